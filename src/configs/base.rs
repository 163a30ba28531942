use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::types::AnyResult;
use crate::configs::*;

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Config {
  #[serde(default)]
  pub reader: ReaderConfig,
  #[serde(default)]
  pub parser: ParserConfig,
  #[serde(default)]
  pub logging: Option<LoggingConfig>,
}

impl Config {
  pub fn load(path: impl AsRef<Path>) -> AnyResult<Self> {
    let path = path.as_ref();
    let config_str = std::fs::read_to_string(path)?;
    if config_str.trim().is_empty() {
      return Err(format!("{} is empty", path.display()).into());
    }

    let config: Config = toml::from_str(&config_str)?;
    Ok(config)
  }

  /// Like [`Config::load`], but a missing file yields the defaults.
  pub fn load_or_default(path: impl AsRef<Path>) -> AnyResult<Self> {
    let path = path.as_ref();
    if !path.exists() {
      return Ok(Self::default());
    }
    Self::load(path)
  }
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use super::*;
  use crate::media::constants::{DEFAULT_READ_BUFFER_SIZE, WORKER_THREAD_NAME};

  #[test]
  fn partial_tables_fall_back_to_defaults() {
    let config: Config = toml::from_str(
      r#"
        [reader]
        idle_backoff_us = 250

        [parser]
        extension_hint = "wav"
      "#,
    )
    .unwrap();

    assert_eq!(config.reader.initial_buffer_size, DEFAULT_READ_BUFFER_SIZE);
    assert_eq!(config.reader.worker_thread_name, WORKER_THREAD_NAME);
    assert_eq!(config.reader.idle_backoff().as_micros(), 250);
    assert_eq!(config.parser.extension_hint.as_deref(), Some("wav"));
    assert!(config.logging.is_none());
  }

  #[test]
  fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load_or_default(dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, Config::default());
  }

  #[test]
  fn empty_file_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "   ").unwrap();
    assert!(Config::load(file.path()).is_err());
  }

  #[test]
  fn loads_logging_table() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[logging]\nlevel = \"trace\"").unwrap();
    let config = Config::load(file.path()).unwrap();
    assert_eq!(
      config.logging.and_then(|l| l.level).as_deref(),
      Some("trace")
    );
  }
}
