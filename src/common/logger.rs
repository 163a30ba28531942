use tracing_subscriber::{EnvFilter, fmt::{self, time::LocalTime}, prelude::*};

use crate::configs::Config;

/// Builds the filter string from the configured level and extra directives.
pub fn filter_directives(config: &Config) -> String {
  let log_level = config
    .logging
    .as_ref()
    .and_then(|l| l.level.as_deref())
    .unwrap_or("info");

  let filters = config
    .logging
    .as_ref()
    .and_then(|l| l.filters.as_deref())
    .unwrap_or("");

  if filters.is_empty() {
    log_level.to_string()
  } else {
    format!("{},{}", log_level, filters)
  }
}

pub fn init(config: &Config) {
  // RUST_LOG wins over the config file
  let env_filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_directives(config)));

  let fmt_layer = fmt::layer()
    .with_timer(LocalTime::rfc_3339())
    .with_target(true)
    .with_thread_ids(true)
    .with_thread_names(true)
    .with_line_number(true)
    .with_file(false)
    .with_writer(std::io::stderr);

  tracing_subscriber::registry()
    .with(env_filter)
    .with(fmt_layer)
    .init();
}
