use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::media::constants::{
    DEFAULT_READ_BUFFER_SIZE, DEFAULT_REQUEST_WAIT_MS, WORKER_THREAD_NAME,
};

/// `[reader]` table: knobs for the read worker.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ReaderConfig {
    /// Initial capacity of the worker's scratch buffer. The buffer grows to
    /// fit larger requests and is never shrunk.
    #[serde(default = "default_initial_buffer_size")]
    pub initial_buffer_size: usize,
    #[serde(default = "default_worker_thread_name")]
    pub worker_thread_name: String,
    /// Pause between polls when the parser has no request pending.
    /// `0` yields the thread instead of sleeping.
    #[serde(default)]
    pub idle_backoff_us: u64,
}

impl ReaderConfig {
    pub fn idle_backoff(&self) -> Duration {
        Duration::from_micros(self.idle_backoff_us)
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            initial_buffer_size: default_initial_buffer_size(),
            worker_thread_name: default_worker_thread_name(),
            idle_backoff_us: 0,
        }
    }
}

/// `[parser]` table: settings for the bundled symphonia parser.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ParserConfig {
    /// How long `next_read_request` blocks before reporting "nothing yet".
    #[serde(default = "default_request_wait_ms")]
    pub request_wait_ms: u64,
    /// File extension passed to the probe as a hint (`"wav"`, `"mkv"`, ...).
    #[serde(default)]
    pub extension_hint: Option<String>,
}

impl ParserConfig {
    pub fn request_wait(&self) -> Duration {
        Duration::from_millis(self.request_wait_ms)
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            request_wait_ms: default_request_wait_ms(),
            extension_hint: None,
        }
    }
}

fn default_initial_buffer_size() -> usize {
    DEFAULT_READ_BUFFER_SIZE
}

fn default_worker_thread_name() -> String {
    WORKER_THREAD_NAME.to_string()
}

fn default_request_wait_ms() -> u64 {
    DEFAULT_REQUEST_WAIT_MS
}
