//! Central constants for the media reader.
//!
//! Defaults for the configurable knobs live here so the config layer and the
//! worker agree on them.

// ── Read worker ──────────────────────────────────────────────────────────────

/// Initial size of the worker's scratch buffer (4 KB). Grown on demand.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 4 * 1_024;

/// Name given to the background read thread.
pub const WORKER_THREAD_NAME: &str = "media-reader-worker";

// ── Bundled parser ───────────────────────────────────────────────────────────

/// Milliseconds `next_read_request` parks waiting for the demuxer to ask for
/// data before returning "no request" so the worker can re-check shutdown.
pub const DEFAULT_REQUEST_WAIT_MS: u64 = 50;
