use std::sync::Arc;

use super::{stream::StreamInfo, worker::Worker};
use crate::media::{parser::Parser, source::SharedSource};

/// Where a reader is in its open/close cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Closed,
    /// Parser created and worker running; `connect` in progress.
    Opening,
    Open,
    /// `close` has claimed the reader and is tearing it down.
    Closing,
}

/// Lock-protected state of one reader.
///
/// `parser` and `source` are both set exactly when `phase` is not
/// `Closed`; `streams` is non-empty only while `Open`.
pub(crate) struct ReaderState {
    pub phase: Phase,
    pub source: Option<SharedSource>,
    pub parser: Option<Arc<dyn Parser>>,
    pub source_size: u64,
    pub streams: Arc<[StreamInfo]>,
    pub worker: Option<Worker>,
    /// Bumped on every successful claim by `open`; stream handles compare
    /// against it to detect that their reader was closed.
    pub generation: u64,
}

/// Handles released by [`ReaderState::clear`], dropped by the caller
/// outside the lock.
pub(crate) type Released = (Option<Arc<dyn Parser>>, Option<SharedSource>);

impl ReaderState {
    pub fn new() -> Self {
        Self {
            phase: Phase::Closed,
            source: None,
            parser: None,
            source_size: 0,
            streams: Arc::from(Vec::new()),
            worker: None,
            generation: 0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.phase == Phase::Open
    }

    /// Back to `Closed`. The worker must already have been joined.
    pub fn clear(&mut self) -> Released {
        debug_assert!(self.worker.is_none(), "clearing state with a live worker");
        self.phase = Phase::Closed;
        self.source_size = 0;
        self.streams = Arc::from(Vec::new());
        (self.parser.take(), self.source.take())
    }
}
