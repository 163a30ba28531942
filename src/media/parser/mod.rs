//! Parser layer: the pull-mode demultiplexer contract the reader drives,
//! plus a bundled implementation on top of symphonia's probe.
//!
//! # Module layout
//!
//! ```text
//! src/media/parser/
//! ├── mod.rs     ← Parser / ParserFactory traits, request + stream types
//! └── probe.rs   ← SymphoniaParser (request/response pipe, container probe)
//! ```
//!
//! A parser never touches the byte source. It asks for bytes through
//! [`Parser::next_read_request`] and is answered through
//! [`Parser::push_data`] by the reader's worker thread.

pub mod probe;

use std::sync::Arc;

pub use probe::{SymphoniaParser, SymphoniaParserFactory};

pub use crate::common::errors::ParserError;

/// One pending read the parser wants serviced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadRequest {
    pub offset: u64,
    pub size: usize,
}

impl ReadRequest {
    pub fn new(offset: u64, size: usize) -> Self {
        Self { offset, size }
    }

    /// Bytes that can actually be served from a source of `total_size`
    /// bytes: zero at or past the end, otherwise truncated to what remains.
    pub fn clamped_len(&self, total_size: u64) -> usize {
        if self.offset >= total_size {
            return 0;
        }
        (total_size - self.offset).min(self.size as u64) as usize
    }
}

/// Broad media type of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamKind {
    Audio,
    Video,
    Subtitle,
    #[default]
    Unknown,
}

impl StreamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Subtitle => "subtitle",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for StreamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// The parser's own description of one stream. `id` is the parser-side
/// handle (track id); it is not the reader's 0-based index.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StreamDescriptor {
    pub id: u32,
    pub kind: StreamKind,
    pub codec: Option<String>,
    pub name: Option<String>,
    pub language: Option<String>,
    /// Bits per second, when the container or codec parameters give it.
    pub bitrate: Option<u32>,
    /// Buffer window in milliseconds.
    pub buffer_window: Option<u32>,
}

/// Pull-mode demultiplexer driven by the reader.
///
/// All methods take `&self`: the worker blocks in `next_read_request` while
/// the lifecycle controller calls `connect`/`disconnect` from another thread,
/// so implementations synchronize internally.
pub trait Parser: Send + Sync {
    /// Negotiate with a source of `total_size` bytes and discover streams.
    /// May block while the parser issues read requests of its own.
    fn connect(&self, total_size: u64) -> Result<(), ParserError>;

    /// Stop parsing. Must unblock any thread waiting in
    /// `next_read_request` or inside `connect`.
    fn disconnect(&self) -> Result<(), ParserError>;

    fn stream_count(&self) -> usize;

    fn stream(&self, index: usize) -> Option<StreamDescriptor>;

    /// Block until the parser wants bytes. `None` means nothing is pending
    /// right now; callers re-poll.
    fn next_read_request(&self) -> Option<ReadRequest>;

    /// Answer the last request. `Some(&[])` signals end of data, `None`
    /// signals that the source failed to deliver.
    fn push_data(&self, data: Option<&[u8]>);
}

/// Creates one parser per `open`. Returning `None` is reported as
/// resource exhaustion.
pub trait ParserFactory: Send + Sync {
    fn create(&self) -> Option<Arc<dyn Parser>>;
}

impl<F> ParserFactory for F
where
    F: Fn() -> Option<Arc<dyn Parser>> + Send + Sync,
{
    fn create(&self) -> Option<Arc<dyn Parser>> {
        self()
    }
}
