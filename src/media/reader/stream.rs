use std::sync::Arc;

use super::ReaderInner;
use crate::{
    common::errors::{ReaderError, Result},
    media::parser::{StreamDescriptor, StreamKind},
};

/// One entry of the reader's stream table, filled once at connect time.
#[derive(Debug, Clone)]
pub(crate) struct StreamInfo {
    pub index: usize,
    pub descriptor: StreamDescriptor,
}

/// Caller-visible handle to one stream of an open reader.
///
/// Holding a handle keeps the reader alive. Once the reader is closed the
/// handle stays valid but every query returns [`ReaderError::InvalidState`].
#[derive(Clone)]
pub struct StreamHandle {
    reader: Arc<ReaderInner>,
    index: usize,
    generation: u64,
}

impl StreamHandle {
    pub(crate) fn new(reader: Arc<ReaderInner>, index: usize, generation: u64) -> Self {
        Self {
            reader,
            index,
            generation,
        }
    }

    /// Runs `f` against this handle's table entry if the reader that
    /// created the handle is still open.
    fn with_info<T>(&self, f: impl FnOnce(&StreamInfo) -> T) -> Result<T> {
        let state = self.reader.state.lock();
        if !state.is_open() || state.generation != self.generation {
            return Err(ReaderError::InvalidState("stream belongs to a closed reader"));
        }
        state
            .streams
            .get(self.index)
            .map(f)
            .ok_or(ReaderError::InvalidState("stream table changed"))
    }

    /// 0-based position in the reader's stream table.
    pub fn index(&self) -> Result<usize> {
        self.with_info(|info| info.index)
    }

    /// 1-based stream number.
    pub fn number(&self) -> Result<usize> {
        self.with_info(|info| info.index + 1)
    }

    pub fn kind(&self) -> Result<StreamKind> {
        self.with_info(|info| info.descriptor.kind)
    }

    pub fn codec(&self) -> Result<Option<String>> {
        self.with_info(|info| info.descriptor.codec.clone())
    }

    pub fn name(&self) -> Result<Option<String>> {
        self.with_info(|info| info.descriptor.name.clone())
    }

    pub fn language(&self) -> Result<Option<String>> {
        self.with_info(|info| info.descriptor.language.clone())
    }

    pub fn bitrate(&self) -> Result<Option<u32>> {
        self.with_info(|info| info.descriptor.bitrate)
    }

    pub fn buffer_window(&self) -> Result<Option<u32>> {
        self.with_info(|info| info.descriptor.buffer_window)
    }

    /// Snapshot of the parser's description of this stream.
    pub fn descriptor(&self) -> Result<StreamDescriptor> {
        self.with_info(|info| info.descriptor.clone())
    }
}

impl std::fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamHandle")
            .field("index", &self.index)
            .field("generation", &self.generation)
            .finish()
    }
}
