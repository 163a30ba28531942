//! `Reader` bridges a random-access [`ByteSource`] to a pull-mode
//! [`Parser`] through a dedicated read worker.
//!
//! # Module layout
//!
//! ```text
//! src/media/reader/
//! ├── mod.rs      ← Reader: open / close lifecycle, stream enumeration
//! ├── state.rs    ← ReaderState (lock-protected) + Phase
//! ├── stream.rs   ← StreamInfo table entries, StreamHandle
//! └── worker.rs   ← read worker thread
//! ```
//!
//! # Locking
//!
//! One `parking_lot::Mutex` guards [`ReaderState`]. The shutdown flag is an
//! `AtomicBool` the worker polls without the lock; it is only ever written
//! with the lock held. Parser `connect`/`disconnect` and the worker join
//! run outside the lock: the parser may be blocked waiting on the worker,
//! and stream handles take the lock for every query.

mod state;
mod stream;
mod worker;

use std::{
    fs::File,
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use self::{
    state::{Phase, ReaderState},
    worker::{Worker, WorkerContext},
};
pub use self::stream::StreamHandle;
use self::stream::StreamInfo;
use crate::{
    common::errors::{ParserError, ReaderError, Result},
    configs::ReaderConfig,
    media::{
        parser::{Parser, ParserFactory},
        source::{ByteSource, SharedSource},
    },
};

/// Shared core of a reader; kept alive by the [`Reader`] and by every
/// [`StreamHandle`] it hands out.
pub(crate) struct ReaderInner {
    config: ReaderConfig,
    factory: Box<dyn ParserFactory>,
    state: Mutex<ReaderState>,
    shutdown: Arc<AtomicBool>,
}

impl ReaderInner {
    /// Raise the shutdown flag and join the worker, if one is running.
    fn stop_worker(&self) {
        let worker = {
            let mut state = self.state.lock();
            self.shutdown.store(true, Ordering::Release);
            state.worker.take()
        };
        if let Some(worker) = worker {
            worker.join();
        }
    }

    /// Undo a partially completed `open`. The caller has already
    /// disconnected the parser if that was needed to unblock the worker.
    fn rollback_open(&self) {
        self.stop_worker();
        let released = self.state.lock().clear();
        drop(released);
    }
}

impl Drop for ReaderInner {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        let Some(worker) = state.worker.take() else {
            return;
        };

        warn!("Reader released while open; stopping read worker");
        if let Some(parser) = &state.parser {
            if let Err(e) = parser.disconnect() {
                warn!("Failed to disconnect parser: {}", e);
            }
        }
        self.shutdown.store(true, Ordering::Release);
        worker.join();
    }
}

/// An asynchronous media-container reader.
///
/// `open` starts a worker that services the parser's read requests against
/// the byte source; `close` stops it. All methods take `&self` and may be
/// called from any thread.
pub struct Reader {
    inner: Arc<ReaderInner>,
}

impl Reader {
    pub fn new(factory: impl ParserFactory + 'static) -> Self {
        Self::with_config(ReaderConfig::default(), factory)
    }

    pub fn with_config(config: ReaderConfig, factory: impl ParserFactory + 'static) -> Self {
        Self {
            inner: Arc::new(ReaderInner {
                config,
                factory: Box::new(factory),
                state: Mutex::new(ReaderState::new()),
                shutdown: Arc::new(AtomicBool::new(false)),
            }),
        }
    }

    /// Open `source`, start the read worker and connect the parser.
    ///
    /// Fails with `InvalidState` if the reader is already open. On any
    /// failure the reader is left closed with no worker running.
    pub fn open(&self, source: impl ByteSource + 'static) -> Result<()> {
        self.open_boxed(Box::new(source))
    }

    /// Open the file at `path` as the byte source.
    pub fn open_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::open(path).inspect_err(|e| {
            error!("Failed to open {}: {}", path.display(), e);
        })?;
        info!("Opening {}", path.display());
        self.open(file)
    }

    fn open_boxed(&self, source: Box<dyn ByteSource>) -> Result<()> {
        if self.inner.state.lock().phase != Phase::Closed {
            return Err(ReaderError::InvalidState("reader is already open"));
        }

        let total_size = source.stat().map_err(|e| {
            error!("Failed to stat source: {}", e);
            ReaderError::SourceQuery(e)
        })?;

        let parser = self
            .inner
            .factory
            .create()
            .ok_or_else(|| ReaderError::resource_exhausted("failed to create parser"))?;

        let source: SharedSource = Arc::new(Mutex::new(source));

        {
            let mut state = self.inner.state.lock();
            if state.phase != Phase::Closed {
                return Err(ReaderError::InvalidState("reader is already open"));
            }

            state.phase = Phase::Opening;
            state.source = Some(Arc::clone(&source));
            state.parser = Some(Arc::clone(&parser));
            state.source_size = total_size;
            state.generation += 1;
            self.inner.shutdown.store(false, Ordering::Release);

            let ctx = WorkerContext {
                parser: Arc::clone(&parser),
                source,
                total_size,
                shutdown: Arc::clone(&self.inner.shutdown),
                initial_buffer_size: self.inner.config.initial_buffer_size,
                idle_backoff: self.inner.config.idle_backoff(),
            };

            match Worker::spawn(&self.inner.config.worker_thread_name, ctx) {
                Ok(worker) => state.worker = Some(worker),
                Err(e) => {
                    error!("Failed to spawn read worker: {}", e);
                    let released = state.clear();
                    drop(state);
                    drop(released);
                    return Err(ReaderError::resource_exhausted(format!(
                        "failed to spawn read worker: {e}"
                    )));
                }
            }
        }

        if let Err(e) = parser.connect(total_size) {
            error!("Failed to connect parser: {}", e);
            self.abort_open(&parser);
            return Err(e.into());
        }

        let count = parser.stream_count();
        let mut streams = Vec::with_capacity(count);
        for index in 0..count {
            let Some(descriptor) = parser.stream(index) else {
                error!("Parser reported {} streams but has none at {}", count, index);
                self.abort_open(&parser);
                return Err(ParserError::MissingStream(index).into());
            };
            streams.push(StreamInfo { index, descriptor });
        }

        let mut state = self.inner.state.lock();
        state.streams = Arc::from(streams);
        state.phase = Phase::Open;
        info!(
            "Reader open: {} byte source, {} stream(s)",
            total_size, count
        );
        Ok(())
    }

    /// Disconnect (to unblock the worker) and roll the open back.
    fn abort_open(&self, parser: &Arc<dyn Parser>) {
        if let Err(e) = parser.disconnect() {
            warn!("Failed to disconnect parser during rollback: {}", e);
        }
        self.inner.rollback_open();
    }

    /// Stop the worker, disconnect and destroy the parser and release the
    /// source. Blocks until the worker thread has exited.
    ///
    /// Closing a reader that is not open is `InvalidState`. A parser
    /// disconnect error is returned after the teardown has completed.
    pub fn close(&self) -> Result<()> {
        let parser = {
            let mut state = self.inner.state.lock();
            if state.phase != Phase::Open {
                return Err(ReaderError::InvalidState("reader is not open"));
            }
            state.phase = Phase::Closing;
            state.parser.clone()
        };

        let disconnected = match &parser {
            Some(parser) => parser.disconnect(),
            None => Ok(()),
        };

        self.inner.stop_worker();
        drop(parser);

        let released = self.inner.state.lock().clear();
        drop(released);

        match disconnected {
            Ok(()) => {
                debug!("Reader closed");
                Ok(())
            }
            Err(e) => {
                error!("Failed to disconnect parser: {}", e);
                Err(e.into())
            }
        }
    }

    pub fn is_open(&self) -> bool {
        self.inner.state.lock().is_open()
    }

    /// Total size reported by the source at open time.
    pub fn source_size(&self) -> Result<u64> {
        let state = self.inner.state.lock();
        if !state.is_open() {
            return Err(ReaderError::InvalidState("reader is not open"));
        }
        Ok(state.source_size)
    }

    pub fn stream_count(&self) -> Result<usize> {
        let state = self.inner.state.lock();
        if !state.is_open() {
            return Err(ReaderError::InvalidState("reader is not open"));
        }
        Ok(state.streams.len())
    }

    /// Handle to the stream at 0-based `index`.
    pub fn stream(&self, index: usize) -> Result<StreamHandle> {
        let state = self.inner.state.lock();
        if !state.is_open() {
            return Err(ReaderError::InvalidState("reader is not open"));
        }
        if index >= state.streams.len() {
            warn!(
                "Index {} exceeds stream count {}",
                index,
                state.streams.len()
            );
            return Err(ReaderError::invalid_argument(format!(
                "stream index {} out of range (count {})",
                index,
                state.streams.len()
            )));
        }
        Ok(StreamHandle::new(
            Arc::clone(&self.inner),
            index,
            state.generation,
        ))
    }

    /// Handle to the stream with 1-based `number`.
    pub fn stream_by_number(&self, number: usize) -> Result<StreamHandle> {
        match number.checked_sub(1) {
            Some(index) => self.stream(index),
            None => Err(ReaderError::invalid_argument("stream numbers start at 1")),
        }
    }
}

impl std::fmt::Debug for Reader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Reader")
            .field("phase", &state.phase)
            .field("source_size", &state.source_size)
            .field("streams", &state.streams.len())
            .finish()
    }
}
