//! The read worker: a dedicated thread that asks the parser what to read,
//! reads it from the byte source and pushes it back.
//!
//! The loop exits only when the shutdown flag is raised. Seek/read errors
//! are logged and forwarded to the parser as a failed push, never fatal.

use std::{
    io,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use tracing::{debug, error, trace};

use crate::media::{
    parser::{Parser, ReadRequest},
    source::{SharedSource, read_full},
};

/// Everything the worker thread owns for one open/close cycle.
pub(crate) struct WorkerContext {
    pub parser: Arc<dyn Parser>,
    pub source: SharedSource,
    pub total_size: u64,
    pub shutdown: Arc<AtomicBool>,
    pub initial_buffer_size: usize,
    pub idle_backoff: Duration,
}

/// Join handle of a running worker.
pub(crate) struct Worker {
    handle: JoinHandle<()>,
}

impl Worker {
    pub fn spawn(name: &str, ctx: WorkerContext) -> io::Result<Self> {
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || ctx.run())?;
        Ok(Self { handle })
    }

    /// Blocks until the thread has exited. The shutdown flag must be set
    /// (and the parser unblocked) first.
    pub fn join(self) {
        if self.handle.join().is_err() {
            error!("read worker panicked");
        }
    }
}

impl WorkerContext {
    pub fn run(self) {
        let mut data = vec![0u8; self.initial_buffer_size];

        debug!("Starting read worker ({} byte source)", self.total_size);

        while !self.shutdown.load(Ordering::Acquire) {
            let Some(request) = self.parser.next_read_request() else {
                self.idle();
                continue;
            };

            self.service(request, &mut data);
        }

        debug!("Reader is shutting down; read worker exiting");
    }

    fn service(&self, request: ReadRequest, data: &mut Vec<u8>) {
        let size = request.clamped_len(self.total_size);
        trace!(
            "read request offset={} size={} -> {}",
            request.offset, request.size, size
        );

        if size == 0 {
            self.parser.push_data(Some(&[]));
            return;
        }

        // grow, never shrink
        if data.len() < size {
            data.resize(size, 0);
        }

        let result = {
            let mut source = self.source.lock();
            source
                .seek_to(request.offset)
                .and_then(|()| read_full(&mut **source, &mut data[..size]))
        };

        match result {
            Ok(read) => {
                if read != size {
                    error!(
                        "Unexpected short read: requested {} bytes, got {}",
                        size, read
                    );
                }
                self.parser.push_data(Some(&data[..read]));
            }
            Err(e) => {
                error!(
                    "Failed to read {} bytes at offset {}: {}",
                    size, request.offset, e
                );
                self.parser.push_data(None);
            }
        }
    }

    fn idle(&self) {
        if self.idle_backoff.is_zero() {
            thread::yield_now();
        } else {
            thread::sleep(self.idle_backoff);
        }
    }
}
