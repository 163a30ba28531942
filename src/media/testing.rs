//! Test doubles for the parser and byte-source collaborators.

use std::{
    collections::VecDeque,
    io,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use parking_lot::{Condvar, Mutex};

use crate::media::{
    parser::{Parser, ParserError, ReadRequest, StreamDescriptor, StreamKind},
    source::ByteSource,
};

// ─────────────────────────────────────────────────────────────────────────────
// ScriptedParser
// ─────────────────────────────────────────────────────────────────────────────

/// What the worker handed back for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Pushed {
    Data(Vec<u8>),
    Failed,
}

/// A parser that serves queued requests and records every push.
pub(crate) struct ScriptedParser {
    requests: Mutex<VecDeque<ReadRequest>>,
    pushes: Mutex<Vec<Pushed>>,
    pushed: Condvar,
    streams: Vec<StreamDescriptor>,
    /// Requests `connect` issues itself and waits on before returning.
    connect_reads: Mutex<Vec<ReadRequest>>,
    connect_error: Mutex<Option<ParserError>>,
    disconnect_error: Mutex<Option<ParserError>>,
    connected: AtomicBool,
    pub connects: AtomicUsize,
    pub disconnects: AtomicUsize,
}

impl ScriptedParser {
    pub fn new(stream_count: usize) -> Arc<Self> {
        let kinds = [StreamKind::Video, StreamKind::Audio, StreamKind::Subtitle];
        let streams = (0..stream_count)
            .map(|i| StreamDescriptor {
                id: 100 + i as u32,
                kind: kinds[i % kinds.len()],
                codec: Some(format!("codec{i}")),
                name: Some(format!("stream {i}")),
                language: (i % 2 == 1).then(|| "en".to_string()),
                bitrate: Some(64_000 * (i as u32 + 1)),
                buffer_window: Some(3_000),
            })
            .collect();

        Arc::new(Self {
            requests: Mutex::new(VecDeque::new()),
            pushes: Mutex::new(Vec::new()),
            pushed: Condvar::new(),
            streams,
            connect_reads: Mutex::new(Vec::new()),
            connect_error: Mutex::new(None),
            disconnect_error: Mutex::new(None),
            connected: AtomicBool::new(false),
            connects: AtomicUsize::new(0),
            disconnects: AtomicUsize::new(0),
        })
    }

    pub fn enqueue(&self, request: ReadRequest) {
        self.requests.lock().push_back(request);
    }

    pub fn read_during_connect(&self, request: ReadRequest) {
        self.connect_reads.lock().push(request);
    }

    pub fn fail_connect(&self, err: ParserError) {
        *self.connect_error.lock() = Some(err);
    }

    pub fn fail_disconnect(&self, err: ParserError) {
        *self.disconnect_error.lock() = Some(err);
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    pub fn pushes(&self) -> Vec<Pushed> {
        self.pushes.lock().clone()
    }

    /// Waits until at least `count` pushes were recorded.
    pub fn wait_for_pushes(&self, count: usize, timeout: Duration) -> Vec<Pushed> {
        let deadline = Instant::now() + timeout;
        let mut pushes = self.pushes.lock();
        while pushes.len() < count {
            if self.pushed.wait_until(&mut pushes, deadline).timed_out() {
                panic!("timed out waiting for {count} pushes, got {:?}", *pushes);
            }
        }
        pushes.clone()
    }
}

impl Parser for ScriptedParser {
    fn connect(&self, _total_size: u64) -> Result<(), ParserError> {
        self.connects.fetch_add(1, Ordering::AcqRel);
        if let Some(err) = self.connect_error.lock().take() {
            return Err(err);
        }

        let reads: Vec<ReadRequest> = self.connect_reads.lock().drain(..).collect();
        if !reads.is_empty() {
            let already = self.pushes.lock().len();
            let wanted = already + reads.len();
            for request in reads {
                self.enqueue(request);
            }
            self.wait_for_pushes(wanted, Duration::from_secs(5));
        }

        self.connected.store(true, Ordering::Release);
        Ok(())
    }

    fn disconnect(&self) -> Result<(), ParserError> {
        self.disconnects.fetch_add(1, Ordering::AcqRel);
        self.connected.store(false, Ordering::Release);
        match self.disconnect_error.lock().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn stream_count(&self) -> usize {
        self.streams.len()
    }

    fn stream(&self, index: usize) -> Option<StreamDescriptor> {
        self.streams.get(index).cloned()
    }

    fn next_read_request(&self) -> Option<ReadRequest> {
        let request = self.requests.lock().pop_front();
        if request.is_none() {
            thread::sleep(Duration::from_millis(1));
        }
        request
    }

    fn push_data(&self, data: Option<&[u8]>) {
        let mut pushes = self.pushes.lock();
        pushes.push(match data {
            Some(bytes) => Pushed::Data(bytes.to_vec()),
            None => Pushed::Failed,
        });
        self.pushed.notify_all();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MemorySource
// ─────────────────────────────────────────────────────────────────────────────

/// Counters shared between a [`MemorySource`] and the test holding it.
#[derive(Default)]
pub(crate) struct SourceStats {
    reads: AtomicUsize,
    seeks: AtomicUsize,
    dropped: AtomicBool,
}

impl SourceStats {
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::Acquire)
    }

    pub fn seeks(&self) -> usize {
        self.seeks.load(Ordering::Acquire)
    }

    pub fn dropped(&self) -> bool {
        self.dropped.load(Ordering::Acquire)
    }
}

/// In-memory byte source with fault injection.
pub(crate) struct MemorySource {
    data: Vec<u8>,
    pos: u64,
    stats: Arc<SourceStats>,
    fail_read_at: Option<u64>,
    readable_len: Option<u64>,
    stat_fails: bool,
}

impl MemorySource {
    pub fn byte_at(offset: u64) -> u8 {
        (offset % 251) as u8
    }

    /// `len` bytes where byte `i` is [`MemorySource::byte_at`]`(i)`.
    pub fn patterned(len: u64) -> Self {
        Self {
            data: (0..len).map(Self::byte_at).collect(),
            pos: 0,
            stats: Arc::default(),
            fail_read_at: None,
            readable_len: None,
            stat_fails: false,
        }
    }

    /// The first read starting at `offset` fails; later ones succeed.
    pub fn fail_read_at(mut self, offset: u64) -> Self {
        self.fail_read_at = Some(offset);
        self
    }

    /// Reports the full size from `stat` but yields no data past `len`.
    pub fn truncate_reads_to(mut self, len: u64) -> Self {
        self.readable_len = Some(len);
        self
    }

    pub fn failing_stat(mut self) -> Self {
        self.stat_fails = true;
        self
    }

    pub fn stats(&self) -> Arc<SourceStats> {
        Arc::clone(&self.stats)
    }
}

impl ByteSource for MemorySource {
    fn stat(&self) -> io::Result<u64> {
        if self.stat_fails {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "stat denied"));
        }
        Ok(self.data.len() as u64)
    }

    fn seek_to(&mut self, offset: u64) -> io::Result<()> {
        self.stats.seeks.fetch_add(1, Ordering::AcqRel);
        self.pos = offset;
        Ok(())
    }

    fn read_into(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stats.reads.fetch_add(1, Ordering::AcqRel);
        if self.fail_read_at == Some(self.pos) {
            self.fail_read_at = None;
            return Err(io::Error::new(io::ErrorKind::TimedOut, "transient failure"));
        }

        let end = self
            .readable_len
            .unwrap_or(self.data.len() as u64)
            .min(self.data.len() as u64);
        if self.pos >= end {
            return Ok(0);
        }
        let start = self.pos as usize;
        let n = buf.len().min((end - self.pos) as usize);
        buf[..n].copy_from_slice(&self.data[start..start + n]);
        self.pos += n as u64;
        Ok(n)
    }
}

impl Drop for MemorySource {
    fn drop(&mut self) {
        self.stats.dropped.store(true, Ordering::Release);
    }
}
