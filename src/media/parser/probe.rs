//! `SymphoniaParser`: a pull-mode parser built on symphonia's probe.
//!
//! Symphonia wants a `Read + Seek` source, the reader wants a parser that
//! asks for `(offset, size)` and gets bytes pushed back. A [`Pipe`] joins
//! the two: the demuxer reads through [`PipeSource`], which posts a
//! [`ReadRequest`] and parks on a condvar until the worker answers via
//! `push_data`.

use std::{
    io::{self, Read, Seek, SeekFrom},
    sync::Arc,
    time::Duration,
};

use bytes::Bytes;
use parking_lot::{Condvar, Mutex};
use symphonia::core::{
    codecs::CODEC_TYPE_NULL,
    formats::{FormatOptions, Track},
    io::{MediaSource, MediaSourceStream},
    meta::MetadataOptions,
    probe::Hint,
};
use tracing::{debug, trace, warn};

use super::{Parser, ParserError, ParserFactory, ReadRequest, StreamDescriptor, StreamKind};
use crate::configs::ParserConfig;

// ─────────────────────────────────────────────────────────────────────────────
// Pipe
// ─────────────────────────────────────────────────────────────────────────────

struct PipeState {
    /// Posted by the demuxer, taken by the worker.
    pending: Option<ReadRequest>,
    /// Answer to the request in flight; inner `None` = source failure.
    response: Option<Option<Bytes>>,
    disconnected: bool,
}

struct Pipe {
    state: Mutex<PipeState>,
    cvar: Condvar,
}

impl Pipe {
    fn new() -> Self {
        Self {
            state: Mutex::new(PipeState {
                pending: None,
                response: None,
                disconnected: false,
            }),
            cvar: Condvar::new(),
        }
    }

    /// Demuxer side: ask for `buf.len()` bytes at `offset` and wait.
    fn request(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let mut state = self.state.lock();
        if state.disconnected {
            return Err(disconnected());
        }

        state.pending = Some(ReadRequest::new(offset, buf.len()));
        state.response = None;
        self.cvar.notify_all();

        loop {
            if state.disconnected {
                state.pending = None;
                return Err(disconnected());
            }
            if let Some(response) = state.response.take() {
                return match response {
                    Some(data) => {
                        let n = data.len().min(buf.len());
                        buf[..n].copy_from_slice(&data[..n]);
                        Ok(n)
                    }
                    None => Err(io::Error::other("byte source failed to deliver data")),
                };
            }
            self.cvar.wait(&mut state);
        }
    }

    /// Worker side: take the pending request, waiting up to `wait`.
    fn take_request(&self, wait: Duration) -> Option<ReadRequest> {
        let mut state = self.state.lock();
        if state.pending.is_none() && !state.disconnected {
            self.cvar.wait_for(&mut state, wait);
        }
        if state.disconnected {
            return None;
        }
        state.pending.take()
    }

    fn respond(&self, data: Option<&[u8]>) {
        let mut state = self.state.lock();
        if state.disconnected {
            return;
        }
        state.response = Some(data.map(Bytes::copy_from_slice));
        self.cvar.notify_all();
    }

    /// Returns `false` if the pipe was already disconnected.
    fn disconnect(&self) -> bool {
        let mut state = self.state.lock();
        let was_connected = !state.disconnected;
        state.disconnected = true;
        state.pending = None;
        self.cvar.notify_all();
        was_connected
    }

    fn reset(&self) {
        let mut state = self.state.lock();
        state.pending = None;
        state.response = None;
        state.disconnected = false;
    }
}

fn disconnected() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "parser disconnected")
}

// ─────────────────────────────────────────────────────────────────────────────
// PipeSource
// ─────────────────────────────────────────────────────────────────────────────

/// The `MediaSource` symphonia reads from. Every read becomes a request.
struct PipeSource {
    pipe: Arc<Pipe>,
    pos: u64,
    len: u64,
}

impl Read for PipeSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.pipe.request(self.pos, buf)?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl Seek for PipeSource {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let new_pos = match pos {
            SeekFrom::Start(p) => Some(p),
            SeekFrom::Current(delta) => self.pos.checked_add_signed(delta),
            SeekFrom::End(delta) => self.len.checked_add_signed(delta),
        };
        self.pos = new_pos.ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "seek before start of stream")
        })?;
        Ok(self.pos)
    }
}

impl MediaSource for PipeSource {
    fn is_seekable(&self) -> bool {
        true
    }

    fn byte_len(&self) -> Option<u64> {
        Some(self.len)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SymphoniaParser
// ─────────────────────────────────────────────────────────────────────────────

/// Probes the container on `connect` and reports one stream per track.
pub struct SymphoniaParser {
    pipe: Arc<Pipe>,
    streams: Mutex<Vec<StreamDescriptor>>,
    request_wait: Duration,
    extension_hint: Option<String>,
}

impl SymphoniaParser {
    pub fn new(config: &ParserConfig) -> Self {
        Self {
            pipe: Arc::new(Pipe::new()),
            streams: Mutex::new(Vec::new()),
            request_wait: config.request_wait(),
            extension_hint: config.extension_hint.clone(),
        }
    }

    fn hint(&self) -> Hint {
        let mut hint = Hint::new();
        if let Some(ext) = &self.extension_hint {
            hint.with_extension(ext);
        }
        hint
    }
}

impl Parser for SymphoniaParser {
    fn connect(&self, total_size: u64) -> Result<(), ParserError> {
        self.pipe.reset();
        let source = PipeSource {
            pipe: Arc::clone(&self.pipe),
            pos: 0,
            len: total_size,
        };
        let mss = MediaSourceStream::new(Box::new(source), Default::default());

        let probed = symphonia::default::get_probe().format(
            &self.hint(),
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )?;

        let streams: Vec<StreamDescriptor> =
            probed.format.tracks().iter().map(describe_track).collect();
        debug!(
            "SymphoniaParser: connected, {} byte(s), {} stream(s)",
            total_size,
            streams.len()
        );
        *self.streams.lock() = streams;
        Ok(())
    }

    fn disconnect(&self) -> Result<(), ParserError> {
        if !self.pipe.disconnect() {
            trace!("SymphoniaParser: already disconnected");
        }
        Ok(())
    }

    fn stream_count(&self) -> usize {
        self.streams.lock().len()
    }

    fn stream(&self, index: usize) -> Option<StreamDescriptor> {
        self.streams.lock().get(index).cloned()
    }

    fn next_read_request(&self) -> Option<ReadRequest> {
        self.pipe.take_request(self.request_wait)
    }

    fn push_data(&self, data: Option<&[u8]>) {
        if data.is_none() {
            warn!("SymphoniaParser: source read failed, failing demuxer read");
        }
        self.pipe.respond(data);
    }
}

fn describe_track(track: &Track) -> StreamDescriptor {
    let params = &track.codec_params;

    // symphonia only registers audio codecs
    let kind = if params.codec == CODEC_TYPE_NULL {
        StreamKind::Unknown
    } else {
        StreamKind::Audio
    };

    let codec = symphonia::default::get_codecs()
        .get_codec(params.codec)
        .map(|desc| desc.short_name.to_string());

    let bitrate = match (params.sample_rate, params.channels, params.bits_per_sample) {
        (Some(rate), Some(channels), Some(bits)) => {
            rate.checked_mul(channels.count() as u32)
                .and_then(|v| v.checked_mul(bits))
        }
        _ => None,
    };

    StreamDescriptor {
        id: track.id,
        kind,
        codec,
        name: None,
        language: track.language.clone(),
        bitrate,
        buffer_window: None,
    }
}

/// Builds a fresh [`SymphoniaParser`] for every `open`.
#[derive(Debug, Clone, Default)]
pub struct SymphoniaParserFactory {
    config: ParserConfig,
}

impl SymphoniaParserFactory {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }
}

impl ParserFactory for SymphoniaParserFactory {
    fn create(&self) -> Option<Arc<dyn Parser>> {
        Some(Arc::new(SymphoniaParser::new(&self.config)))
    }
}
