//! Error types for the media reader.

use std::io;

use thiserror::Error;

/// Result type for reader operations.
pub type Result<T> = std::result::Result<T, ReaderError>;

/// Errors surfaced synchronously by the reader's lifecycle and
/// enumeration calls.
#[derive(Debug, Error)]
pub enum ReaderError {
    /// The call requires an open (or closed) reader and the reader is not
    /// in that state, e.g. a second `close` or enumeration while closed.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// Out-of-range stream index or number.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Parser allocation or worker spawn failed.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    /// The byte source could not report its total size.
    #[error("failed to query source size: {0}")]
    SourceQuery(#[source] io::Error),

    /// The byte source itself could not be opened.
    #[error("source I/O error: {0}")]
    SourceIo(#[from] io::Error),

    /// Propagated verbatim from parser connect/disconnect.
    #[error(transparent)]
    Parser(#[from] ParserError),
}

impl ReaderError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn resource_exhausted(msg: impl Into<String>) -> Self {
        Self::ResourceExhausted(msg.into())
    }
}

/// Errors reported by a [`Parser`](crate::media::parser::Parser).
#[derive(Debug, Error)]
pub enum ParserError {
    /// The parser was disconnected while a call was in progress.
    #[error("parser disconnected")]
    Disconnected,

    /// No demuxer recognised the container.
    #[error("unsupported container: {0}")]
    Unsupported(String),

    /// The container was recognised but is malformed.
    #[error("malformed container: {0}")]
    Format(String),

    /// The parser reported fewer streams than its stream count.
    #[error("parser has no stream at index {0}")]
    MissingStream(usize),

    #[error("parser I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<symphonia::core::errors::Error> for ParserError {
    fn from(err: symphonia::core::errors::Error) -> Self {
        use symphonia::core::errors::Error;

        match err {
            Error::IoError(e) if e.kind() == io::ErrorKind::BrokenPipe => Self::Disconnected,
            Error::IoError(e) => Self::Io(e),
            Error::Unsupported(msg) => Self::Unsupported(msg.to_string()),
            Error::DecodeError(msg) => Self::Format(msg.to_string()),
            other => Self::Format(other.to_string()),
        }
    }
}
