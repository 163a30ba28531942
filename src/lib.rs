pub mod common;
pub mod configs;
pub mod media;

pub use common::errors::{ParserError, ReaderError, Result};
pub use media::{
    ByteSource, Parser, ParserFactory, ReadRequest, Reader, StreamDescriptor, StreamHandle,
    StreamKind, SymphoniaParser, SymphoniaParserFactory,
};
