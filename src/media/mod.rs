//! Asynchronous media-container reading.
//!
//! ```text
//! src/media/
//! ├── constants.rs  ← buffer sizes, thread name, parser timeouts
//! ├── source/       ← ByteSource: random-access bytes with a known size
//! ├── parser/       ← Parser contract + symphonia-backed implementation
//! └── reader/       ← Reader: worker thread, lifecycle, stream handles
//! ```

pub mod constants;
pub mod parser;
pub mod reader;
pub mod source;

#[cfg(test)]
pub(crate) mod testing;

pub use parser::{
    Parser, ParserFactory, ReadRequest, StreamDescriptor, StreamKind, SymphoniaParser,
    SymphoniaParserFactory,
};
pub use reader::{Reader, StreamHandle};
pub use source::ByteSource;
