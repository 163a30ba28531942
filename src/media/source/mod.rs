//! `ByteSource` trait, the random-access byte provider the read worker
//! services parser requests from.
//!
//! Every symphonia [`MediaSource`] is a `ByteSource`, which covers
//! `std::fs::File` and `std::io::Cursor<T>` out of the box.

use std::io::{self, Read, Seek, SeekFrom};

use symphonia::core::io::MediaSource;

use crate::common::types::Shared;

/// Random-access byte source: size query, absolute seek, bounded read.
pub trait ByteSource: Send {
    /// Total size of the source in bytes.
    fn stat(&self) -> io::Result<u64>;

    /// Position the source at an absolute byte offset.
    fn seek_to(&mut self, offset: u64) -> io::Result<()>;

    /// Read at most `buf.len()` bytes. `Ok(0)` means end of source.
    fn read_into(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// The byte source as held by an open reader and its worker.
pub type SharedSource = Shared<Box<dyn ByteSource>>;

impl<T: MediaSource + ?Sized> ByteSource for T {
    fn stat(&self) -> io::Result<u64> {
        self.byte_len().ok_or_else(|| {
            io::Error::new(io::ErrorKind::Unsupported, "source length unknown")
        })
    }

    fn seek_to(&mut self, offset: u64) -> io::Result<()> {
        self.seek(SeekFrom::Start(offset)).map(|_| ())
    }

    fn read_into(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read(buf)
    }
}

/// Fill `buf` from the current position, stopping early only at end of
/// source. Returns the number of bytes read, which is short on EOF.
pub fn read_full(source: &mut dyn ByteSource, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read_into(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
