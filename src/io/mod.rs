mod http;
mod local;

pub use http::HttpRangeReader;
pub use local::LocalFileReader;

use anyhow::Result;
use std::io::{self, Read};
use std::sync::Arc;

/// Trait for random access reading from a data source
pub trait ReadAt {
    /// Read data at the specified offset into the buffer
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize>;

    /// Get the total size of the data source
    fn size(&self) -> u64;
}

impl<R: ReadAt + ?Sized> ReadAt for Arc<R> {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        (**self).read_at(offset, buf)
    }

    fn size(&self) -> u64 {
        (**self).size()
    }
}

/// In-memory archives.
impl ReadAt for Vec<u8> {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        let start = usize::try_from(offset).unwrap_or(usize::MAX).min(self.len());
        let n = buf.len().min(self.len() - start);
        buf[..n].copy_from_slice(&self[start..start + n]);
        Ok(n)
    }

    fn size(&self) -> u64 {
        self.len() as u64
    }
}

/// Streams a [`ReadAt`] source front to back through [`std::io::Read`].
///
/// The tar reader only ever moves forward, so a cursor over the source is
/// all it needs. Wrap this in a [`std::io::BufReader`] for remote sources,
/// otherwise every 512-byte tar header becomes its own range request.
pub struct SequentialReader<R: ReadAt> {
    source: R,
    position: u64,
}

impl<R: ReadAt> SequentialReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            position: 0,
        }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> u64 {
        self.position
    }
}

impl<R: ReadAt> Read for SequentialReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.source.size().saturating_sub(self.position);
        if remaining == 0 || buf.is_empty() {
            return Ok(0);
        }

        let len = buf.len().min(usize::try_from(remaining).unwrap_or(usize::MAX));
        let n = self
            .source
            .read_at(self.position, &mut buf[..len])
            .map_err(io::Error::other)?;
        self.position += n as u64;
        Ok(n)
    }
}
