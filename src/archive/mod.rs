//! Lisa Archive packages.
//!
//! A package is a tar file, optionally gzip, bzip2 or xz compressed, holding
//! one entry per part of each archived Lisa file:
//!
//! ```text
//! NAME.info    file information
//! NAME.label   LisaOS file label
//! NAME.data    file contents (text files decode with `decode::Decoder::LisaText`)
//! ```
//!
//! [`open`] turns any [`ReadAt`] source into a [`tar::Archive`] and
//! [`locate`] picks the entry for a [`Part`](crate::verb::Part).

mod locator;

pub use locator::{LocateError, NamedEntry, locate};

use anyhow::{Context, Result};
use bzip2::read::MultiBzDecoder;
use flate2::read::MultiGzDecoder;
use std::io::{BufReader, Read};
use xz2::read::XzDecoder;

use crate::io::{ReadAt, SequentialReader};

const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];
const BZIP2_MAGIC: &[u8] = b"BZh";
const XZ_MAGIC: &[u8] = &[0xfd, b'7', b'z', b'X', b'Z', 0x00];

/// Longest magic number sniffed by [`Compression::detect`].
const MAGIC_LEN: usize = 6;

/// Read-ahead for the archive stream. Sized so a remote source is fetched in
/// a few large ranges instead of one request per tar header.
const READ_AHEAD: usize = 256 * 1024;

/// Compression wrapped around the tar stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Bzip2,
    Xz,
}

impl Compression {
    /// Sniff the compression from the start of `source`.
    pub fn detect<R: ReadAt + ?Sized>(source: &R) -> Result<Self> {
        let mut magic = [0u8; MAGIC_LEN];
        let mut filled = 0;
        while filled < magic.len() {
            match source.read_at(filled as u64, &mut magic[filled..])? {
                0 => break,
                n => filled += n,
            }
        }

        let magic = &magic[..filled];
        let compression = if magic.starts_with(GZIP_MAGIC) {
            Compression::Gzip
        } else if magic.starts_with(BZIP2_MAGIC) {
            Compression::Bzip2
        } else if magic.starts_with(XZ_MAGIC) {
            Compression::Xz
        } else {
            Compression::None
        };
        Ok(compression)
    }
}

/// Open `source` as a tar archive, decompressing gzip, bzip2 and xz
/// transparently.
pub fn open<R: ReadAt + 'static>(source: R) -> Result<tar::Archive<Box<dyn Read>>> {
    let compression = Compression::detect(&source).context("cannot read archive header")?;
    log::debug!("archive compression: {compression:?}");

    let stream = BufReader::with_capacity(READ_AHEAD, SequentialReader::new(source));
    let stream: Box<dyn Read> = match compression {
        Compression::None => Box::new(stream),
        Compression::Gzip => Box::new(MultiGzDecoder::new(stream)),
        Compression::Bzip2 => Box::new(MultiBzDecoder::new(stream)),
        Compression::Xz => Box::new(XzDecoder::new_multi_decoder(stream)),
    };

    Ok(tar::Archive::new(stream))
}
