//! Decoders turning an archive part's bytes into what gets printed.
//!
//! - [`raw`]: byte-for-byte passthrough, used for every part
//! - [`text`]: the Lisa text file format, used on the `data` part
//!
//! Decoders write into any [`Write`] sink and report how many bytes they
//! emitted. They never validate which part they were handed.

mod raw;
mod text;

pub use raw::decode_raw;
pub use text::{BLOCK_SIZE, decode_lisa_text};

use std::io::{self, Read, Write};

/// How a located part is turned into output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoder {
    /// Dump the part unmodified.
    Raw,
    /// Decode the part as a Lisa text file.
    LisaText,
}

impl Decoder {
    /// Run this decoder over `input` to completion.
    ///
    /// Returns the number of bytes written to `output`.
    pub fn decode<R, W>(self, input: &mut R, output: &mut W) -> io::Result<u64>
    where
        R: Read + ?Sized,
        W: Write + ?Sized,
    {
        match self {
            Decoder::Raw => decode_raw(input, output),
            Decoder::LisaText => decode_lisa_text(input, output),
        }
    }
}
