//! Lisa text files.
//!
//! A text file's data part starts with one block of metadata, followed by
//! blocks of text. Lines end in CR and never straddle a block: the tail of a
//! block after its last line is NUL padding. A run of spaces may be stored as
//! `0x10` followed by a count byte biased by 32.
//!
//! ```text
//! +--------------+--------------------------------+----
//! | header 1 KiB | text ... CR text CR 00 00 .. 00 | ...
//! +--------------+--------------------------------+----
//! ```

use std::io::{self, Read, Write};

/// Size of the header and of every text block.
pub const BLOCK_SIZE: usize = 1024;

const PADDING: u8 = 0x00;
const CARRIAGE_RETURN: u8 = 0x0d;
const SPACE_RUN: u8 = 0x10;
const SPACE_RUN_BIAS: u8 = 32;

const MAX_SPACE_RUN: usize = (u8::MAX - SPACE_RUN_BIAS) as usize;

static SPACES: [u8; MAX_SPACE_RUN] = [b' '; MAX_SPACE_RUN];

/// Decode a Lisa text file's data part into `output`.
///
/// Stops at the first short block. The format keeps files to whole blocks,
/// so a short block only shows up at the end of the stream.
pub fn decode_lisa_text<R, W>(input: &mut R, output: &mut W) -> io::Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut block = [0u8; BLOCK_SIZE];

    // Header block: metadata, not text
    read_block(input, &mut block)?;

    let mut written = 0;
    loop {
        let len = read_block(input, &mut block)?;
        written += decode_block(&block[..len], output)?;
        if len < BLOCK_SIZE {
            return Ok(written);
        }
    }
}

/// Decode a single block. Escape state starts clear and dies with the block,
/// so a `0x10` in the last byte is dropped.
fn decode_block<W: Write + ?Sized>(block: &[u8], output: &mut W) -> io::Result<u64> {
    let mut written = 0u64;
    let mut space_run_pending = false;
    // start of bytes copied through unchanged but not yet written
    let mut literal_start = 0;

    for (i, &byte) in block.iter().enumerate() {
        if space_run_pending {
            space_run_pending = false;
            let count = usize::from(byte.saturating_sub(SPACE_RUN_BIAS));
            output.write_all(&SPACES[..count])?;
            written += count as u64;
            literal_start = i + 1;
            continue;
        }

        match byte {
            PADDING | CARRIAGE_RETURN | SPACE_RUN => {
                output.write_all(&block[literal_start..i])?;
                written += (i - literal_start) as u64;
                literal_start = i + 1;
            }
            _ => continue,
        }

        match byte {
            PADDING => return Ok(written),
            CARRIAGE_RETURN => {
                output.write_all(b"\n")?;
                written += 1;
            }
            _ => space_run_pending = true,
        }
    }

    output.write_all(&block[literal_start..])?;
    written += (block.len() - literal_start) as u64;
    Ok(written)
}

/// Fill `block` from `input`, stopping early only at end of stream.
fn read_block<R: Read + ?Sized>(input: &mut R, block: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < block.len() {
        match input.read(&mut block[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
