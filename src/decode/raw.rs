use std::io::{self, Read, Write};

/// Copy `input` to `output` unchanged, binary or not.
pub fn decode_raw<R, W>(input: &mut R, output: &mut W) -> io::Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    io::copy(input, output)
}
