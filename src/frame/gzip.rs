use flate2::{Compression, read::GzDecoder, write::GzEncoder};
use std::io::{self, Read, Write};

/// Compresses `input` into a single gzip member.
pub fn gzip_compress(input: &[u8]) -> io::Result<Vec<u8>> {
    let mut enc = GzEncoder::new(Vec::with_capacity(input.len() / 2), Compression::default());
    enc.write_all(input)?;
    enc.finish()
}

pub fn gzip_decompress(input: &[u8]) -> io::Result<Vec<u8>> {
    let mut dec = GzDecoder::new(input);
    let mut out = Vec::new();
    dec.read_to_end(&mut out)?;
    Ok(out)
}
