use std::fmt;
use std::io::{Error, ErrorKind, Result};

use flate2::{Compress, Decompress, FlushCompress, FlushDecompress, Status};

pub mod constants {
    pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;
    pub const MAX_COMPRESSION_LEVEL: u32 = 9;
}

use self::constants::*;

/// Worst case size of a deflate stream produced from `size` input bytes.
#[inline(always)]
pub const fn max_compression_space(size: usize) -> usize {
    size + size / 1000 + 12
}

/// Zlib stream compressor used for `GZipBase64Binary` payloads.
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct ZlibCompressor {
    level: u32,
}

impl Default for ZlibCompressor {
    fn default() -> Self {
        ZlibCompressor::new(DEFAULT_COMPRESSION_LEVEL)
    }
}

impl fmt::Debug for ZlibCompressor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "zlib(level: {})", self.level)
    }
}

impl ZlibCompressor {
    /// Levels above 9 are clamped.
    pub const fn new(level: u32) -> ZlibCompressor {
        let level = if level > MAX_COMPRESSION_LEVEL {
            MAX_COMPRESSION_LEVEL
        } else {
            level
        };
        ZlibCompressor { level }
    }

    #[inline(always)]
    pub const fn level(self) -> u32 {
        self.level
    }

    #[inline(always)]
    fn encoder(self) -> Compress {
        Compress::new(flate2::Compression::new(self.level), true)
    }

    /// Compresses `data` into `out`, returning the compressed length.
    ///
    /// Fails with `WriteZero` when `out` is too small; size it with
    /// [`max_compression_space`].
    pub fn compress(self, data: &[u8], out: &mut [u8]) -> Result<usize> {
        let mut encoder = self.encoder();
        loop {
            let consumed = encoder.total_in() as usize;
            let produced = encoder.total_out() as usize;
            let status = encoder
                .compress(&data[consumed..], &mut out[produced..], FlushCompress::Finish)
                .map_err(|e| Error::new(ErrorKind::Other, e))?;

            if status == Status::StreamEnd {
                return Ok(encoder.total_out() as usize);
            }

            let stalled = encoder.total_in() as usize == consumed
                && encoder.total_out() as usize == produced;
            if encoder.total_out() as usize == out.len() || stalled {
                return Err(Error::new(
                    ErrorKind::WriteZero,
                    format!("compressed data exceeds output buffer of {} bytes", out.len()),
                ));
            }
        }
    }

    /// Compresses `data` into a new buffer, growing it past the usual bound if needed.
    pub fn compress_to_vec(self, data: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = self.encoder();
        let mut out = Vec::with_capacity(max_compression_space(data.len()));
        loop {
            let consumed = encoder.total_in() as usize;
            let status = encoder
                .compress_vec(&data[consumed..], &mut out, FlushCompress::Finish)
                .map_err(|e| Error::new(ErrorKind::Other, e))?;

            match status {
                Status::StreamEnd => return Ok(out),
                Status::Ok | Status::BufError => out.reserve(out.capacity().max(64)),
            }
        }
    }

    /// Inflates `data` into `out`.
    ///
    /// Returns the full inflated length of the stream. When that exceeds
    /// `out.len()`, `out` holds the first bytes and the rest is discarded, so
    /// callers compare the result with the length they expect.
    pub fn uncompress(self, data: &[u8], out: &mut [u8]) -> Result<usize> {
        let mut decoder = Decompress::new(true);
        let mut overflow = [0u8; 4096];
        loop {
            let consumed = decoder.total_in() as usize;
            let produced = decoder.total_out() as usize;
            let target = if produced < out.len() {
                &mut out[produced..]
            } else {
                &mut overflow[..]
            };

            let status = decoder
                .decompress(&data[consumed..], target, FlushDecompress::None)
                .map_err(|e| Error::new(ErrorKind::InvalidData, e))?;

            if status == Status::StreamEnd {
                return Ok(decoder.total_out() as usize);
            }

            if decoder.total_in() as usize == consumed && decoder.total_out() as usize == produced {
                return Err(Error::new(
                    ErrorKind::UnexpectedEof,
                    "compressed stream ended before its end marker",
                ));
            }
        }
    }
}
