//! Stream encoders and decoders for each compression algorithm.
//!
//! This module maps the user-friendly compression level scale (1-9) to each
//! codec's own level type and wraps the codec crates behind one encoder type
//! and one decoder constructor.
//!
//! # Level Mapping
//!
//! - **1-3**: Fast compression (lower CPU usage, larger files)
//! - **6** or unset: Codec default (balanced)
//! - **7-9**: Best compression (higher CPU usage, smaller files)

use std::io;
use std::io::Read;
use std::io::Write;

use bzip2::read::MultiBzDecoder;
use bzip2::write::BzEncoder;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use lz4_flex::frame::FrameDecoder;
use lz4_flex::frame::FrameEncoder;
use xz2::read::XzDecoder;
use xz2::write::XzEncoder;

use crate::formats::Algorithm;

/// Converts user compression level (1-9) to flate2 compression level.
///
/// # Examples
///
/// ```
/// use filepack_core::codec::compression_level_to_flate2;
///
/// assert_eq!(compression_level_to_flate2(None), flate2::Compression::default());
/// assert_eq!(compression_level_to_flate2(Some(9)), flate2::Compression::best());
/// ```
#[must_use]
pub fn compression_level_to_flate2(level: Option<u8>) -> flate2::Compression {
    match level {
        None | Some(6) => flate2::Compression::default(),
        Some(1..=3) => flate2::Compression::fast(),
        Some(7..=9) => flate2::Compression::best(),
        Some(n) => flate2::Compression::new(u32::from(n)),
    }
}

/// Converts user compression level (1-9) to bzip2 compression level.
#[must_use]
pub fn compression_level_to_bzip2(level: Option<u8>) -> bzip2::Compression {
    match level {
        None | Some(6) => bzip2::Compression::default(),
        Some(1) => bzip2::Compression::fast(),
        Some(7..=9) => bzip2::Compression::best(),
        Some(n) => bzip2::Compression::new(u32::from(n.min(9))),
    }
}

/// Converts user compression level (1-9) to an xz preset.
#[must_use]
pub fn compression_level_to_xz(level: Option<u8>) -> u32 {
    match level {
        None => 6,
        Some(n) => u32::from(n.min(9)),
    }
}

/// Streaming compressor writing into `W`.
///
/// Call [`Encoder::finish`] to flush the trailer; dropping an encoder without
/// finishing it may leave a truncated stream.
pub enum Encoder<W: Write> {
    /// Gzip stream.
    Gzip(GzEncoder<W>),
    /// Bzip2 stream.
    Bz2(BzEncoder<W>),
    /// LZ4 frame stream.
    Lz4(FrameEncoder<W>),
    /// Xz stream.
    Xz(XzEncoder<W>),
}

impl<W: Write> Encoder<W> {
    /// Wraps `inner` in an encoder for `algorithm`.
    pub fn new(algorithm: Algorithm, inner: W, level: Option<u8>) -> Self {
        match algorithm {
            Algorithm::Gzip => Self::Gzip(GzEncoder::new(inner, compression_level_to_flate2(level))),
            Algorithm::Bz2 => Self::Bz2(BzEncoder::new(inner, compression_level_to_bzip2(level))),
            Algorithm::Lz4 => Self::Lz4(FrameEncoder::new(inner)),
            Algorithm::Xz => Self::Xz(XzEncoder::new(inner, compression_level_to_xz(level))),
        }
    }

    /// Writes the stream trailer and returns the inner writer.
    pub fn finish(self) -> io::Result<W> {
        match self {
            Self::Gzip(e) => e.finish(),
            Self::Bz2(e) => e.finish(),
            Self::Lz4(e) => e.finish().map_err(io::Error::from),
            Self::Xz(e) => e.finish(),
        }
    }
}

impl<W: Write> Write for Encoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Gzip(e) => e.write(buf),
            Self::Bz2(e) => e.write(buf),
            Self::Lz4(e) => e.write(buf),
            Self::Xz(e) => e.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Gzip(e) => e.flush(),
            Self::Bz2(e) => e.flush(),
            Self::Lz4(e) => e.flush(),
            Self::Xz(e) => e.flush(),
        }
    }
}

/// Wraps `reader` in a decoder for `algorithm`.
///
/// Multi-member gzip, bzip2 and xz streams are decoded in full.
pub fn decoder<'a, R: Read + 'a>(algorithm: Algorithm, reader: R) -> Box<dyn Read + 'a> {
    match algorithm {
        Algorithm::Gzip => Box::new(MultiGzDecoder::new(reader)),
        Algorithm::Bz2 => Box::new(MultiBzDecoder::new(reader)),
        Algorithm::Lz4 => Box::new(FrameDecoder::new(reader)),
        Algorithm::Xz => Box::new(XzDecoder::new_multi_decoder(reader)),
    }
}

/// Compresses everything from `reader` into `writer`, returning the number of
/// uncompressed bytes consumed.
pub fn compress_stream<R: Read, W: Write>(
    algorithm: Algorithm,
    level: Option<u8>,
    reader: &mut R,
    writer: W,
) -> io::Result<u64> {
    let mut encoder = Encoder::new(algorithm, writer, level);
    let read = io::copy(reader, &mut encoder)?;
    encoder.finish()?.flush()?;
    Ok(read)
}

/// Decompresses everything from `reader` into `writer`, returning the number
/// of uncompressed bytes produced.
pub fn decompress_stream<R: Read, W: Write>(
    algorithm: Algorithm,
    reader: R,
    writer: &mut W,
) -> io::Result<u64> {
    let mut decoder = decoder(algorithm, reader);
    let written = io::copy(&mut decoder, writer)?;
    writer.flush()?;
    Ok(written)
}
