//! Compression algorithms supported for single-file streams.
//!
//! # Supported Algorithms
//!
//! - **Gzip** (.gz): Fast compression with good compatibility
//! - **Bzip2** (.bz2): Better compression ratio, slower
//! - **Lz4** (.lz4): Very fast, lower ratio (LZ4 frame format)
//! - **Xz** (.xz): Best compression ratio, slowest

use std::fmt;
use std::str::FromStr;

use crate::FilePackError;

/// Compression algorithm for a single-stream compressed file.
///
/// # Performance Characteristics
///
/// | Algorithm | Compression | Decompression | Ratio  |
/// |-----------|-------------|---------------|--------|
/// | Gzip      | Fast        | Fast          | Good   |
/// | Bzip2     | Slow        | Medium        | Better |
/// | Lz4       | Very Fast   | Very Fast     | Fair   |
/// | Xz        | Very Slow   | Medium        | Best   |
///
/// None of the four formats is measured from a trailer: the uncompressed size
/// is always obtained by a full decoding pass.
///
/// # Examples
///
/// ```
/// use filepack_core::Algorithm;
///
/// let algorithm: Algorithm = "gz".parse().unwrap();
/// assert_eq!(algorithm, Algorithm::Gzip);
/// assert_eq!(algorithm.extension(), "gz");
/// assert!("zstd".parse::<Algorithm>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Gzip compression (deflate algorithm).
    Gzip,

    /// Bzip2 compression (Burrows-Wheeler algorithm).
    Bz2,

    /// LZ4 frame compression.
    ///
    /// The LZ4 encoder has a single speed setting; compression levels are
    /// accepted and ignored.
    Lz4,

    /// Xz compression (LZMA2 algorithm).
    Xz,
}

impl Algorithm {
    /// Every supported algorithm.
    pub const ALL: [Self; 4] = [Self::Gzip, Self::Bz2, Self::Lz4, Self::Xz];

    /// Returns the file suffix (without the dot) for this algorithm.
    ///
    /// # Examples
    ///
    /// ```
    /// use filepack_core::Algorithm;
    ///
    /// assert_eq!(Algorithm::Gzip.extension(), "gz");
    /// assert_eq!(Algorithm::Bz2.extension(), "bz2");
    /// assert_eq!(Algorithm::Lz4.extension(), "lz4");
    /// assert_eq!(Algorithm::Xz.extension(), "xz");
    /// ```
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Gzip => "gz",
            Self::Bz2 => "bz2",
            Self::Lz4 => "lz4",
            Self::Xz => "xz",
        }
    }

    /// Returns a human-readable name for this algorithm.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Gzip => "gzip",
            Self::Bz2 => "bzip2",
            Self::Lz4 => "lz4",
            Self::Xz => "xz",
        }
    }

    /// Maps a single file suffix to an algorithm, case-insensitively.
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "gz" => Some(Self::Gzip),
            "bz2" => Some(Self::Bz2),
            "lz4" => Some(Self::Lz4),
            "xz" => Some(Self::Xz),
            _ => None,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for Algorithm {
    type Err = FilePackError;

    /// Accepts either the suffix (`gz`) or the name (`gzip`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().trim_start_matches('.');
        Self::from_extension(tag)
            .or_else(|| Self::ALL.into_iter().find(|a| a.name().eq_ignore_ascii_case(tag)))
            .ok_or_else(|| FilePackError::UnsupportedAlgorithm(s.to_string()))
    }
}
