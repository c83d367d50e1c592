//! Format detection from suffix chains and magic bytes.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::FilePackError;
use crate::Result;
use crate::formats::Algorithm;

/// Supported archive container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    /// Tar archive.
    Tar,
    /// ZIP archive.
    Zip,
    /// 7z archive.
    SevenZip,
}

impl ArchiveFormat {
    /// Returns the file suffix (without the dot) for this format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Tar => "tar",
            Self::Zip => "zip",
            Self::SevenZip => "7z",
        }
    }

    /// Maps a single file suffix to an archive format, case-insensitively.
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "tar" => Some(Self::Tar),
            "zip" => Some(Self::Zip),
            "7z" => Some(Self::SevenZip),
            _ => None,
        }
    }

    /// Detects the archive format of a path from its final suffix.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFormat` if the suffix is not `.tar`, `.zip` or
    /// `.7z`.
    pub fn from_path(path: &Path) -> Result<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| FilePackError::UnsupportedFormat {
                path: path.to_path_buf(),
            })
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// What a path holds, derived from its suffix chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackKind {
    /// A plain archive, e.g. `backup.tar`.
    ArchiveOnly(ArchiveFormat),
    /// A file handled only through compression.
    ///
    /// Carries the algorithm when the suffix names one (`notes.txt.gz`), and
    /// `None` for any other existing file (`notes.txt`).
    CompressionOnly(Option<Algorithm>),
    /// A compressed archive, e.g. `backup.tar.gz`.
    CompressedArchive {
        /// The inner archive format.
        format: ArchiveFormat,
        /// The outer compression algorithm.
        algorithm: Algorithm,
    },
}

impl PackKind {
    /// Returns `true` if member operations apply to this kind.
    #[must_use]
    pub const fn has_archive(&self) -> bool {
        matches!(self, Self::ArchiveOnly(_) | Self::CompressedArchive { .. })
    }

    /// Returns `true` if whole-file compression operations apply to this kind.
    #[must_use]
    pub const fn has_compression(&self) -> bool {
        matches!(self, Self::CompressionOnly(_) | Self::CompressedArchive { .. })
    }
}

impl fmt::Display for PackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArchiveOnly(format) => write!(f, "{format} archive"),
            Self::CompressionOnly(Some(algorithm)) => write!(f, "{algorithm} compressed file"),
            Self::CompressionOnly(None) => f.write_str("plain file"),
            Self::CompressedArchive { format, algorithm } => {
                write!(f, "{algorithm} compressed {format} archive")
            }
        }
    }
}

/// Classifies a path by peeling its suffixes one at a time.
///
/// Short tar aliases (`.tgz`, `.tbz2`, `.tbz`, `.txz`) are recognized as
/// compressed tar archives.
///
/// # Errors
///
/// Returns `UnsupportedFormat` when no suffix is recognized and no regular
/// file exists at `path`.
///
/// # Examples
///
/// ```
/// use filepack_core::formats::detect::{ArchiveFormat, PackKind, detect_kind};
/// use filepack_core::Algorithm;
/// use std::path::Path;
///
/// assert_eq!(
///     detect_kind(Path::new("backup.tar.gz")).unwrap(),
///     PackKind::CompressedArchive { format: ArchiveFormat::Tar, algorithm: Algorithm::Gzip }
/// );
/// assert_eq!(
///     detect_kind(Path::new("photos.zip")).unwrap(),
///     PackKind::ArchiveOnly(ArchiveFormat::Zip)
/// );
/// ```
pub fn detect_kind(path: &Path) -> Result<PackKind> {
    let outer = path.extension().and_then(|e| e.to_str());

    if let Some(ext) = outer {
        if let Some(format) = ArchiveFormat::from_extension(ext) {
            return Ok(PackKind::ArchiveOnly(format));
        }

        if let Some(algorithm) = tar_alias(ext) {
            return Ok(PackKind::CompressedArchive {
                format: ArchiveFormat::Tar,
                algorithm,
            });
        }

        if let Some(algorithm) = Algorithm::from_extension(ext) {
            let inner = path
                .file_stem()
                .map(Path::new)
                .and_then(Path::extension)
                .and_then(|e| e.to_str())
                .and_then(ArchiveFormat::from_extension);

            return Ok(match inner {
                Some(format) => PackKind::CompressedArchive { format, algorithm },
                None => PackKind::CompressionOnly(Some(algorithm)),
            });
        }
    }

    if path.is_file() {
        return Ok(PackKind::CompressionOnly(None));
    }

    Err(FilePackError::UnsupportedFormat {
        path: path.to_path_buf(),
    })
}

/// Algorithm implied by a single-suffix tar shorthand such as `tgz`.
pub(crate) fn tar_alias(extension: &str) -> Option<Algorithm> {
    match extension.to_ascii_lowercase().as_str() {
        "tgz" => Some(Algorithm::Gzip),
        "tbz" | "tbz2" => Some(Algorithm::Bz2),
        "txz" => Some(Algorithm::Xz),
        _ => None,
    }
}

/// Number of leading bytes inspected for magic signatures.
const SNIFF_LEN: u64 = 8192;

/// LZ4 frame format magic number (little-endian `0x184D2204`).
const LZ4_FRAME_MAGIC: [u8; 4] = [0x04, 0x22, 0x4D, 0x18];

/// Identifies the compression algorithm of an existing file from its magic
/// bytes.
///
/// Returns `Ok(None)` for files whose content matches none of the supported
/// algorithms (including empty files).
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read.
pub fn sniff_algorithm(path: &Path) -> Result<Option<Algorithm>> {
    let mut head = Vec::new();
    File::open(path)?.take(SNIFF_LEN).read_to_end(&mut head)?;

    if head.starts_with(&LZ4_FRAME_MAGIC) {
        return Ok(Some(Algorithm::Lz4));
    }
    Ok(infer::get(&head).and_then(|k| Algorithm::from_extension(k.extension())))
}
