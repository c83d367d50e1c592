//! Whole-file compression handle.

use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::io::BufWriter;
use std::path::Path;
use std::path::PathBuf;

use tempfile::NamedTempFile;
use tracing::debug;
use tracing::info;

use crate::CompressOptions;
use crate::FilePackError;
use crate::Result;
use crate::codec;
use crate::formats::Algorithm;
use crate::formats::common::temp_file_for;
use crate::formats::detect::tar_alias;
use crate::formats::detect::sniff_algorithm;

/// A file on disk handled through single-stream compression.
///
/// The handle only stores a path; the file is reopened on every call. After
/// an in-place [`compress`](Self::compress) or
/// [`decompress`](Self::decompress) the handle points at the output file.
///
/// # Examples
///
/// ```no_run
/// use filepack_core::{Algorithm, CompressOptions, Compression};
///
/// # fn main() -> Result<(), filepack_core::FilePackError> {
/// let mut file = Compression::new("notes.txt")?;
/// file.compress(Algorithm::Gzip, &CompressOptions::default().with_in_place(true))?;
/// assert!(file.is_compressed(Algorithm::Gzip));
/// println!("ratio {:.2}", file.compression_ratio(Algorithm::Gzip)?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compression {
    path: PathBuf,
}

impl Compression {
    /// Opens a handle on an existing file.
    ///
    /// # Errors
    ///
    /// Returns `SourceNotFound` if nothing exists at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(FilePackError::SourceNotFound { path });
        }
        Ok(Self { path })
    }

    /// Returns the path the handle currently points at.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the algorithm identified from the file's magic bytes, if any.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read.
    pub fn detected_algorithm(&self) -> Result<Option<Algorithm>> {
        sniff_algorithm(&self.path)
    }

    /// Returns `true` if the content carries `algorithm`'s magic signature.
    ///
    /// Missing or unreadable files are reported as not compressed.
    #[must_use]
    pub fn is_compressed(&self, algorithm: Algorithm) -> bool {
        matches!(self.detected_algorithm(), Ok(Some(found)) if found == algorithm)
    }

    /// Returns the size of the decompressed content.
    ///
    /// The whole stream is decoded and counted; no trailer is trusted and
    /// nothing is written to disk.
    ///
    /// # Errors
    ///
    /// Returns `NotCompressed` if the file is not compressed with
    /// `algorithm`, or an I/O error if decoding fails.
    pub fn uncompressed_size(&self, algorithm: Algorithm) -> Result<u64> {
        self.ensure_compressed(algorithm)?;
        let reader = BufReader::new(File::open(&self.path)?);
        let size = std::io::copy(&mut codec::decoder(algorithm, reader), &mut std::io::sink())?;
        debug!(path = %self.path.display(), %algorithm, size, "measured uncompressed size");
        Ok(size)
    }

    /// Returns the on-disk size of the compressed file.
    ///
    /// # Errors
    ///
    /// Returns `NotCompressed` if the file is not compressed with
    /// `algorithm`.
    pub fn compressed_size(&self, algorithm: Algorithm) -> Result<u64> {
        self.ensure_compressed(algorithm)?;
        Ok(fs::metadata(&self.path)?.len())
    }

    /// Returns the size the file would have once compressed with
    /// `algorithm` at `level`.
    ///
    /// The file is compressed into a temporary file that is removed
    /// afterwards.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyCompressed` if the file is already compressed with
    /// `algorithm`, `InvalidCompressionLevel` for a level outside 1-9, or an
    /// I/O error.
    pub fn estimated_compressed_size(&self, algorithm: Algorithm, level: Option<u8>) -> Result<u64> {
        if self.is_compressed(algorithm) {
            return Err(FilePackError::AlreadyCompressed {
                path: self.path.clone(),
                algorithm,
            });
        }
        CompressOptions {
            compression_level: level,
            ..CompressOptions::default()
        }
        .validate()?;

        let mut temp = NamedTempFile::new()?;
        let mut reader = BufReader::new(File::open(&self.path)?);
        codec::compress_stream(algorithm, level, &mut reader, BufWriter::new(temp.as_file_mut()))?;
        Ok(temp.as_file().metadata()?.len())
    }

    /// Returns `uncompressed_size / compressed_size`.
    ///
    /// # Errors
    ///
    /// Returns `NotCompressed` if the file is not compressed with
    /// `algorithm`, or `ZeroSize` if either size is zero.
    pub fn compression_ratio(&self, algorithm: Algorithm) -> Result<f64> {
        let compressed = self.compressed_size(algorithm)?;
        let uncompressed = self.uncompressed_size(algorithm)?;
        if compressed == 0 || uncompressed == 0 {
            return Err(FilePackError::ZeroSize {
                path: self.path.clone(),
            });
        }
        Ok(uncompressed as f64 / compressed as f64)
    }

    /// Compresses the file with `algorithm`.
    ///
    /// Output goes to `options.target_path`, or `<path>.<ext>` by default. It
    /// is written to a temporary file beside the target and renamed into
    /// place once complete. With `in_place`, the source is removed and the
    /// handle points at the output.
    ///
    /// Returns the path of the compressed file.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyCompressed` if the file is already compressed with
    /// `algorithm`, `TargetExists` if the target exists and `overwrite` is not
    /// set, or an I/O error.
    pub fn compress(&mut self, algorithm: Algorithm, options: &CompressOptions) -> Result<PathBuf> {
        options.validate()?;
        if self.is_compressed(algorithm) {
            return Err(FilePackError::AlreadyCompressed {
                path: self.path.clone(),
                algorithm,
            });
        }

        let target = options
            .target_path
            .clone()
            .unwrap_or_else(|| with_suffix(&self.path, algorithm.extension()));
        self.check_target(&target, options)?;

        let level = options.compression_level;
        let consumed = write_via_temp(&self.path, &target, |out| {
            let mut reader = BufReader::new(File::open(&self.path)?);
            Ok(codec::compress_stream(algorithm, level, &mut reader, BufWriter::new(out))?)
        })?;
        info!(
            source = %self.path.display(),
            target = %target.display(),
            %algorithm,
            bytes = consumed,
            "compressed file"
        );

        self.finish(target, options)
    }

    /// Decompresses the file with `algorithm`.
    ///
    /// Output goes to `options.target_path`, or by default the path with the
    /// algorithm suffix removed (`notes.txt.gz` to `notes.txt`), or with
    /// `.out` appended when the name does not carry the suffix. With
    /// `in_place`, the source is removed and the handle points at the output.
    ///
    /// Returns the path of the decompressed file.
    ///
    /// # Errors
    ///
    /// Returns `NotCompressed` if the file is not compressed with
    /// `algorithm`, `TargetExists` if the target exists and `overwrite` is
    /// not set, or an I/O error if decoding fails.
    pub fn decompress(&mut self, algorithm: Algorithm, options: &CompressOptions) -> Result<PathBuf> {
        options.validate()?;
        self.ensure_compressed(algorithm)?;

        let target = options
            .target_path
            .clone()
            .unwrap_or_else(|| decompressed_path(&self.path, algorithm));
        self.check_target(&target, options)?;

        let produced = write_via_temp(&self.path, &target, |out| {
            let reader = BufReader::new(File::open(&self.path)?);
            Ok(codec::decompress_stream(algorithm, reader, &mut BufWriter::new(out))?)
        })?;
        info!(
            source = %self.path.display(),
            target = %target.display(),
            %algorithm,
            bytes = produced,
            "decompressed file"
        );

        self.finish(target, options)
    }

    fn ensure_compressed(&self, algorithm: Algorithm) -> Result<()> {
        if self.is_compressed(algorithm) {
            Ok(())
        } else {
            Err(FilePackError::NotCompressed {
                path: self.path.clone(),
                algorithm,
            })
        }
    }

    fn check_target(&self, target: &Path, options: &CompressOptions) -> Result<()> {
        if target.exists() && (!options.overwrite || target == self.path) {
            return Err(FilePackError::TargetExists {
                path: target.to_path_buf(),
            });
        }
        Ok(())
    }

    fn finish(&mut self, target: PathBuf, options: &CompressOptions) -> Result<PathBuf> {
        if options.in_place {
            fs::remove_file(&self.path)?;
            debug!(removed = %self.path.display(), now = %target.display(), "replaced source");
            self.path.clone_from(&target);
        }
        Ok(target)
    }
}

/// Appends `.ext` to the full file name (`a.txt` to `a.txt.gz`).
fn with_suffix(path: &Path, ext: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// Default decompression target for `path`.
///
/// `a.txt.gz` becomes `a.txt`, the tar shorthands (`a.tgz`, `a.tbz2`,
/// `a.txz`) become `a.tar`, and anything else gets `.out` appended.
fn decompressed_path(path: &Path, algorithm: Algorithm) -> PathBuf {
    let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
        return with_suffix(path, "out");
    };

    if tar_alias(extension) == Some(algorithm) {
        path.with_extension("tar")
    } else if Algorithm::from_extension(extension) == Some(algorithm) {
        path.with_extension("")
    } else {
        with_suffix(path, "out")
    }
}

/// Runs `write` against a temporary file beside `target`, then renames it
/// over `target`. The output takes the permissions of `source`. The temporary
/// file is removed if `write` fails.
fn write_via_temp<F>(source: &Path, target: &Path, write: F) -> Result<u64>
where
    F: FnOnce(&mut File) -> Result<u64>,
{
    let mut temp = temp_file_for(target, source)?;
    let written = write(temp.as_file_mut())?;
    temp.persist(target).map_err(|e| FilePackError::Io(e.error))?;
    Ok(written)
}
