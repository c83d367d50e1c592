//! Options for compress and decompress operations.

use std::path::Path;
use std::path::PathBuf;

use crate::FilePackError;
use crate::Result;

/// Options controlling where compressed or decompressed output goes.
///
/// # Examples
///
/// ```
/// use filepack_core::CompressOptions;
///
/// // Write `<path>.<ext>` next to the source, keep the source
/// let options = CompressOptions::default();
///
/// // Replace the source, best compression
/// let options = CompressOptions::default()
///     .with_in_place(true)
///     .with_compression_level(9);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompressOptions {
    /// Output path.
    ///
    /// `None` derives it from the source path: `<path>.<ext>` when
    /// compressing, the path without the algorithm suffix when decompressing.
    ///
    /// Default: `None`.
    pub target_path: Option<PathBuf>,

    /// Remove the source once the output has been written; the handle then
    /// points at the output.
    ///
    /// Default: `false`.
    pub in_place: bool,

    /// Replace an existing file at the output path.
    ///
    /// Default: `false`.
    pub overwrite: bool,

    /// Compression level (1-9). Ignored when decompressing and by LZ4.
    ///
    /// `None` uses the codec default.
    ///
    /// Default: `None`.
    pub compression_level: Option<u8>,
}

impl CompressOptions {
    /// Creates options with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the output path.
    #[must_use]
    pub fn with_target_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.target_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets whether the source is replaced.
    #[must_use]
    pub fn with_in_place(mut self, in_place: bool) -> Self {
        self.in_place = in_place;
        self
    }

    /// Sets whether an existing output file may be replaced.
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Sets the compression level.
    ///
    /// The level is checked by [`validate`](Self::validate), which every
    /// compress and decompress call runs first.
    #[must_use]
    pub fn with_compression_level(mut self, level: u8) -> Self {
        self.compression_level = Some(level);
        self
    }

    /// Validates the options.
    ///
    /// # Errors
    ///
    /// Returns an error if the compression level is set but not in range 1-9.
    pub fn validate(&self) -> Result<()> {
        if let Some(level) = self.compression_level
            && !(1..=9).contains(&level)
        {
            return Err(FilePackError::InvalidCompressionLevel { level });
        }
        Ok(())
    }
}
