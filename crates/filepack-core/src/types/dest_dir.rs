//! Validated destination directory type.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use crate::FilePackError;
use crate::Result;

/// Target directory for extraction, as an absolute canonical path.
///
/// Construction creates the directory when missing, so every extracted member
/// path can be checked against an existing canonical prefix.
///
/// # Examples
///
/// ```no_run
/// use filepack_core::types::DestDir;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::new("restored/photos")?;
/// assert!(dest.as_path().is_absolute());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestDir(PathBuf);

impl DestDir {
    /// Creates a new `DestDir`, creating the directory (and any missing
    /// parents) when it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `NotADirectory` if the path exists and is not a directory, or
    /// an I/O error if it cannot be created or canonicalized.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        match fs::metadata(&path) {
            Ok(meta) if !meta.is_dir() => return Err(FilePackError::NotADirectory { path }),
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => fs::create_dir_all(&path)?,
            Err(e) => return Err(e.into()),
        }

        Ok(Self(path.canonicalize()?))
    }

    /// Returns the path as a `&Path`.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Joins a `SafePath` to this destination directory.
    #[inline]
    #[must_use]
    pub fn join(&self, safe_path: &super::SafePath) -> PathBuf {
        self.0.join(safe_path.as_path())
    }
}
