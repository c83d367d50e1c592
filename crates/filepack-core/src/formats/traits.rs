//! Common trait for archive format backends.

use std::path::Path;

use crate::Result;
use crate::formats::ArchiveFormat;
use crate::formats::SevenZipBackend;
use crate::formats::TarBackend;
use crate::formats::ZipBackend;
use crate::member::Member;
use crate::types::DestDir;

/// Per-format archive operations.
///
/// Backends are stateless: every call reopens the archive at `archive`, so
/// the file on disk stays the only source of truth. Callers check member
/// existence and validate names before invoking mutating operations.
pub trait ArchiveBackend {
    /// Returns the format handled by this backend.
    fn format(&self) -> ArchiveFormat;

    /// Lists every member of the archive in storage order.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive cannot be opened or parsed.
    fn list(&self, archive: &Path) -> Result<Vec<Member>>;

    /// Writes an archive with no members, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn create_empty(&self, archive: &Path) -> Result<()>;

    /// Extracts the member `name` under `dest`.
    ///
    /// # Errors
    ///
    /// Returns `MemberNotFound` if no member has that name, `UnsupportedEntry`
    /// for links and special files, or `PathTraversal` if the name escapes
    /// `dest`.
    fn extract_member(&self, archive: &Path, name: &str, dest: &DestDir) -> Result<()>;

    /// Extracts every file and directory member under `dest`.
    ///
    /// Links and special files are skipped.
    ///
    /// # Errors
    ///
    /// Returns `PathTraversal` if a member name escapes `dest`, or an I/O
    /// error if writing fails.
    fn extract_all(&self, archive: &Path, dest: &DestDir) -> Result<()>;

    /// Stores the file at `source` in an existing archive as `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive or the source cannot be read or
    /// written.
    fn append(&self, archive: &Path, source: &Path, name: &str) -> Result<()>;

    /// Rewrites the archive without the member `name`.
    ///
    /// The archive is replaced atomically; on failure it is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `MemberNotFound` if no member has that name.
    fn remove(&self, archive: &Path, name: &str) -> Result<()>;
}

/// Returns the backend implementing `format`.
#[must_use]
pub fn backend_for(format: ArchiveFormat) -> &'static dyn ArchiveBackend {
    match format {
        ArchiveFormat::Tar => &TarBackend,
        ArchiveFormat::Zip => &ZipBackend,
        ArchiveFormat::SevenZip => &SevenZipBackend,
    }
}
