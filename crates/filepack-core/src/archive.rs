//! Format-agnostic archive handle.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use tracing::debug;
use tracing::info;

use crate::FilePackError;
use crate::Result;
use crate::formats::ArchiveBackend;
use crate::formats::ArchiveFormat;
use crate::formats::backend_for;
use crate::formats::common::same_name;
use crate::member::Member;
use crate::member::render_table;
use crate::types::DestDir;
use crate::types::SafePath;

/// An archive container on disk: a path plus its format.
///
/// Nothing is cached: every operation reopens the file, so the archive on
/// disk is the only source of truth. The path does not have to exist yet;
/// listing a missing archive yields no members and the first
/// [`add_member`](Self::add_member) creates it.
///
/// # Examples
///
/// ```no_run
/// use filepack_core::Archive;
///
/// # fn main() -> Result<(), filepack_core::FilePackError> {
/// let archive = Archive::new("backup.zip")?;
/// archive.add_member("notes.txt", None)?;
/// for member in archive.get_members()? {
///     println!("{} ({} bytes)", member.name, member.size);
/// }
/// archive.extract_all("restored")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    path: PathBuf,
    format: ArchiveFormat,
}

impl Archive {
    /// Creates a handle, detecting the format from the path's final suffix.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFormat` if the suffix is not `.tar`, `.zip` or
    /// `.7z`.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let format = ArchiveFormat::from_path(path)?;
        Ok(Self::with_format(path, format))
    }

    /// Creates a handle with an explicit format, whatever the path's suffix.
    #[must_use]
    pub fn with_format<P: AsRef<Path>>(path: P, format: ArchiveFormat) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            format,
        }
    }

    /// Returns the archive path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the archive format.
    #[must_use]
    pub const fn format(&self) -> ArchiveFormat {
        self.format
    }

    /// Returns `true` if the archive file exists.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Returns the archive size in bytes, or 0 if it does not exist.
    #[must_use]
    pub fn size(&self) -> u64 {
        fs::metadata(&self.path).map_or(0, |m| m.len())
    }

    fn backend(&self) -> &'static dyn ArchiveBackend {
        backend_for(self.format)
    }

    /// An archive with no bytes on disk is treated like a missing one.
    fn has_content(&self) -> bool {
        self.size() > 0
    }

    /// Writes an empty archive, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be written.
    pub fn create(&self) -> Result<()> {
        info!(archive = %self.path.display(), format = %self.format, "creating empty archive");
        self.backend().create_empty(&self.path)
    }

    /// Lists every member, in storage order.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArchive` if the file exists but cannot be parsed.
    pub fn get_members(&self) -> Result<Vec<Member>> {
        if !self.has_content() {
            return Ok(Vec::new());
        }
        let members = self.backend().list(&self.path)?;
        debug!(archive = %self.path.display(), count = members.len(), "listed members");
        Ok(members)
    }

    /// Returns the member named `name`.
    ///
    /// # Errors
    ///
    /// Returns `MemberNotFound` if no member has that name.
    pub fn get_member(&self, name: &str) -> Result<Member> {
        self.get_members()?
            .into_iter()
            .find(|m| same_name(&m.name, name))
            .ok_or_else(|| FilePackError::MemberNotFound {
                name: name.to_string(),
            })
    }

    /// Returns `true` if a member named `name` exists.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArchive` if the archive cannot be parsed.
    pub fn member_exists(&self, name: &str) -> Result<bool> {
        Ok(self.get_members()?.iter().any(|m| same_name(&m.name, name)))
    }

    /// Adds the file at `member_path` to the archive.
    ///
    /// The member is stored as `arcname`, or under the file's base name when
    /// `arcname` is `None`. The archive is created if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `SourceNotFound` if `member_path` does not exist,
    /// `UnsupportedEntry` if it is not a regular file, or `MemberExists` if
    /// the archive already holds a member with that name.
    pub fn add_member<P: AsRef<Path>>(&self, member_path: P, arcname: Option<&str>) -> Result<()> {
        let source = member_path.as_ref();
        if !source.exists() {
            return Err(FilePackError::SourceNotFound {
                path: source.to_path_buf(),
            });
        }

        let name = match arcname {
            Some(name) => name.to_string(),
            None => source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| FilePackError::SourceNotFound {
                    path: source.to_path_buf(),
                })?,
        };
        if !source.is_file() {
            return Err(FilePackError::UnsupportedEntry { name });
        }

        if self.has_content() {
            if self.member_exists(&name)? {
                return Err(FilePackError::MemberExists { name });
            }
        } else {
            self.create()?;
        }

        self.backend().append(&self.path, source, &name)?;
        info!(archive = %self.path.display(), member = %name, "added member");
        Ok(())
    }

    /// Adds the file at `member_path`, then deletes it.
    ///
    /// # Errors
    ///
    /// Same as [`add_member`](Self::add_member); the source is kept if adding
    /// fails.
    pub fn add_member_in_place<P: AsRef<Path>>(
        &self,
        member_path: P,
        arcname: Option<&str>,
    ) -> Result<()> {
        let source = member_path.as_ref();
        self.add_member(source, arcname)?;
        fs::remove_file(source)?;
        Ok(())
    }

    /// Removes the member named `name`.
    ///
    /// The archive is rewritten through a temporary file and replaced in one
    /// step; on failure it is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns `MemberNotFound` if no member has that name.
    pub fn remove_member(&self, name: &str) -> Result<()> {
        let member = self.get_member(name)?;
        self.backend().remove(&self.path, &member.name)?;
        info!(archive = %self.path.display(), member = %member.name, "removed member");
        Ok(())
    }

    /// Deletes the archive file. A missing archive is left as it is.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file exists but cannot be removed.
    pub fn remove_all(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(archive = %self.path.display(), "deleted archive");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Extracts the member named `name` under `target_dir`.
    ///
    /// `target_dir` is created if missing.
    ///
    /// # Errors
    ///
    /// Returns `MemberNotFound` if no member has that name, `NotADirectory` if
    /// `target_dir` is a file, `PathTraversal` if the name escapes
    /// `target_dir`, or `UnsupportedEntry` for links and special files.
    pub fn extract_member<P: AsRef<Path>>(&self, name: &str, target_dir: P) -> Result<()> {
        let member = self.get_member(name)?;
        let dest = DestDir::new(target_dir.as_ref())?;
        self.backend().extract_member(&self.path, &member.name, &dest)?;
        debug!(archive = %self.path.display(), member = %member.name, dest = %dest.as_path().display(), "extracted member");
        Ok(())
    }

    /// Extracts the member named `name`, then removes it from the archive.
    ///
    /// # Errors
    ///
    /// Same as [`extract_member`](Self::extract_member) and
    /// [`remove_member`](Self::remove_member).
    pub fn extract_member_in_place<P: AsRef<Path>>(&self, name: &str, target_dir: P) -> Result<()> {
        self.extract_member(name, target_dir)?;
        self.remove_member(name)
    }

    /// Extracts every member under `target_dir`.
    ///
    /// A missing or empty archive is a no-op and creates nothing. All member
    /// names are validated before anything is written. Links and special
    /// files are skipped.
    ///
    /// # Errors
    ///
    /// Returns `NotADirectory` if `target_dir` is a file, or `PathTraversal`
    /// if any member name escapes `target_dir`.
    pub fn extract_all<P: AsRef<Path>>(&self, target_dir: P) -> Result<()> {
        let members = self.get_members()?;
        if members.is_empty() {
            debug!(archive = %self.path.display(), "nothing to extract");
            return Ok(());
        }

        let dest = DestDir::new(target_dir.as_ref())?;
        for member in members.iter().filter(|m| m.member_type.is_extractable()) {
            SafePath::validate(Path::new(&member.name), &dest)?;
        }

        self.backend().extract_all(&self.path, &dest)?;
        info!(
            archive = %self.path.display(),
            dest = %dest.as_path().display(),
            members = members.len(),
            "extracted archive"
        );
        Ok(())
    }

    /// Extracts every member, then deletes the archive.
    ///
    /// # Errors
    ///
    /// Same as [`extract_all`](Self::extract_all); the archive is kept if
    /// extraction fails.
    pub fn extract_all_in_place<P: AsRef<Path>>(&self, target_dir: P) -> Result<()> {
        self.extract_all(target_dir)?;
        self.remove_all()
    }

    /// Renders the member listing as a grid table.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArchive` if the archive cannot be parsed.
    pub fn members_table(&self) -> Result<String> {
        Ok(render_table(&self.get_members()?))
    }

    /// Prints the member listing as a grid table on stdout.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArchive` if the archive cannot be parsed.
    #[allow(clippy::print_stdout)]
    pub fn print_members(&self) -> Result<()> {
        print!("{}", self.members_table()?);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::write_file;
    use tempfile::TempDir;

    #[test]
    fn test_new_detects_format() {
        assert_eq!(Archive::new("a.tar").unwrap().format(), ArchiveFormat::Tar);
        assert_eq!(Archive::new("a.7z").unwrap().format(), ArchiveFormat::SevenZip);
        assert!(matches!(
            Archive::new("a.rar"),
            Err(FilePackError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_missing_archive_is_empty() {
        let temp = TempDir::new().unwrap();
        let archive = Archive::new(temp.path().join("missing.zip")).unwrap();

        assert!(!archive.exists());
        assert_eq!(archive.size(), 0);
        assert!(archive.get_members().unwrap().is_empty());
        assert!(!archive.member_exists("a").unwrap());

        archive.extract_all(temp.path().join("out")).unwrap();
        assert!(!temp.path().join("out").exists());
    }

    #[test]
    fn test_add_member_creates_archive() {
        let temp = TempDir::new().unwrap();
        let source = write_file(temp.path(), "notes.txt", b"notes");
        let archive = Archive::new(temp.path().join("new.tar")).unwrap();

        archive.add_member(&source, None).unwrap();
        assert!(archive.exists());

        let member = archive.get_member("notes.txt").unwrap();
        assert_eq!(member.size, 5);
    }

    #[test]
    fn test_add_member_rejects_duplicates_and_missing() {
        let temp = TempDir::new().unwrap();
        let source = write_file(temp.path(), "a.txt", b"a");
        let archive = Archive::new(temp.path().join("a.zip")).unwrap();
        archive.add_member(&source, Some("docs/a.txt")).unwrap();

        assert!(matches!(
            archive.add_member(&source, Some("docs/a.txt")),
            Err(FilePackError::MemberExists { .. })
        ));
        assert!(matches!(
            archive.add_member(temp.path().join("missing"), None),
            Err(FilePackError::SourceNotFound { .. })
        ));
        assert!(matches!(
            archive.add_member(temp.path(), Some("dir")),
            Err(FilePackError::UnsupportedEntry { .. })
        ));
    }

    #[test]
    fn test_in_place_variants() {
        let temp = TempDir::new().unwrap();
        let source = write_file(temp.path(), "a.txt", b"a");
        let archive = Archive::new(temp.path().join("a.tar")).unwrap();

        archive.add_member_in_place(&source, None).unwrap();
        assert!(!source.exists());

        let out = temp.path().join("out");
        archive.extract_member_in_place("a.txt", &out).unwrap();
        assert!(out.join("a.txt").exists());
        assert!(archive.get_members().unwrap().is_empty());

        let source = write_file(temp.path(), "b.txt", b"b");
        archive.add_member(&source, None).unwrap();
        archive.extract_all_in_place(&out).unwrap();
        assert!(out.join("b.txt").exists());
        assert!(!archive.exists());
    }

    #[test]
    fn test_extract_into_file_fails() {
        let temp = TempDir::new().unwrap();
        let source = write_file(temp.path(), "a.txt", b"a");
        let archive = Archive::new(temp.path().join("a.zip")).unwrap();
        archive.add_member(&source, None).unwrap();

        assert!(matches!(
            archive.extract_all(&source),
            Err(FilePackError::NotADirectory { .. })
        ));
    }

    #[test]
    fn test_remove_member_missing() {
        let temp = TempDir::new().unwrap();
        let archive = Archive::new(temp.path().join("a.tar")).unwrap();
        assert!(matches!(
            archive.remove_member("nope"),
            Err(FilePackError::MemberNotFound { .. })
        ));
    }

    #[test]
    fn test_members_table() {
        let temp = TempDir::new().unwrap();
        let source = write_file(temp.path(), "a.txt", b"abc");
        let archive = Archive::new(temp.path().join("a.zip")).unwrap();
        archive.add_member(&source, None).unwrap();

        let table = archive.members_table().unwrap();
        assert!(table.contains("| a.txt "));
        assert!(table.contains("| 3 "));
    }

    #[test]
    fn test_remove_all() {
        let temp = TempDir::new().unwrap();
        let archive = Archive::new(temp.path().join("a.tar")).unwrap();
        archive.create().unwrap();
        assert!(archive.exists());

        archive.remove_all().unwrap();
        assert!(!archive.exists());
        archive.remove_all().unwrap();
    }
}
