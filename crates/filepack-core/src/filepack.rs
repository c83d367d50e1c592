//! Composite handle dispatching on the detected [`PackKind`].

use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::io::BufWriter;
use std::path::Path;
use std::path::PathBuf;

use tempfile::TempDir;
use tracing::debug;
use tracing::info;

use crate::Archive;
use crate::CompressOptions;
use crate::Compression;
use crate::FilePackError;
use crate::Result;
use crate::codec;
use crate::formats::Algorithm;
use crate::formats::ArchiveFormat;
use crate::formats::PackKind;
use crate::formats::common::replace_atomically;
use crate::formats::detect::detect_kind;
use crate::member::Member;

/// A path handled as an archive, a compressed file, or both.
///
/// The kind is derived from the suffix chain when the handle is built.
/// Member operations are available for [`PackKind::ArchiveOnly`] and
/// [`PackKind::CompressedArchive`]; whole-file compression operations for
/// [`PackKind::CompressionOnly`] and [`PackKind::CompressedArchive`]. Anything
/// else fails with `UnsupportedOperation`.
///
/// Member operations on a compressed archive are transparent: the archive is
/// decompressed into a temporary directory, the operation runs there, and
/// mutations are recompressed over the original in one atomic step.
///
/// # Examples
///
/// ```no_run
/// use filepack_core::{Algorithm, CompressOptions, FilePack};
///
/// # fn main() -> Result<(), filepack_core::FilePackError> {
/// let pack = FilePack::new("backup.tar.gz")?;
/// pack.add_member("notes.txt", None)?;
/// pack.print_members()?;
///
/// let mut pack = FilePack::new("notes.txt")?;
/// pack.compress(Algorithm::Xz, &CompressOptions::default().with_in_place(true))?;
/// assert_eq!(pack.path().extension().unwrap(), "xz");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePack {
    path: PathBuf,
    kind: PackKind,
}

impl FilePack {
    /// Creates a handle, classifying `path` by its suffix chain.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFormat` if no suffix is recognized and no file
    /// exists at `path`, or `SourceNotFound` for a compressed-file path that
    /// does not exist.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let kind = detect_kind(&path)?;
        if matches!(kind, PackKind::CompressionOnly(_)) && !path.exists() {
            return Err(FilePackError::SourceNotFound { path });
        }
        debug!(path = %path.display(), %kind, "opened pack");
        Ok(Self { path, kind })
    }

    /// Returns the path the handle currently points at.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the detected kind.
    #[must_use]
    pub const fn kind(&self) -> PackKind {
        self.kind
    }

    /// Returns the compression algorithm named by the suffix chain, if any.
    #[must_use]
    pub const fn algorithm(&self) -> Option<Algorithm> {
        match self.kind {
            PackKind::CompressionOnly(algorithm) => algorithm,
            PackKind::CompressedArchive { algorithm, .. } => Some(algorithm),
            PackKind::ArchiveOnly(_) => None,
        }
    }

    /// Returns the archive format named by the suffix chain, if any.
    #[must_use]
    pub const fn archive_format(&self) -> Option<ArchiveFormat> {
        match self.kind {
            PackKind::ArchiveOnly(format) | PackKind::CompressedArchive { format, .. } => {
                Some(format)
            }
            PackKind::CompressionOnly(_) => None,
        }
    }

    fn unsupported(&self, operation: &'static str) -> FilePackError {
        FilePackError::UnsupportedOperation {
            operation,
            kind: self.kind.to_string(),
        }
    }

    /// Runs a read-only member operation.
    fn read_members<T, F>(&self, operation: &'static str, op: F) -> Result<T>
    where
        F: FnOnce(&Archive) -> Result<T>,
    {
        self.with_archive(operation, false, op)
    }

    /// Runs a member operation that changes the archive.
    fn write_members<T, F>(&self, operation: &'static str, op: F) -> Result<T>
    where
        F: FnOnce(&Archive) -> Result<T>,
    {
        self.with_archive(operation, true, op)
    }

    fn with_archive<T, F>(&self, operation: &'static str, mutates: bool, op: F) -> Result<T>
    where
        F: FnOnce(&Archive) -> Result<T>,
    {
        match self.kind {
            PackKind::ArchiveOnly(format) => op(&Archive::with_format(&self.path, format)),
            PackKind::CompressedArchive { format, algorithm } => {
                self.with_staged_archive(format, algorithm, mutates, op)
            }
            PackKind::CompressionOnly(_) => Err(self.unsupported(operation)),
        }
    }

    /// Decompresses the archive into a staging directory, runs `op` on the
    /// staged copy and, for mutations, recompresses it over the original.
    ///
    /// A missing or empty file stages no archive, so reads see no members and
    /// the first addition creates one.
    fn with_staged_archive<T, F>(
        &self,
        format: ArchiveFormat,
        algorithm: Algorithm,
        mutates: bool,
        op: F,
    ) -> Result<T>
    where
        F: FnOnce(&Archive) -> Result<T>,
    {
        let staging = TempDir::new()?;
        let staged = Archive::with_format(
            staging.path().join(format!("staged.{}", format.extension())),
            format,
        );

        if fs::metadata(&self.path).is_ok_and(|m| m.len() > 0) {
            if !Compression::new(&self.path)?.is_compressed(algorithm) {
                return Err(FilePackError::NotCompressed {
                    path: self.path.clone(),
                    algorithm,
                });
            }
            let reader = BufReader::new(File::open(&self.path)?);
            let mut out = BufWriter::new(File::create(staged.path())?);
            let size = codec::decompress_stream(algorithm, reader, &mut out)?;
            debug!(path = %self.path.display(), %algorithm, size, "staged compressed archive");
        }

        let result = op(&staged)?;

        if mutates && staged.exists() {
            replace_atomically(&self.path, |out| {
                let mut reader = BufReader::new(File::open(staged.path())?);
                codec::compress_stream(algorithm, None, &mut reader, BufWriter::new(out))?;
                Ok(())
            })?;
            info!(path = %self.path.display(), %algorithm, "recompressed archive");
        }

        Ok(result)
    }

    fn compression(&self, operation: &'static str) -> Result<Compression> {
        if self.kind.has_compression() {
            Compression::new(&self.path)
        } else {
            Err(self.unsupported(operation))
        }
    }

    /// Points the handle at `path` and derives the kind again.
    fn retarget(&mut self, path: PathBuf) -> Result<()> {
        self.kind = detect_kind(&path)?;
        debug!(path = %path.display(), kind = %self.kind, "retargeted pack");
        self.path = path;
        Ok(())
    }

    // Member operations

    /// Lists every member. See [`Archive::get_members`].
    pub fn get_members(&self) -> Result<Vec<Member>> {
        self.read_members("get_members", Archive::get_members)
    }

    /// Returns one member. See [`Archive::get_member`].
    pub fn get_member(&self, name: &str) -> Result<Member> {
        self.read_members("get_member", |a| a.get_member(name))
    }

    /// See [`Archive::member_exists`].
    pub fn member_exists(&self, name: &str) -> Result<bool> {
        self.read_members("member_exists", |a| a.member_exists(name))
    }

    /// Adds a file as a member. See [`Archive::add_member`].
    pub fn add_member<P: AsRef<Path>>(&self, member_path: P, arcname: Option<&str>) -> Result<()> {
        self.write_members("add_member", |a| a.add_member(member_path, arcname))
    }

    /// Adds a file as a member, then deletes it.
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

    /// Removes a member. See [`Archive::remove_member`].
    pub fn remove_member(&self, name: &str) -> Result<()> {
        self.write_members("remove_member", |a| a.remove_member(name))
    }

    /// Deletes the whole file, compressed or not.
    pub fn remove_all(&self) -> Result<()> {
        match self.archive_format() {
            Some(format) => Archive::with_format(&self.path, format).remove_all(),
            None => Err(self.unsupported("remove_all")),
        }
    }

    /// Extracts one member. See [`Archive::extract_member`].
    pub fn extract_member<P: AsRef<Path>>(&self, name: &str, target_dir: P) -> Result<()> {
        self.read_members("extract_member", |a| a.extract_member(name, target_dir))
    }

    /// Extracts one member, then removes it.
    pub fn extract_member_in_place<P: AsRef<Path>>(&self, name: &str, target_dir: P) -> Result<()> {
        self.extract_member(name, target_dir)?;
        self.remove_member(name)
    }

    /// Extracts every member. See [`Archive::extract_all`].
    pub fn extract_all<P: AsRef<Path>>(&self, target_dir: P) -> Result<()> {
        self.read_members("extract_all", |a| a.extract_all(target_dir))
    }

    /// Extracts every member, then deletes the file.
    pub fn extract_all_in_place<P: AsRef<Path>>(&self, target_dir: P) -> Result<()> {
        self.extract_all(target_dir)?;
        self.remove_all()
    }

    /// Renders the member listing. See [`Archive::members_table`].
    pub fn members_table(&self) -> Result<String> {
        self.read_members("members_table", Archive::members_table)
    }

    /// Prints the member listing on stdout.
    #[allow(clippy::print_stdout)]
    pub fn print_members(&self) -> Result<()> {
        print!("{}", self.members_table()?);
        Ok(())
    }

    // Compression operations

    /// See [`Compression::is_compressed`].
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedOperation` for a plain archive.
    pub fn is_compressed(&self, algorithm: Algorithm) -> Result<bool> {
        Ok(self.compression("is_compressed")?.is_compressed(algorithm))
    }

    /// See [`Compression::uncompressed_size`].
    pub fn uncompressed_size(&self, algorithm: Algorithm) -> Result<u64> {
        self.compression("uncompressed_size")?.uncompressed_size(algorithm)
    }

    /// See [`Compression::compressed_size`].
    pub fn compressed_size(&self, algorithm: Algorithm) -> Result<u64> {
        self.compression("compressed_size")?.compressed_size(algorithm)
    }

    /// See [`Compression::estimated_compressed_size`].
    pub fn estimated_compressed_size(&self, algorithm: Algorithm, level: Option<u8>) -> Result<u64> {
        self.compression("estimated_compressed_size")?
            .estimated_compressed_size(algorithm, level)
    }

    /// See [`Compression::compression_ratio`].
    pub fn compression_ratio(&self, algorithm: Algorithm) -> Result<f64> {
        self.compression("compression_ratio")?.compression_ratio(algorithm)
    }

    /// Compresses the whole file. See [`Compression::compress`].
    ///
    /// With `in_place`, the handle moves to the output path and its kind is
    /// derived again from the new suffix chain.
    pub fn compress(&mut self, algorithm: Algorithm, options: &CompressOptions) -> Result<PathBuf> {
        let target = self.compression("compress")?.compress(algorithm, options)?;
        if options.in_place {
            self.retarget(target.clone())?;
        }
        Ok(target)
    }

    /// Decompresses the whole file. See [`Compression::decompress`].
    ///
    /// With `in_place`, the handle moves to the output path and its kind is
    /// derived again, so decompressing `backup.tar.gz` leaves a handle on the
    /// plain `backup.tar` archive.
    pub fn decompress(&mut self, algorithm: Algorithm, options: &CompressOptions) -> Result<PathBuf> {
        let target = self.compression("decompress")?.decompress(algorithm, options)?;
        if options.in_place {
            self.retarget(target.clone())?;
        }
        Ok(target)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::write_file;

    #[test]
    fn test_new_classifies_path() {
        let pack = FilePack::new("backup.tar.bz2").unwrap();
        assert_eq!(pack.archive_format(), Some(ArchiveFormat::Tar));
        assert_eq!(pack.algorithm(), Some(Algorithm::Bz2));

        let pack = FilePack::new("photos.zip").unwrap();
        assert_eq!(pack.kind(), PackKind::ArchiveOnly(ArchiveFormat::Zip));
        assert_eq!(pack.algorithm(), None);
    }

    #[test]
    fn test_new_missing_compressed_file() {
        assert!(matches!(
            FilePack::new("/nonexistent/notes.txt.gz"),
            Err(FilePackError::SourceNotFound { .. })
        ));
        assert!(matches!(
            FilePack::new("/nonexistent/notes.unknown"),
            Err(FilePackError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_member_ops_on_compressed_file_unsupported() {
        let temp = TempDir::new().unwrap();
        let path = write_file(temp.path(), "notes.txt", b"plain");
        let pack = FilePack::new(&path).unwrap();

        let err = pack.get_members().unwrap_err();
        assert!(matches!(
            err,
            FilePackError::UnsupportedOperation {
                operation: "get_members",
                ..
            }
        ));
        assert!(pack.remove_all().is_err());
    }

    #[test]
    fn test_compression_ops_on_archive_unsupported() {
        let temp = TempDir::new().unwrap();
        let mut pack = FilePack::new(temp.path().join("a.tar")).unwrap();

        assert!(matches!(
            pack.is_compressed(Algorithm::Gzip),
            Err(FilePackError::UnsupportedOperation { .. })
        ));
        assert!(matches!(
            pack.compressed_size(Algorithm::Gzip),
            Err(FilePackError::UnsupportedOperation { .. })
        ));
        assert!(matches!(
            pack.compress(Algorithm::Gzip, &CompressOptions::default()),
            Err(FilePackError::UnsupportedOperation { .. })
        ));
    }

    #[test]
    fn test_compressed_archive_add_and_list() {
        let temp = TempDir::new().unwrap();
        let source = write_file(temp.path(), "a.txt", b"hello");
        let pack = FilePack::new(temp.path().join("bundle.tar.gz")).unwrap();

        assert!(pack.get_members().unwrap().is_empty());
        pack.add_member(&source, None).unwrap();

        assert!(pack.is_compressed(Algorithm::Gzip).unwrap());
        let members = pack.get_members().unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].name, "a.txt");
        assert_eq!(members[0].size, 5);
    }

    #[test]
    fn test_compressed_archive_not_actually_compressed() {
        let temp = TempDir::new().unwrap();
        let path = write_file(temp.path(), "fake.zip.xz", b"plain bytes");
        let pack = FilePack::new(&path).unwrap();

        assert!(matches!(
            pack.get_members(),
            Err(FilePackError::NotCompressed { .. })
        ));
    }

    #[test]
    fn test_failed_mutation_leaves_file_untouched() {
        let temp = TempDir::new().unwrap();
        let source = write_file(temp.path(), "a.txt", b"hello");
        let pack = FilePack::new(temp.path().join("bundle.zip.bz2")).unwrap();
        pack.add_member(&source, None).unwrap();
        let before = fs::read(pack.path()).unwrap();

        assert!(pack.remove_member("missing").is_err());
        assert!(pack.add_member(&source, None).is_err());
        assert_eq!(fs::read(pack.path()).unwrap(), before);
    }

    #[test]
    fn test_decompress_in_place_retargets_to_archive() {
        let temp = TempDir::new().unwrap();
        let source = write_file(temp.path(), "a.txt", b"hello");
        let mut pack = FilePack::new(temp.path().join("bundle.tar.xz")).unwrap();
        pack.add_member(&source, None).unwrap();

        let target = pack
            .decompress(Algorithm::Xz, &CompressOptions::default().with_in_place(true))
            .unwrap();
        assert_eq!(target, temp.path().join("bundle.tar"));
        assert_eq!(pack.kind(), PackKind::ArchiveOnly(ArchiveFormat::Tar));
        assert!(pack.member_exists("a.txt").unwrap());
    }

    #[test]
    fn test_decompress_in_place_tgz_becomes_tar() {
        let temp = TempDir::new().unwrap();
        let source = write_file(temp.path(), "a.txt", b"hello");
        let mut pack = FilePack::new(temp.path().join("b.tgz")).unwrap();
        pack.add_member(&source, None).unwrap();

        let target = pack
            .decompress(Algorithm::Gzip, &CompressOptions::default().with_in_place(true))
            .unwrap();
        assert_eq!(target, temp.path().join("b.tar"));
        assert_eq!(pack.kind(), PackKind::ArchiveOnly(ArchiveFormat::Tar));
        assert_eq!(pack.get_members().unwrap().len(), 1);
    }
}
