//! Test utilities for building archives and fixture files.
//!
//! # Panics
//!
//! All functions in this module may panic on I/O errors since they are
//! designed for test use only where panics are acceptable.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::io::Cursor;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use zip::write::SimpleFileOptions;

/// Writes `content` to `dir/name`, creating parent directories, and returns
/// the full path.
pub fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}

/// Returns `len` bytes of highly redundant text.
#[must_use]
pub fn redundant_text(len: usize) -> Vec<u8> {
    b"filepack compresses repetitive text very well. "
        .iter()
        .copied()
        .cycle()
        .take(len)
        .collect()
}

/// Fixed modification time for tar fixtures (2023-08-01 12:00:00 UTC).
pub const FIXTURE_MTIME: u64 = 1_690_891_200;

/// Builds in-memory tar archives, including entries `tar::Builder` would
/// refuse to write such as `../` names and links.
///
/// ```
/// use filepack_core::test_utils::TarTestBuilder;
///
/// let bytes = TarTestBuilder::new()
///     .add_file("docs/readme.md", b"# readme")
///     .add_directory("docs/")
///     .add_symlink("latest", "docs/readme.md")
///     .build();
/// assert_eq!(bytes.len() % 512, 0);
/// ```
pub struct TarTestBuilder {
    builder: tar::Builder<Vec<u8>>,
}

impl TarTestBuilder {
    /// Starts an empty archive.
    #[must_use]
    pub fn new() -> Self {
        Self {
            builder: tar::Builder::new(Vec::new()),
        }
    }

    fn header(kind: tar::EntryType, size: usize, mode: u32) -> tar::Header {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(kind);
        header.set_size(size as u64);
        header.set_mode(mode);
        header.set_mtime(FIXTURE_MTIME);
        header
    }

    /// Appends a regular file.
    #[must_use]
    pub fn add_file(mut self, name: &str, data: &[u8]) -> Self {
        let mut header = Self::header(tar::EntryType::Regular, data.len(), 0o644);
        self.builder.append_data(&mut header, name, data).unwrap();
        self
    }

    /// Appends a regular file with `name` copied verbatim into the header.
    ///
    /// Used for hostile names like `../evil.txt`, which `append_data`
    /// rejects. `name` must be shorter than 100 bytes.
    #[must_use]
    pub fn add_file_raw_path(mut self, name: &str, data: &[u8]) -> Self {
        let mut header = Self::header(tar::EntryType::Regular, data.len(), 0o644);
        header.as_old_mut().name[..name.len()].copy_from_slice(name.as_bytes());
        header.set_cksum();
        self.builder.append(&header, data).unwrap();
        self
    }

    /// Appends a directory entry.
    #[must_use]
    pub fn add_directory(mut self, name: &str) -> Self {
        let mut header = Self::header(tar::EntryType::Directory, 0, 0o755);
        self.builder
            .append_data(&mut header, name, std::io::empty())
            .unwrap();
        self
    }

    /// Appends a symbolic link to `target`.
    #[must_use]
    pub fn add_symlink(self, name: &str, target: &str) -> Self {
        self.add_link(tar::EntryType::Symlink, name, target)
    }

    /// Appends a hard link to `target`.
    #[must_use]
    pub fn add_hardlink(self, name: &str, target: &str) -> Self {
        self.add_link(tar::EntryType::Link, name, target)
    }

    fn add_link(mut self, kind: tar::EntryType, name: &str, target: &str) -> Self {
        let mut header = Self::header(kind, 0, 0o777);
        header.set_link_name(target).unwrap();
        self.builder
            .append_data(&mut header, name, std::io::empty())
            .unwrap();
        self
    }

    /// Finishes the archive and returns its bytes.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.builder.into_inner().unwrap()
    }
}

impl Default for TarTestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds in-memory zip archives with stored (uncompressed) entries.
///
/// `zip::ZipWriter` accepts any entry name, so hostile names such as
/// `../evil.txt` need no special method.
///
/// ```
/// use filepack_core::test_utils::ZipTestBuilder;
///
/// let bytes = ZipTestBuilder::new()
///     .add_file("../evil.txt", b"x")
///     .add_directory("assets/")
///     .build();
/// assert!(bytes.starts_with(b"PK"));
/// ```
pub struct ZipTestBuilder {
    zip: zip::ZipWriter<Cursor<Vec<u8>>>,
}

impl ZipTestBuilder {
    /// Starts an empty archive.
    #[must_use]
    pub fn new() -> Self {
        Self {
            zip: zip::ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    fn options(mode: u32) -> SimpleFileOptions {
        SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored)
            .unix_permissions(mode)
    }

    fn add_entry(mut self, name: &str, mode: u32, data: &[u8]) -> Self {
        self.zip.start_file(name, Self::options(mode)).unwrap();
        self.zip.write_all(data).unwrap();
        self
    }

    /// Appends a regular file.
    #[must_use]
    pub fn add_file(self, name: &str, data: &[u8]) -> Self {
        self.add_entry(name, 0o644, data)
    }

    /// Appends a directory entry.
    #[must_use]
    pub fn add_directory(mut self, name: &str) -> Self {
        self.zip.add_directory(name, Self::options(0o755)).unwrap();
        self
    }

    /// Appends a symbolic link: an entry whose Unix mode carries the link
    /// type bits and whose content is the target.
    #[must_use]
    pub fn add_symlink(self, name: &str, target: &str) -> Self {
        self.add_entry(name, 0o120_777, target.as_bytes())
    }

    /// Finishes the archive and returns its bytes.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.zip.finish().unwrap().into_inner()
    }
}

impl Default for ZipTestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
