//! 7z archive backend.
//!
//! `sevenz-rust2` reads and writes whole archives only, so appends and
//! removals are full rewrites: the current members are extracted into a
//! staging directory and repacked, with the change applied, into a temporary
//! archive that replaces the original.
//!
//! # Limitations
//!
//! - **Timestamps and stored sizes**: not reported in listings
//! - **Symlinks**: only Windows reparse points are recognized; they are
//!   listed as symlinks and never extracted or carried over by a rewrite
//! - **Encryption**: password-protected archives are rejected

use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::path::Path;

use sevenz_rust2::ArchiveEntry;
use sevenz_rust2::ArchiveWriter;
use sevenz_rust2::Password;
use tempfile::TempDir;
use tracing::debug;
use tracing::warn;

use crate::FilePackError;
use crate::Result;
use crate::formats::ArchiveFormat;
use crate::formats::common;
use crate::formats::traits::ArchiveBackend;
use crate::member::Member;
use crate::member::MemberType;
use crate::types::DestDir;
use crate::types::SafePath;

/// Backend for `.7z` archives.
#[derive(Debug, Clone, Copy, Default)]
pub struct SevenZipBackend;

/// A file to add during a rewrite: source path and member name.
type Addition<'a> = (&'a Path, &'a str);

impl SevenZipBackend {
    /// Extracts the members accepted by `select` under `dest`.
    ///
    /// Every selected name must already have been validated against `dest`.
    fn extract_selected<F>(archive: &Path, dest: &DestDir, mut select: F) -> Result<()>
    where
        F: FnMut(&str) -> bool,
    {
        let mut failure: Option<FilePackError> = None;

        let extract_fn = |entry: &ArchiveEntry,
                          reader: &mut dyn Read,
                          _dest_dir: &std::path::PathBuf|
         -> std::result::Result<bool, sevenz_rust2::Error> {
            let member_type = entry_type(entry);
            if !select(&entry.name) || !member_type.is_extractable() {
                std::io::copy(reader, &mut std::io::sink())?;
                return Ok(true);
            }

            let written = common::validate_member(&entry.name, member_type, dest).and_then(
                |safe_path| match member_type {
                    MemberType::Directory => common::create_directory(&safe_path, dest),
                    _ => common::extract_file(reader, &safe_path, dest, None).map(|_| ()),
                },
            );

            match written {
                Ok(()) => Ok(true),
                Err(err) => {
                    failure = Some(err);
                    Ok(false)
                }
            }
        };

        sevenz_rust2::decompress_with_extract_fn(File::open(archive)?, dest.as_path(), extract_fn)?;

        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Repacks the archive without `skip` and with `addition` appended.
    fn rewrite(&self, archive: &Path, skip: Option<&str>, addition: Option<Addition<'_>>) -> Result<()> {
        let members = self.list(archive)?;
        let staging = TempDir::new()?;
        let stage = DestDir::new(staging.path())?;
        debug!(
            archive = %archive.display(),
            members = members.len(),
            staging = %stage.as_path().display(),
            "rewriting 7z archive"
        );

        let kept: Vec<&Member> = members
            .iter()
            .filter(|m| !skip.is_some_and(|name| common::same_name(&m.name, name)))
            .filter(|m| {
                if !m.member_type.is_extractable() {
                    warn!(member = %m.name, "dropping link entry from rewritten 7z archive");
                }
                m.member_type.is_extractable()
            })
            .collect();

        let mut staged = Vec::with_capacity(kept.len());
        for member in &kept {
            staged.push((SafePath::validate(Path::new(&member.name), &stage)?, *member));
        }

        Self::extract_selected(archive, &stage, |name| {
            kept.iter().any(|m| m.name == name)
        })?;

        common::replace_atomically(archive, |out| {
            let mut writer = ArchiveWriter::new(out)?;

            for (safe_path, member) in &staged {
                let path = stage.join(safe_path);
                let entry = ArchiveEntry::from_path(&path, member.name.clone());
                if member.member_type == MemberType::Directory {
                    writer.push_archive_entry(entry, None::<File>)?;
                } else {
                    writer.push_archive_entry(entry, Some(BufReader::new(File::open(&path)?)))?;
                }
            }

            if let Some((source, name)) = addition {
                let entry = ArchiveEntry::from_path(source, name.to_string());
                writer.push_archive_entry(entry, Some(BufReader::new(File::open(source)?)))?;
            }

            writer.finish()?;
            Ok(())
        })
    }
}

impl ArchiveBackend for SevenZipBackend {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::SevenZip
    }

    fn list(&self, archive: &Path) -> Result<Vec<Member>> {
        let mut file = BufReader::new(File::open(archive)?);
        let parsed = sevenz_rust2::Archive::read(&mut file, &Password::empty())?;

        Ok(parsed
            .files
            .iter()
            .map(|entry| Member {
                name: entry.name.clone(),
                size: entry.size,
                compressed_size: None,
                modified: None,
                member_type: entry_type(entry),
            })
            .collect())
    }

    fn create_empty(&self, archive: &Path) -> Result<()> {
        ArchiveWriter::create(archive)?.finish()?;
        Ok(())
    }

    fn extract_member(&self, archive: &Path, name: &str, dest: &DestDir) -> Result<()> {
        let member = self
            .list(archive)?
            .into_iter()
            .find(|m| common::same_name(&m.name, name))
            .ok_or_else(|| FilePackError::MemberNotFound {
                name: name.to_string(),
            })?;
        common::validate_member(&member.name, member.member_type, dest)?;

        Self::extract_selected(archive, dest, |stored| stored == member.name)
    }

    fn extract_all(&self, archive: &Path, dest: &DestDir) -> Result<()> {
        Self::extract_selected(archive, dest, |_| true)
    }

    fn append(&self, archive: &Path, source: &Path, name: &str) -> Result<()> {
        self.rewrite(archive, None, Some((source, name)))
    }

    fn remove(&self, archive: &Path, name: &str) -> Result<()> {
        if !self.list(archive)?.iter().any(|m| common::same_name(&m.name, name)) {
            return Err(FilePackError::MemberNotFound {
                name: name.to_string(),
            });
        }
        self.rewrite(archive, Some(name), None)
    }
}

fn entry_type(entry: &ArchiveEntry) -> MemberType {
    const FILE_ATTRIBUTE_REPARSE_POINT: u32 = 0x0000_0400;

    if entry.has_windows_attributes
        && (entry.windows_attributes & FILE_ATTRIBUTE_REPARSE_POINT) != 0
    {
        MemberType::Symlink
    } else if entry.is_directory() {
        MemberType::Directory
    } else {
        MemberType::File
    }
}
