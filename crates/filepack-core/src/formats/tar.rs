//! TAR archive backend.
//!
//! Appends are native: the end-of-archive marker is located by walking the
//! entry headers, the file is truncated there and the new entry is written
//! followed by a fresh marker. Removal stream-copies every other entry into a
//! temporary archive that replaces the original.

use std::borrow::Cow;
use std::fs::File;
use std::fs::OpenOptions;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::path::Path;

use chrono::DateTime;
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

/// Size of a TAR block; entry data is padded to this boundary.
const BLOCK_SIZE: u64 = 512;

/// Backend for `.tar` archives.
#[derive(Debug, Clone, Copy, Default)]
pub struct TarBackend;

impl TarBackend {
    fn open(archive: &Path) -> Result<tar::Archive<BufReader<File>>> {
        Ok(tar::Archive::new(BufReader::new(File::open(archive)?)))
    }

    /// Returns the offset where the end-of-archive marker starts.
    fn data_end(archive: &Path) -> Result<u64> {
        let mut reader = Self::open(archive)?;
        let mut end = 0;
        for entry in reader.entries().map_err(invalid)? {
            let entry = entry.map_err(invalid)?;
            let stored = entry.header().entry_size().map_err(invalid)?;
            end = entry.raw_file_position() + stored.div_ceil(BLOCK_SIZE) * BLOCK_SIZE;
        }
        Ok(end)
    }
}

impl ArchiveBackend for TarBackend {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Tar
    }

    fn list(&self, archive: &Path) -> Result<Vec<Member>> {
        let mut reader = Self::open(archive)?;
        let mut members = Vec::new();
        for entry in reader.entries().map_err(invalid)? {
            let entry = entry.map_err(invalid)?;
            members.push(to_member(&entry)?);
        }
        Ok(members)
    }

    fn create_empty(&self, archive: &Path) -> Result<()> {
        let mut builder = tar::Builder::new(File::create(archive)?);
        builder.finish()?;
        Ok(())
    }

    fn extract_member(&self, archive: &Path, name: &str, dest: &DestDir) -> Result<()> {
        let mut reader = Self::open(archive)?;
        for entry in reader.entries().map_err(invalid)? {
            let mut entry = entry.map_err(invalid)?;
            let member = to_member(&entry)?;
            if !common::same_name(&member.name, name) {
                continue;
            }
            return extract_entry(&mut entry, &member, dest);
        }
        Err(FilePackError::MemberNotFound {
            name: name.to_string(),
        })
    }

    fn extract_all(&self, archive: &Path, dest: &DestDir) -> Result<()> {
        let mut reader = Self::open(archive)?;
        for entry in reader.entries().map_err(invalid)? {
            let mut entry = entry.map_err(invalid)?;
            let member = to_member(&entry)?;
            if !member.member_type.is_extractable() {
                warn!(member = %member.name, kind = %member.member_type, "skipping link entry");
                continue;
            }
            extract_entry(&mut entry, &member, dest)?;
        }
        Ok(())
    }

    fn append(&self, archive: &Path, source: &Path, name: &str) -> Result<()> {
        let end = Self::data_end(archive)?;
        debug!(archive = %archive.display(), offset = end, "appending tar entry");

        let mut file = OpenOptions::new().read(true).write(true).open(archive)?;
        file.set_len(end)?;
        file.seek(SeekFrom::Start(end))?;

        let mut builder = tar::Builder::new(file);
        builder.append_path_with_name(source, name)?;
        builder.finish()?;
        Ok(())
    }

    fn remove(&self, archive: &Path, name: &str) -> Result<()> {
        common::replace_atomically(archive, |out| {
            let mut reader = Self::open(archive)?;
            let mut builder = tar::Builder::new(out);
            let mut found = false;

            for entry in reader.entries().map_err(invalid)? {
                let mut entry = entry.map_err(invalid)?;
                let path = entry.path().map_err(invalid)?.into_owned();
                if common::same_name(&path.to_string_lossy(), name) {
                    found = true;
                    continue;
                }
                let mut header = entry.header().clone();
                // Long link targets live in their own GNU record.
                match entry.link_name().map_err(invalid)?.map(Cow::into_owned) {
                    Some(target) => builder.append_link(&mut header, &path, &target)?,
                    None => builder.append_data(&mut header, &path, &mut entry)?,
                }
            }

            if !found {
                return Err(FilePackError::MemberNotFound {
                    name: name.to_string(),
                });
            }
            builder.finish()?;
            Ok(())
        })
    }
}

fn invalid(err: std::io::Error) -> FilePackError {
    FilePackError::invalid_archive("tar", err)
}

fn to_member<R: Read>(entry: &tar::Entry<'_, R>) -> Result<Member> {
    let name = entry.path().map_err(invalid)?.to_string_lossy().into_owned();
    let header = entry.header();
    let modified = header
        .mtime()
        .ok()
        .and_then(|t| i64::try_from(t).ok())
        .and_then(|t| DateTime::from_timestamp(t, 0));

    Ok(Member {
        name,
        size: entry.size(),
        compressed_size: None,
        modified,
        member_type: member_type(header.entry_type()),
    })
}

fn member_type(entry_type: tar::EntryType) -> MemberType {
    match entry_type {
        tar::EntryType::Directory => MemberType::Directory,
        tar::EntryType::Symlink => MemberType::Symlink,
        tar::EntryType::Link
        | tar::EntryType::Char
        | tar::EntryType::Block
        | tar::EntryType::Fifo => MemberType::Other,
        // Regular, Continuous, GNU sparse and the like hold file data
        _ => MemberType::File,
    }
}

fn extract_entry<R: Read>(
    entry: &mut tar::Entry<'_, R>,
    member: &Member,
    dest: &DestDir,
) -> Result<()> {
    let safe_path = common::validate_member(&member.name, member.member_type, dest)?;
    match member.member_type {
        MemberType::Directory => common::create_directory(&safe_path, dest),
        _ => {
            let mode = entry.header().mode().ok();
            common::extract_file(entry, &safe_path, dest, mode).map(|_| ())
        }
    }
}
