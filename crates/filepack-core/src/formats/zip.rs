//! ZIP archive backend.
//!
//! Appends reopen the archive with [`ZipWriter::new_append`], which keeps the
//! existing entries in place and rewrites only the central directory. Removal
//! raw-copies every other entry (without recompressing) into a temporary
//! archive that replaces the original.

use std::fs::File;
use std::fs::Metadata;
use std::fs::OpenOptions;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use std::path::Path;

use chrono::Datelike;
use chrono::NaiveDate;
use chrono::Timelike;
use tracing::debug;
use tracing::warn;
use zip::CompressionMethod;
use zip::ZipArchive;
use zip::ZipWriter;
use zip::read::ZipFile;
use zip::write::SimpleFileOptions;

use crate::FilePackError;
use crate::Result;
use crate::formats::ArchiveFormat;
use crate::formats::common;
use crate::formats::traits::ArchiveBackend;
use crate::member::Member;
use crate::member::MemberType;
use crate::types::DestDir;

/// Unix file type bits and the symlink type.
const S_IFMT: u32 = 0o170_000;
const S_IFLNK: u32 = 0o120_000;

/// Backend for `.zip` archives.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipBackend;

impl ZipBackend {
    fn open(archive: &Path) -> Result<ZipArchive<BufReader<File>>> {
        Ok(ZipArchive::new(BufReader::new(File::open(archive)?))?)
    }
}

impl ArchiveBackend for ZipBackend {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Zip
    }

    fn list(&self, archive: &Path) -> Result<Vec<Member>> {
        let mut zip = Self::open(archive)?;
        let mut members = Vec::with_capacity(zip.len());
        for i in 0..zip.len() {
            let entry = zip.by_index(i)?;
            members.push(to_member(&entry));
        }
        Ok(members)
    }

    fn create_empty(&self, archive: &Path) -> Result<()> {
        ZipWriter::new(File::create(archive)?).finish()?;
        Ok(())
    }

    fn extract_member(&self, archive: &Path, name: &str, dest: &DestDir) -> Result<()> {
        let mut zip = Self::open(archive)?;
        let index = (0..zip.len())
            .find(|&i| {
                zip.name_for_index(i)
                    .is_some_and(|stored| common::same_name(stored, name))
            })
            .ok_or_else(|| FilePackError::MemberNotFound {
                name: name.to_string(),
            })?;

        let mut entry = zip.by_index(index)?;
        extract_entry(&mut entry, dest)
    }

    fn extract_all(&self, archive: &Path, dest: &DestDir) -> Result<()> {
        let mut zip = Self::open(archive)?;
        for i in 0..zip.len() {
            let mut entry = zip.by_index(i)?;
            let member_type = member_type(&entry);
            if !member_type.is_extractable() {
                warn!(member = entry.name(), kind = %member_type, "skipping link entry");
                continue;
            }
            extract_entry(&mut entry, dest)?;
        }
        Ok(())
    }

    fn append(&self, archive: &Path, source: &Path, name: &str) -> Result<()> {
        let mut input = File::open(source)?;
        let options = file_options(&input.metadata()?);

        let file = OpenOptions::new().read(true).write(true).open(archive)?;
        let mut zip = ZipWriter::new_append(file)?;
        debug!(archive = %archive.display(), member = name, "appending zip entry");

        zip.start_file(name, options)?;
        std::io::copy(&mut input, &mut zip)?;
        zip.finish()?;
        Ok(())
    }

    fn remove(&self, archive: &Path, name: &str) -> Result<()> {
        common::replace_atomically(archive, |out| {
            let mut source = Self::open(archive)?;
            let mut zip = ZipWriter::new(out);
            let mut found = false;

            for i in 0..source.len() {
                let entry = source.by_index_raw(i)?;
                if common::same_name(entry.name(), name) {
                    found = true;
                    continue;
                }
                zip.raw_copy_file(entry)?;
            }

            if !found {
                return Err(FilePackError::MemberNotFound {
                    name: name.to_string(),
                });
            }
            zip.finish()?;
            Ok(())
        })
    }
}

fn file_options(metadata: &Metadata) -> SimpleFileOptions {
    let mut options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(metadata.len() >= u64::from(u32::MAX));

    if let Some(modified) = zip_mtime(metadata) {
        options = options.last_modified_time(modified);
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        options = options.unix_permissions(metadata.permissions().mode());
    }

    options
}

/// Converts a file's modification time to a ZIP timestamp, in UTC.
///
/// Returns `None` for times the DOS date format cannot represent (before
/// 1980 or after 2107).
fn zip_mtime(metadata: &Metadata) -> Option<zip::DateTime> {
    let modified: chrono::DateTime<chrono::Utc> = metadata.modified().ok()?.into();
    zip::DateTime::from_date_and_time(
        u16::try_from(modified.year()).ok()?,
        u8::try_from(modified.month()).ok()?,
        u8::try_from(modified.day()).ok()?,
        u8::try_from(modified.hour()).ok()?,
        u8::try_from(modified.minute()).ok()?,
        u8::try_from(modified.second()).ok()?,
    )
    .ok()
}

fn to_member<R: Read>(entry: &ZipFile<'_, R>) -> Member {
    let modified = entry.last_modified().and_then(|dt| {
        NaiveDate::from_ymd_opt(i32::from(dt.year()), u32::from(dt.month()), u32::from(dt.day()))?
            .and_hms_opt(
                u32::from(dt.hour()),
                u32::from(dt.minute()),
                u32::from(dt.second()),
            )
            .map(|t| t.and_utc())
    });

    Member {
        name: entry.name().to_string(),
        size: entry.size(),
        compressed_size: Some(entry.compressed_size()),
        modified,
        member_type: member_type(entry),
    }
}

fn member_type<R: Read>(entry: &ZipFile<'_, R>) -> MemberType {
    if entry.is_dir() {
        MemberType::Directory
    } else if entry
        .unix_mode()
        .is_some_and(|mode| mode & S_IFMT == S_IFLNK)
    {
        MemberType::Symlink
    } else {
        MemberType::File
    }
}

fn extract_entry<R: Read + Seek>(entry: &mut ZipFile<'_, R>, dest: &DestDir) -> Result<()> {
    let name = entry.name().to_string();
    let member_type = member_type(entry);
    let safe_path = common::validate_member(&name, member_type, dest)?;

    match member_type {
        MemberType::Directory => common::create_directory(&safe_path, dest),
        _ => {
            let mode = entry.unix_mode();
            common::extract_file(entry, &safe_path, dest, mode).map(|_| ())
        }
    }
}
