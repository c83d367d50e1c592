//! Common utilities shared between archive backends.
//!
//! This is an internal module; backends use it for:
//!
//! - [`validate_member`]: entry type and path checks before extraction
//! - [`extract_file`]: buffered file writes under the destination
//! - [`create_directory`]: directory creation (idempotent)
//! - [`replace_atomically`]: temp file in the target directory, then rename

use std::fs;
use std::fs::File;
use std::fs::create_dir_all;
use std::io;
use std::io::BufWriter;
use std::io::Read;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::FilePackError;
use crate::Result;
use crate::member::MemberType;
use crate::types::DestDir;
use crate::types::SafePath;

/// Buffer size used for member writes.
const WRITE_BUFFER_SIZE: usize = 64 * 1024;

/// Returns `true` if two member names refer to the same entry.
///
/// Directory entries are stored with a trailing `/` by some formats; the
/// separator is ignored for comparison.
#[must_use]
pub fn same_name(stored: &str, requested: &str) -> bool {
    stored.trim_end_matches('/') == requested.trim_end_matches('/')
}

/// Checks that a member can be extracted under `dest`.
///
/// # Errors
///
/// Returns `UnsupportedEntry` for links and special files, and
/// `PathTraversal` if the name escapes `dest`.
pub fn validate_member(name: &str, member_type: MemberType, dest: &DestDir) -> Result<SafePath> {
    if !member_type.is_extractable() {
        return Err(FilePackError::UnsupportedEntry {
            name: name.to_string(),
        });
    }
    SafePath::validate(Path::new(name), dest)
}

/// Writes a file member to its validated location.
///
/// Parent directories are created as needed. On Unix the permission bits
/// from `mode` are applied when present.
///
/// # Errors
///
/// Returns an error if directory creation, file creation or the copy fails.
pub fn extract_file<R: Read + ?Sized>(
    reader: &mut R,
    safe_path: &SafePath,
    dest: &DestDir,
    mode: Option<u32>,
) -> Result<u64> {
    let output_path = dest.join(safe_path);

    if let Some(parent) = output_path.parent() {
        create_dir_all(parent)?;
    }

    let output_file = File::create(&output_path)?;
    let mut writer = BufWriter::with_capacity(WRITE_BUFFER_SIZE, output_file);
    let written = std::io::copy(reader, &mut writer)?;
    writer.flush()?;

    #[cfg(unix)]
    if let Some(mode) = mode {
        use std::os::unix::fs::PermissionsExt;
        // Keep the owner able to read and write what was extracted.
        let permissions = std::fs::Permissions::from_mode((mode & 0o777) | 0o600);
        std::fs::set_permissions(&output_path, permissions)?;
    }
    #[cfg(not(unix))]
    let _ = mode;

    Ok(written)
}

/// Creates a directory member. Existing directories are left as they are.
///
/// # Errors
///
/// Returns an error if directory creation fails.
pub fn create_directory(safe_path: &SafePath, dest: &DestDir) -> Result<()> {
    create_dir_all(dest.join(safe_path))?;
    Ok(())
}

/// Returns the directory holding `path`, or `.` for bare file names.
#[must_use]
pub fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Creates a temporary file beside `target` carrying the permissions of
/// `mode_from`.
///
/// When `mode_from` does not exist the file gets the permissions a freshly
/// created file would get (`0666` minus the umask on Unix), not the private
/// mode temporary files default to.
pub fn temp_file_for(target: &Path, mode_from: &Path) -> Result<NamedTempFile> {
    let temp = new_temp_file(parent_dir(target))?;
    match fs::metadata(mode_from) {
        Ok(metadata) => temp.as_file().set_permissions(metadata.permissions())?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    Ok(temp)
}

#[cfg(unix)]
fn new_temp_file(dir: &Path) -> io::Result<NamedTempFile> {
    use std::os::unix::fs::PermissionsExt;

    tempfile::Builder::new()
        .permissions(fs::Permissions::from_mode(0o666))
        .tempfile_in(dir)
}

#[cfg(not(unix))]
fn new_temp_file(dir: &Path) -> io::Result<NamedTempFile> {
    NamedTempFile::new_in(dir)
}

/// Replaces `target` with the output of `write`.
///
/// The content is written to a temporary file in the same directory as
/// `target` and renamed over it once `write` succeeds. An existing target
/// keeps its permissions. If `write` fails, the temporary file is removed and
/// `target` is left untouched.
///
/// `write` must release any handle it holds on `target` before returning.
///
/// # Errors
///
/// Returns the error from `write`, or an I/O error if the temporary file
/// cannot be created or persisted.
pub fn replace_atomically<F>(target: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut File) -> Result<()>,
{
    let mut temp = temp_file_for(target, target)?;
    write(temp.as_file_mut())?;
    temp.as_file_mut().flush()?;
    temp.persist(target).map_err(|e| FilePackError::Io(e.error))?;
    Ok(())
}
