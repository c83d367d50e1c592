//! Member names checked against an extraction directory.

use std::io;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use crate::FilePackError;
use crate::Result;

use super::DestDir;

/// A member name that resolves to a location inside a [`DestDir`].
///
/// The only constructor is [`SafePath::validate`]. The stored path is
/// relative, free of `.` components and never empty.
///
/// ```no_run
/// use filepack_core::types::DestDir;
/// use filepack_core::types::SafePath;
/// use std::path::Path;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::new("/tmp/out")?;
/// let nested = SafePath::validate(Path::new("./docs/readme.md"), &dest)?;
/// assert_eq!(nested.as_path(), Path::new("docs/readme.md"));
/// assert!(SafePath::validate(Path::new("../escape.txt"), &dest).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SafePath(PathBuf);

impl SafePath {
    /// Checks `name` and returns its normalized relative form.
    ///
    /// Fails with `PathTraversal` when the name contains a NUL byte, a `..`
    /// component, a root or drive prefix, is empty, or when an existing
    /// directory on the way is a link leading out of `dest`.
    pub fn validate(name: &Path, dest: &DestDir) -> Result<Self> {
        let rejected = || FilePackError::PathTraversal {
            path: name.to_path_buf(),
        };

        if contains_nul(name) {
            return Err(rejected());
        }

        let mut relative = PathBuf::new();
        for component in name.components() {
            match component {
                Component::Normal(part) => relative.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(rejected());
                }
            }
        }
        if relative.as_os_str().is_empty() {
            return Err(rejected());
        }

        let target = dest.as_path().join(&relative);
        if let Some(parent) = target.parent() {
            match parent.canonicalize() {
                Ok(real) if !real.starts_with(dest.as_path()) => return Err(rejected()),
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        Ok(Self(relative))
    }

    /// The normalized relative path.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

#[cfg(unix)]
fn contains_nul(path: &Path) -> bool {
    use std::os::unix::ffi::OsStrExt;
    path.as_os_str().as_bytes().contains(&0)
}

#[cfg(not(unix))]
fn contains_nul(path: &Path) -> bool {
    path.to_str().is_none_or(|s| s.contains('\0'))
}
