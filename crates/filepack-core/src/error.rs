//! Error types for archive and compression operations.

use std::path::PathBuf;
use thiserror::Error;

use crate::formats::Algorithm;

/// Result type alias using `FilePackError`.
pub type Result<T> = std::result::Result<T, FilePackError>;

/// Errors that can occur while manipulating archives or compressed files.
#[derive(Error, Debug)]
pub enum FilePackError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The path's suffix chain maps to no supported archive or compression
    /// format.
    #[error("unsupported format: {path}")]
    UnsupportedFormat {
        /// The offending path.
        path: PathBuf,
    },

    /// Unrecognized compression algorithm tag.
    #[error("unsupported compression algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Archive lookup miss.
    #[error("archive member not found: {name}")]
    MemberNotFound {
        /// The requested member name.
        name: String,
    },

    /// A member with this name is already stored in the archive.
    #[error("archive member already exists: {name}")]
    MemberExists {
        /// The conflicting member name.
        name: String,
    },

    /// The file is not compressed with the requested algorithm.
    #[error("{path} is not compressed with {algorithm}")]
    NotCompressed {
        /// The file path.
        path: PathBuf,
        /// The requested algorithm.
        algorithm: Algorithm,
    },

    /// The file is already compressed with the requested algorithm.
    #[error("{path} is already compressed with {algorithm}")]
    AlreadyCompressed {
        /// The file path.
        path: PathBuf,
        /// The requested algorithm.
        algorithm: Algorithm,
    },

    /// A member name escapes the extraction directory.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The member path that attempted traversal.
        path: PathBuf,
    },

    /// The operation does not apply to this kind of file.
    #[error("operation '{operation}' is not supported for {kind}")]
    UnsupportedOperation {
        /// Name of the rejected operation.
        operation: &'static str,
        /// Description of the detected file kind.
        kind: String,
    },

    /// The member is of a type that cannot be extracted (links, devices).
    #[error("unsupported entry type for member: {name}")]
    UnsupportedEntry {
        /// The member name.
        name: String,
    },

    /// The source file does not exist.
    #[error("source file not found: {path}")]
    SourceNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// The target path exists and overwriting was not requested.
    #[error("target already exists: {path}")]
    TargetExists {
        /// The existing target path.
        path: PathBuf,
    },

    /// The extraction target exists and is not a directory.
    #[error("not a directory: {path}")]
    NotADirectory {
        /// The offending path.
        path: PathBuf,
    },

    /// A size needed for a ratio is zero.
    #[error("cannot compute compression ratio for {path}: size is zero")]
    ZeroSize {
        /// The file path.
        path: PathBuf,
    },

    /// Archive is corrupted or the backend rejected it.
    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    /// Compression level is outside 1-9.
    #[error("invalid compression level {level}: must be 1-9")]
    InvalidCompressionLevel {
        /// The rejected level.
        level: u8,
    },
}

impl FilePackError {
    /// Returns `true` if this error represents a security violation.
    ///
    /// # Examples
    ///
    /// ```
    /// use filepack_core::FilePackError;
    /// use std::path::PathBuf;
    ///
    /// let err = FilePackError::PathTraversal {
    ///     path: PathBuf::from("../etc/passwd"),
    /// };
    /// assert!(err.is_security_violation());
    ///
    /// let err = FilePackError::MemberNotFound { name: "a.txt".into() };
    /// assert!(!err.is_security_violation());
    /// ```
    #[must_use]
    pub const fn is_security_violation(&self) -> bool {
        matches!(self, Self::PathTraversal { .. })
    }

    /// Returns a context string for this error, if available.
    ///
    /// # Examples
    ///
    /// ```
    /// use filepack_core::FilePackError;
    ///
    /// let err = FilePackError::InvalidArchive("bad header".to_string());
    /// assert_eq!(err.context(), Some("bad header"));
    ///
    /// let err = FilePackError::UnsupportedAlgorithm("zstd".to_string());
    /// assert_eq!(err.context(), Some("zstd"));
    /// ```
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::InvalidArchive(msg) | Self::UnsupportedAlgorithm(msg) => Some(msg),
            Self::MemberNotFound { name }
            | Self::MemberExists { name }
            | Self::UnsupportedEntry { name } => Some(name),
            _ => None,
        }
    }

    pub(crate) fn invalid_archive(what: &str, err: impl std::fmt::Display) -> Self {
        Self::InvalidArchive(format!("{what}: {err}"))
    }
}

impl From<zip::result::ZipError> for FilePackError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(io) => Self::Io(io),
            other => Self::invalid_archive("zip", other),
        }
    }
}

impl From<sevenz_rust2::Error> for FilePackError {
    fn from(err: sevenz_rust2::Error) -> Self {
        Self::invalid_archive("7z", err)
    }
}
