//! Error conversion utilities for CLI.
//!
//! Converts filepack-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use filepack_core::FilePackError;
use std::path::Path;

/// Converts `FilePackError` to user-friendly anyhow error with context
pub fn convert_error(err: FilePackError, path: &Path) -> anyhow::Error {
    match err {
        FilePackError::PathTraversal { path: member } => {
            anyhow!(
                "Security violation: Archive '{}' contains a member escaping the target directory: '{}'\n\
                 HINT: This archive may be malicious. Do not extract from untrusted sources.",
                path.display(),
                member.display()
            )
        }
        FilePackError::UnsupportedFormat { .. } => {
            anyhow!(
                "Format not supported: {}\n\
                 HINT: Supported archives: tar, zip, 7z, optionally compressed with gz, bz2, lz4 or xz \
                 (e.g. .tar.gz, .tgz, .zip.xz). Other existing files can be compressed.",
                path.display()
            )
        }
        FilePackError::MemberNotFound { name } => {
            anyhow!(
                "No member named '{name}' in '{}'\n\
                 HINT: Run 'filepack list {}' to see the stored names.",
                path.display(),
                path.display()
            )
        }
        FilePackError::MemberExists { name } => {
            anyhow!(
                "'{}' already contains a member named '{name}'\n\
                 HINT: Remove it first or use --name to store the file under another name.",
                path.display()
            )
        }
        FilePackError::NotCompressed { algorithm, .. } => {
            anyhow!(
                "'{}' is not {algorithm} compressed\n\
                 HINT: Check the algorithm passed with --algorithm.",
                path.display()
            )
        }
        FilePackError::AlreadyCompressed { algorithm, .. } => {
            anyhow!("'{}' is already {algorithm} compressed", path.display())
        }
        FilePackError::TargetExists { path: target } => {
            anyhow!(
                "Output file already exists: {}\n\
                 HINT: Use --force to overwrite it or --output to choose another path.",
                target.display()
            )
        }
        FilePackError::SourceNotFound { path: source } => {
            anyhow!("File not found: {}", source.display())
        }
        FilePackError::UnsupportedOperation { operation, kind } => {
            anyhow!(
                "Cannot run '{operation}' on '{}' ({kind})\n\
                 HINT: Member commands need an archive; compression commands need a file that is not a plain archive.",
                path.display()
            )
        }
        FilePackError::UnsupportedEntry { name } => {
            anyhow!(
                "Member '{name}' in '{}' is a link or special file and cannot be extracted",
                path.display()
            )
        }
        FilePackError::InvalidArchive(reason) => {
            anyhow!(
                "Invalid archive '{}': {}\n\
                 HINT: The archive may be corrupted or malformed.",
                path.display(),
                reason
            )
        }
        FilePackError::Io(io_err) => {
            anyhow!("I/O error while processing '{}': {}", path.display(), io_err)
        }
        _ => anyhow::Error::from(err).context(format!("Error processing '{}'", path.display())),
    }
}

/// Adds context to a library result about the file being processed
pub fn add_path_context<T>(
    result: Result<T, FilePackError>,
    path: &Path,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_error(e, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use filepack_core::Algorithm;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn test_convert_path_traversal_error() {
        let err = FilePackError::PathTraversal {
            path: PathBuf::from("../evil.txt"),
        };
        let converted = convert_error(err, Path::new("malicious.zip"));
        let msg = format!("{converted:?}");
        assert!(msg.contains("escaping the target directory"));
        assert!(msg.contains("malicious.zip"));
        assert!(msg.contains("HINT"));
    }

    #[test]
    fn test_convert_target_exists_error() {
        let err = FilePackError::TargetExists {
            path: PathBuf::from("notes.txt.gz"),
        };
        let msg = format!("{:?}", convert_error(err, Path::new("notes.txt")));
        assert!(msg.contains("notes.txt.gz"));
        assert!(msg.contains("--force"));
    }

    #[test]
    fn test_convert_not_compressed_error() {
        let err = FilePackError::NotCompressed {
            path: PathBuf::from("plain.gz"),
            algorithm: Algorithm::Gzip,
        };
        let msg = format!("{:?}", convert_error(err, Path::new("plain.gz")));
        assert!(msg.contains("not gz compressed"));
    }

    #[test]
    fn test_convert_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err = FilePackError::Io(io_err);
        let converted = convert_error(err, Path::new("archive.tar.gz"));
        let msg = format!("{converted:?}");
        assert!(msg.contains("I/O error"));
    }

    #[test]
    fn test_other_errors_keep_context() {
        let err = FilePackError::ZeroSize {
            path: PathBuf::from("empty.gz"),
        };
        let msg = format!("{:?}", convert_error(err, Path::new("empty.gz")));
        assert!(msg.contains("Error processing 'empty.gz'"));
    }
}
