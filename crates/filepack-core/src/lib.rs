//! One interface over archive containers and single-stream compression.
//!
//! `filepack-core` adds, removes and extracts archive members (tar, zip, 7z)
//! and compresses or decompresses whole files (gzip, bzip2, lz4, xz) without
//! format-specific APIs. Formats are detected from the path's suffix chain,
//! so `backup.tar.gz` is handled as a gzip-compressed tar archive.
//!
//! Three handles are provided:
//!
//! - [`Archive`] for member operations on a `.tar`, `.zip` or `.7z` file
//! - [`Compression`] for whole-file compression of any file
//! - [`FilePack`], which detects the kind of a path and dispatches to either
//!
//! Extraction rejects member names that would escape the target directory.
//!
//! # Examples
//!
//! ```no_run
//! use filepack_core::{Algorithm, CompressOptions, FilePack};
//!
//! # fn main() -> Result<(), filepack_core::FilePackError> {
//! let pack = FilePack::new("backup.tar.gz")?;
//! pack.add_member("report.pdf", None)?;
//! for member in pack.get_members()? {
//!     println!("{} {}", member.name, member.size);
//! }
//! pack.extract_all("/tmp/restore")?;
//!
//! let mut notes = FilePack::new("notes.txt")?;
//! notes.compress(Algorithm::Gzip, &CompressOptions::default().with_in_place(true))?;
//! println!("ratio {:.2}", notes.compression_ratio(Algorithm::Gzip)?);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod archive;
pub mod codec;
pub mod compression;
pub mod config;
pub mod error;
pub mod filepack;
pub mod formats;
pub mod member;
pub mod types;

#[doc(hidden)]
pub mod test_utils;

// Re-export main API types
pub use archive::Archive;
pub use compression::Compression;
pub use config::CompressOptions;
pub use error::FilePackError;
pub use error::Result;
pub use filepack::FilePack;
pub use formats::Algorithm;
pub use formats::ArchiveFormat;
pub use formats::PackKind;
pub use member::Member;
pub use member::MemberType;
