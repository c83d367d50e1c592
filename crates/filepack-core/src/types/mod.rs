//! Validated path types for extraction.
//!
//! Member names come from archive headers and are untrusted. These newtypes
//! are validated upon construction and cannot be created from raw paths
//! without going through validation.

pub mod dest_dir;
pub mod safe_path;

pub use dest_dir::DestDir;
pub use safe_path::SafePath;
