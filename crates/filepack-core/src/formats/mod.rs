//! Archive format backends and compression algorithm detection.

pub mod common;
pub mod compression;
pub mod detect;
pub mod sevenz;
pub mod tar;
pub mod traits;
pub mod zip;

// Re-export main types for convenience
pub use compression::Algorithm;
pub use detect::ArchiveFormat;
pub use detect::PackKind;
pub use sevenz::SevenZipBackend;
pub use tar::TarBackend;
pub use traits::ArchiveBackend;
pub use traits::backend_for;
pub use zip::ZipBackend;
