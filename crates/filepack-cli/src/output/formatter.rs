//! Output formatter trait for CLI results.

use anyhow::Result;
use filepack_core::Algorithm;
use filepack_core::Member;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;

/// Outcome of a compress or decompress command.
#[derive(Debug)]
pub struct CompressionSummary {
    /// `compress` or `decompress`.
    pub operation: &'static str,
    pub source: PathBuf,
    pub target: PathBuf,
    pub algorithm: Algorithm,
    pub source_size: u64,
    pub target_size: u64,
    /// Whether the source file was removed.
    pub in_place: bool,
}

/// Sizes reported by the info command.
#[derive(Debug)]
pub struct SizeInfo {
    pub path: PathBuf,
    pub algorithm: Algorithm,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    /// `None` when either size is zero.
    pub ratio: Option<f64>,
}

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format an archive listing
    fn format_members(&self, path: &Path, members: &[Member]) -> Result<()>;

    /// Format the result of adding a member
    fn format_added(&self, archive: &Path, name: &str) -> Result<()>;

    /// Format the result of removing a member
    fn format_removed(&self, archive: &Path, name: &str) -> Result<()>;

    /// Format the result of an extraction; `members` are the ones written
    fn format_extracted(&self, archive: &Path, output_dir: &Path, members: &[Member])
    -> Result<()>;

    /// Format the result of a compress or decompress command
    fn format_compression(&self, summary: &CompressionSummary) -> Result<()>;

    /// Format size information
    fn format_info(&self, info: &SizeInfo) -> Result<()>;

    /// Format warning message
    fn format_warning(&self, message: &str);
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Warning,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
        }
    }

    pub fn warning(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Warning,
            data: Some(data),
        }
    }
}
