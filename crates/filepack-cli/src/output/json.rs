//! JSON output formatter for machine-readable results.

use super::formatter::CompressionSummary;
use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use super::formatter::SizeInfo;
use anyhow::Result;
use filepack_core::Member;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use std::path::Path;

pub struct JsonFormatter;

#[derive(Debug, Serialize)]
struct MemberOutput {
    name: String,
    size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    compressed_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    modified: Option<String>,
    member_type: &'static str,
}

impl From<&Member> for MemberOutput {
    fn from(member: &Member) -> Self {
        Self {
            name: member.name.clone(),
            size: member.size,
            compressed_size: member.compressed_size,
            modified: member.modified.map(|t| t.to_rfc3339()),
            member_type: member.member_type.as_str(),
        }
    }
}

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_members(&self, path: &Path, members: &[Member]) -> Result<()> {
        #[derive(Serialize)]
        struct ListOutput {
            path: String,
            total_members: usize,
            total_size: u64,
            members: Vec<MemberOutput>,
        }

        let data = ListOutput {
            path: path.display().to_string(),
            total_members: members.len(),
            total_size: members.iter().map(|m| m.size).sum(),
            members: members.iter().map(MemberOutput::from).collect(),
        };

        Self::output(&JsonOutput::success("list", data))
    }

    fn format_added(&self, archive: &Path, name: &str) -> Result<()> {
        #[derive(Serialize)]
        struct AddOutput {
            archive: String,
            member: String,
        }

        let data = AddOutput {
            archive: archive.display().to_string(),
            member: name.to_string(),
        };
        Self::output(&JsonOutput::success("add", data))
    }

    fn format_removed(&self, archive: &Path, name: &str) -> Result<()> {
        #[derive(Serialize)]
        struct RemoveOutput {
            archive: String,
            member: String,
        }

        let data = RemoveOutput {
            archive: archive.display().to_string(),
            member: name.to_string(),
        };
        Self::output(&JsonOutput::success("remove", data))
    }

    fn format_extracted(
        &self,
        archive: &Path,
        output_dir: &Path,
        members: &[Member],
    ) -> Result<()> {
        #[derive(Serialize)]
        struct ExtractOutput {
            archive: String,
            output_dir: String,
            members_extracted: usize,
            bytes_written: u64,
            members: Vec<String>,
        }

        let data = ExtractOutput {
            archive: archive.display().to_string(),
            output_dir: output_dir.display().to_string(),
            members_extracted: members.len(),
            bytes_written: members.iter().map(|m| m.size).sum(),
            members: members.iter().map(|m| m.name.clone()).collect(),
        };
        Self::output(&JsonOutput::success("extract", data))
    }

    fn format_compression(&self, summary: &CompressionSummary) -> Result<()> {
        #[derive(Serialize)]
        struct CompressionOutput {
            source: String,
            target: String,
            algorithm: &'static str,
            source_size: u64,
            target_size: u64,
            in_place: bool,
        }

        let data = CompressionOutput {
            source: summary.source.display().to_string(),
            target: summary.target.display().to_string(),
            algorithm: summary.algorithm.extension(),
            source_size: summary.source_size,
            target_size: summary.target_size,
            in_place: summary.in_place,
        };
        Self::output(&JsonOutput::success(summary.operation, data))
    }

    fn format_info(&self, info: &SizeInfo) -> Result<()> {
        #[derive(Serialize)]
        struct InfoOutput {
            path: String,
            algorithm: &'static str,
            compressed_size: u64,
            uncompressed_size: u64,
            compression_ratio: Option<f64>,
        }

        let data = InfoOutput {
            path: info.path.display().to_string(),
            algorithm: info.algorithm.extension(),
            compressed_size: info.compressed_size,
            uncompressed_size: info.uncompressed_size,
            compression_ratio: info.ratio,
        };
        Self::output(&JsonOutput::success("info", data))
    }

    fn format_warning(&self, message: &str) {
        #[derive(Serialize)]
        struct WarningData {
            message: String,
        }

        let output = JsonOutput::warning(
            "warning",
            WarningData {
                message: message.to_string(),
            },
        );
        let _ = Self::output(&output);
    }
}
