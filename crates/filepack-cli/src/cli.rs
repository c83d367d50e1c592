//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use filepack_core::Algorithm;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "filepack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output and debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List archive members
    List(ListArgs),
    /// Add a file to an archive
    Add(AddArgs),
    /// Remove a member from an archive
    Remove(RemoveArgs),
    /// Extract archive members
    Extract(ExtractArgs),
    /// Compress a file
    Compress(CompressArgs),
    /// Decompress a file
    Decompress(DecompressArgs),
    /// Show compressed and uncompressed sizes
    Info(InfoArgs),
    /// Generate shell completions
    Completion(CompletionArgs),
}

#[derive(clap::Args)]
pub struct ListArgs {
    /// Path to the archive (compressed archives such as .tar.gz are accepted)
    #[arg(value_name = "PATH")]
    pub path: PathBuf,
}

#[derive(clap::Args)]
pub struct AddArgs {
    /// Path to the archive; created if missing
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// File to add
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Member name inside the archive (default: the file's base name)
    #[arg(short, long, value_name = "NAME")]
    pub name: Option<String>,

    /// Delete the source file once added
    #[arg(long)]
    pub in_place: bool,
}

#[derive(clap::Args)]
pub struct RemoveArgs {
    /// Path to the archive
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Member name to remove
    #[arg(value_name = "NAME")]
    pub name: String,
}

#[derive(clap::Args)]
pub struct ExtractArgs {
    /// Path to the archive
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Output directory; created if missing
    #[arg(value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Extract only this member
    #[arg(short, long, value_name = "NAME")]
    pub member: Option<String>,

    /// Remove what was extracted from the archive (or the archive itself)
    #[arg(long)]
    pub in_place: bool,
}

#[derive(clap::Args)]
pub struct CompressArgs {
    /// File to compress
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Compression algorithm (gz, bz2, lz4, xz)
    #[arg(short, long, value_parser = parse_algorithm)]
    pub algorithm: Algorithm,

    /// Output path (default: FILE with the algorithm suffix appended)
    #[arg(short, long, value_name = "OUT")]
    pub output: Option<PathBuf>,

    /// Remove the source file once compressed
    #[arg(long)]
    pub in_place: bool,

    /// Overwrite the output file if it exists
    #[arg(short = 'f', long)]
    pub force: bool,

    /// Compression level (1-9)
    #[arg(short = 'l', long, value_parser = clap::value_parser!(u8).range(1..=9))]
    pub level: Option<u8>,
}

#[derive(clap::Args)]
pub struct DecompressArgs {
    /// File to decompress
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Compression algorithm (gz, bz2, lz4, xz)
    #[arg(short, long, value_parser = parse_algorithm)]
    pub algorithm: Algorithm,

    /// Output path (default: FILE without the algorithm suffix)
    #[arg(short, long, value_name = "OUT")]
    pub output: Option<PathBuf>,

    /// Remove the compressed file once decompressed
    #[arg(long)]
    pub in_place: bool,

    /// Overwrite the output file if it exists
    #[arg(short = 'f', long)]
    pub force: bool,
}

#[derive(clap::Args)]
pub struct InfoArgs {
    /// Compressed file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Compression algorithm (gz, bz2, lz4, xz)
    #[arg(short, long, value_parser = parse_algorithm)]
    pub algorithm: Algorithm,
}

#[derive(clap::Args)]
pub struct CompletionArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

fn parse_algorithm(s: &str) -> Result<Algorithm, String> {
    s.parse::<Algorithm>().map_err(|e| e.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_algorithm() {
        assert_eq!(parse_algorithm("gz").unwrap(), Algorithm::Gzip);
        assert_eq!(parse_algorithm("bzip2").unwrap(), Algorithm::Bz2);
        assert!(parse_algorithm("zstd").unwrap_err().contains("zstd"));
    }

    #[test]
    fn test_compress_args() {
        let cli = Cli::try_parse_from([
            "filepack", "compress", "notes.txt", "-a", "xz", "-l", "9", "--in-place",
        ])
        .unwrap();
        let Commands::Compress(args) = cli.command else {
            panic!("expected compress");
        };
        assert_eq!(args.algorithm, Algorithm::Xz);
        assert_eq!(args.level, Some(9));
        assert!(args.in_place);
        assert!(!args.force);
    }

    #[test]
    fn test_level_out_of_range() {
        let result = Cli::try_parse_from(["filepack", "compress", "f", "-a", "gz", "-l", "0"]);
        assert!(result.is_err());
    }
}
