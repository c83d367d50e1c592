//! Compress and decompress command implementations.
//!
//! Both work on any file through `Compression`, including plain archives
//! such as `backup.tar`.

use crate::cli::CompressArgs;
use crate::cli::DecompressArgs;
use crate::error::add_path_context;
use crate::output::CompressionSummary;
use crate::output::OutputFormatter;
use anyhow::Context;
use anyhow::Result;
use filepack_core::CompressOptions;
use filepack_core::Compression;
use std::fs;
use std::path::Path;

fn options(output: Option<&Path>, in_place: bool, force: bool) -> CompressOptions {
    let options = CompressOptions::new()
        .with_in_place(in_place)
        .with_overwrite(force);
    match output {
        Some(path) => options.with_target_path(path),
        None => options,
    }
}

fn file_size(path: &Path) -> Result<u64> {
    Ok(fs::metadata(path)
        .with_context(|| format!("failed to read metadata of '{}'", path.display()))?
        .len())
}

pub fn execute_compress(args: &CompressArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let mut file = add_path_context(Compression::new(&args.file), &args.file)?;
    let source_size = file_size(&args.file)?;

    let mut options = options(args.output.as_deref(), args.in_place, args.force);
    if let Some(level) = args.level {
        options = options.with_compression_level(level);
    }

    let target = add_path_context(file.compress(args.algorithm, &options), &args.file)?;

    formatter.format_compression(&CompressionSummary {
        operation: "compress",
        source: args.file.clone(),
        target_size: file_size(&target)?,
        target,
        algorithm: args.algorithm,
        source_size,
        in_place: args.in_place,
    })
}

pub fn execute_decompress(args: &DecompressArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let mut file = add_path_context(Compression::new(&args.file), &args.file)?;
    let source_size = file_size(&args.file)?;

    let options = options(args.output.as_deref(), args.in_place, args.force);
    let target = add_path_context(file.decompress(args.algorithm, &options), &args.file)?;

    formatter.format_compression(&CompressionSummary {
        operation: "decompress",
        source: args.file.clone(),
        target_size: file_size(&target)?,
        target,
        algorithm: args.algorithm,
        source_size,
        in_place: args.in_place,
    })
}
