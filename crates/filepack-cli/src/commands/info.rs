//! Info command implementation

use crate::cli::InfoArgs;
use crate::error::add_path_context;
use crate::output::OutputFormatter;
use crate::output::SizeInfo;
use anyhow::Result;
use filepack_core::Compression;
use filepack_core::FilePackError;

pub fn execute(args: &InfoArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let file = add_path_context(Compression::new(&args.file), &args.file)?;

    let compressed_size = add_path_context(file.compressed_size(args.algorithm), &args.file)?;
    let uncompressed_size = add_path_context(file.uncompressed_size(args.algorithm), &args.file)?;
    let ratio = match file.compression_ratio(args.algorithm) {
        Ok(ratio) => Some(ratio),
        Err(FilePackError::ZeroSize { .. }) => None,
        Err(err) => return Err(crate::error::convert_error(err, &args.file)),
    };

    formatter.format_info(&SizeInfo {
        path: args.file.clone(),
        algorithm: args.algorithm,
        compressed_size,
        uncompressed_size,
        ratio,
    })
}
