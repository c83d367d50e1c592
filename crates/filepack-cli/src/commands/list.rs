//! List command implementation

use crate::cli::ListArgs;
use crate::error::add_path_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use filepack_core::FilePack;

pub fn execute(args: &ListArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let pack = add_path_context(FilePack::new(&args.path), &args.path)?;
    let members = add_path_context(pack.get_members(), &args.path)?;

    formatter.format_members(&args.path, &members)
}
