//! Remove command implementation

use crate::cli::RemoveArgs;
use crate::error::add_path_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use filepack_core::FilePack;

pub fn execute(args: &RemoveArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let pack = add_path_context(FilePack::new(&args.archive), &args.archive)?;
    add_path_context(pack.remove_member(&args.name), &args.archive)?;

    formatter.format_removed(&args.archive, &args.name)
}
