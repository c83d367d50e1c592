//! Add command implementation

use crate::cli::AddArgs;
use crate::error::add_path_context;
use crate::output::OutputFormatter;
use anyhow::Context;
use anyhow::Result;
use filepack_core::FilePack;

pub fn execute(args: &AddArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let pack = add_path_context(FilePack::new(&args.archive), &args.archive)?;

    let name = match &args.name {
        Some(name) => name.clone(),
        None => args
            .file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .with_context(|| format!("'{}' has no file name", args.file.display()))?,
    };

    let result = if args.in_place {
        pack.add_member_in_place(&args.file, Some(&name))
    } else {
        pack.add_member(&args.file, Some(&name))
    };
    add_path_context(result, &args.archive)?;

    formatter.format_added(&args.archive, &name)
}
