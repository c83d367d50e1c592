//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::error::add_path_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use filepack_core::FilePack;
use filepack_core::Member;

pub fn execute(args: &ExtractArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let pack = add_path_context(FilePack::new(&args.archive), &args.archive)?;

    let extracted: Vec<Member> = if let Some(name) = &args.member {
        let member = add_path_context(pack.get_member(name), &args.archive)?;
        let result = if args.in_place {
            pack.extract_member_in_place(name, &args.output_dir)
        } else {
            pack.extract_member(name, &args.output_dir)
        };
        add_path_context(result, &args.archive)?;
        vec![member]
    } else {
        let members = add_path_context(pack.get_members(), &args.archive)?;
        let result = if args.in_place {
            pack.extract_all_in_place(&args.output_dir)
        } else {
            pack.extract_all(&args.output_dir)
        };
        add_path_context(result, &args.archive)?;

        let (written, skipped): (Vec<_>, Vec<_>) = members
            .into_iter()
            .partition(|m| m.member_type.is_extractable());
        if !skipped.is_empty() {
            formatter.format_warning(&format!(
                "skipped {} link or special entries",
                skipped.len()
            ));
        }
        written
    };

    formatter.format_extracted(&args.archive, &args.output_dir, &extracted)
}
