//! filepack CLI - Command-line utility for managing archives and compressed
//! files.

mod cli;
mod commands;
mod error;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Installs the log subscriber on stderr.
///
/// `RUST_LOG` wins when set; otherwise `-v` enables debug logs and the
/// default only reports warnings.
fn setup_logging(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else if quiet {
            EnvFilter::new("error")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);

    match &cli.command {
        cli::Commands::List(args) => commands::list::execute(args, &*formatter),
        cli::Commands::Add(args) => commands::add::execute(args, &*formatter),
        cli::Commands::Remove(args) => commands::remove::execute(args, &*formatter),
        cli::Commands::Extract(args) => commands::extract::execute(args, &*formatter),
        cli::Commands::Compress(args) => commands::compress::execute_compress(args, &*formatter),
        cli::Commands::Decompress(args) => {
            commands::compress::execute_decompress(args, &*formatter)
        }
        cli::Commands::Info(args) => commands::info::execute(args, &*formatter),
        cli::Commands::Completion(args) => {
            commands::completion::execute(args.shell);
            Ok(())
        }
    }
}
