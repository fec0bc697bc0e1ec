//! Main entry point for the oncokb-curation CLI.

use clap::{command, Args, Parser, Subcommand};

use oncokb_curation::{batch, common, parse, verify};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Parsing of curated cancer alterations"
)]
struct Cli {
    /// Commonly used arguments
    #[command(flatten)]
    common: common::Args,

    /// The sub command to run
    #[command(subcommand)]
    command: Commands,
}

/// Enum supporting the parsing of top-level commands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Parse alterations given on the command line.
    Parse(parse::Args),
    /// Parse alterations from a file.
    Batch(batch::Args),
    /// Verification related commands.
    Verify(Verify),
}

/// Parsing of "verify *" sub commands.
#[derive(Debug, Args)]
#[command(args_conflicts_with_subcommands = true)]
struct Verify {
    /// The sub command to run
    #[command(subcommand)]
    command: VerifyCommands,
}

/// Enum supporting the parsing of "verify *" sub commands.
#[derive(Debug, Subcommand)]
enum VerifyCommands {
    ProteinChanges(verify::protein_changes::Args),
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Build a tracing subscriber according to the configuration in `cli.common`.
    let collector = tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_max_level(match cli.common.verbose.log_level() {
            Some(level) => match level {
                log::Level::Error => tracing::Level::ERROR,
                log::Level::Warn => tracing::Level::WARN,
                log::Level::Info => tracing::Level::INFO,
                log::Level::Debug => tracing::Level::DEBUG,
                log::Level::Trace => tracing::Level::TRACE,
            },
            None => tracing::Level::INFO,
        })
        .compact()
        .finish();

    // Install collector and go into sub commands.
    tracing::subscriber::with_default(collector, || {
        tracing::info!(
            "oncokb-curation {} startup -- reading the fine print...",
            common::version()
        );

        match &cli.command {
            Commands::Parse(args) => parse::run(&cli.common, args)?,
            Commands::Batch(args) => batch::run(&cli.common, args)?,
            Commands::Verify(verify) => match &verify.command {
                VerifyCommands::ProteinChanges(args) => {
                    verify::protein_changes::run(&cli.common, args)?
                }
            },
        }

        tracing::info!("All done. Have a nice day!");

        Ok::<(), anyhow::Error>(())
    })?;

    Ok(())
}
