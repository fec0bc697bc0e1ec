//! Parsing of alterations given on the command line.

use std::io::Write;

use clap::Parser;

use crate::alteration::dispatch::parse_alteration;
use crate::alteration::ProteinChangeParser;
use crate::common::ParserArgs;

/// Output format of the `parse` sub command.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

/// Command line arguments for `parse` sub command.
#[derive(Parser, Debug)]
#[command(about = "Parse alterations and print the result", long_about = None)]
pub struct Args {
    /// The alterations to parse.
    #[arg(required = true)]
    pub alterations: Vec<String>,
    /// The output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
    /// Treat each input as a protein change, skipping alteration type detection.
    #[arg(long, default_value_t = false)]
    pub protein_change_only: bool,

    #[command(flatten)]
    pub parser: ParserArgs,
}

fn write_records<T, W>(
    writer: &mut W,
    records: &T,
    format: OutputFormat,
) -> Result<(), anyhow::Error>
where
    T: serde::Serialize,
    W: Write,
{
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, records)?;
            writeln!(writer)?;
        }
        OutputFormat::Yaml => serde_yaml::to_writer(&mut *writer, records)?,
    }
    Ok(())
}

/// Parse `alterations` and write the results to `writer`.
pub fn parse_to_writer<S, W>(
    parser: &ProteinChangeParser,
    alterations: &[S],
    protein_change_only: bool,
    format: OutputFormat,
    writer: &mut W,
) -> Result<(), anyhow::Error>
where
    S: AsRef<str>,
    W: Write,
{
    if protein_change_only {
        let records = alterations
            .iter()
            .map(|s| parser.parse(s.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        write_records(writer, &records, format)
    } else {
        let records = alterations
            .iter()
            .map(|s| parse_alteration(parser, s.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        write_records(writer, &records, format)
    }
}

/// Main entry point for `parse` sub command.
pub fn run(_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::debug!("args = {:#?}", &args);

    let parser = args.parser.build_parser()?;
    let stdout = std::io::stdout();
    let mut writer = stdout.lock();
    parse_to_writer(
        &parser,
        &args.alterations,
        args.protein_change_only,
        args.format,
        &mut writer,
    )?;
    writer.flush()?;

    Ok(())
}
