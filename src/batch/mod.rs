//! Bulk parsing of alterations from a text file.

use std::io::{BufRead, Write};

use clap::Parser;
use itertools::Itertools;
use rayon::prelude::*;

use crate::alteration::dispatch::{parse_alteration, Alteration};
use crate::alteration::{ParseStatus, ProteinChangeParser};
use crate::common::{
    io::{open_read_maybe_gz, open_write_maybe_gz},
    ParserArgs,
};

/// Command line arguments for `batch` sub command.
#[derive(Parser, Debug)]
#[command(about = "Parse alterations from a text file, one per line", long_about = None)]
pub struct Args {
    /// Path to the input file, may be gzip compressed.
    #[arg(long)]
    pub path_input: String,
    /// Path to the output TSV file, gzip compressed if ending in `.gz`.
    #[arg(long)]
    pub path_output_tsv: String,
    /// Optional path to write inputs that could not be parsed to.
    #[arg(long)]
    pub path_rejected: Option<String>,

    #[command(flatten)]
    pub parser: ParserArgs,
}

/// Header of the output TSV file.
pub const HEADER: &[&str] = &[
    "input",
    "status",
    "alteration_type",
    "alteration",
    "name",
    "consequence",
    "notation_kind",
    "protein_start",
    "protein_end",
    "ref_residues",
    "variant_residues",
    "excluding",
    "message",
];

/// Read the alterations from `reader`, skipping blank lines and `#` comments.
pub fn read_alterations<R: BufRead>(reader: R) -> Result<Vec<String>, anyhow::Error> {
    let mut result = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        result.push(trimmed.to_string());
    }
    Ok(result)
}

/// Parse all alterations in parallel, the order of the input is kept.
///
/// Blank alterations yield `None`.
pub fn parse_all<S: AsRef<str> + Sync>(
    parser: &ProteinChangeParser,
    alterations: &[S],
) -> Result<Vec<Option<ParseStatus<Alteration>>>, anyhow::Error> {
    alterations
        .par_iter()
        .map(|s| parse_alteration(parser, s.as_ref()))
        .collect()
}

fn or_empty<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Convert one result into the columns of [`HEADER`].
pub fn to_row(input: &str, status: &ParseStatus<Alteration>) -> Vec<String> {
    let alteration = &status.entity;
    let protein_change = alteration.protein_change.as_ref();
    vec![
        input.to_string(),
        status.status_type.to_string(),
        alteration.alteration_type.to_string(),
        alteration.alteration.clone(),
        alteration.name.clone(),
        or_empty(alteration.consequence.as_deref()),
        or_empty(protein_change.and_then(|p| p.notation_kind)),
        or_empty(protein_change.and_then(|p| p.protein_start)),
        or_empty(protein_change.and_then(|p| p.protein_end)),
        or_empty(protein_change.and_then(|p| p.ref_residues.as_deref())),
        or_empty(protein_change.and_then(|p| p.variant_residues.as_deref())),
        or_empty(protein_change.and_then(|p| p.excluding.as_deref())),
        or_empty(status.message.as_deref()),
    ]
}

/// Main entry point for `batch` sub command.
pub fn run(_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("args = {:#?}", &args);

    let parser = args.parser.build_parser()?;

    tracing::info!("Reading alterations...");
    let alterations = read_alterations(open_read_maybe_gz(&args.path_input)?)?;
    tracing::info!("... done reading {} alterations", alterations.len());

    tracing::info!("Parsing alterations...");
    let before_parsing = std::time::Instant::now();
    let results = parse_all(&parser, &alterations)?;
    tracing::info!(
        "... done parsing in {:?}",
        std::time::Instant::now() - before_parsing
    );

    let mut writer = open_write_maybe_gz(&args.path_output_tsv)?;
    writeln!(writer, "{}", HEADER.join("\t"))?;
    let mut rejected = args
        .path_rejected
        .as_ref()
        .map(open_write_maybe_gz)
        .transpose()?;

    let counts = results
        .iter()
        .flatten()
        .map(|status| status.status_type)
        .counts();
    for (input, status) in alterations.iter().zip(results.iter()) {
        let Some(status) = status else {
            continue;
        };
        writeln!(writer, "{}", to_row(input, status).join("\t"))?;
        if status.is_error() {
            if let Some(rejected) = rejected.as_mut() {
                writeln!(
                    rejected,
                    "{}\t{}",
                    input,
                    status.message.as_deref().unwrap_or_default()
                )?;
            }
        }
    }
    writer.flush()?;
    if let Some(rejected) = rejected.as_mut() {
        rejected.flush()?;
    }

    tracing::info!(
        "Status counts: {}",
        counts
            .iter()
            .sorted()
            .map(|(status_type, count)| format!("{}={}", status_type, count))
            .join(", ")
    );

    Ok(())
}
