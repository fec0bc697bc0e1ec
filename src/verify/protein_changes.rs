//! Verification of protein change parsing against a fixture table.
//!
//! The fixture is a headerless TSV file with the columns protein change,
//! expected consequence term, expected reference residues, expected variant
//! residues, expected protein start, and expected protein end.  Trailing
//! columns may be omitted and lines starting with `#` are ignored.

use std::{io::Write, path::Path};

use clap::Parser;

use crate::alteration::{ParsedAlteration, ProteinChangeParser};
use crate::common::{io::open_write_maybe_gz, ParserArgs};

/// Command line arguments for `verify protein-changes` sub command.
#[derive(Parser, Debug)]
#[command(about = "Verify protein change parsing against a fixture TSV", long_about = None)]
pub struct Args {
    /// Path to the fixture TSV file.
    #[arg(long)]
    pub path_input_tsv: String,
    /// Path to the output TSV file.
    #[arg(long)]
    pub path_output_tsv: String,
    /// Exit with an error if any record does not match.
    #[arg(long, default_value_t = false)]
    pub fail_on_mismatch: bool,

    #[command(flatten)]
    pub parser: ParserArgs,
}

/// One row of the fixture table.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct FixtureRecord {
    pub protein_change: String,
    pub expected_consequence: String,
    pub expected_ref: String,
    pub expected_var: String,
    pub expected_start: String,
    pub expected_end: String,
}

impl FixtureRecord {
    /// Load all records from the TSV file at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<Self>, anyhow::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .comment(Some(b'#'))
            .has_headers(false)
            .flexible(true)
            .from_path(path.as_ref())
            .map_err(|e| {
                anyhow::anyhow!("could not open {}: {}", path.as_ref().display(), e)
            })?;

        reader
            .deserialize()
            .collect::<Result<Vec<Self>, _>>()
            .map_err(|e| anyhow::anyhow!("problem reading fixture record: {}", e))
    }
}

/// Outcome of checking one fixture record.
#[derive(Debug, Clone)]
pub struct Verdict {
    pub record: FixtureRecord,
    pub actual: ParsedAlteration,
    /// Names of the columns that did not match.
    pub mismatches: Vec<&'static str>,
}

impl Verdict {
    pub fn is_ok(&self) -> bool {
        self.mismatches.is_empty()
    }
}

fn or_empty<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Parse the record's protein change and compare it with the expectations.
pub fn verify_record(
    parser: &ProteinChangeParser,
    record: &FixtureRecord,
) -> Result<Verdict, anyhow::Error> {
    let actual = parser.parse(&record.protein_change)?.entity;

    let columns = [
        (
            "consequence",
            &record.expected_consequence,
            or_empty(actual.consequence_term()),
        ),
        ("ref", &record.expected_ref, or_empty(actual.ref_residues.as_deref())),
        (
            "var",
            &record.expected_var,
            or_empty(actual.variant_residues.as_deref()),
        ),
        ("start", &record.expected_start, or_empty(actual.protein_start)),
        ("end", &record.expected_end, or_empty(actual.protein_end)),
    ];
    let mismatches = columns
        .into_iter()
        .filter(|(name, expected, actual)| {
            // Consequence terms are case-insensitive, residues are not.
            if *name == "consequence" {
                !expected.trim().eq_ignore_ascii_case(actual)
            } else {
                expected.trim() != actual
            }
        })
        .map(|(name, _, _)| name)
        .collect();

    Ok(Verdict {
        record: record.clone(),
        actual,
        mismatches,
    })
}

fn write_verdict(writer: &mut dyn Write, verdict: &Verdict) -> Result<(), anyhow::Error> {
    let actual = &verdict.actual;
    writeln!(
        writer,
        "{}",
        [
            if verdict.is_ok() { "OK" } else { "mismatch" }.to_string(),
            verdict.record.protein_change.clone(),
            actual.normalized_notation.clone(),
            or_empty(actual.notation_kind),
            verdict.record.expected_consequence.clone(),
            or_empty(actual.consequence_term()),
            verdict.record.expected_ref.clone(),
            or_empty(actual.ref_residues.as_deref()),
            verdict.record.expected_var.clone(),
            or_empty(actual.variant_residues.as_deref()),
            verdict.record.expected_start.clone(),
            or_empty(actual.protein_start),
            verdict.record.expected_end.clone(),
            or_empty(actual.protein_end),
            verdict.mismatches.join(","),
        ]
        .join("\t")
    )?;
    Ok(())
}

/// Main entry point for `verify protein-changes` sub command.
pub fn run(_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("args = {:#?}", &args);

    let parser = args.parser.build_parser()?;

    tracing::info!("Loading fixture records...");
    let records = FixtureRecord::load(&args.path_input_tsv)?;
    tracing::info!("... done loading {} records", records.len());

    let mut writer = open_write_maybe_gz(&args.path_output_tsv)?;
    writeln!(
        writer,
        "{}",
        [
            "result",
            "protein_change",
            "normalized_notation",
            "notation_kind",
            "expected_consequence",
            "actual_consequence",
            "expected_ref",
            "actual_ref",
            "expected_var",
            "actual_var",
            "expected_start",
            "actual_start",
            "expected_end",
            "actual_end",
            "mismatched_columns",
        ]
        .join("\t")
    )?;

    let mut count_ok = 0usize;
    let mut count_mismatch = 0usize;
    for record in &records {
        let verdict = verify_record(&parser, record)?;
        if verdict.is_ok() {
            count_ok += 1;
        } else {
            count_mismatch += 1;
            tracing::warn!(
                "mismatch for {:?} in columns {}",
                &record.protein_change,
                verdict.mismatches.join(", ")
            );
        }
        write_verdict(&mut writer, &verdict)?;
    }
    writer.flush()?;

    tracing::info!(
        "Verified {} records: {} OK, {} mismatch",
        records.len(),
        count_ok,
        count_mismatch
    );

    if args.fail_on_mismatch && count_mismatch > 0 {
        anyhow::bail!("{} of {} records did not match", count_mismatch, records.len());
    }

    Ok(())
}
