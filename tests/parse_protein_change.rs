//! Checks protein change parsing against the fixture table.

use oncokb_curation::alteration::ProteinChangeParser;
use oncokb_curation::verify::protein_changes::{verify_record, FixtureRecord};

const PATH_FIXTURE: &str = "tests/data/test_parse_protein_change.tsv";

#[test]
fn fixture_records_match() -> Result<(), anyhow::Error> {
    let parser = ProteinChangeParser::default();
    let records = FixtureRecord::load(PATH_FIXTURE)?;
    assert!(records.len() > 40);

    let failures = records
        .iter()
        .map(|record| verify_record(&parser, record))
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .filter(|verdict| !verdict.is_ok())
        .map(|verdict| {
            format!(
                "{:?}: mismatch in {:?}, got {:?}",
                verdict.record.protein_change, verdict.mismatches, verdict.actual
            )
        })
        .collect::<Vec<_>>();

    assert!(failures.is_empty(), "{}", failures.join("\n"));

    Ok(())
}

#[test]
fn fixture_records_are_stable_under_reparse() -> Result<(), anyhow::Error> {
    let parser = ProteinChangeParser::default();

    for record in FixtureRecord::load(PATH_FIXTURE)? {
        let first = parser.parse(&record.protein_change)?;
        if first.is_error() {
            continue;
        }
        let second = parser.parse(&first.entity.normalized_notation)?;

        pretty_assertions::assert_eq!(
            second.entity.normalized_notation,
            first.entity.normalized_notation
        );
        pretty_assertions::assert_eq!(second.entity.notation_kind, first.entity.notation_kind);
        pretty_assertions::assert_eq!(second.entity.protein_start, first.entity.protein_start);
        pretty_assertions::assert_eq!(second.entity.protein_end, first.entity.protein_end);
        pretty_assertions::assert_eq!(second.entity.consequence, first.entity.consequence);
    }

    Ok(())
}
