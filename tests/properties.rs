//! Property-based tests for protein change parsing.

use oncokb_curation::alteration::{Diagnostic, ProteinChangeParser, StatusType};
use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;

/// One of the twenty standard amino acids.
fn residue() -> impl Strategy<Value = char> {
    prop::sample::select("ACDEFGHIKLMNPQRSTVWY".chars().collect::<Vec<_>>())
}

fn residues() -> impl Strategy<Value = String> {
    prop::collection::vec(residue(), 1..6).prop_map(|v| v.into_iter().collect())
}

fn position() -> impl Strategy<Value = u32> {
    1..5000u32
}

fn substitution() -> impl Strategy<Value = String> {
    (residue(), position(), residue()).prop_map(|(r, p, v)| format!("{}{}{}", r, p, v))
}

fn deletion() -> impl Strategy<Value = String> {
    (residue(), position(), residue(), 0..50u32)
        .prop_map(|(r1, p, r2, d)| format!("{}{}_{}{}del", r1, p, r2, p + d))
}

fn deletion_insertion() -> impl Strategy<Value = String> {
    (residue(), position(), residues()).prop_map(|(r, p, v)| format!("{}{}delins{}", r, p, v))
}

fn insertion() -> impl Strategy<Value = String> {
    (residue(), position(), residue(), residues())
        .prop_map(|(r1, p, r2, v)| format!("{}{}_{}{}ins{}", r1, p, r2, p + 1, v))
}

fn duplication() -> impl Strategy<Value = String> {
    (residue(), position()).prop_map(|(r, p)| format!("{}{}dup", r, p))
}

fn frameshift() -> impl Strategy<Value = String> {
    (residue(), position(), residue(), 1..100u32)
        .prop_map(|(r, p, v, n)| format!("{}{}{}fs*{}", r, p, v, n))
}

fn range() -> impl Strategy<Value = String> {
    (position(), position(), prop_oneof![Just(""), Just("mis"), Just("trunc")])
        .prop_map(|(a, b, suffix)| format!("{}_{}{}", a, b, suffix))
}

fn any_notation() -> impl Strategy<Value = String> {
    prop_oneof![
        substitution(),
        deletion(),
        deletion_insertion(),
        insertion(),
        duplication(),
        frameshift(),
        range(),
    ]
}

/// A notation together with a random upper/lower case mix of it.
fn mixed_case_notation() -> impl Strategy<Value = (String, String)> {
    (any_notation(), prop::collection::vec(any::<bool>(), 64)).prop_map(|(notation, flips)| {
        let mixed = notation
            .chars()
            .zip(flips.iter().cycle())
            .map(|(c, flip)| {
                if *flip {
                    c.to_ascii_lowercase()
                } else {
                    c.to_ascii_uppercase()
                }
            })
            .collect();
        (notation, mixed)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Parsing the normalized notation again yields the same record.
    #[test]
    fn normalization_is_idempotent(notation in any_notation()) {
        let parser = ProteinChangeParser::default();
        let first = parser.parse(&notation).unwrap();
        let second = parser.parse(&first.entity.normalized_notation).unwrap();

        prop_assert_eq!(&second.entity.normalized_notation, &first.entity.normalized_notation);
        prop_assert_eq!(second.entity.notation_kind, first.entity.notation_kind);
        prop_assert_eq!(second.entity.protein_start, first.entity.protein_start);
        prop_assert_eq!(second.entity.protein_end, first.entity.protein_end);
        prop_assert_eq!(&second.entity.consequence, &first.entity.consequence);
    }

    /// Letter case of the input does not change the result.
    #[test]
    fn parsing_ignores_case((notation, mixed) in mixed_case_notation()) {
        let parser = ProteinChangeParser::default();
        let expected = parser.parse(&notation).unwrap();
        let actual = parser.parse(&mixed).unwrap();

        prop_assert_eq!(&actual.entity.normalized_notation, &expected.entity.normalized_notation);
        prop_assert_eq!(&actual.entity.ref_residues, &expected.entity.ref_residues);
        prop_assert_eq!(&actual.entity.variant_residues, &expected.entity.variant_residues);
        prop_assert_eq!(&actual.entity.consequence, &expected.entity.consequence);
        prop_assert_eq!(actual.status_type, expected.status_type);
    }

    /// Generated notations are always recognized.
    #[test]
    fn generated_notations_are_recognized(notation in any_notation()) {
        let status = ProteinChangeParser::default().parse(&notation).unwrap();

        prop_assert!(status.status_type != StatusType::Error);
        prop_assert!(status.entity.protein_start.is_some());
        prop_assert!(status.entity.notation_kind.is_some());
    }

    /// Start never exceeds end, whatever the input.
    #[test]
    fn start_not_after_end(raw in "\\PC{0,40}") {
        let status = ProteinChangeParser::default().parse(&raw).unwrap();

        if let (Some(start), Some(end)) = (status.entity.protein_start, status.entity.protein_end) {
            prop_assert!(start <= end, "{} > {} for {:?}", start, end, raw);
        }
    }

    /// A notation kind is assigned unless the input was rejected before matching.
    #[test]
    fn exactly_one_kind(raw in "[A-Za-z0-9_*= ]{0,30}") {
        let status = ProteinChangeParser::default().parse(&raw).unwrap();

        let rejected_early = status
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::EmptyInput | Diagnostic::InputTooLong { .. }));
        prop_assert_eq!(status.entity.notation_kind.is_none(), rejected_early);
    }
}
