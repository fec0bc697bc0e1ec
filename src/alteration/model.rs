//! Output records of protein change parsing.

use parse_display::{Display, FromStr};

use super::csq::ConsequenceTerm;

/// The notation kind a protein change was recognized as.
///
/// Exactly one kind is assigned per parse that got past normalization.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    FromStr,
    serde::Deserialize,
    serde::Serialize,
    strum::EnumIter,
)]
#[display(style = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotationKind {
    Substitution,
    Nonsense,
    Frameshift,
    Deletion,
    Insertion,
    DeletionInsertion,
    Duplication,
    Extension,
    Splice,
    Range,
    /// A single residue without a definite variant, e.g., `V600` or `V600?`.
    Position,
    /// Multi-residue in-frame replacement, e.g., `IK744K`.
    Replacement,
    Other,
}

impl NotationKind {
    /// Whether the notation kind carries residue information at all.
    pub fn defines_residues(&self) -> bool {
        !matches!(self, NotationKind::Range | NotationKind::Other)
    }
}

/// A parsed protein change.
///
/// This is a plain value; whether and how it is mapped onto a persisted alteration
/// row is up to the caller.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize)]
pub struct ParsedAlteration {
    /// Original text as supplied.
    pub raw_input: String,
    /// Canonical notation, e.g., `V600E` or `T599delinsIP`.
    pub normalized_notation: String,
    /// Recognized notation kind, `None` if the input never reached the matcher.
    pub notation_kind: Option<NotationKind>,
    /// 1-based protein start position.
    pub protein_start: Option<u32>,
    /// 1-based inclusive protein end position, only set for ranges.
    pub protein_end: Option<u32>,
    /// Reference residue(s), upper case.
    pub ref_residues: Option<String>,
    /// Variant residue(s), upper case.
    pub variant_residues: Option<String>,
    /// Molecular consequence as found in the term table.
    pub consequence: Option<ConsequenceTerm>,
    /// Alterations listed in an `{excluding ...}` clause.
    pub excluding: Option<String>,
}

impl ParsedAlteration {
    /// Create an empty record for the given input.
    pub fn new(raw_input: &str) -> Self {
        Self {
            raw_input: raw_input.to_string(),
            ..Default::default()
        }
    }

    /// Term of the consequence, if any.
    pub fn consequence_term(&self) -> Option<&str> {
        self.consequence.as_ref().map(|csq| csq.term.as_str())
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    use super::*;

    #[rstest::rstest]
    #[case(NotationKind::Substitution, "substitution")]
    #[case(NotationKind::DeletionInsertion, "deletion_insertion")]
    #[case(NotationKind::Replacement, "replacement")]
    #[case(NotationKind::Other, "other")]
    fn notation_kind_display(#[case] kind: NotationKind, #[case] expected: &str) {
        assert_eq!(format!("{}", kind), expected);
    }

    #[test]
    fn notation_kind_from_str() -> Result<(), anyhow::Error> {
        for kind in NotationKind::iter() {
            assert_eq!(NotationKind::from_str(&kind.to_string())?, kind);
        }

        Ok(())
    }

    #[test]
    fn defines_residues() {
        assert!(NotationKind::Substitution.defines_residues());
        assert!(NotationKind::Splice.defines_residues());
        assert!(NotationKind::Position.defines_residues());
        assert!(!NotationKind::Range.defines_residues());
        assert!(!NotationKind::Other.defines_residues());
    }

    #[test]
    fn parsed_alteration_skips_none_on_serialization() -> Result<(), anyhow::Error> {
        let mut value = ParsedAlteration::new("v600e");
        value.normalized_notation = String::from("V600E");
        value.protein_start = Some(600);

        assert_eq!(
            serde_json::to_string(&value)?,
            r#"{"raw_input":"v600e","normalized_notation":"V600E","protein_start":600}"#
        );

        Ok(())
    }
}
