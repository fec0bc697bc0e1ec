//! Classification of protein changes into molecular consequences.

use std::{path::Path, sync::Arc};

use indexmap::IndexMap;
use parse_display::{Display, FromStr};
use strum::IntoEnumIterator;

use super::{grammar::NotationMatch, model::NotationKind, ParsedAlteration};

/// Putative impact level.
#[derive(
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Clone,
    Copy,
    Display,
    FromStr,
    serde::Deserialize,
    serde::Serialize,
    strum::EnumIter,
)]
#[display(style = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum PutativeImpact {
    High,
    Moderate,
    Low,
    Modifier,
}

/// Consequence terms a protein change can be classified as.
#[derive(
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Clone,
    Copy,
    Display,
    FromStr,
    serde::Deserialize,
    serde::Serialize,
    strum::EnumIter,
)]
#[display(style = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Consequence {
    // high impact
    FrameshiftVariant,
    SpliceAcceptorVariant,
    SpliceDonorVariant,
    StartLost,
    StopGained,
    StopLost,
    // moderate impact
    InframeDeletion,
    InframeInsertion,
    MissenseVariant,
    ProteinAlteringVariant,
    SpliceRegionVariant,
    // low impact
    StopRetainedVariant,
    SynonymousVariant,
    // modifier
    CodingSequenceVariant,
    FeatureTruncation,
    /// Any change at the given position or region.
    Any,
}

impl From<Consequence> for PutativeImpact {
    fn from(val: Consequence) -> Self {
        match val {
            Consequence::FrameshiftVariant
            | Consequence::SpliceAcceptorVariant
            | Consequence::SpliceDonorVariant
            | Consequence::StartLost
            | Consequence::StopGained
            | Consequence::StopLost => PutativeImpact::High,
            Consequence::InframeDeletion
            | Consequence::InframeInsertion
            | Consequence::MissenseVariant
            | Consequence::ProteinAlteringVariant
            | Consequence::SpliceRegionVariant => PutativeImpact::Moderate,
            Consequence::StopRetainedVariant | Consequence::SynonymousVariant => {
                PutativeImpact::Low
            }
            Consequence::CodingSequenceVariant
            | Consequence::FeatureTruncation
            | Consequence::Any => PutativeImpact::Modifier,
        }
    }
}

impl Consequence {
    /// Return vector of all values of `Consequence`.
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }

    pub fn impact(&self) -> PutativeImpact {
        PutativeImpact::from(*self)
    }

    /// Whether the consequence generally shortens the protein product.
    pub fn is_generally_truncating(&self) -> bool {
        matches!(
            self,
            Consequence::FrameshiftVariant
                | Consequence::StopGained
                | Consequence::SpliceAcceptorVariant
                | Consequence::SpliceDonorVariant
                | Consequence::SpliceRegionVariant
                | Consequence::FeatureTruncation
        )
    }
}

/// A record of the consequence term table.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct ConsequenceTerm {
    /// Canonical term, e.g., `missense_variant`.
    pub term: String,
    pub is_generally_truncating: bool,
    #[serde(default)]
    pub description: Option<String>,
}

impl From<Consequence> for ConsequenceTerm {
    fn from(val: Consequence) -> Self {
        Self {
            term: val.to_string(),
            is_generally_truncating: val.is_generally_truncating(),
            description: None,
        }
    }
}

/// Read-only access to the consequence terms.
///
/// Implementations must be safe to share between threads; the parser only ever
/// reads from them.
pub trait TermProvider: Send + Sync {
    /// Look up `term`, returning `Ok(None)` if it is not known.
    ///
    /// An `Err` is reserved for the provider itself being unavailable.
    fn term(&self, term: &str) -> Result<Option<ConsequenceTerm>, anyhow::Error>;
}

/// In-memory consequence term table, keyed by lower-case term.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsequenceTable {
    terms: IndexMap<String, ConsequenceTerm>,
}

impl ConsequenceTable {
    /// Build table from the given records; later records override earlier ones.
    pub fn new<I>(terms: I) -> Self
    where
        I: IntoIterator<Item = ConsequenceTerm>,
    {
        Self {
            terms: terms
                .into_iter()
                .map(|term| (term.term.to_lowercase(), term))
                .collect(),
        }
    }

    /// Table with one record per `Consequence` value.
    pub fn builtin() -> Self {
        Self::new(Consequence::iter().map(ConsequenceTerm::from))
    }

    /// Load table from a TSV file with header `term`, `is_generally_truncating`,
    /// and `description`.
    pub fn from_path<P>(path: P) -> Result<Self, anyhow::Error>
    where
        P: AsRef<Path>,
    {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .comment(Some(b'#'))
            .has_headers(true)
            .flexible(true)
            .from_path(path.as_ref())
            .map_err(|e| {
                anyhow::anyhow!(
                    "could not open consequence table {}: {}",
                    path.as_ref().display(),
                    e
                )
            })?;
        let mut terms = Vec::new();
        for result in rdr.deserialize() {
            let term: ConsequenceTerm = result?;
            terms.push(term);
        }
        tracing::debug!(
            "loaded {} consequence terms from {}",
            terms.len(),
            path.as_ref().display()
        );
        Ok(Self::new(terms))
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConsequenceTerm> {
        self.terms.values()
    }
}

impl TermProvider for ConsequenceTable {
    fn term(&self, term: &str) -> Result<Option<ConsequenceTerm>, anyhow::Error> {
        Ok(self.terms.get(&term.to_lowercase()).cloned())
    }
}

/// Load the term provider from `path`, or use the built-in table.
pub fn load_provider(path: Option<&Path>) -> Result<Arc<dyn TermProvider>, anyhow::Error> {
    match path {
        Some(path) => {
            tracing::info!("Loading consequence terms from {}", path.display());
            Ok(Arc::new(ConsequenceTable::from_path(path)?))
        }
        None => Ok(Arc::new(ConsequenceTable::builtin())),
    }
}

/// Classify a matched protein change with resolved residues.
///
/// Returns `None` where the notation does not determine a consequence.
pub fn classify(matched: &NotationMatch, alteration: &ParsedAlteration) -> Option<Consequence> {
    match matched.kind {
        NotationKind::Substitution => {
            if alteration.ref_residues == alteration.variant_residues {
                if alteration.ref_residues.as_deref() == Some("*") {
                    Some(Consequence::StopRetainedVariant)
                } else {
                    Some(Consequence::SynonymousVariant)
                }
            } else if alteration.ref_residues.as_deref() == Some("*") {
                Some(Consequence::StopLost)
            } else if alteration.protein_start == Some(1) {
                Some(Consequence::StartLost)
            } else {
                Some(Consequence::MissenseVariant)
            }
        }
        NotationKind::Position => {
            if alteration.protein_start == Some(1) {
                Some(Consequence::StartLost)
            } else if matched.captures.variant.as_deref() == Some("?") {
                Some(Consequence::Any)
            } else {
                Some(Consequence::MissenseVariant)
            }
        }
        NotationKind::Replacement => Some(classify_replacement(alteration)),
        NotationKind::Nonsense => Some(Consequence::StopGained),
        NotationKind::Frameshift => Some(Consequence::FrameshiftVariant),
        NotationKind::Deletion | NotationKind::DeletionInsertion => {
            Some(Consequence::InframeDeletion)
        }
        NotationKind::Insertion | NotationKind::Duplication => Some(Consequence::InframeInsertion),
        NotationKind::Extension => {
            if matched.captures.is_n_terminal_extension() {
                Some(Consequence::InframeInsertion)
            } else {
                Some(Consequence::StopLost)
            }
        }
        NotationKind::Splice => Some(Consequence::SpliceRegionVariant),
        NotationKind::Range => match matched.captures.suffix.as_deref() {
            Some("mis") => Some(Consequence::MissenseVariant),
            Some("trunc") => Some(Consequence::FeatureTruncation),
            Some("mut") => Some(Consequence::Any),
            _ => None,
        },
        NotationKind::Other => None,
    }
}

/// Multi-residue replacements are classified by comparing residue counts.
fn classify_replacement(alteration: &ParsedAlteration) -> Consequence {
    let ref_residues = alteration.ref_residues.as_deref().unwrap_or_default();
    let variant_residues = alteration.variant_residues.as_deref().unwrap_or_default();

    if variant_residues == "*" {
        Consequence::StopGained
    } else if ref_residues == variant_residues {
        Consequence::SynonymousVariant
    } else if alteration.protein_start == Some(1) {
        Consequence::StartLost
    } else if variant_residues == "?" {
        Consequence::Any
    } else {
        match ref_residues.len().cmp(&variant_residues.len()) {
            std::cmp::Ordering::Greater => Consequence::InframeDeletion,
            std::cmp::Ordering::Less => Consequence::InframeInsertion,
            std::cmp::Ordering::Equal => Consequence::MissenseVariant,
        }
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::alteration::grammar::match_notation;

    #[test]
    fn putative_impact_display() {
        assert_eq!(format!("{}", PutativeImpact::High), "HIGH");
        assert_eq!(format!("{}", PutativeImpact::Moderate), "MODERATE");
        assert_eq!(format!("{}", PutativeImpact::Low), "LOW");
        assert_eq!(format!("{}", PutativeImpact::Modifier), "MODIFIER");
    }

    #[rstest::rstest]
    #[case(Consequence::MissenseVariant, "missense_variant")]
    #[case(Consequence::StartLost, "start_lost")]
    #[case(Consequence::StopRetainedVariant, "stop_retained_variant")]
    #[case(Consequence::FeatureTruncation, "feature_truncation")]
    #[case(Consequence::Any, "any")]
    fn consequence_display_from_str(
        #[case] csq: Consequence,
        #[case] term: &str,
    ) -> Result<(), anyhow::Error> {
        assert_eq!(format!("{}", csq), term);
        assert_eq!(Consequence::from_str(term)?, csq);

        Ok(())
    }

    #[test]
    fn consequence_impact() {
        assert_eq!(Consequence::StopGained.impact(), PutativeImpact::High);
        assert_eq!(
            Consequence::InframeDeletion.impact(),
            PutativeImpact::Moderate
        );
        assert_eq!(Consequence::SynonymousVariant.impact(), PutativeImpact::Low);
    }

    #[test]
    fn truncating_consequences() {
        let truncating = Consequence::all()
            .into_iter()
            .filter(Consequence::is_generally_truncating)
            .map(|csq| csq.to_string())
            .collect::<Vec<_>>();

        insta::assert_yaml_snapshot!(truncating, @r###"
        - frameshift_variant
        - splice_acceptor_variant
        - splice_donor_variant
        - stop_gained
        - splice_region_variant
        - feature_truncation
        "###);
    }

    #[test]
    fn builtin_table_lookup() -> Result<(), anyhow::Error> {
        let table = ConsequenceTable::builtin();
        assert_eq!(table.len(), Consequence::all().len());

        let term = table.term("Stop_Gained")?;
        assert_eq!(
            term,
            Some(ConsequenceTerm {
                term: String::from("stop_gained"),
                is_generally_truncating: true,
                description: None,
            })
        );
        assert_eq!(table.term("no_such_term")?, None);

        Ok(())
    }

    #[test]
    fn table_from_path() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let path = tmp_dir.join("consequences.tsv");
        std::fs::write(
            &path,
            "term\tis_generally_truncating\tdescription\n\
             # comment\n\
             missense_variant\tfalse\tA change of one residue\n\
             stop_gained\ttrue\t\n",
        )?;

        let table = ConsequenceTable::from_path(&path)?;
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.term("missense_variant")?.and_then(|t| t.description),
            Some(String::from("A change of one residue"))
        );
        assert_eq!(table.term("frameshift_variant")?, None);

        Ok(())
    }

    #[test]
    fn table_from_missing_path() {
        assert!(ConsequenceTable::from_path("/no/such/file.tsv").is_err());
        assert!(load_provider(Some(Path::new("/no/such/file.tsv"))).is_err());
    }

    fn alteration(
        ref_residues: Option<&str>,
        variant_residues: Option<&str>,
        protein_start: Option<u32>,
    ) -> ParsedAlteration {
        ParsedAlteration {
            ref_residues: ref_residues.map(String::from),
            variant_residues: variant_residues.map(String::from),
            protein_start,
            ..Default::default()
        }
    }

    #[rstest::rstest]
    #[case("V600E", Some("V"), Some("E"), Some(600), Some(Consequence::MissenseVariant))]
    #[case("V600V", Some("V"), Some("V"), Some(600), Some(Consequence::SynonymousVariant))]
    #[case("*757=", Some("*"), Some("*"), Some(757), Some(Consequence::StopRetainedVariant))]
    #[case("M1I", Some("M"), Some("I"), Some(1), Some(Consequence::StartLost))]
    #[case("R213*", Some("R"), Some("*"), Some(213), Some(Consequence::StopGained))]
    #[case("K12fs", Some("K"), None, Some(12), Some(Consequence::FrameshiftVariant))]
    #[case("V600del", Some("V"), None, Some(600), Some(Consequence::InframeDeletion))]
    #[case("T599delinsIP", Some("T"), Some("IP"), Some(599), Some(Consequence::InframeDeletion))]
    #[case("A767dup", Some("A"), None, Some(767), Some(Consequence::InframeInsertion))]
    #[case("*757Kext*", Some("*"), Some("K"), Some(757), Some(Consequence::StopLost))]
    #[case("M1ext-5", Some("M"), None, Some(1), Some(Consequence::InframeInsertion))]
    #[case("splice", None, None, None, Some(Consequence::SpliceRegionVariant))]
    #[case("61_88mis", None, None, Some(61), Some(Consequence::MissenseVariant))]
    #[case("1_100trunc", None, None, Some(1), Some(Consequence::FeatureTruncation))]
    #[case("1_100mut", None, None, Some(1), Some(Consequence::Any))]
    #[case("*757E", Some("*"), Some("E"), Some(757), Some(Consequence::StopLost))]
    #[case("V600", Some("V"), None, Some(600), Some(Consequence::MissenseVariant))]
    #[case("V600?", Some("V"), None, Some(600), Some(Consequence::Any))]
    #[case("M1", Some("M"), None, Some(1), Some(Consequence::StartLost))]
    #[case("IK744K", Some("IK"), Some("K"), Some(744), Some(Consequence::InframeDeletion))]
    #[case("K744IK", Some("K"), Some("IK"), Some(744), Some(Consequence::InframeInsertion))]
    #[case("IK744KI", Some("IK"), Some("KI"), Some(744), Some(Consequence::MissenseVariant))]
    #[case("IK744IK", Some("IK"), Some("IK"), Some(744), Some(Consequence::SynonymousVariant))]
    #[case("IK744*", Some("IK"), Some("*"), Some(744), Some(Consequence::StopGained))]
    #[case("IK744?", Some("IK"), Some("?"), Some(744), Some(Consequence::Any))]
    #[case("KL12", Some("KL"), None, Some(12), Some(Consequence::InframeDeletion))]
    #[case("1_100", None, None, Some(1), None)]
    fn classify_notation(
        #[case] notation: &str,
        #[case] ref_residues: Option<&str>,
        #[case] variant_residues: Option<&str>,
        #[case] protein_start: Option<u32>,
        #[case] expected: Option<Consequence>,
    ) -> Result<(), anyhow::Error> {
        let matched = match_notation(notation)
            .ok_or_else(|| anyhow::anyhow!("no match for {}", notation))?;
        let alteration = alteration(ref_residues, variant_residues, protein_start);

        assert_eq!(classify(&matched, &alteration), expected);

        Ok(())
    }
}
