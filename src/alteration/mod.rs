//! Parsing of free-text protein change notation.
//!
//! The entry point is [`ProteinChangeParser::parse`] which runs the input
//! through the normalizer, the grammar matcher, the residue range resolver,
//! and the consequence classifier.  Data quality problems are reported in
//! the returned [`ParseStatus`] rather than as errors.

pub mod csq;
pub mod dispatch;
pub mod grammar;
pub mod model;
pub mod normalize;
pub mod residues;
pub mod status;

use std::sync::Arc;

pub use self::csq::{ConsequenceTable, ConsequenceTerm, TermProvider};
pub use self::model::{NotationKind, ParsedAlteration};
pub use self::status::{Diagnostic, ParseStatus, StatusType};

/// Configuration of the `ProteinChangeParser`.
#[derive(Debug, Clone, PartialEq, Eq, derive_builder::Builder)]
#[builder(pattern = "immutable")]
pub struct Config {
    /// Inputs longer than this many characters are rejected.
    #[builder(default = "512")]
    pub max_input_len: usize,

    /// Whether to strip an HGVS `p.` prefix.
    #[builder(default = "true")]
    pub strip_protein_prefix: bool,

    /// Whether to extract `{excluding ...}` clauses.
    #[builder(default = "true")]
    pub allow_exclusion_criteria: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_input_len: 512,
            strip_protein_prefix: true,
            allow_exclusion_criteria: true,
        }
    }
}

/// Parser for protein changes.
///
/// The parser only reads from its term provider and may be shared between
/// threads.
#[derive(Clone)]
pub struct ProteinChangeParser {
    provider: Arc<dyn TermProvider>,
    config: Config,
}

impl Default for ProteinChangeParser {
    fn default() -> Self {
        Self::new(Arc::new(ConsequenceTable::builtin()), Config::default())
    }
}

impl std::fmt::Debug for ProteinChangeParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProteinChangeParser")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ProteinChangeParser {
    pub fn new(provider: Arc<dyn TermProvider>, config: Config) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Parse the protein change `raw`.
    ///
    /// # Errors
    ///
    /// Only if the term provider fails; malformed input is reported through
    /// the returned status.
    pub fn parse(&self, raw: &str) -> Result<ParseStatus<ParsedAlteration>, anyhow::Error> {
        let mut status = ParseStatus::new(ParsedAlteration::new(raw));

        if raw.chars().count() > self.config.max_input_len {
            status.push(Diagnostic::InputTooLong {
                max_len: self.config.max_input_len,
            });
            tracing::debug!("rejecting input of {} bytes", raw.len());
            return Ok(status);
        }

        let normalized = normalize::normalize(raw, &self.config);
        status.entity.excluding = normalized.excluding.clone();
        if normalized.is_empty() {
            status.push(Diagnostic::EmptyInput);
            tracing::debug!("empty protein change {:?}", raw);
            return Ok(status);
        }

        let Some(matched) = grammar::match_notation(&normalized.notation) else {
            status.entity.notation_kind = Some(NotationKind::Other);
            status.entity.normalized_notation = normalized.verbatim.clone();
            match grammar::suggest_range_keyword(&normalized.notation) {
                Some(suggestion) => status.push(Diagnostic::MisspelledRangeKeyword { suggestion }),
                None => status.push(Diagnostic::UnrecognizedNotation {
                    notation: normalized.verbatim,
                }),
            }
            tracing::debug!("{}", status.message.as_deref().unwrap_or_default());
            return Ok(status);
        };

        status.entity.notation_kind = Some(matched.kind);
        status.entity.normalized_notation = matched.to_string();

        let resolved = match residues::resolve(&matched) {
            Ok(resolved) => resolved,
            Err(diagnostic) => {
                tracing::debug!("{}: {}", raw, diagnostic);
                status.push(diagnostic);
                return Ok(status);
            }
        };
        status.entity.protein_start = resolved.protein_start;
        status.entity.protein_end = resolved.protein_end;
        status.entity.ref_residues = resolved.ref_residues;
        status.entity.variant_residues = resolved.variant_residues;
        for warning in resolved.warnings {
            tracing::debug!("{}: {}", raw, warning);
            status.push(warning);
        }

        if let Some(consequence) = csq::classify(&matched, &status.entity) {
            let term = consequence.to_string();
            match self.provider.term(&term)? {
                Some(consequence) => status.entity.consequence = Some(consequence),
                None => {
                    tracing::debug!("{}: consequence term {} not found", raw, term);
                    status.push(Diagnostic::UnknownConsequenceTerm { term });
                }
            }
        }

        Ok(status)
    }
}
