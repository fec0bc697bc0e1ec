//! Status envelope and diagnostics of a parse.

use itertools::Itertools;
use parse_display::{Display, FromStr};

/// Overall status of a parse.
///
/// Ordered by severity so that the worst status wins.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Display,
    FromStr,
    serde::Deserialize,
    serde::Serialize,
)]
#[display(style = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum StatusType {
    #[default]
    Ok,
    Warning,
    Error,
}

/// A data-quality finding made while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Display, serde::Deserialize, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Nothing left to parse after normalization.
    #[display("The alteration is empty")]
    EmptyInput,
    /// Input exceeds the configured maximal length.
    #[display("The alteration is longer than {max_len} characters")]
    InputTooLong { max_len: usize },
    /// Position token is not a positive integer.
    #[display("Invalid protein position '{token}'")]
    MalformedPosition { token: String },
    /// No notation rule matched, kept as free text.
    #[display("Unable to recognize '{notation}', kept as free text")]
    UnrecognizedNotation { notation: String },
    /// Range given as end before start.
    #[display("Protein start {start} is after protein end {end}, positions were swapped")]
    InvertedRange { start: u32, end: u32 },
    /// The classified term is missing from the term table.
    #[display("Consequence term '{term}' is unknown")]
    UnknownConsequenceTerm { term: String },
    /// A protein range followed by an unknown keyword.
    #[display("The alteration name is invalid, do you mean {suggestion}?")]
    MisspelledRangeKeyword { suggestion: String },
    /// Exon number beyond what any gene has.
    #[display("Exon {exon} is beyond the largest supported exon number {max_exon}")]
    ExonOutOfRange { exon: u32, max_exon: u32 },
}

impl Diagnostic {
    /// Status type implied by the diagnostic.
    pub fn status_type(&self) -> StatusType {
        match self {
            Diagnostic::EmptyInput
            | Diagnostic::InputTooLong { .. }
            | Diagnostic::MalformedPosition { .. }
            | Diagnostic::MisspelledRangeKeyword { .. }
            | Diagnostic::ExonOutOfRange { .. } => StatusType::Error,
            Diagnostic::UnrecognizedNotation { .. }
            | Diagnostic::InvertedRange { .. }
            | Diagnostic::UnknownConsequenceTerm { .. } => StatusType::Warning,
        }
    }
}

/// Wraps a parsed entity together with the status of the parse.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct ParseStatus<T> {
    /// The (possibly partially) populated entity.
    pub entity: T,
    /// Human-readable summary of all diagnostics.
    pub message: Option<String>,
    /// Worst status over all diagnostics.
    pub status_type: StatusType,
    /// Diagnostics in the order they were detected.
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> ParseStatus<T> {
    /// Wrap `entity` with `Ok` status.
    pub fn new(entity: T) -> Self {
        Self {
            entity,
            message: None,
            status_type: StatusType::Ok,
            diagnostics: Vec::new(),
        }
    }

    /// Record a diagnostic, raising the status type and extending the message.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.status_type = self.status_type.max(diagnostic.status_type());
        self.diagnostics.push(diagnostic);
        self.message = Some(self.diagnostics.iter().join("; "));
    }

    pub fn is_ok(&self) -> bool {
        self.status_type == StatusType::Ok
    }

    pub fn is_warning(&self) -> bool {
        self.status_type == StatusType::Warning
    }

    pub fn is_error(&self) -> bool {
        self.status_type == StatusType::Error
    }

    /// Transform the entity, keeping status and diagnostics.
    pub fn map<U, F>(self, f: F) -> ParseStatus<U>
    where
        F: FnOnce(T) -> U,
    {
        ParseStatus {
            entity: f(self.entity),
            message: self.message,
            status_type: self.status_type,
            diagnostics: self.diagnostics,
        }
    }
}
