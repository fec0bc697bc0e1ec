//! Resolution of captured positions and residues.

use super::{
    grammar::{Captures, NotationMatch},
    model::NotationKind,
    status::Diagnostic,
};

/// Protein coordinates and residues of a matched notation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Resolved {
    pub protein_start: Option<u32>,
    pub protein_end: Option<u32>,
    pub ref_residues: Option<String>,
    pub variant_residues: Option<String>,
    /// Non-fatal findings, e.g., an inverted range.
    pub warnings: Vec<Diagnostic>,
}

/// Parse a 1-based protein position.
pub fn parse_position(token: &str) -> Result<u32, Diagnostic> {
    match token.parse::<u32>() {
        Ok(pos) if pos > 0 => Ok(pos),
        _ => Err(Diagnostic::MalformedPosition {
            token: token.to_string(),
        }),
    }
}

/// Resolve positions and residues of `matched`.
///
/// A malformed position is returned as `Err`; nothing is resolved in this case.
pub fn resolve(matched: &NotationMatch) -> Result<Resolved, Diagnostic> {
    let captures = &matched.captures;

    let mut protein_start = captures.start.as_deref().map(parse_position).transpose()?;
    let mut protein_end = captures.end.as_deref().map(parse_position).transpose()?;
    if matched.kind == NotationKind::Replacement {
        protein_end = replacement_end(protein_start, captures)?;
    }

    let mut warnings = Vec::new();
    if let (Some(start), Some(end)) = (protein_start, protein_end) {
        if start > end {
            warnings.push(Diagnostic::InvertedRange { start, end });
            protein_start = Some(end);
            protein_end = Some(start);
        }
    }

    let (ref_residues, variant_residues) = residues(matched.kind, captures);

    Ok(Resolved {
        protein_start,
        protein_end,
        ref_residues,
        variant_residues,
        warnings,
    })
}

/// Last position covered by the reference residues of a replacement.
fn replacement_end(start: Option<u32>, captures: &Captures) -> Result<Option<u32>, Diagnostic> {
    let ref_len = captures.ref_start.as_deref().map(str::len).unwrap_or_default();
    match start {
        Some(start) if ref_len > 1 => u32::try_from(ref_len - 1)
            .ok()
            .and_then(|offset| start.checked_add(offset))
            .map(Some)
            .ok_or_else(|| Diagnostic::MalformedPosition {
                token: captures.start.clone().unwrap_or_default(),
            }),
        _ => Ok(None),
    }
}

/// Reference and variant residues of the given notation kind.
fn residues(kind: NotationKind, captures: &Captures) -> (Option<String>, Option<String>) {
    let ref_start = captures.ref_start.clone();
    match kind {
        NotationKind::Position => (ref_start, None),
        NotationKind::Replacement => (ref_start, captures.variant.clone()),
        NotationKind::Substitution => {
            let variant = match captures.variant.as_deref() {
                Some("=") => ref_start.clone(),
                _ => captures.variant.clone(),
            };
            (ref_start, variant)
        }
        NotationKind::Nonsense => (ref_start, Some(String::from("*"))),
        NotationKind::Frameshift => {
            if captures.is_range() {
                (None, None)
            } else {
                (ref_start, None)
            }
        }
        NotationKind::Deletion => (captures.extra.clone().or(ref_start), None),
        NotationKind::Insertion | NotationKind::DeletionInsertion => {
            (ref_start, captures.variant.clone())
        }
        NotationKind::Duplication => (ref_start, None),
        NotationKind::Extension => {
            if captures.is_n_terminal_extension() {
                (ref_start, None)
            } else {
                let variant = captures.variant.clone().or_else(|| {
                    captures
                        .suffix
                        .clone()
                        .filter(|s| s.chars().all(|c| c.is_ascii_alphabetic()))
                });
                (ref_start, variant)
            }
        }
        NotationKind::Splice => {
            if captures.is_range() {
                (None, None)
            } else {
                (ref_start.filter(|r| r != "X"), None)
            }
        }
        NotationKind::Range | NotationKind::Other => (None, None),
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::alteration::grammar::match_notation;

    #[rstest::rstest]
    #[case("1", Ok(1))]
    #[case("600", Ok(600))]
    #[case("0600", Ok(600))]
    #[case("0", Err(Diagnostic::MalformedPosition { token: String::from("0") }))]
    #[case(
        "99999999999",
        Err(Diagnostic::MalformedPosition { token: String::from("99999999999") })
    )]
    #[case("12a", Err(Diagnostic::MalformedPosition { token: String::from("12a") }))]
    fn parse_position_cases(#[case] token: &str, #[case] expected: Result<u32, Diagnostic>) {
        assert_eq!(parse_position(token), expected);
    }

    fn resolved(
        protein_start: Option<u32>,
        protein_end: Option<u32>,
        ref_residues: Option<&str>,
        variant_residues: Option<&str>,
    ) -> Resolved {
        Resolved {
            protein_start,
            protein_end,
            ref_residues: ref_residues.map(String::from),
            variant_residues: variant_residues.map(String::from),
            warnings: Vec::new(),
        }
    }

    #[rstest::rstest]
    #[case("V600E", resolved(Some(600), None, Some("V"), Some("E")))]
    #[case("V600=", resolved(Some(600), None, Some("V"), Some("V")))]
    #[case("*757=", resolved(Some(757), None, Some("*"), Some("*")))]
    #[case("R213*", resolved(Some(213), None, Some("R"), Some("*")))]
    #[case("R248Qfs*5", resolved(Some(248), None, Some("R"), None))]
    #[case("N1100_R1101fs", resolved(Some(1100), Some(1101), None, None))]
    #[case("E746_A750del", resolved(Some(746), Some(750), Some("E"), None))]
    #[case("E746_A750delELREA", resolved(Some(746), Some(750), Some("ELREA"), None))]
    #[case("T599delinsIP", resolved(Some(599), None, Some("T"), Some("IP")))]
    #[case("600_601insFGLAT", resolved(Some(600), Some(601), None, Some("FGLAT")))]
    #[case("S768_D770dup", resolved(Some(768), Some(770), Some("S"), None))]
    #[case("*757Kext*", resolved(Some(757), None, Some("*"), Some("K")))]
    #[case("*757ext*K", resolved(Some(757), None, Some("*"), Some("K")))]
    #[case("*110Gext*17", resolved(Some(110), None, Some("*"), Some("G")))]
    #[case("M1ext-5", resolved(Some(1), None, Some("M"), None))]
    #[case("X1010_splice", resolved(Some(1010), None, None, None))]
    #[case("T599_splice", resolved(Some(599), None, Some("T"), None))]
    #[case("963_D1010splice", resolved(Some(963), Some(1010), None, None))]
    #[case("splice", resolved(None, None, None, None))]
    #[case("61_88mis", resolved(Some(61), Some(88), None, None))]
    #[case("V600", resolved(Some(600), None, Some("V"), None))]
    #[case("V600?", resolved(Some(600), None, Some("V"), None))]
    #[case("IK744K", resolved(Some(744), Some(745), Some("IK"), Some("K")))]
    #[case("K744IK", resolved(Some(744), None, Some("K"), Some("IK")))]
    #[case("IKR744?", resolved(Some(744), Some(746), Some("IKR"), Some("?")))]
    fn resolve_notation(
        #[case] notation: &str,
        #[case] expected: Resolved,
    ) -> Result<(), anyhow::Error> {
        let matched = match_notation(notation)
            .ok_or_else(|| anyhow::anyhow!("no match for {}", notation))?;

        assert_eq!(resolve(&matched), Ok(expected));

        Ok(())
    }

    #[test]
    fn resolve_inverted_range() -> Result<(), anyhow::Error> {
        let matched = match_notation("A750_E746del").ok_or_else(|| anyhow::anyhow!("no match"))?;

        let resolved = resolve(&matched).map_err(|e| anyhow::anyhow!("{}", e))?;
        assert_eq!(resolved.protein_start, Some(746));
        assert_eq!(resolved.protein_end, Some(750));
        assert_eq!(resolved.ref_residues.as_deref(), Some("A"));
        assert_eq!(
            resolved.warnings,
            vec![Diagnostic::InvertedRange {
                start: 750,
                end: 746
            }]
        );

        Ok(())
    }

    #[rstest::rstest]
    #[case("V0E", "0")]
    #[case("0_100", "0")]
    #[case("1_0del", "0")]
    #[case("V99999999999E", "99999999999")]
    #[case("IK4294967295K", "4294967295")]
    fn resolve_malformed_position(
        #[case] notation: &str,
        #[case] token: &str,
    ) -> Result<(), anyhow::Error> {
        let matched = match_notation(notation)
            .ok_or_else(|| anyhow::anyhow!("no match for {}", notation))?;

        assert_eq!(
            resolve(&matched),
            Err(Diagnostic::MalformedPosition {
                token: token.to_string()
            })
        );

        Ok(())
    }
}
