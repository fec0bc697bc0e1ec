//! Lexical pre-pass over raw protein change text.

use itertools::Itertools;

use super::Config;

/// Structural keywords, longest first so that `delins` wins over `del`.
const KEYWORDS: &[&str] = &["delins", "splice", "del", "ins", "dup", "ext", "fs"];

/// Keywords after which the remainder of a letter run are residues.
const RESIDUES_FOLLOW: &[&str] = &["delins", "del", "ins", "ext"];

/// Region keywords, only recognized when they form a complete letter run.
const REGION_KEYWORDS: &[&str] = &["mis", "trunc", "mut"];

/// Characters trimmed from both ends of the input.
fn is_surrounding_punctuation(c: char) -> bool {
    c.is_whitespace() || matches!(c, '"' | '\'' | '`' | ',' | ';' | ':' | '.' | '(' | ')')
}

/// Result of normalization.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Normalized {
    /// Case-folded notation, input to the grammar matcher.
    pub notation: String,
    /// Stripped but not case-folded text, kept for unrecognized notations.
    pub verbatim: String,
    /// Content of an `{excluding ...}` clause.
    pub excluding: Option<String>,
}

impl Normalized {
    pub fn is_empty(&self) -> bool {
        self.notation.is_empty()
    }
}

/// Normalize `raw` for matching.
pub fn normalize(raw: &str, config: &Config) -> Normalized {
    let mut text = raw.trim();

    if config.strip_protein_prefix {
        if let Some(prefix) = text.get(..2) {
            if prefix.eq_ignore_ascii_case("p.") {
                text = text[2..].trim_start();
            }
        }
    }

    if let Some(idx) = text.find('[') {
        text = text[..idx].trim_end();
    }

    let mut excluding = None;
    if config.allow_exclusion_criteria {
        if let Some((head, clause)) = split_exclusion(text) {
            text = head;
            excluding = clause;
        }
    }

    let verbatim = text.trim_matches(is_surrounding_punctuation).to_string();
    let notation = fold_case(&verbatim);

    Normalized {
        notation,
        verbatim,
        excluding,
    }
}

/// Split off a trailing `{exclude ...}` or `{excluding ...}` clause.
fn split_exclusion(text: &str) -> Option<(&str, Option<String>)> {
    let inner = text.strip_suffix('}')?;
    let idx = inner.rfind('{')?;
    let clause = inner[idx + 1..].trim_start();
    let rest = ["excluding", "exclude"].iter().find_map(|kw| {
        clause
            .get(..kw.len())
            .filter(|prefix| prefix.eq_ignore_ascii_case(kw))
            .map(|_| &clause[kw.len()..])
    })?;
    let rest = rest.trim();
    let excluding = (!rest.is_empty()).then(|| rest.to_string());

    Some((text[..idx].trim_end(), excluding))
}

/// Fold case of every maximal run of ASCII letters.
pub fn fold_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for (is_letter, chunk) in &text.chars().chunk_by(|c| c.is_ascii_alphabetic()) {
        if is_letter {
            fold_run(&chunk.collect::<String>(), &mut result);
        } else {
            result.extend(chunk);
        }
    }
    result
}

fn fold_run(run: &str, out: &mut String) {
    if REGION_KEYWORDS.iter().any(|kw| run.eq_ignore_ascii_case(kw)) {
        out.push_str(&run.to_ascii_lowercase());
        return;
    }

    let mut rest = run;
    while let Some(c) = rest.chars().next() {
        let keyword = KEYWORDS.iter().find(|kw| {
            rest.get(..kw.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(kw))
        });
        match keyword {
            Some(kw) => {
                out.push_str(kw);
                rest = &rest[kw.len()..];
                if RESIDUES_FOLLOW.contains(kw) {
                    out.push_str(&rest.to_ascii_uppercase());
                    return;
                }
            }
            None => {
                out.push(c.to_ascii_uppercase());
                rest = &rest[c.len_utf8()..];
            }
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::alteration::ConfigBuilder;

    #[rstest::rstest]
    #[case("v600e", "V600E")]
    #[case("  V600E\t", "V600E")]
    #[case("T599delinsip", "T599delinsIP")]
    #[case("T599DELINSIP", "T599delinsIP")]
    #[case("*757kext*", "*757Kext*")]
    #[case("*315textalgt*", "*315TextALGT*")]
    #[case("m1EXT-5", "M1ext-5")]
    #[case("e746_a750delelrea", "E746_A750delELREA")]
    #[case("v600_k601inse", "V600_K601insE")]
    #[case("s768_d770DUP", "S768_D770dup")]
    #[case("r248qFS*5", "R248Qfs*5")]
    #[case("R248fster5", "R248fsTER5")]
    #[case("x1010_SPLICE", "X1010_splice")]
    #[case("61_88MIS", "61_88mis")]
    #[case("1_100Trunc", "1_100trunc")]
    #[case("V600=", "V600=")]
    #[case("p.V600E", "V600E")]
    #[case("P.v600e", "V600E")]
    #[case("(V600E)", "V600E")]
    #[case("\"V600E\",", "V600E")]
    #[case("V600E [somatic]", "V600E")]
    #[case("*757kext*.", "*757Kext*")]
    #[case("", "")]
    #[case("   ", "")]
    fn normalize_notation(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize(raw, &Config::default()).notation, expected);
    }

    #[test]
    fn normalize_keeps_verbatim() {
        let normalized = normalize(" p.(Amplification) ", &Config::default());

        assert_eq!(normalized.verbatim, "Amplification");
        assert_eq!(normalized.notation, "AMPLIFICATION");
    }

    #[rstest::rstest]
    #[case("V600 {excluding V600E, V600K}", "V600", Some("V600E, V600K"))]
    #[case("V600 {Exclude V600E}", "V600", Some("V600E"))]
    #[case("V600 {excluding }", "V600", None)]
    #[case("V600 {V600E}", "V600 {V600E}", None)]
    fn normalize_exclusion(
        #[case] raw: &str,
        #[case] verbatim: &str,
        #[case] excluding: Option<&str>,
    ) {
        let normalized = normalize(raw, &Config::default());

        assert_eq!(normalized.verbatim, verbatim);
        assert_eq!(normalized.excluding.as_deref(), excluding);
    }

    #[test]
    fn normalize_honors_config() -> Result<(), anyhow::Error> {
        let config = ConfigBuilder::default()
            .strip_protein_prefix(false)
            .allow_exclusion_criteria(false)
            .build()?;

        assert_eq!(normalize("p.V600E", &config).notation, "P.V600E");
        let normalized = normalize("V600 {excluding V600E}", &config);
        assert_eq!(normalized.excluding, None);
        assert_eq!(normalized.verbatim, "V600 {excluding V600E}");

        Ok(())
    }

    #[rstest::rstest]
    #[case("V600E")]
    #[case("T599delinsIP")]
    #[case("*757Kext*")]
    #[case("E746_A750delELREA")]
    #[case("963_D1010splice")]
    fn fold_case_is_fixed_point(#[case] notation: &str) {
        assert_eq!(fold_case(notation), notation);
    }
}
