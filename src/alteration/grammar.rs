//! Ordered recognizers for normalized protein change notation.
//!
//! Recognizers operate on the output of the normalizer, i.e., residues are
//! upper case and structural keywords lower case.  They are tried in a fixed
//! order and the first one consuming the complete input wins.

use std::fmt;

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit1, satisfy},
    combinator::{all_consuming, opt, verify},
    sequence::preceded,
    IResult, Parser,
};

use super::model::NotationKind;

/// Raw capture groups of a matched notation.
///
/// Positions are kept as digit strings; they are only converted into numbers by
/// the residue range resolver.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Captures {
    /// Residue at the (first) position.
    pub ref_start: Option<String>,
    /// Digits of the (first) position.
    pub start: Option<String>,
    /// Residue at the second position of a range.
    pub ref_end: Option<String>,
    /// Digits of the second position of a range.
    pub end: Option<String>,
    /// Variant residue(s).
    pub variant: Option<String>,
    /// Explicitly given deleted residues, or the residues following `ext`.
    pub extra: Option<String>,
    /// Trailing part, e.g., the stop tail of a frameshift or a region keyword.
    pub suffix: Option<String>,
}

impl Captures {
    /// Whether this is an N-terminal extension such as `M1ext-5`.
    pub fn is_n_terminal_extension(&self) -> bool {
        self.suffix.as_deref().is_some_and(|s| s.starts_with('-'))
    }

    /// Whether a second position was given.
    pub fn is_range(&self) -> bool {
        self.end.is_some()
    }

    fn write_location(&self, f: &mut fmt::Formatter<'_>, drop_unknown: bool) -> fmt::Result {
        let keep = |residue: &Option<String>| {
            residue
                .as_deref()
                .filter(|r| !(drop_unknown && *r == "X"))
                .unwrap_or_default()
                .to_string()
        };
        if let Some(start) = &self.start {
            write!(f, "{}{}", keep(&self.ref_start), start)?;
        }
        if let Some(end) = &self.end {
            write!(f, "_{}{}", keep(&self.ref_end), end)?;
        }
        Ok(())
    }
}

/// A notation kind with its captures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotationMatch {
    pub kind: NotationKind,
    pub captures: Captures,
}

impl fmt::Display for NotationMatch {
    /// Render the canonical notation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.captures;
        let or_empty = |value: &Option<String>| value.clone().unwrap_or_default();
        match self.kind {
            NotationKind::Substitution => {
                c.write_location(f, false)?;
                write!(f, "{}", or_empty(&c.variant))
            }
            NotationKind::Nonsense => {
                c.write_location(f, false)?;
                write!(f, "*")
            }
            NotationKind::Frameshift => {
                c.write_location(f, false)?;
                write!(f, "{}fs{}", or_empty(&c.variant), or_empty(&c.suffix))
            }
            NotationKind::Deletion => {
                c.write_location(f, false)?;
                write!(f, "del{}", or_empty(&c.extra))
            }
            NotationKind::Insertion => {
                c.write_location(f, false)?;
                write!(f, "ins{}", or_empty(&c.variant))
            }
            NotationKind::DeletionInsertion => {
                c.write_location(f, false)?;
                write!(f, "delins{}", or_empty(&c.variant))
            }
            NotationKind::Duplication => {
                c.write_location(f, false)?;
                write!(f, "dup")
            }
            NotationKind::Extension => {
                if c.is_n_terminal_extension() {
                    c.write_location(f, false)?;
                    write!(f, "ext{}", or_empty(&c.suffix))
                } else {
                    c.write_location(f, false)?;
                    write!(
                        f,
                        "{}ext{}*{}",
                        or_empty(&c.variant),
                        or_empty(&c.extra),
                        or_empty(&c.suffix)
                    )
                }
            }
            NotationKind::Splice => match (&c.start, &c.end) {
                (None, _) => write!(f, "splice"),
                (Some(_), Some(_)) => {
                    c.write_location(f, true)?;
                    write!(f, "splice")
                }
                (Some(_), None) => {
                    c.write_location(f, true)?;
                    write!(f, "_splice")
                }
            },
            NotationKind::Range => {
                c.write_location(f, false)?;
                write!(f, "{}", or_empty(&c.suffix))
            }
            NotationKind::Position | NotationKind::Replacement => {
                c.write_location(f, false)?;
                write!(f, "{}", or_empty(&c.variant))
            }
            NotationKind::Other => Ok(()),
        }
    }
}

type Recognizer = fn(&str) -> IResult<&str, Captures>;

/// Recognizers in priority order.
const RULES: &[(NotationKind, Recognizer)] = &[
    (NotationKind::DeletionInsertion, parse_delins as Recognizer),
    (NotationKind::Duplication, parse_dup as Recognizer),
    (NotationKind::Insertion, parse_ins as Recognizer),
    (NotationKind::Deletion, parse_del as Recognizer),
    (NotationKind::Extension, parse_extension as Recognizer),
    (NotationKind::Frameshift, parse_frameshift as Recognizer),
    (NotationKind::Nonsense, parse_nonsense as Recognizer),
    (NotationKind::Substitution, parse_substitution as Recognizer),
    (NotationKind::Position, parse_position as Recognizer),
    (NotationKind::Replacement, parse_replacement as Recognizer),
    (NotationKind::Splice, parse_splice as Recognizer),
    (NotationKind::Range, parse_range as Recognizer),
];

/// Match the normalized `notation` against all recognizers.
///
/// Returns `None` if no recognizer consumes the complete input.
pub fn match_notation(notation: &str) -> Option<NotationMatch> {
    RULES.iter().find_map(|(kind, rule)| {
        all_consuming(*rule)
            .parse(notation)
            .ok()
            .map(|(_, captures)| {
                tracing::trace!("'{}' matched as {}", notation, kind);
                NotationMatch {
                    kind: *kind,
                    captures,
                }
            })
    })
}

fn residue(input: &str) -> IResult<&str, char> {
    satisfy(|c: char| c.is_ascii_uppercase()).parse(input)
}

fn letters(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_uppercase()).parse(input)
}

fn residues(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_uppercase() || c == '*').parse(input)
}

/// `<ref><pos>` optionally followed by `_<ref2><pos2>`.
fn location(input: &str) -> IResult<&str, Captures> {
    let (input, ref_start) = opt(residue).parse(input)?;
    let (input, start) = digit1.parse(input)?;
    let (input, end) = opt(preceded(char('_'), (opt(residue), digit1))).parse(input)?;

    Ok((
        input,
        Captures {
            ref_start: ref_start.map(String::from),
            start: Some(start.to_string()),
            ref_end: end.and_then(|(ref_end, _)| ref_end).map(String::from),
            end: end.map(|(_, end): (Option<char>, &str)| end.to_string()),
            ..Default::default()
        },
    ))
}

fn range_location(input: &str) -> IResult<&str, Captures> {
    verify(location, |captures: &Captures| captures.is_range()).parse(input)
}

fn parse_delins(input: &str) -> IResult<&str, Captures> {
    let (input, captures) = location(input)?;
    let (input, _) = tag("delins").parse(input)?;
    let (input, variant) = residues(input)?;

    Ok((
        input,
        Captures {
            variant: Some(variant.to_string()),
            ..captures
        },
    ))
}

fn parse_dup(input: &str) -> IResult<&str, Captures> {
    let (input, captures) = location(input)?;
    let (input, _) = tag("dup").parse(input)?;

    Ok((input, captures))
}

fn parse_ins(input: &str) -> IResult<&str, Captures> {
    let (input, captures) = range_location(input)?;
    let (input, _) = tag("ins").parse(input)?;
    let (input, variant) = residues(input)?;

    Ok((
        input,
        Captures {
            variant: Some(variant.to_string()),
            ..captures
        },
    ))
}

fn parse_del(input: &str) -> IResult<&str, Captures> {
    let (input, captures) = location(input)?;
    let (input, _) = tag("del").parse(input)?;
    let (input, extra) = opt(letters).parse(input)?;

    Ok((
        input,
        Captures {
            extra: extra.map(String::from),
            ..captures
        },
    ))
}

/// `M1ext-<n>`
fn parse_n_terminal_extension(input: &str) -> IResult<&str, Captures> {
    let (input, ref_start) = opt(char('M')).parse(input)?;
    let (input, start) = tag("1").parse(input)?;
    let (input, _) = tag("ext-").parse(input)?;
    let (input, upstream) = digit1.parse(input)?;

    Ok((
        input,
        Captures {
            ref_start: ref_start.map(String::from),
            start: Some(start.to_string()),
            suffix: Some(format!("-{}", upstream)),
            ..Default::default()
        },
    ))
}

/// `*<pos>[<var>]ext[<residues>]*[<n>|?|<var>]`
fn parse_c_terminal_extension(input: &str) -> IResult<&str, Captures> {
    let (input, _) = opt(char('*')).parse(input)?;
    let (input, start) = digit1.parse(input)?;
    let (input, variant) = opt(residue).parse(input)?;
    let (input, _) = tag("ext").parse(input)?;
    let (input, extra) = opt(letters).parse(input)?;
    let (input, _) = char('*').parse(input)?;
    let (input, suffix) = opt(alt((digit1, tag("?"), letters))).parse(input)?;

    Ok((
        input,
        Captures {
            ref_start: Some(String::from("*")),
            start: Some(start.to_string()),
            variant: variant.map(String::from),
            extra: extra.map(String::from),
            suffix: suffix.map(String::from),
            ..Default::default()
        },
    ))
}

fn parse_extension(input: &str) -> IResult<&str, Captures> {
    alt((parse_n_terminal_extension, parse_c_terminal_extension)).parse(input)
}

/// Trailing `*<n>`, `X<n>`, `TER<n>`, or `*?` of a frameshift, rendered as `*<n>`.
fn stop_tail(input: &str) -> IResult<&str, String> {
    let (input, _) = alt((tag("*"), tag("X"), tag("TER"))).parse(input)?;
    let (input, count) = opt(alt((digit1, tag("?")))).parse(input)?;

    Ok((input, format!("*{}", count.unwrap_or_default())))
}

fn parse_frameshift(input: &str) -> IResult<&str, Captures> {
    let (input, captures) = location(input)?;
    let (input, variant) = opt(residue).parse(input)?;
    let (input, _) = tag("fs").parse(input)?;
    let (input, suffix) = opt(stop_tail).parse(input)?;

    Ok((
        input,
        Captures {
            variant: variant.map(String::from),
            suffix,
            ..captures
        },
    ))
}

fn parse_nonsense(input: &str) -> IResult<&str, Captures> {
    let (input, ref_start) = residue(input)?;
    let (input, start) = digit1.parse(input)?;
    let (input, _) = alt((char('*'), char('X'))).parse(input)?;

    Ok((
        input,
        Captures {
            ref_start: Some(String::from(ref_start)),
            start: Some(start.to_string()),
            variant: Some(String::from("*")),
            ..Default::default()
        },
    ))
}

fn parse_substitution(input: &str) -> IResult<&str, Captures> {
    let (input, ref_start) = alt((residue, char('*'))).parse(input)?;
    let (input, start) = digit1.parse(input)?;
    let (input, variant) = alt((residue, char('='))).parse(input)?;

    Ok((
        input,
        Captures {
            ref_start: Some(String::from(ref_start)),
            start: Some(start.to_string()),
            variant: Some(String::from(variant)),
            ..Default::default()
        },
    ))
}

fn parse_splice(input: &str) -> IResult<&str, Captures> {
    let (input, captures) = opt((location, opt(char('_')))).parse(input)?;
    let (input, _) = tag("splice").parse(input)?;

    Ok((
        input,
        captures.map(|(captures, _)| captures).unwrap_or_default(),
    ))
}

/// `<ref><pos>` or `<ref><pos>?`
fn parse_position(input: &str) -> IResult<&str, Captures> {
    let (input, ref_start) = residue(input)?;
    let (input, start) = digit1.parse(input)?;
    let (input, unknown) = opt(char('?')).parse(input)?;

    Ok((
        input,
        Captures {
            ref_start: Some(String::from(ref_start)),
            start: Some(start.to_string()),
            variant: unknown.map(String::from),
            ..Default::default()
        },
    ))
}

/// `<refs><pos>[<vars>]` with more than one residue on either side.
fn parse_replacement(input: &str) -> IResult<&str, Captures> {
    let (input, ref_start) = residues(input)?;
    let (input, start) = digit1.parse(input)?;
    let (input, variant) =
        take_while(|c: char| c.is_ascii_uppercase() || c == '*' || c == '?').parse(input)?;
    if ref_start.len() < 2 && variant.len() < 2 {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Verify,
        )));
    }

    Ok((
        input,
        Captures {
            ref_start: Some(ref_start.to_string()),
            start: Some(start.to_string()),
            variant: (!variant.is_empty()).then(|| variant.to_string()),
            ..Default::default()
        },
    ))
}

fn parse_range(input: &str) -> IResult<&str, Captures> {
    let (input, captures) = range_location(input)?;
    let (input, suffix) = opt(alt((tag("mis"), tag("trunc"), tag("mut")))).parse(input)?;

    Ok((
        input,
        Captures {
            suffix: suffix.map(String::from),
            ..captures
        },
    ))
}

/// Keywords that may follow a protein range.
const RANGE_KEYWORDS: &[&str] = &["mis", "ins", "del", "fs", "trunc", "dup", "mut"];

/// Suggest a correction for a protein range followed by an unknown word.
///
/// For `1_100msi` this is `1_100mis`, the range keyword with the greatest
/// Jaro-Winkler similarity.  Returns `None` if `notation` is not of that shape.
pub fn suggest_range_keyword(notation: &str) -> Option<String> {
    let location = notation.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    let word = notation[location.len()..].to_ascii_lowercase();
    if word.is_empty() || all_consuming(range_location).parse(location).is_err() {
        return None;
    }

    let (keyword, _) = RANGE_KEYWORDS
        .iter()
        .map(|keyword| (keyword, strsim::jaro_winkler(&word, keyword)))
        .reduce(|best, next| if next.1 > best.1 { next } else { best })?;
    Some(format!("{}{}", location, keyword))
}
