//! Classification of curator-entered alterations before protein change parsing.
//!
//! Fusions, copy number alterations, cDNA and genomic changes, and exon
//! alterations are recognized here.  Everything else is handed to the
//! [`ProteinChangeParser`].

use std::collections::BTreeSet;
use std::str::FromStr;

use itertools::Itertools;
use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while, take_while_m_n},
    character::complete::{char, digit1, multispace0, multispace1},
    combinator::{all_consuming, opt, rest},
    multi::separated_list1,
    sequence::preceded,
    IResult, Parser,
};
use parse_display::{Display, FromStr};
use strum::IntoEnumIterator;

use super::{Diagnostic, NotationKind, ParseStatus, ParsedAlteration, ProteinChangeParser};

/// Largest exon number accepted in exon alterations.
pub const MAX_EXON_NUMBER: u32 = 1000;

/// Type of an alteration.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    FromStr,
    serde::Deserialize,
    serde::Serialize,
    strum::EnumIter,
)]
#[display(style = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AlterationType {
    ProteinChange,
    StructuralVariant,
    CopyNumberAlteration,
    CdnaChange,
    GenomicChange,
}

/// Consequence of a copy number alteration.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    FromStr,
    serde::Deserialize,
    serde::Serialize,
    strum::EnumIter,
)]
#[display(style = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CnaConsequence {
    Amplification,
    Deletion,
    Gain,
    Loss,
}

/// Consequence of a structural variant.
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
pub enum SvConsequence {
    #[display("sv_deletion")]
    #[serde(rename = "sv_deletion")]
    Deletion,
    #[display("sv_insertion")]
    #[serde(rename = "sv_insertion")]
    Insertion,
    #[display("sv_duplication")]
    #[serde(rename = "sv_duplication")]
    Duplication,
    #[display("sv_fusion")]
    #[serde(rename = "sv_fusion")]
    Fusion,
    #[display("sv_unknown")]
    #[serde(rename = "sv_unknown")]
    Unknown,
}

impl SvConsequence {
    /// Word used in exon alteration names, e.g., `Deletion`.
    fn exon_term(&self) -> &'static str {
        match self {
            SvConsequence::Deletion => "Deletion",
            SvConsequence::Insertion => "Insertion",
            SvConsequence::Duplication => "Duplication",
            SvConsequence::Fusion => "Fusion",
            SvConsequence::Unknown => "Unknown",
        }
    }
}

/// A classified alteration.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Alteration {
    pub alteration_type: AlterationType,
    /// Canonical alteration text.
    pub alteration: String,
    /// Display name, e.g., with consecutive exons collapsed.
    pub name: String,
    /// Genes involved in a fusion.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genes: Vec<String>,
    /// Consequence term, if determined.
    pub consequence: Option<String>,
    /// Result of protein change parsing.
    pub protein_change: Option<ParsedAlteration>,
}

impl Alteration {
    fn new(alteration_type: AlterationType, alteration: &str, consequence: Option<String>) -> Self {
        Self {
            alteration_type,
            alteration: alteration.to_string(),
            name: alteration.to_string(),
            genes: Vec::new(),
            consequence,
            protein_change: None,
        }
    }
}

/// Classify and parse a curator-entered alteration.
///
/// Returns `None` for empty input.
pub fn parse_alteration(
    parser: &ProteinChangeParser,
    raw: &str,
) -> Result<Option<ParseStatus<Alteration>>, anyhow::Error> {
    let alteration = raw.trim();
    if alteration.is_empty() {
        return Ok(None);
    }
    if alteration.chars().count() > parser.config().max_input_len {
        return parse_protein_change(parser, alteration).map(Some);
    }

    if let Some(fusion) = parse_fusion(alteration) {
        tracing::trace!("'{}' is a fusion", raw);
        return Ok(Some(ParseStatus::new(fusion)));
    }
    if let Ok(cna) = CnaConsequence::from_str(&alteration.to_lowercase()) {
        tracing::trace!("'{}' is a copy number alteration", raw);
        let name = capitalize(&cna.to_string());
        return Ok(Some(ParseStatus::new(Alteration::new(
            AlterationType::CopyNumberAlteration,
            &name,
            Some(cna.to_string()),
        ))));
    }
    if alteration.starts_with("c.") {
        return Ok(Some(ParseStatus::new(Alteration::new(
            AlterationType::CdnaChange,
            alteration,
            None,
        ))));
    }
    if is_genomic_change(alteration) {
        return Ok(Some(ParseStatus::new(Alteration::new(
            AlterationType::GenomicChange,
            alteration,
            None,
        ))));
    }
    if let Some(exons) = parse_exon_alterations(alteration) {
        tracing::trace!("'{}' is an exon alteration", raw);
        return Ok(Some(exons));
    }
    if is_truncating_mutations(alteration) {
        return Ok(Some(ParseStatus::new(Alteration::new(
            AlterationType::ProteinChange,
            alteration,
            Some(super::csq::Consequence::FeatureTruncation.to_string()),
        ))));
    }

    parse_protein_change(parser, alteration).map(Some)
}

fn parse_protein_change(
    parser: &ProteinChangeParser,
    alteration: &str,
) -> Result<ParseStatus<Alteration>, anyhow::Error> {
    let status = parser.parse(alteration)?;
    Ok(status.map(|parsed| Alteration {
        name: protein_change_name(&parsed),
        protein_change: Some(parsed.clone()),
        ..Alteration::new(
            AlterationType::ProteinChange,
            &parsed.normalized_notation,
            parsed.consequence_term().map(String::from),
        )
    }))
}

/// Name of a protein change; a bare position names all missense mutations there.
fn protein_change_name(parsed: &ParsedAlteration) -> String {
    let is_positional = parsed.notation_kind == Some(NotationKind::Position)
        && parsed.variant_residues.is_none()
        && parsed.consequence_term() == Some("missense_variant");
    if !is_positional {
        return parsed.normalized_notation.clone();
    }

    match parsed.excluding.as_deref() {
        Some(excluding) => format!(
            "{} Missense Mutations, excluding {}",
            parsed.normalized_notation, excluding
        ),
        None => format!("{} Missense Mutations", parsed.normalized_notation),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// `GENE1::GENE2 [Fusion]`
fn fusion_double_colon(input: &str) -> IResult<&str, (&str, &str)> {
    let (input, _) = multispace0.parse(input)?;
    let (input, gene1) = take_while(is_word).parse(input)?;
    let (input, _) = tag("::").parse(input)?;
    let (input, gene2) = take_while(is_word).parse(input)?;
    let (input, _) = multispace0.parse(input)?;
    let (input, _) = opt(tag_no_case("fusion")).parse(input)?;
    let (input, _) = multispace0.parse(input)?;

    Ok((input, (gene1, gene2)))
}

/// `GENE1-GENE2 Fusion`
fn fusion_hyphen(input: &str) -> IResult<&str, (&str, &str)> {
    let (input, _) = multispace0.parse(input)?;
    let (input, gene1) = take_while(is_word).parse(input)?;
    let (input, _) = char('-').parse(input)?;
    let (input, gene2) = take_while(is_word).parse(input)?;
    let (input, _) = multispace1.parse(input)?;
    let (input, _) = tag_no_case("fusion").parse(input)?;
    let (input, _) = multispace0.parse(input)?;

    Ok((input, (gene1, gene2)))
}

fn parse_fusion(alteration: &str) -> Option<Alteration> {
    let consequence = Some(SvConsequence::Fusion.to_string());

    if alteration.eq_ignore_ascii_case("fusion") || alteration.eq_ignore_ascii_case("fusions") {
        return Some(Alteration::new(
            AlterationType::StructuralVariant,
            &capitalize(alteration),
            consequence,
        ));
    }

    let (_, (gene1, gene2)) = all_consuming(alt((fusion_double_colon, fusion_hyphen)))
        .parse(alteration)
        .ok()?;
    let genes = [gene1, gene2]
        .into_iter()
        .filter(|gene| !gene.is_empty())
        .map(String::from)
        .collect::<Vec<_>>();
    let name = format!("{} Fusion", genes.iter().join("-"));

    Some(Alteration {
        genes,
        ..Alteration::new(AlterationType::StructuralVariant, &name, consequence)
    })
}

/// `[chr:]g.<anything>`
fn is_genomic_change(alteration: &str) -> bool {
    fn chrom(input: &str) -> IResult<&str, &str> {
        alt((
            take_while_m_n(1, 2, |c: char| c.is_ascii_digit()),
            tag("X"),
            tag("Y"),
            tag("MT"),
        ))
        .parse(input)
    }

    all_consuming((opt((chrom, char(':'))), tag("g."), rest))
        .parse(alteration)
        .is_ok()
}

fn is_truncating_mutations(alteration: &str) -> bool {
    let lower = alteration.to_lowercase();
    lower == "truncating mutation" || lower == "truncating mutations"
}

/// One `[Any ]Exon <n>[-<m>] <Consequence>` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ExonAlteration {
    is_any: bool,
    start: u32,
    end: u32,
    consequence: SvConsequence,
}

impl ExonAlteration {
    fn name(&self) -> String {
        exon_name(self.is_any, self.start, self.end, self.consequence)
    }
}

fn exon_name(is_any: bool, start: u32, end: u32, consequence: SvConsequence) -> String {
    let prefix = if is_any { "Any " } else { "" };
    if start == end {
        format!("{}Exon {} {}", prefix, start, consequence.exon_term())
    } else {
        format!(
            "{}Exon {}-{} {}",
            prefix,
            start,
            end,
            consequence.exon_term()
        )
    }
}

fn exon_number(input: &str) -> IResult<&str, u32> {
    let (rest, digits) = digit1.parse(input)?;
    let number = digits.parse::<u32>().map_err(|_| {
        nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Digit))
    })?;

    Ok((rest, number))
}

fn exon_alteration(input: &str) -> IResult<&str, ExonAlteration> {
    let (input, any) = opt((tag_no_case("any"), multispace1)).parse(input)?;
    let (input, _) = tag_no_case("exon").parse(input)?;
    let (input, _) = multispace1.parse(input)?;
    let (input, start) = exon_number(input)?;
    let (input, end) = opt(preceded(char('-'), exon_number)).parse(input)?;
    let (input, _) = multispace1.parse(input)?;
    let (input, consequence) = alt((
        tag_no_case("deletion"),
        tag_no_case("insertion"),
        tag_no_case("duplication"),
    ))
    .parse(input)?;

    let consequence = match consequence.to_lowercase().as_str() {
        "deletion" => SvConsequence::Deletion,
        "insertion" => SvConsequence::Insertion,
        _ => SvConsequence::Duplication,
    };
    let end = end.unwrap_or(start);

    Ok((
        input,
        ExonAlteration {
            is_any: any.is_some(),
            start: start.min(end),
            end: start.max(end),
            consequence,
        },
    ))
}

fn exon_alterations(input: &str) -> IResult<&str, Vec<ExonAlteration>> {
    separated_list1((multispace0, char('+'), multispace0), exon_alteration).parse(input)
}

fn parse_exon_alterations(alteration: &str) -> Option<ParseStatus<Alteration>> {
    let (_, exons) = all_consuming(exon_alterations).parse(alteration).ok()?;

    let largest_exon = exons.iter().map(|exon| exon.end).max();
    if let Some(exon) = largest_exon.filter(|&exon| exon > MAX_EXON_NUMBER) {
        let mut status = ParseStatus::new(Alteration::new(
            AlterationType::StructuralVariant,
            alteration,
            None,
        ));
        status.push(Diagnostic::ExonOutOfRange {
            exon,
            max_exon: MAX_EXON_NUMBER,
        });
        return Some(status);
    }

    let consequences = exons.iter().map(|exon| exon.consequence).unique().collect::<Vec<_>>();
    let consequence = match consequences.as_slice() {
        [single] => *single,
        _ => SvConsequence::Unknown,
    };

    let mut split = Vec::new();
    let mut any_exons = Vec::new();
    let mut by_consequence: Vec<(SvConsequence, BTreeSet<u32>)> = SvConsequence::iter()
        .filter(|csq| {
            matches!(
                csq,
                SvConsequence::Deletion | SvConsequence::Insertion | SvConsequence::Duplication
            )
        })
        .map(|csq| (csq, BTreeSet::new()))
        .collect();
    for exon in &exons {
        if exon.is_any {
            split.push(exon.name());
            any_exons.push(exon.name());
            continue;
        }
        for number in exon.start..=exon.end {
            split.push(exon_name(false, number, number, exon.consequence));
            if let Some((_, numbers)) = by_consequence
                .iter_mut()
                .find(|(csq, _)| *csq == exon.consequence)
            {
                numbers.insert(number);
            }
        }
    }

    let mut names = by_consequence
        .iter()
        .filter(|(_, numbers)| !numbers.is_empty())
        .map(|(csq, numbers)| collapse_exons(*csq, numbers))
        .collect::<Vec<_>>();
    names.extend(any_exons);

    Some(ParseStatus::new(Alteration {
        name: names.join(" + "),
        ..Alteration::new(
            AlterationType::StructuralVariant,
            &split.join(" + "),
            Some(consequence.to_string()),
        )
    }))
}

/// Collapse sorted exon numbers into runs of consecutive exons.
fn collapse_exons(consequence: SvConsequence, numbers: &BTreeSet<u32>) -> String {
    let mut runs: Vec<(u32, u32)> = Vec::new();
    for &number in numbers {
        match runs.last_mut() {
            Some((_, end)) if *end + 1 == number => *end = number,
            _ => runs.push((number, number)),
        }
    }
    runs.into_iter()
        .map(|(start, end)| exon_name(false, start, end, consequence))
        .join(" + ")
}
