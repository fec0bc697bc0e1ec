//! Parsing and classification of curated cancer alterations.
//!
//! The core is [`alteration::ProteinChangeParser`] which turns free-text
//! protein change notation such as `V600E`, `T599delinsIP`, or `*757Kext*`
//! into structured records.  [`alteration::dispatch`] classifies whole
//! alteration strings (fusions, copy number changes, exon alterations) before
//! handing protein changes to the parser.

pub mod alteration;
pub mod batch;
pub mod cancer_type;
pub mod common;
pub mod parse;
pub mod verify;
