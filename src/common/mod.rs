//! Commonly used code.

use std::path::PathBuf;

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};

use crate::alteration::{csq, Config, ProteinChangeParser};

pub mod io;

/// Commonly used command line arguments.
#[derive(Parser, Debug, Default)]
pub struct Args {
    /// Verbosity of the program
    #[clap(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

/// Command line arguments for configuring the protein change parser.
#[derive(Parser, Debug, Clone)]
pub struct ParserArgs {
    /// Path to TSV file with consequence terms, the built-in table is used if omitted.
    #[arg(long)]
    pub path_consequences: Option<PathBuf>,

    /// Maximal length of an alteration.
    #[arg(long, default_value_t = 512)]
    pub max_input_len: usize,

    /// Keep an HGVS `p.` prefix instead of stripping it.
    #[arg(long, default_value_t = false)]
    pub keep_protein_prefix: bool,
}

impl Default for ParserArgs {
    fn default() -> Self {
        Self {
            path_consequences: None,
            max_input_len: 512,
            keep_protein_prefix: false,
        }
    }
}

impl ParserArgs {
    /// Construct the parser, loading the consequence terms.
    pub fn build_parser(&self) -> Result<ProteinChangeParser, anyhow::Error> {
        let provider = csq::load_provider(self.path_consequences.as_deref())?;
        let config = Config {
            max_input_len: self.max_input_len,
            strip_protein_prefix: !self.keep_protein_prefix,
            ..Default::default()
        };
        Ok(ProteinChangeParser::new(provider, config))
    }
}

/// The version of `oncokb-curation` package.
#[cfg(not(test))]
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// This allows us to override the version to `0.0.0` in tests.
pub fn version() -> &'static str {
    #[cfg(test)]
    return "0.0.0";
    #[cfg(not(test))]
    return VERSION;
}
