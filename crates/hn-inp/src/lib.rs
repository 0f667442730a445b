//! hn-inp: reader for EPANET-style network description files.
//!
//! The text is organised in bracketed sections (`[JUNCTIONS]`, `[PIPES]`,
//! `[OPTIONS]`, ...). Sections may appear in any order and may refer to
//! elements declared later in the file. A parse either returns a fully
//! validated [`WaterNetwork`] or an error; it never hands out a partial
//! network.
//!
//! ```
//! let text = "\
//! [RESERVOIRS]
//! R1 100
//! [JUNCTIONS]
//! J1 50 10
//! [PIPES]
//! P1 R1 J1 1000 12 100
//! ";
//! let net = hn_inp::parse_str(text).unwrap();
//! assert_eq!(net.statistics().total_links, 1);
//! ```

use std::path::Path;

use hn_core::{HnResult, ValidationError};
use hn_network::WaterNetwork;
use serde::Deserialize;

mod fields;
mod reader;
mod records;
pub mod section;
mod settings;

/// What to do with a record whose element fails its validation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidRecordPolicy {
    /// Fail the whole parse.
    #[default]
    Abort,
    /// Drop the record and report it in [`ParseOutcome::skipped`].
    Skip,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    pub invalid_records: InvalidRecordPolicy,
}

impl ParseOptions {
    pub fn skip_invalid() -> Self {
        Self {
            invalid_records: InvalidRecordPolicy::Skip,
        }
    }
}

#[derive(Debug)]
pub struct ParseOutcome {
    pub network: WaterNetwork,
    /// Records dropped under [`InvalidRecordPolicy::Skip`], in file order.
    pub skipped: Vec<ValidationError>,
}

/// Parse with the default fail-fast policy.
pub fn parse_str(text: &str) -> HnResult<WaterNetwork> {
    parse_str_with(text, &ParseOptions::default()).map(|outcome| outcome.network)
}

pub fn parse_str_with(text: &str, options: &ParseOptions) -> HnResult<ParseOutcome> {
    reader::parse(text, options)
}

pub fn read_file(path: &Path) -> HnResult<WaterNetwork> {
    read_file_with(path, &ParseOptions::default()).map(|outcome| outcome.network)
}

/// Only failures of the read itself are I/O errors; undecodable bytes in
/// the data are reported as a [`hn_core::FormatError`] with their line.
pub fn read_file_with(path: &Path, options: &ParseOptions) -> HnResult<ParseOutcome> {
    let bytes = std::fs::read(path)?;
    let text = section::decode_source(&bytes)?;
    parse_str_with(&text, options)
}
