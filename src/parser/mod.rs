//! Ecosystem-specific index parsers.
//!
//! Every parser consumes the decompressed index text produced by
//! [`crate::fetch::IndexFetcher`] and emits [`RawPackage`] records with the
//! shared normalization rules from [`crate::package`] applied: dependency
//! tokens reduced to bare names, descriptions cleaned and truncated.
//! Malformed individual records are skipped; a fatal decode error (invalid
//! XML) aborts the run.

pub mod alpine;
pub mod archlinux;
pub mod centos;
pub mod debian;

use crate::ecosystem::Ecosystem;
use crate::error::Result;
use crate::package::RawPackage;

/// Parse a fetched index into package records.
pub fn parse_index(ecosystem: Ecosystem, text: &str) -> Result<Vec<RawPackage>> {
    match ecosystem {
        Ecosystem::Alpine => Ok(alpine::parse(text)),
        Ecosystem::Archlinux => Ok(archlinux::parse(text)),
        Ecosystem::Debian => Ok(debian::parse(text)),
        Ecosystem::Centos => centos::parse(text),
    }
}
