//! Alpine APKINDEX parser.
//!
//! Entries are blank-line-separated stanzas of `K:value` lines. Only the
//! fields the pipeline needs are read: `P` (name), `V` (version), `D`
//! (space-separated depends tokens), `T` (description), `U` (homepage).

use crate::package::{RawPackage, clean_description, normalize_dep_token};

pub fn parse(text: &str) -> Vec<RawPackage> {
    let mut packages = Vec::new();

    for entry in text.split("\n\n") {
        let mut pkg = RawPackage::default();
        for line in entry.lines() {
            let Some((key, value)) = line.split_at_checked(2) else {
                continue;
            };
            match key {
                "P:" => pkg.name = value.to_string(),
                "V:" => pkg.version = value.to_string(),
                "T:" => pkg.description = clean_description(value, false),
                "U:" => pkg.homepage = value.trim().to_string(),
                "D:" => {
                    pkg.depends = value
                        .split_whitespace()
                        .filter_map(normalize_dep_token)
                        .collect();
                }
                _ => {}
            }
        }
        if !pkg.name.is_empty() {
            packages.push(pkg);
        }
    }

    packages
}
