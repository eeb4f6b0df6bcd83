//! Debian `Packages` stanza parser.
//!
//! Stanzas are blank-line-separated `Field: value` records. `Depends` is a
//! comma-separated list where each element may carry a version constraint
//! in parentheses, an architecture qualifier (`foo:any`), and `|`
//! alternatives; the first alternative is taken and reduced to its bare
//! name.

use crate::package::{RawPackage, clean_description};

pub fn parse(text: &str) -> Vec<RawPackage> {
    let mut packages = Vec::new();
    let mut pkg = RawPackage::default();

    for line in text.lines() {
        if line.is_empty() {
            if !pkg.name.is_empty() {
                packages.push(std::mem::take(&mut pkg));
            } else {
                pkg = RawPackage::default();
            }
            continue;
        }
        // Continuation lines (long descriptions) are not stored.
        if line.starts_with(' ') || line.starts_with('\t') {
            continue;
        }
        let Some((field, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match field {
            "Package" => pkg.name = value.to_string(),
            "Version" => pkg.version = value.to_string(),
            "Homepage" => pkg.homepage = value.to_string(),
            "Description" => pkg.description = clean_description(value, false),
            "Depends" | "Pre-Depends" => {
                pkg.depends
                    .extend(value.split(',').filter_map(depends_token));
            }
            _ => {}
        }
    }
    if !pkg.name.is_empty() {
        packages.push(pkg);
    }

    packages
}

/// Reduce one `Depends` element to a bare package name: first alternative,
/// no version constraint, no architecture qualifier.
fn depends_token(element: &str) -> Option<String> {
    let first = element.split('|').next()?.trim();
    let bare = first
        .split(|c| c == '(' || c == ' ')
        .next()
        .unwrap_or_default();
    let name = bare.split(':').next().unwrap_or_default().trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
