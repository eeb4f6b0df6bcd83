//! Parsed package records and the normalization rules shared by every
//! index parser.

/// The schema caps `description` at VARCHAR(255); keep one below it so the
/// value always fits.
pub const DESCRIPTION_MAX: usize = 254;

/// A package record as emitted by an index parser.
///
/// `depends` holds bare package names with namespace prefixes and version
/// constraints already stripped. Records are immutable once parsed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPackage {
    pub name: String,
    pub version: String,
    pub description: String,
    pub homepage: String,
    pub depends: Vec<String>,
}

/// Reduce a dependency token to a bare package name.
///
/// Strips a leading `namespace:` prefix (Alpine `so:`, `cmd:`, `pc:`) and
/// cuts at the first version-constraint operator, so `libc:foo>=1.2`,
/// `libc:foo=1.2` and `foo<2` all yield `foo`. Returns `None` when nothing
/// is left.
pub fn normalize_dep_token(token: &str) -> Option<String> {
    let token = token.trim();
    let token = match token.find(':') {
        Some(idx) => &token[idx + 1..],
        None => token,
    };
    let end = token
        .find(|c| c == '=' || c == '<' || c == '>')
        .unwrap_or(token.len());
    let name = token[..end].trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Clean a descriptive field: drop NUL bytes, optionally drop non-ASCII
/// (the RPM metadata path), and truncate to the schema width.
pub fn clean_description(text: &str, ascii_only: bool) -> String {
    let cleaned: String = text
        .chars()
        .filter(|&c| c != '\0' && (!ascii_only || c.is_ascii()))
        .collect();
    truncate_chars(&cleaned, DESCRIPTION_MAX)
}

/// Truncate to at most `max` characters on a char boundary.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        text.chars().take(max).collect()
    }
}
