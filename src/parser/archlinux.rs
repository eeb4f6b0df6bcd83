//! Arch Linux pacman sync-database parser.
//!
//! The fetcher concatenates the `desc` (and, in older layouts, `depends`)
//! files from the repository `.db.tar.gz`. Each file is a sequence of
//! `%FIELD%` headers followed by value lines; a `%FILENAME%` header opens
//! the next package record.

use crate::package::{RawPackage, clean_description, normalize_dep_token};

#[derive(Clone, Copy, PartialEq)]
enum Field {
    Name,
    Version,
    Desc,
    Url,
    Depends,
    Other,
}

pub fn parse(text: &str) -> Vec<RawPackage> {
    let mut packages = Vec::new();
    let mut pkg = RawPackage::default();
    let mut field = Field::Other;

    for line in text.lines() {
        if let Some(header) = line.strip_prefix('%').and_then(|l| l.strip_suffix('%')) {
            field = match header {
                "FILENAME" => {
                    if !pkg.name.is_empty() {
                        packages.push(std::mem::take(&mut pkg));
                    }
                    Field::Other
                }
                "NAME" => Field::Name,
                "VERSION" => Field::Version,
                "DESC" => Field::Desc,
                "URL" => Field::Url,
                "DEPENDS" => Field::Depends,
                _ => Field::Other,
            };
            continue;
        }
        if line.is_empty() {
            field = Field::Other;
            continue;
        }
        match field {
            Field::Name => pkg.name = line.trim().to_string(),
            Field::Version => pkg.version = line.trim().to_string(),
            Field::Desc => pkg.description = clean_description(line, false),
            Field::Url => pkg.homepage = line.trim().to_string(),
            Field::Depends => {
                if let Some(token) = normalize_dep_token(line) {
                    pkg.depends.push(token);
                }
            }
            Field::Other => {}
        }
    }
    if !pkg.name.is_empty() {
        packages.push(pkg);
    }

    packages
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
%FILENAME%
bash-5.2.026-2-x86_64.pkg.tar.zst

%NAME%
bash

%VERSION%
5.2.026-2

%DESC%
The GNU Bourne Again shell

%URL%
https://www.gnu.org/software/bash/

%DEPENDS%
readline
libreadline.so=8-64
glibc>=2.38

%FILENAME%
glibc-2.39-1-x86_64.pkg.tar.zst

%NAME%
glibc

%VERSION%
2.39-1

%DESC%
GNU C Library

%URL%
https://www.gnu.org/software/libc
";

    #[test]
    fn parses_desc_blocks() {
        let packages = parse(SAMPLE);
        assert_eq!(packages.len(), 2);

        let bash = &packages[0];
        assert_eq!(bash.name, "bash");
        assert_eq!(bash.version, "5.2.026-2");
        assert_eq!(bash.description, "The GNU Bourne Again shell");
        assert_eq!(bash.depends, vec!["readline", "libreadline.so", "glibc"]);

        assert_eq!(packages[1].name, "glibc");
        assert!(packages[1].depends.is_empty());
    }

    #[test]
    fn version_constraints_stripped() {
        let packages = parse(SAMPLE);
        assert!(packages[0].depends.contains(&"glibc".to_string()));
        assert!(!packages[0].depends.iter().any(|d| d.contains(">=")));
    }

    #[test]
    fn empty_input() {
        assert!(parse("").is_empty());
    }
}
