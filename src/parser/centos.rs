//! CentOS/RPM `primary.xml` parser.
//!
//! Streaming walk over `<package type="rpm">` elements. Version is
//! rendered as `epoch:ver-rel`; depends tokens come from the
//! `<rpm:entry name="…">` elements inside the `rpm:requires` group.
//! RPM metadata in the wild carries NUL bytes and broken encodings, so
//! descriptive fields are reduced to ASCII before they reach the schema.

use crate::error::Result;
use crate::package::{RawPackage, clean_description};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashSet;

#[derive(Clone, Copy)]
enum TextField {
    Name,
    Description,
    Url,
}

pub fn parse(xml: &str) -> Result<Vec<RawPackage>> {
    // NUL bytes upset the XML reader before any per-field cleaning runs.
    let xml = xml.replace('\0', "");

    let mut reader = Reader::from_str(&xml);
    reader.trim_text(true);

    let mut packages: Vec<RawPackage> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    let mut current: Option<RawPackage> = None;
    let mut in_requires = false;
    let mut text_field: Option<TextField> = None;
    let mut text_buf = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"package" => {
                    if attr_value(&e, b"type")?.as_deref() == Some("rpm") {
                        current = Some(RawPackage::default());
                    }
                }
                b"name" if current.is_some() => {
                    text_field = Some(TextField::Name);
                    text_buf.clear();
                }
                b"description" if current.is_some() => {
                    text_field = Some(TextField::Description);
                    text_buf.clear();
                }
                b"url" if current.is_some() => {
                    text_field = Some(TextField::Url);
                    text_buf.clear();
                }
                b"version" => {
                    if let Some(pkg) = current.as_mut() {
                        pkg.version = format_version(&e)?;
                    }
                }
                b"requires" => in_requires = true,
                b"entry" if in_requires => {
                    if let (Some(pkg), Some(name)) = (current.as_mut(), attr_value(&e, b"name")?) {
                        pkg.depends.push(name);
                    }
                }
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"version" => {
                    if let Some(pkg) = current.as_mut() {
                        pkg.version = format_version(&e)?;
                    }
                }
                b"entry" if in_requires => {
                    if let (Some(pkg), Some(name)) = (current.as_mut(), attr_value(&e, b"name")?) {
                        pkg.depends.push(name);
                    }
                }
                _ => {}
            },
            Event::Text(t) => {
                if text_field.is_some() {
                    text_buf.push_str(&t.unescape()?);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"package" => {
                    if let Some(pkg) = current.take() {
                        if !pkg.name.is_empty() && seen.insert(pkg.name.clone()) {
                            packages.push(pkg);
                        }
                    }
                    in_requires = false;
                }
                b"requires" => in_requires = false,
                b"name" | b"description" | b"url" => {
                    if let (Some(field), Some(pkg)) = (text_field.take(), current.as_mut()) {
                        match field {
                            TextField::Name => pkg.name = text_buf.trim().to_string(),
                            TextField::Description => {
                                pkg.description = clean_description(&text_buf, true);
                            }
                            TextField::Url => pkg.homepage = ascii_clean(text_buf.trim()),
                        }
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(packages)
}

fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn format_version(e: &BytesStart<'_>) -> Result<String> {
    let epoch = attr_value(e, b"epoch")?.unwrap_or_default();
    let ver = attr_value(e, b"ver")?.unwrap_or_default();
    let rel = attr_value(e, b"rel")?.unwrap_or_default();
    Ok(format!("{epoch}:{ver}-{rel}"))
}

fn ascii_clean(text: &str) -> String {
    text.chars()
        .filter(|&c| c != '\0' && c.is_ascii())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::DESCRIPTION_MAX;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<metadata xmlns="http://linux.duke.edu/metadata/common" xmlns:rpm="http://linux.duke.edu/metadata/rpm" packages="2">
  <package type="rpm">
    <name>bash</name>
    <arch>x86_64</arch>
    <version epoch="0" ver="4.2.46" rel="35.el7"/>
    <summary>The GNU Bourne Again shell</summary>
    <description>The GNU Bourne Again shell (Bash).</description>
    <url>http://www.gnu.org/software/bash</url>
    <format>
      <rpm:provides>
        <rpm:entry name="bash-provides"/>
      </rpm:provides>
      <rpm:requires>
        <rpm:entry name="glibc" flags="GE" epoch="0" ver="2.15"/>
        <rpm:entry name="ncurses-libs"/>
      </rpm:requires>
    </format>
  </package>
  <package type="rpm">
    <name>glibc</name>
    <version epoch="0" ver="2.17" rel="317.el7"/>
    <description>caf&#233; libc</description>
    <url>http://www.gnu.org/software/glibc/</url>
    <format>
      <rpm:requires/>
    </format>
  </package>
  <package type="srpm">
    <name>ignored-source-package</name>
  </package>
</metadata>
"#;

    #[test]
    fn parses_rpm_packages() {
        let packages = parse(SAMPLE).unwrap();
        assert_eq!(packages.len(), 2);

        let bash = &packages[0];
        assert_eq!(bash.name, "bash");
        assert_eq!(bash.version, "0:4.2.46-35.el7");
        assert_eq!(bash.homepage, "http://www.gnu.org/software/bash");
        assert_eq!(bash.depends, vec!["glibc", "ncurses-libs"]);
    }

    #[test]
    fn provides_entries_are_not_depends() {
        let packages = parse(SAMPLE).unwrap();
        assert!(!packages[0].depends.contains(&"bash-provides".to_string()));
    }

    #[test]
    fn non_rpm_packages_skipped() {
        let packages = parse(SAMPLE).unwrap();
        assert!(packages.iter().all(|p| p.name != "ignored-source-package"));
    }

    #[test]
    fn description_reduced_to_ascii() {
        let packages = parse(SAMPLE).unwrap();
        assert_eq!(packages[1].description, "caf libc");
    }

    #[test]
    fn duplicate_names_first_wins() {
        let xml = r#"<metadata xmlns:rpm="x">
  <package type="rpm"><name>a</name><version epoch="0" ver="1" rel="1"/><description>first</description></package>
  <package type="rpm"><name>a</name><version epoch="0" ver="2" rel="1"/><description>second</description></package>
</metadata>"#;
        let packages = parse(xml).unwrap();
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].description, "first");
    }

    #[test]
    fn long_description_truncated() {
        let body = "y".repeat(400);
        let xml = format!(
            r#"<m><package type="rpm"><name>long</name><description>{body}</description></package></m>"#
        );
        let packages = parse(&xml).unwrap();
        assert_eq!(packages[0].description.len(), DESCRIPTION_MAX);
    }

    #[test]
    fn nul_bytes_stripped_before_decode() {
        let xml = "<m><package type=\"rpm\"><name>n\0ul</name></package></m>";
        let packages = parse(xml).unwrap();
        assert_eq!(packages[0].name, "nul");
    }
}
