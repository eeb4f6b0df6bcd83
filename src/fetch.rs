//! HTTP index fetching and decompression.
//!
//! One [`IndexFetcher`] serves a whole ecosystem run. Each ecosystem
//! publishes its index differently:
//! - Alpine: `APKINDEX.tar.gz` per architecture; the `APKINDEX` member of
//!   the archive is the text index.
//! - Arch: `<repo>.db.tar.gz`; one directory per package holding `desc`
//!   (and, in old layouts, `depends`) descriptor files.
//! - Debian: flat `Packages.gz`.
//! - CentOS: `primary.xml.gz` published under a content-hash name, located
//!   through `repodata/repomd.xml`.
//!
//! Transport failures surface as [`CritError::Network`], malformed archives
//! as [`CritError::Decode`]; both abort the run.

use crate::ecosystem::Ecosystem;
use crate::error::{CritError, Result};
use flate2::read::GzDecoder;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::io::Read;
use std::time::Duration;
use tar::Archive;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub struct IndexFetcher {
    client: reqwest::Client,
}

impl IndexFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("critscore/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Fetch and decompress every index blob for `ecosystem`, returning
    /// the concatenated text the parser consumes.
    pub async fn fetch_index(&self, ecosystem: Ecosystem) -> Result<String> {
        let mut blobs = Vec::new();
        for url in ecosystem.index_urls() {
            let text = match ecosystem {
                Ecosystem::Alpine => apkindex_text(&self.get_bytes(&url).await?)?,
                Ecosystem::Archlinux => pacman_db_text(&self.get_bytes(&url).await?)?,
                Ecosystem::Debian => gunzip(&self.get_bytes(&url).await?)?,
                Ecosystem::Centos => {
                    let primary_url = self.resolve_primary_url(&url).await?;
                    gunzip(&self.get_bytes(&primary_url).await?)?
                }
            };
            blobs.push(text);
        }
        Ok(blobs.join("\n\n"))
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        debug!(url, "fetching index blob");
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Read `repomd.xml` and return the full URL of the primary metadata.
    async fn resolve_primary_url(&self, repomd_url: &str) -> Result<String> {
        let bytes = self.get_bytes(repomd_url).await?;
        let xml = String::from_utf8_lossy(&bytes);
        let href = primary_location(&xml)?.ok_or_else(|| {
            CritError::Decode("repomd.xml lists no primary metadata".to_string())
        })?;
        let base = repomd_url
            .trim_end_matches("repomd.xml")
            .trim_end_matches('/')
            .trim_end_matches("repodata")
            .trim_end_matches('/');
        Ok(format!("{base}/{href}"))
    }
}

/// Extract the `href` of the `<data type="primary">` location element.
fn primary_location(xml: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut in_primary = false;
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"data" => {
                    in_primary = e
                        .attributes()
                        .flatten()
                        .any(|a| a.key.as_ref() == b"type" && a.value.as_ref() == b"primary");
                }
                b"location" if in_primary => {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"href" {
                            return Ok(Some(attr.unescape_value()?.into_owned()));
                        }
                    }
                }
                _ => {}
            },
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

fn gunzip(data: &[u8]) -> Result<String> {
    let mut decoder = GzDecoder::new(data);
    let mut buf = Vec::new();
    decoder
        .read_to_end(&mut buf)
        .map_err(|e| CritError::Decode(format!("gzip: {e}")))?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Pull the `APKINDEX` member out of an `APKINDEX.tar.gz`.
fn apkindex_text(data: &[u8]) -> Result<String> {
    let mut archive = Archive::new(GzDecoder::new(data));
    let entries = archive
        .entries()
        .map_err(|e| CritError::Decode(format!("apkindex archive: {e}")))?;
    for entry in entries {
        let mut entry = entry.map_err(|e| CritError::Decode(format!("apkindex archive: {e}")))?;
        let is_index = entry
            .path()
            .map(|p| p.file_name().is_some_and(|n| n == "APKINDEX"))
            .unwrap_or(false);
        if is_index {
            let mut buf = Vec::new();
            entry
                .read_to_end(&mut buf)
                .map_err(|e| CritError::Decode(format!("apkindex entry: {e}")))?;
            return Ok(String::from_utf8_lossy(&buf).into_owned());
        }
    }
    Err(CritError::Decode(
        "no APKINDEX member in archive".to_string(),
    ))
}

/// Concatenate the per-package descriptor files of a pacman sync database.
fn pacman_db_text(data: &[u8]) -> Result<String> {
    let mut archive = Archive::new(GzDecoder::new(data));
    let entries = archive
        .entries()
        .map_err(|e| CritError::Decode(format!("pacman db archive: {e}")))?;
    let mut text = String::new();
    for entry in entries {
        let mut entry = entry.map_err(|e| CritError::Decode(format!("pacman db archive: {e}")))?;
        let is_descriptor = entry
            .path()
            .map(|p| {
                p.file_name()
                    .is_some_and(|n| n == "desc" || n == "depends")
            })
            .unwrap_or(false);
        if is_descriptor {
            let mut buf = Vec::new();
            entry
                .read_to_end(&mut buf)
                .map_err(|e| CritError::Decode(format!("pacman db entry: {e}")))?;
            text.push_str(&String::from_utf8_lossy(&buf));
            if !text.ends_with('\n') {
                text.push('\n');
            }
            text.push('\n');
        }
    }
    Ok(text)
}
