//! Supported package ecosystems and their index locations.

use clap::ValueEnum;
use std::fmt;

/// A Linux-distribution package ecosystem the collector understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Ecosystem {
    Archlinux,
    Debian,
    Centos,
    Alpine,
}

impl Ecosystem {
    pub const ALL: [Ecosystem; 4] = [
        Ecosystem::Archlinux,
        Ecosystem::Debian,
        Ecosystem::Centos,
        Ecosystem::Alpine,
    ];

    /// Table-name prefix for `<distro>_packages` / `<distro>_relationships`.
    pub fn table_prefix(&self) -> &'static str {
        match self {
            Ecosystem::Archlinux => "arch",
            Ecosystem::Debian => "debian",
            Ecosystem::Centos => "centos",
            Ecosystem::Alpine => "alpine",
        }
    }

    pub fn packages_table(&self) -> String {
        format!("{}_packages", self.table_prefix())
    }

    pub fn relationships_table(&self) -> String {
        format!("{}_relationships", self.table_prefix())
    }

    /// Index blob URLs, one per architecture/repository where the
    /// distribution splits its index.
    pub fn index_urls(&self) -> Vec<String> {
        match self {
            Ecosystem::Alpine => ALPINE_ARCHES
                .iter()
                .map(|arch| format!("{ALPINE_MIRROR}/v3.21/main/{arch}/APKINDEX.tar.gz"))
                .collect(),
            Ecosystem::Archlinux => ARCH_REPOS
                .iter()
                .map(|repo| format!("{ARCH_MIRROR}/{repo}/os/x86_64/{repo}.db.tar.gz"))
                .collect(),
            Ecosystem::Debian => {
                vec![format!(
                    "{DEBIAN_MIRROR}/dists/stable/main/binary-amd64/Packages.gz"
                )]
            }
            // CentOS publishes primary.xml.gz under a content-hash name;
            // the fetcher resolves it through repodata/repomd.xml.
            Ecosystem::Centos => vec![format!("{CENTOS_MIRROR}/repodata/repomd.xml")],
        }
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Ecosystem::Archlinux => "archlinux",
            Ecosystem::Debian => "debian",
            Ecosystem::Centos => "centos",
            Ecosystem::Alpine => "alpine",
        };
        write!(f, "{name}")
    }
}

const ALPINE_MIRROR: &str = "https://dl-cdn.alpinelinux.org/alpine";
const ALPINE_ARCHES: [&str; 1] = ["x86_64"];

const ARCH_MIRROR: &str = "https://mirrors.kernel.org/archlinux";
const ARCH_REPOS: [&str; 2] = ["core", "extra"];

const DEBIAN_MIRROR: &str = "https://deb.debian.org/debian";

const CENTOS_MIRROR: &str = "https://vault.centos.org/7.9.2009/os/x86_64";
