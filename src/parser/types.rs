//! Common types for parsers

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::checksum::HashAlgorithm;

/// Target architecture of a per-architecture source
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub enum Arch {
    #[serde(rename = "x86_64")]
    X86_64,
    #[serde(rename = "aarch64")]
    Aarch64,
    #[serde(rename = "loong64")]
    Loong64,
    #[serde(rename = "mips64el")]
    Mips64el,
}

impl Arch {
    pub const ALL: [Arch; 4] = [Arch::X86_64, Arch::Aarch64, Arch::Loong64, Arch::Mips64el];

    /// Returns the string representation used by makepkg
    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::X86_64 => "x86_64",
            Arch::Aarch64 => "aarch64",
            Arch::Loong64 => "loong64",
            Arch::Mips64el => "mips64el",
        }
    }
}

impl std::fmt::Display for Arch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Arch {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x86_64" => Ok(Arch::X86_64),
            "aarch64" => Ok(Arch::Aarch64),
            "loong64" => Ok(Arch::Loong64),
            "mips64el" => Ok(Arch::Mips64el),
            _ => Err(()),
        }
    }
}

/// Which `source`/checksum arrays of a PKGBUILD an artifact belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceTarget {
    /// `source=()`, `sha512sums=()`
    Generic,
    /// `source_<arch>=()`, `sha512sums_<arch>=()`
    Arch(Arch),
}

impl SourceTarget {
    /// Variable name suffix, e.g. `""` or `"_x86_64"`
    pub fn suffix(&self) -> String {
        match self {
            SourceTarget::Generic => String::new(),
            SourceTarget::Arch(arch) => format!("_{}", arch.as_str()),
        }
    }

    /// Full variable name for a base field, e.g. `source_aarch64`
    pub fn field(&self, base: &str) -> String {
        format!("{}{}", base, self.suffix())
    }
}

impl std::fmt::Display for SourceTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceTarget::Generic => f.write_str("generic"),
            SourceTarget::Arch(arch) => f.write_str(arch.as_str()),
        }
    }
}

/// Normalized upstream release information produced by a parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRecord {
    /// Version usable verbatim as `pkgver`
    pub version: String,
    /// Primary artifact URL (architecture-independent, or x86_64)
    pub download_url: String,
    /// Digest of `download_url` when the source publishes one
    pub checksum: Option<String>,
    /// Algorithm of `checksum`
    pub checksum_algorithm: Option<HashAlgorithm>,
    /// Per-architecture artifact URLs
    pub arch_urls: BTreeMap<Arch, String>,
}

impl VersionRecord {
    pub fn new(version: impl Into<String>, download_url: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            download_url: download_url.into(),
            checksum: None,
            checksum_algorithm: None,
            arch_urls: BTreeMap::new(),
        }
    }

    pub fn with_checksum(mut self, algorithm: HashAlgorithm, checksum: impl Into<String>) -> Self {
        self.checksum = Some(checksum.into());
        self.checksum_algorithm = Some(algorithm);
        self
    }

    pub fn with_arch_urls(mut self, arch_urls: BTreeMap<Arch, String>) -> Self {
        self.arch_urls = arch_urls;
        self
    }

    /// Artifact URL for a PKGBUILD target
    pub fn url_for(&self, target: SourceTarget) -> Option<&str> {
        match target {
            SourceTarget::Generic => Some(self.download_url.as_str()),
            SourceTarget::Arch(arch) => self.arch_urls.get(&arch).map(String::as_str),
        }
    }

    /// Pre-supplied digest that applies to the artifact at `url`
    pub fn supplied_checksum(&self, url: &str) -> Option<(HashAlgorithm, &str)> {
        if url != self.download_url {
            return None;
        }
        match (self.checksum_algorithm, self.checksum.as_deref()) {
            (Some(algorithm), Some(checksum)) => Some((algorithm, checksum)),
            _ => None,
        }
    }
}
