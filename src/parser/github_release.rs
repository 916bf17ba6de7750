//! GitHub Releases API parser
//!
//! Expects the body of `GET /repos/{owner}/{repo}/releases/latest`.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::warn;

use crate::checksum::HashAlgorithm;
use crate::parser::traits::{ParseError, VersionParser, excerpt, validate_version};
use crate::parser::types::{Arch, VersionRecord};

/// Response from GitHub Releases API
#[derive(Debug, Deserialize)]
struct Release {
    tag_name: Option<String>,
    tarball_url: Option<String>,
    #[serde(default)]
    assets: Vec<Asset>,
}

#[derive(Debug, Deserialize)]
struct Asset {
    name: String,
    browser_download_url: String,
    /// e.g. `sha256:2fd4e1c6...`
    digest: Option<String>,
}

pub struct GitHubReleaseParser;

impl GitHubReleaseParser {
    pub const ID: &'static str = "GitHubReleaseParser";

    fn release(payload: &str) -> Result<Release, ParseError> {
        serde_json::from_str(payload)
            .map_err(|e| ParseError::malformed(format!("not a GitHub release: {e}"), payload))
    }

    /// Names an asset may use for an architecture
    fn aliases(arch: Arch) -> &'static [&'static str] {
        match arch {
            Arch::X86_64 => &["x86_64", "amd64", "x64"],
            Arch::Aarch64 => &["aarch64", "arm64"],
            Arch::Loong64 => &["loong64", "loongarch64"],
            Arch::Mips64el => &["mips64el", "mips64le"],
        }
    }

    /// Checksum and signature files published next to the real artifacts
    const SIDECAR_SUFFIXES: &'static [&'static str] = &[
        ".sha256", ".sha512", ".sha256sum", ".sha512sum", ".md5", ".sig", ".asc", ".minisig",
        ".pem",
    ];

    fn is_artifact(asset: &Asset) -> bool {
        let name = asset.name.to_ascii_lowercase();
        !Self::SIDECAR_SUFFIXES
            .iter()
            .any(|suffix| name.ends_with(suffix))
    }

    fn asset_for(release: &Release, arch: Arch) -> Option<&Asset> {
        let aliases = Self::aliases(arch);
        release
            .assets
            .iter()
            .filter(|asset| Self::is_artifact(asset))
            .find(|asset| {
                let name = asset.name.to_ascii_lowercase();
                aliases.iter().any(|alias| name.contains(alias))
            })
    }

    /// `v1.2.3-beta` → `1.2.3_beta`
    fn normalize_tag(tag: &str) -> String {
        let tag = tag.trim();
        let tag = tag.strip_prefix('v').unwrap_or(tag);
        tag.replace('-', "_")
    }

    fn parse_digest(digest: &str) -> Option<(HashAlgorithm, String)> {
        let (algorithm, value) = digest.split_once(':')?;
        match algorithm.parse::<HashAlgorithm>() {
            Ok(algorithm) => Some((algorithm, value.to_string())),
            Err(_) => {
                warn!("Ignoring asset digest with unsupported algorithm: {}", digest);
                None
            }
        }
    }
}

impl VersionParser for GitHubReleaseParser {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn parse_version(&self, payload: &str) -> Result<VersionRecord, ParseError> {
        let release = Self::release(payload)?;

        let tag = release
            .tag_name
            .as_deref()
            .filter(|tag| !tag.trim().is_empty())
            .ok_or_else(|| ParseError::missing_field("tag_name", payload))?;
        let version = Self::normalize_tag(tag);
        validate_version(&version)?;

        let primary = Self::asset_for(&release, Arch::X86_64)
            .or_else(|| release.assets.iter().find(|a| Self::is_artifact(a)));
        let download_url = match (primary, release.tarball_url.as_deref()) {
            (Some(asset), _) => asset.browser_download_url.clone(),
            (None, Some(tarball)) => tarball.to_string(),
            (None, None) => return Err(ParseError::missing_field("assets", payload)),
        };

        let arch_urls: BTreeMap<Arch, String> = Arch::ALL
            .into_iter()
            .filter_map(|arch| {
                Self::asset_for(&release, arch).map(|a| (arch, a.browser_download_url.clone()))
            })
            .collect();

        let mut record = VersionRecord::new(version, download_url).with_arch_urls(arch_urls);
        if let Some((algorithm, checksum)) = primary
            .and_then(|asset| asset.digest.as_deref())
            .and_then(Self::parse_digest)
        {
            record = record.with_checksum(algorithm, checksum);
        }
        Ok(record)
    }

    fn parse_deb_url(&self, arch: Arch, payload: &str) -> Result<String, ParseError> {
        let release = Self::release(payload)?;
        Self::asset_for(&release, arch)
            .map(|asset| asset.browser_download_url.clone())
            .ok_or_else(|| ParseError::UnsupportedArch {
                arch,
                excerpt: excerpt(payload),
            })
    }
}
