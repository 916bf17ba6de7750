//! Linux QQ parser
//!
//! The QQ download page ships a small JS config whose `params` object lists
//! one download per architecture:
//!
//! ```text
//! var params= {"version":"3.2.19-39038",
//!   "x64DownloadUrl":{"deb":"https://dldir1.qq.com/.../QQ_3.2.19_250904_amd64_01.deb", ...},
//!   "armDownloadUrl":{"deb":"https://dldir1.qq.com/.../QQ_3.2.19_250904_arm64_01.deb", ...},
//!   "loongarchDownloadUrl":"https://dldir1.qq.com/.../QQ_3.2.19_250904_loongarch64_01.deb",
//!   ...};
//! ```
//!
//! The package version is taken from the x86_64 file name, which carries the
//! build number (`3.2.19_250904`) that the `version` field omits.

use std::collections::BTreeMap;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::parser::traits::{ParseError, VersionParser, excerpt, validate_version};
use crate::parser::types::{Arch, VersionRecord};

pub struct QQParser {
    /// Matches `var params = {...};`
    params_re: Regex,
    /// Matches the version in `QQ_3.2.19_250904_amd64_01.deb`
    version_re: Regex,
}

impl QQParser {
    pub const ID: &'static str = "QQParser";

    pub fn new() -> Self {
        Self {
            params_re: Regex::new(r"(?s)var\s+params\s*=\s*(\{.*?\});").unwrap(),
            version_re: Regex::new(r"QQ_([\d._]+)_amd64").unwrap(),
        }
    }

    fn params(&self, payload: &str) -> Result<Value, ParseError> {
        let caps = self
            .params_re
            .captures(payload)
            .ok_or_else(|| ParseError::missing_field("var params", payload))?;
        let object = &caps[1];

        serde_json::from_str(object)
            .map_err(|e| ParseError::malformed(format!("params is not valid JSON: {e}"), object))
    }

    fn url_key(arch: Arch) -> &'static str {
        match arch {
            Arch::X86_64 => "x64DownloadUrl",
            Arch::Aarch64 => "armDownloadUrl",
            Arch::Loong64 => "loongarchDownloadUrl",
            Arch::Mips64el => "mipsDownloadUrl",
        }
    }

    /// The entry is either `{"deb": url, ...}` or, for some architectures, the URL itself
    fn deb_url(params: &Value, arch: Arch) -> Option<String> {
        let entry = params.get(Self::url_key(arch))?;
        let url = match entry {
            Value::String(url) => url.as_str(),
            Value::Object(map) => map.get("deb")?.as_str()?,
            _ => return None,
        };
        let url = url.trim();
        (!url.is_empty()).then(|| url.to_string())
    }
}

impl Default for QQParser {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionParser for QQParser {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn parse_version(&self, payload: &str) -> Result<VersionRecord, ParseError> {
        let params = self.params(payload)?;

        let download_url = Self::deb_url(&params, Arch::X86_64).ok_or_else(|| {
            ParseError::missing_field(&format!("{}.deb", Self::url_key(Arch::X86_64)), payload)
        })?;

        let version = self
            .version_re
            .captures(&download_url)
            .map(|caps| caps[1].to_string())
            .ok_or_else(|| {
                ParseError::malformed("no QQ_<version>_amd64 in download URL", &download_url)
            })?;
        validate_version(&version)?;

        let arch_urls: BTreeMap<Arch, String> = Arch::ALL
            .into_iter()
            .filter_map(|arch| Self::deb_url(&params, arch).map(|url| (arch, url)))
            .collect();
        debug!("QQ {} offers {} architectures", version, arch_urls.len());

        Ok(VersionRecord::new(version, download_url).with_arch_urls(arch_urls))
    }

    fn parse_deb_url(&self, arch: Arch, payload: &str) -> Result<String, ParseError> {
        let params = self.params(payload)?;
        Self::deb_url(&params, arch).ok_or_else(|| ParseError::UnsupportedArch {
            arch,
            excerpt: excerpt(payload),
        })
    }
}
