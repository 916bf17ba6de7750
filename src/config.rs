use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::parser::registry::ParserRegistry;
use crate::parser::types::Arch;

// =============================================================================
// Fetch-related constants
// =============================================================================

/// Timeout for a single HTTP request in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// User agent sent with every request; some vendor endpoints reject unknown clients
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
(KHTML, like Gecko) Chrome/140.0.4472.124 Safari/537.36";

/// Delay between starting each package update to avoid hammering shared hosts (10ms)
pub const FETCH_STAGGER_DELAY_MS: u64 = 10;

/// Configuration file looked up when none is given
pub const DEFAULT_CONFIG_FILE: &str = "packages.yaml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Yaml(#[from] serde_norway::Error),

    #[error("Package `{package}` uses unknown parser `{parser}` (known: {known})")]
    UnknownParser {
        package: String,
        parser: String,
        known: String,
    },

    #[error("Package `{package}` has an empty `{field}`")]
    EmptyField { package: String, field: &'static str },
}

/// Top-level configuration file
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct PackagesConfig {
    pub fetch: FetchSettings,
    /// Packages keyed by name, in file order
    pub packages: IndexMap<String, PackageConfig>,
}

/// HTTP client settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct FetchSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// One tracked AUR package
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PackageConfig {
    /// Package name; defaults to the key in `packages`
    #[serde(default)]
    pub name: String,
    /// Upstream source kind (informational, e.g. "qq", "github")
    pub source: String,
    /// URL of the metadata payload handed to the parser
    pub fetch_url: String,
    /// Upstream project page
    #[serde(default)]
    pub upstream: String,
    /// Parser identifier, see [`ParserRegistry`]
    pub parser: String,
    /// Path of the PKGBUILD, relative to the updater root unless absolute
    pub pkgbuild: PathBuf,
    /// Architectures with their own `source_<arch>` arrays; empty for a plain `source`
    #[serde(default)]
    pub arch: Vec<Arch>,
}

impl PackagesConfig {
    /// Load and parse a YAML configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: PackagesConfig = serde_norway::from_str(content)?;
        for (key, package) in config.packages.iter_mut() {
            if package.name.is_empty() {
                package.name = key.clone();
            }
        }
        Ok(config)
    }

    /// Check that every package can be processed by the given parsers
    pub fn validate(&self, parsers: &ParserRegistry) -> Result<(), ConfigError> {
        for package in self.packages.values() {
            for (field, value) in [
                ("fetch_url", package.fetch_url.as_str()),
                ("parser", package.parser.as_str()),
            ] {
                if value.trim().is_empty() {
                    return Err(ConfigError::EmptyField {
                        package: package.name.clone(),
                        field,
                    });
                }
            }
            if package.pkgbuild.as_os_str().is_empty() {
                return Err(ConfigError::EmptyField {
                    package: package.name.clone(),
                    field: "pkgbuild",
                });
            }
            if !parsers.contains(&package.parser) {
                return Err(ConfigError::UnknownParser {
                    package: package.name.clone(),
                    parser: package.parser.clone(),
                    known: parsers.ids().join(", "),
                });
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&PackageConfig> {
        self.packages.get(name)
    }
}

/// Returns the path to the data directory for aur-updater.
/// Uses $XDG_DATA_HOME/aur-updater if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/aur-updater,
/// or ./aur-updater if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the default path of the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("aur-updater.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("aur-updater")
}
