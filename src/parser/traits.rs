//! Parser trait definition

use crate::parser::types::{Arch, VersionRecord};

/// Longest payload excerpt carried by a `ParseError`
const EXCERPT_LEN: usize = 200;

/// Characters that would change meaning inside a shell assignment
const SHELL_METACHARACTERS: &[char] = &[
    '$', '`', '\\', '"', '\'', ';', '&', '|', '<', '>', '(', ')', '{', '}', '[', ']', '*', '?',
    '!', '~', '#',
];

/// Characters makepkg rejects in `pkgver`
const PKGVER_FORBIDDEN: &[char] = &['-', ':', '/'];

/// Trait for turning an upstream payload into a `VersionRecord`
///
/// One implementation exists per upstream source. Implementations are
/// selected by [`VersionParser::id`], which is the `parser` value of a
/// package's configuration.
pub trait VersionParser: Send + Sync {
    /// Identifier referenced by the configuration
    fn id(&self) -> &'static str;

    /// Extract the latest version and its download URLs
    fn parse_version(&self, payload: &str) -> Result<VersionRecord, ParseError>;

    /// Extract the package download URL for a single architecture
    fn parse_deb_url(&self, arch: Arch, payload: &str) -> Result<String, ParseError>;
}

/// Error type for parsing operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// A field the parser relies on is absent
    #[error("Missing field `{field}` in payload: {excerpt}")]
    MissingField { field: String, excerpt: String },

    /// The payload does not have the expected structure
    #[error("Malformed payload ({reason}): {excerpt}")]
    Malformed { reason: String, excerpt: String },

    /// The extracted version cannot be used as `pkgver`
    #[error("Invalid version `{version}`: {reason}")]
    InvalidVersion { version: String, reason: String },

    /// The payload offers nothing for the requested architecture
    #[error("No download for architecture {arch} in payload: {excerpt}")]
    UnsupportedArch { arch: Arch, excerpt: String },
}

impl ParseError {
    pub fn missing_field(field: &str, payload: &str) -> Self {
        ParseError::MissingField {
            field: field.to_string(),
            excerpt: excerpt(payload),
        }
    }

    pub fn malformed(reason: impl Into<String>, payload: &str) -> Self {
        ParseError::Malformed {
            reason: reason.into(),
            excerpt: excerpt(payload),
        }
    }
}

/// Leading part of a payload, cut on a char boundary
pub fn excerpt(payload: &str) -> String {
    let trimmed = payload.trim();
    match trimmed.char_indices().nth(EXCERPT_LEN) {
        Some((idx, _)) => format!("{}…", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

/// Check that a version can be written verbatim into `pkgver=`
pub fn validate_version(version: &str) -> Result<(), ParseError> {
    let invalid = |reason: &str| ParseError::InvalidVersion {
        version: version.to_string(),
        reason: reason.to_string(),
    };

    if version.is_empty() {
        return Err(invalid("empty"));
    }
    if version.chars().any(char::is_whitespace) {
        return Err(invalid("contains whitespace"));
    }
    if let Some(c) = version.chars().find(|c| SHELL_METACHARACTERS.contains(c)) {
        return Err(invalid(&format!("contains shell metacharacter `{c}`")));
    }
    if let Some(c) = version.chars().find(|c| PKGVER_FORBIDDEN.contains(c)) {
        return Err(invalid(&format!("contains `{c}`, not allowed in pkgver")));
    }
    if version.chars().any(|c| c.is_control()) {
        return Err(invalid("contains control characters"));
    }
    Ok(())
}
