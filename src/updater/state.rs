//! Pipeline states and per-package results

use std::fmt;

use crate::updater::error::UpdateError;

/// Step of a package update, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateState {
    FetchingMetadata,
    Parsing,
    FetchingArtifact,
    Hashing,
    Patching,
    Writing,
    Done,
}

impl UpdateState {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateState::FetchingMetadata => "fetching metadata",
            UpdateState::Parsing => "parsing",
            UpdateState::FetchingArtifact => "fetching artifact",
            UpdateState::Hashing => "hashing",
            UpdateState::Patching => "patching",
            UpdateState::Writing => "writing",
            UpdateState::Done => "done",
        }
    }
}

impl fmt::Display for UpdateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal result of a package update
#[derive(Debug)]
pub enum UpdateOutcome {
    /// The PKGBUILD was rewritten for a new upstream version
    Updated {
        old_version: String,
        new_version: String,
    },
    /// Upstream still ships the version in the PKGBUILD
    Unchanged { version: String },
    /// The update stopped in `state`
    Failed {
        state: UpdateState,
        error: UpdateError,
    },
}

impl UpdateOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, UpdateOutcome::Failed { .. })
    }
}

/// Outcome of one package in a run
#[derive(Debug)]
pub struct PackageReport {
    pub package: String,
    pub outcome: UpdateOutcome,
}

impl fmt::Display for PackageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            UpdateOutcome::Updated {
                old_version,
                new_version,
            } => write!(f, "{}: updated {} -> {}", self.package, old_version, new_version),
            UpdateOutcome::Unchanged { version } => {
                write!(f, "{}: up to date ({})", self.package, version)
            }
            UpdateOutcome::Failed { state, error } => {
                write!(f, "{}: failed while {}: {}", self.package, state, error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_each_outcome() {
        let updated = PackageReport {
            package: "linuxqq".to_string(),
            outcome: UpdateOutcome::Updated {
                old_version: "1.0".to_string(),
                new_version: "1.1".to_string(),
            },
        };
        let failed = PackageReport {
            package: "linuxqq".to_string(),
            outcome: UpdateOutcome::Failed {
                state: UpdateState::Parsing,
                error: UpdateError::UnknownParser("WeChatParser".to_string()),
            },
        };

        assert_eq!(updated.to_string(), "linuxqq: updated 1.0 -> 1.1");
        assert_eq!(
            failed.to_string(),
            "linuxqq: failed while parsing: No parser registered as `WeChatParser`"
        );
        assert!(failed.outcome.is_failed());
        assert!(!updated.outcome.is_failed());
    }
}
