//! Per-package update pipeline
//!
//! Each package runs fetch → parse → verify → patch → write independently;
//! a failure stops only that package and is reported with the step it hit.
//!
//! - error.rs: UpdateError, WriteError
//! - state.rs: UpdateState, UpdateOutcome, PackageReport
//! - writer.rs: atomic PKGBUILD replacement

pub mod error;
pub mod state;
pub mod writer;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::checksum::{self, ChecksumSet, HashAlgorithm, HashError};
use crate::config::{FETCH_STAGGER_DELAY_MS, PackageConfig, PackagesConfig};
use crate::fetcher::Fetcher;
use crate::parser::{ParserRegistry, SourceTarget, VersionRecord};
use crate::pkgbuild::{PatchError, PkgbuildDocument, patcher};

pub use error::{UpdateError, WriteError};
pub use state::{PackageReport, UpdateOutcome, UpdateState};

#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateOptions {
    /// Run every step but leave PKGBUILDs on disk untouched
    pub dry_run: bool,
}

pub struct PackageUpdater {
    config: Arc<PackagesConfig>,
    fetcher: Arc<dyn Fetcher>,
    parsers: ParserRegistry,
    /// Base directory for relative `pkgbuild` paths
    root: PathBuf,
    options: UpdateOptions,
}

impl PackageUpdater {
    pub fn new(
        config: Arc<PackagesConfig>,
        fetcher: Arc<dyn Fetcher>,
        parsers: ParserRegistry,
        root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            config,
            fetcher,
            parsers,
            root: root.into(),
            options: UpdateOptions::default(),
        }
    }

    pub fn with_options(mut self, options: UpdateOptions) -> Self {
        self.options = options;
        self
    }

    /// Configured packages, in file order
    pub fn list_available(&self) -> Vec<&PackageConfig> {
        self.config.packages.values().collect()
    }

    pub fn pkgbuild_path(&self, package: &PackageConfig) -> PathBuf {
        if package.pkgbuild.is_absolute() {
            package.pkgbuild.clone()
        } else {
            self.root.join(&package.pkgbuild)
        }
    }

    /// Update one package by name
    pub async fn update(&self, name: &str) -> PackageReport {
        match self.config.get(name) {
            Some(package) => self.update_package(package).await,
            None => {
                error!("Unknown package: {}", name);
                PackageReport {
                    package: name.to_string(),
                    outcome: UpdateOutcome::Failed {
                        state: UpdateState::FetchingMetadata,
                        error: UpdateError::UnknownPackage(name.to_string()),
                    },
                }
            }
        }
    }

    /// Update the named packages concurrently; reports keep the given order
    ///
    /// Start times are staggered to avoid hammering a shared upstream.
    pub async fn update_many(&self, names: &[String]) -> Vec<PackageReport> {
        let futures = names.iter().enumerate().map(|(i, name)| async move {
            let delay = Duration::from_millis(FETCH_STAGGER_DELAY_MS * i as u64);
            if !delay.is_zero() {
                sleep(delay).await;
            }
            self.update(name).await
        });
        join_all(futures).await
    }

    /// Update every configured package
    pub async fn update_all(&self) -> Vec<PackageReport> {
        let names: Vec<String> = self.config.packages.keys().cloned().collect();
        info!("Updating {} packages", names.len());
        let reports = self.update_many(&names).await;

        let failed = reports.iter().filter(|r| r.outcome.is_failed()).count();
        info!(
            "Finished: {} succeeded, {} failed",
            reports.len() - failed,
            failed
        );
        reports
    }

    async fn update_package(&self, package: &PackageConfig) -> PackageReport {
        let mut state = UpdateState::FetchingMetadata;
        let outcome = match self.run(package, &mut state).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("{}: failed while {}: {}", package.name, state, e);
                UpdateOutcome::Failed { state, error: e }
            }
        };
        PackageReport {
            package: package.name.clone(),
            outcome,
        }
    }

    async fn run(
        &self,
        package: &PackageConfig,
        state: &mut UpdateState,
    ) -> Result<UpdateOutcome, UpdateError> {
        *state = UpdateState::FetchingMetadata;
        debug!("{}: fetching {}", package.name, package.fetch_url);
        let payload = self.fetcher.fetch_text(&package.fetch_url).await?;

        *state = UpdateState::Parsing;
        let parser = self
            .parsers
            .get(&package.parser)
            .ok_or_else(|| UpdateError::UnknownParser(package.parser.clone()))?;
        let record = parser.parse_version(&payload)?;
        debug!(
            "{}: {} reports version {}",
            package.name,
            parser.id(),
            record.version
        );

        let path = self.pkgbuild_path(package);
        let existing = read_pkgbuild(&path).await?;
        let document = PkgbuildDocument::parse(&existing)?;
        let current = document
            .pkgver()
            .ok_or_else(|| PatchError::MissingField("pkgver".to_string()))?
            .to_string();

        if current == record.version {
            info!("{}: already at {}", package.name, current);
            *state = UpdateState::Done;
            return Ok(UpdateOutcome::Unchanged { version: current });
        }

        let mut checksums = BTreeMap::new();
        for target in targets(package) {
            let algorithms = document.checksum_algorithms(target);
            if algorithms.is_empty() {
                return Err(PatchError::MissingChecksums { target }.into());
            }
            let url = record
                .url_for(target)
                .ok_or(PatchError::MissingDownloadUrl { target })?;
            let set = self.checksums_for(&record, url, &algorithms, state).await?;
            checksums.insert(target, set);
        }

        *state = UpdateState::Patching;
        let patched = patcher::apply(&existing, &record, &checksums)?;

        *state = UpdateState::Writing;
        if self.options.dry_run {
            info!(
                "{}: dry run, not writing {} ({} bytes)",
                package.name,
                path.display(),
                patched.len()
            );
        } else {
            writer::write_atomic(&path, patched).await?;
        }

        info!("{}: {} -> {}", package.name, current, record.version);
        *state = UpdateState::Done;
        Ok(UpdateOutcome::Updated {
            old_version: current,
            new_version: record.version,
        })
    }

    /// Digests of the artifact at `url` for every algorithm the PKGBUILD uses
    ///
    /// A digest published by upstream is used as-is when it is the only one
    /// needed. Otherwise the artifact is downloaded and hashed, and any
    /// published digest must agree with the computed one.
    async fn checksums_for(
        &self,
        record: &VersionRecord,
        url: &str,
        algorithms: &[HashAlgorithm],
        state: &mut UpdateState,
    ) -> Result<ChecksumSet, UpdateError> {
        let supplied = record.supplied_checksum(url);
        if let Some((algorithm, digest)) = supplied
            && algorithms.iter().all(|a| *a == algorithm)
        {
            debug!("Using published {} for {}", algorithm, url);
            let mut set = ChecksumSet::new();
            set.insert(algorithm, digest);
            return Ok(set);
        }

        *state = UpdateState::FetchingArtifact;
        debug!("Downloading {}", url);
        let bytes = self.fetcher.fetch_bytes(url).await?;

        *state = UpdateState::Hashing;
        let url = url.to_string();
        let algorithms = algorithms.to_vec();
        let supplied = supplied.map(|(algorithm, digest)| (algorithm, digest.to_string()));
        let set = tokio::task::spawn_blocking(move || {
            hash_artifact(&url, &bytes, &algorithms, supplied.as_ref())
        })
        .await
        .map_err(|e| UpdateError::HashTask(e.to_string()))??;
        Ok(set)
    }
}

/// Hash a downloaded artifact, checking it against a published digest
fn hash_artifact(
    url: &str,
    bytes: &[u8],
    algorithms: &[HashAlgorithm],
    supplied: Option<&(HashAlgorithm, String)>,
) -> Result<ChecksumSet, HashError> {
    let set = ChecksumSet::compute(bytes, algorithms);
    if let Some((algorithm, expected)) = supplied {
        let actual = match set.get(*algorithm) {
            Some(actual) => actual.to_string(),
            None => checksum::digest(bytes, *algorithm),
        };
        if !actual.eq_ignore_ascii_case(expected.trim()) {
            return Err(HashError::Mismatch {
                url: url.to_string(),
                algorithm: *algorithm,
                expected: expected.to_ascii_lowercase(),
                actual,
            });
        }
    }
    debug!("Hashed {} bytes from {}", bytes.len(), url);
    Ok(set)
}

/// PKGBUILD sections an update rewrites
fn targets(package: &PackageConfig) -> Vec<SourceTarget> {
    if package.arch.is_empty() {
        vec![SourceTarget::Generic]
    } else {
        let mut targets: Vec<SourceTarget> =
            package.arch.iter().copied().map(SourceTarget::Arch).collect();
        targets.dedup();
        targets
    }
}

async fn read_pkgbuild(path: &Path) -> Result<String, UpdateError> {
    tokio::fs::read_to_string(path).await.map_err(|source| {
        warn!("Cannot read {}: {}", path.display(), source);
        UpdateError::ReadPkgbuild {
            path: path.to_path_buf(),
            source,
        }
    })
}
