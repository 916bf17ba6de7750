use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::checksum::HashError;
use crate::fetcher::FetchError;
use crate::parser::traits::ParseError;
use crate::pkgbuild::error::PatchError;

/// Failure of one package's update
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("Package `{0}` is not configured")]
    UnknownPackage(String),

    #[error("No parser registered as `{0}`")]
    UnknownParser(String),

    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Parse failed: {0}")]
    Parse(#[from] ParseError),

    #[error("Checksum failed: {0}")]
    Hash(#[from] HashError),

    #[error("Hashing task failed: {0}")]
    HashTask(String),

    #[error("Patch failed: {0}")]
    Patch(#[from] PatchError),

    #[error("Failed to read {path}: {source}")]
    ReadPkgbuild { path: PathBuf, source: io::Error },

    #[error("Write failed: {0}")]
    Write(#[from] WriteError),
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Failed to create temporary file in {dir}: {source}")]
    TempFile { dir: PathBuf, source: io::Error },

    #[error("Failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("Failed to replace {path}: {source}")]
    Persist { path: PathBuf, source: io::Error },

    #[error("Write task failed: {0}")]
    Task(String),
}
