//! Checksum computation for downloaded artifacts

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256, Sha512};

/// Read buffer size used when hashing streams (64 KiB)
const CHUNK_SIZE: usize = 64 * 1024;

/// Digest algorithms that can be written into a PKGBUILD
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HashAlgorithm {
    Sha256,
    Sha512,
}

impl HashAlgorithm {
    /// All supported algorithms, in the order makepkg lists them
    pub const ALL: [HashAlgorithm; 2] = [HashAlgorithm::Sha256, HashAlgorithm::Sha512];

    /// Returns the string representation of the algorithm
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha512 => "sha512",
        }
    }

    /// Name of the PKGBUILD array holding digests of this algorithm
    pub fn sums_field(&self) -> String {
        format!("{}sums", self.as_str())
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HashAlgorithm {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha512" => Ok(HashAlgorithm::Sha512),
            _ => Err(HashError::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HashError {
    #[error("Unsupported hash algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Failed to read artifact stream: {0}")]
    Read(#[from] io::Error),

    #[error("Failed to open {path}: {source}")]
    Open { path: PathBuf, source: io::Error },

    #[error("{algorithm} mismatch for {url}: expected {expected}, got {actual}")]
    Mismatch {
        url: String,
        algorithm: HashAlgorithm,
        expected: String,
        actual: String,
    },
}

/// Compute the lowercase hex digest of an in-memory buffer
pub fn digest(bytes: &[u8], algorithm: HashAlgorithm) -> String {
    match algorithm {
        HashAlgorithm::Sha256 => hex::encode(Sha256::digest(bytes)),
        HashAlgorithm::Sha512 => hex::encode(Sha512::digest(bytes)),
    }
}

/// Compute the digest of a stream without buffering it whole
pub fn digest_reader<R: Read>(reader: R, algorithm: HashAlgorithm) -> Result<String, HashError> {
    match algorithm {
        HashAlgorithm::Sha256 => hash_stream::<Sha256, R>(reader),
        HashAlgorithm::Sha512 => hash_stream::<Sha512, R>(reader),
    }
}

/// Compute the digest of a file on disk
pub fn digest_file(path: &Path, algorithm: HashAlgorithm) -> Result<String, HashError> {
    let file = File::open(path).map_err(|source| HashError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    digest_reader(file, algorithm)
}

/// Check a buffer against an expected digest (case-insensitive)
pub fn verify(bytes: &[u8], algorithm: HashAlgorithm, expected: &str) -> bool {
    digest(bytes, algorithm).eq_ignore_ascii_case(expected.trim())
}

fn hash_stream<D: Digest, R: Read>(mut reader: R) -> Result<String, HashError> {
    let mut hasher = D::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(HashError::Read(e)),
        };
        hasher.update(&buffer[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Digests of one artifact, keyed by algorithm
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecksumSet {
    digests: BTreeMap<HashAlgorithm, String>,
}

impl ChecksumSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash `bytes` once per requested algorithm
    pub fn compute(bytes: &[u8], algorithms: &[HashAlgorithm]) -> Self {
        let mut set = Self::new();
        for &algorithm in algorithms {
            set.insert(algorithm, digest(bytes, algorithm));
        }
        set
    }

    pub fn insert(&mut self, algorithm: HashAlgorithm, hex_digest: impl Into<String>) {
        self.digests
            .insert(algorithm, hex_digest.into().to_ascii_lowercase());
    }

    pub fn get(&self, algorithm: HashAlgorithm) -> Option<&str> {
        self.digests.get(&algorithm).map(String::as_str)
    }

    pub fn contains(&self, algorithm: HashAlgorithm) -> bool {
        self.digests.contains_key(&algorithm)
    }

    pub fn iter(&self) -> impl Iterator<Item = (HashAlgorithm, &str)> {
        self.digests.iter().map(|(a, d)| (*a, d.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }
}
