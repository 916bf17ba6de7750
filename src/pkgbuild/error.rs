use thiserror::Error;

use crate::parser::types::SourceTarget;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    #[error("PKGBUILD has no top-level `{0}=` assignment")]
    MissingField(String),

    #[error("Unterminated quote or array in assignment at line {line}")]
    Unterminated { line: usize },

    #[error("`{field}` has no remote (://) entry to update")]
    NoRemoteSource { field: String },

    #[error("Upstream offers no download for the {target} source")]
    MissingDownloadUrl { target: SourceTarget },

    #[error("PKGBUILD declares no checksum array for the {target} source")]
    MissingChecksums { target: SourceTarget },

    #[error("`{field}` has {len} entries, expected one at index {index}")]
    ChecksumCountMismatch {
        field: String,
        index: usize,
        len: usize,
    },
}
