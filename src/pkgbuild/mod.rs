//! PKGBUILD handling
//! - document.rs: span-preserving model of top-level assignments
//! - patcher.rs: rewrites version, release, source and checksum fields
//! - error.rs: PatchError

pub mod document;
pub mod error;
pub mod patcher;

pub use document::{Assignment, AssignmentValue, PkgbuildDocument, Quote, Word};
pub use error::PatchError;
pub use patcher::apply;
