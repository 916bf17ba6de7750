//! Parser layer
//! - traits.rs: VersionParser trait definition and version sanity checks
//! - types.rs: Common types (VersionRecord, Arch, SourceTarget)
//! - registry.rs: Parser lookup by configured identifier
//! - qq.rs: Linux QQ download config parser
//! - github_release.rs: GitHub Releases API parser

pub mod github_release;
pub mod qq;
pub mod registry;
pub mod traits;
pub mod types;

pub use github_release::GitHubReleaseParser;
pub use qq::QQParser;
pub use registry::{ParserRegistry, create_default_parsers};
pub use traits::{ParseError, VersionParser};
pub use types::{Arch, SourceTarget, VersionRecord};
