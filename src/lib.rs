//! Keeps AUR PKGBUILDs in sync with their upstream releases.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Fetcher   │────▶│   Parser    │────▶│  Checksum   │
//! │  (network)  │     │ (per source)│     │  (sha2)     │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        ▲                                       │
//!        │                                       ▼
//! ┌─────────────┐                         ┌─────────────┐
//! │   Updater   │────────────────────────▶│  PKGBUILD   │
//! │(orchestrate)│                         │  (patcher)  │
//! └─────────────┘                         └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`checksum`]: SHA256/SHA512 digests over buffers and streams
//! - [`config`]: Package list and fetch settings loaded from YAML
//! - [`fetcher`]: HTTP retrieval of metadata payloads and artifacts
//! - [`logging`]: tracing subscriber setup
//! - [`parser`]: Source-specific payload parsers producing a `VersionRecord`
//! - [`pkgbuild`]: Field-precise PKGBUILD editing
//! - [`updater`]: Per-package pipeline and run reports

pub mod checksum;
pub mod config;
pub mod fetcher;
pub mod logging;
pub mod parser;
pub mod pkgbuild;
pub mod updater;
