//! Lookup of parsers by configured identifier

use std::collections::HashMap;
use std::sync::Arc;

use crate::parser::github_release::GitHubReleaseParser;
use crate::parser::qq::QQParser;
use crate::parser::traits::VersionParser;

/// Maps the `parser` value of a package configuration to its implementation
#[derive(Clone, Default)]
pub struct ParserRegistry {
    parsers: HashMap<&'static str, Arc<dyn VersionParser>>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a parser under its own [`VersionParser::id`]
    pub fn register(&mut self, parser: Arc<dyn VersionParser>) {
        self.parsers.insert(parser.id(), parser);
    }

    pub fn with(mut self, parser: Arc<dyn VersionParser>) -> Self {
        self.register(parser);
        self
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn VersionParser>> {
        self.parsers.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.parsers.contains_key(id)
    }

    /// Registered identifiers, sorted
    pub fn ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<_> = self.parsers.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

/// Create the registry of every parser shipped with the crate
pub fn create_default_parsers() -> ParserRegistry {
    ParserRegistry::new()
        .with(Arc::new(QQParser::new()))
        .with(Arc::new(GitHubReleaseParser))
}
