//! Temporary package trees with a config file

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use aur_updater::config::PackagesConfig;
use aur_updater::fetcher::Fetcher;
use aur_updater::parser::create_default_parsers;
use aur_updater::updater::PackageUpdater;

pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write `<root>/<package>/PKGBUILD`
    pub fn write_pkgbuild(&self, package: &str, content: &str) -> PathBuf {
        let dir = self.root().join(package);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("PKGBUILD");
        std::fs::write(&path, content).unwrap();
        path
    }

    pub fn read_pkgbuild(&self, package: &str) -> String {
        std::fs::read_to_string(self.root().join(package).join("PKGBUILD")).unwrap()
    }

    /// Write `packages.yaml` and load it back through the public loader
    pub fn write_config(&self, yaml: &str) -> PackagesConfig {
        let path = self.root().join("packages.yaml");
        std::fs::write(&path, yaml).unwrap();
        let config = PackagesConfig::load(&path).unwrap();
        config.validate(&create_default_parsers()).unwrap();
        config
    }

    pub fn updater(&self, config: PackagesConfig, fetcher: Arc<dyn Fetcher>) -> PackageUpdater {
        PackageUpdater::new(
            Arc::new(config),
            fetcher,
            create_default_parsers(),
            self.root(),
        )
    }
}
