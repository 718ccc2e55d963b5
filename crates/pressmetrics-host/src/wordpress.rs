use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use pressmetrics_common::{ExporterError, Result};
use tracing::{debug, warn};

use crate::{
    traits::HostApplication,
    wp_config::{WpConfig, parse_wp_version},
};

pub const CONFIG_FILE: &str = "wp-config.php";
const VERSION_FILE: &str = "wp-includes/version.php";
const PLUGINS_DIR: &str = "wp-content/plugins";
const THEMES_DIR: &str = "wp-content/themes";

/// A WordPress installation read straight from its document root.
///
/// Content counts, object cache statistics and connection probes need a live
/// database, so this host does not offer those capabilities.
#[derive(Debug, Clone)]
pub struct WordPressInstall {
    root: PathBuf,
    config: WpConfig,
    version: Option<String>,
    runtime_version: Option<String>,
}

impl WordPressInstall {
    pub fn bootstrap(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let config_path = root.join(CONFIG_FILE);
        let source = match fs::read_to_string(&config_path) {
            Ok(source) => source,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(ExporterError::ConfigNotFound(config_path));
            }
            Err(err) => {
                return Err(ExporterError::BootstrapFailed(format!(
                    "failed to read {}: {err}",
                    config_path.display()
                )));
            }
        };

        let config = WpConfig::parse(&source)?;
        let version = read_version(&root);
        debug!(root = %root.display(), db_name = ?config.db_name, ?version, "wordpress bootstrapped");

        Ok(Self {
            root,
            config,
            version,
            runtime_version: None,
        })
    }

    pub fn with_runtime_version(mut self, runtime_version: Option<String>) -> Self {
        self.runtime_version = runtime_version.filter(|value| !value.trim().is_empty());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &WpConfig {
        &self.config
    }
}

impl HostApplication for WordPressInstall {
    fn version(&self) -> Option<String> {
        self.version.clone()
    }

    fn runtime_version(&self) -> Option<String> {
        self.runtime_version.clone()
    }

    fn plugin_count(&self) -> Result<u64> {
        count_directories(&self.root.join(PLUGINS_DIR))
    }

    fn theme_count(&self) -> Result<u64> {
        count_directories(&self.root.join(THEMES_DIR))
    }
}

/// An unreadable version file reports the version as unknown.
fn read_version(root: &Path) -> Option<String> {
    let path = root.join(VERSION_FILE);
    match fs::read_to_string(&path) {
        Ok(source) => parse_wp_version(&source),
        Err(err) if err.kind() == ErrorKind::NotFound => None,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "wordpress version unreadable");
            None
        }
    }
}

fn count_directories(dir: &Path) -> Result<u64> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(0),
        Err(err) => return Err(ExporterError::Io(err)),
    };

    let mut count = 0;
    for entry in entries {
        if entry?.path().is_dir() {
            count += 1;
        }
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pressmetrics_common::ExporterError;
    use tempfile::TempDir;

    use super::WordPressInstall;
    use crate::traits::HostApplication;

    fn wordpress_tree() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("wp-config.php"),
            "<?php\ndefine('DB_NAME', 'wordpress');\n",
        )
        .unwrap();
        fs::create_dir_all(dir.path().join("wp-includes")).unwrap();
        fs::write(
            dir.path().join("wp-includes/version.php"),
            "<?php\n$wp_version = '6.4.2';\n",
        )
        .unwrap();
        for plugin in ["akismet", "jetpack", "woocommerce"] {
            fs::create_dir_all(dir.path().join("wp-content/plugins").join(plugin)).unwrap();
        }
        fs::write(dir.path().join("wp-content/plugins/hello.php"), "<?php").unwrap();
        fs::create_dir_all(dir.path().join("wp-content/themes/twentytwentyfour")).unwrap();
        dir
    }

    #[test]
    fn missing_config_is_config_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = WordPressInstall::bootstrap(dir.path()).unwrap_err();
        match err {
            ExporterError::ConfigNotFound(path) => {
                assert_eq!(path, dir.path().join("wp-config.php"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn incomplete_config_is_bootstrap_failure() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("wp-config.php"), "<?php // empty").unwrap();
        let err = WordPressInstall::bootstrap(dir.path()).unwrap_err();
        assert_eq!(err.reason(), "bootstrap_failed");
    }

    #[test]
    fn reads_version_and_counts_directories() {
        let dir = wordpress_tree();
        let install = WordPressInstall::bootstrap(dir.path())
            .unwrap()
            .with_runtime_version(Some("8.2.12".to_string()));

        assert_eq!(install.version().as_deref(), Some("6.4.2"));
        assert_eq!(install.runtime_version().as_deref(), Some("8.2.12"));
        assert_eq!(install.plugin_count().unwrap(), 3);
        assert_eq!(install.theme_count().unwrap(), 1);
        assert!(install.content().is_none());
        assert!(install.connections().is_none());
    }

    #[test]
    fn unreadable_version_file_reports_unknown() {
        let dir = wordpress_tree();
        fs::remove_file(dir.path().join("wp-includes/version.php")).unwrap();
        fs::create_dir(dir.path().join("wp-includes/version.php")).unwrap();

        let install = WordPressInstall::bootstrap(dir.path()).unwrap();
        assert_eq!(install.version(), None);
        assert_eq!(install.plugin_count().unwrap(), 3);
    }

    #[test]
    fn container_config_bootstraps() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("wp-config.php"),
            "<?php\ndefine( 'DB_NAME', getenv_docker('WORDPRESS_DB_NAME', 'wordpress') );\n",
        )
        .unwrap();

        let install = WordPressInstall::bootstrap(dir.path()).unwrap();
        assert_eq!(install.config().db_name, None);
        assert_eq!(install.version(), None);
    }

    #[test]
    fn missing_optional_files_are_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("wp-config.php"), "<?php define('DB_NAME', 'x');").unwrap();
        let install = WordPressInstall::bootstrap(dir.path())
            .unwrap()
            .with_runtime_version(Some("  ".to_string()));

        assert_eq!(install.version(), None);
        assert_eq!(install.runtime_version(), None);
        assert_eq!(install.plugin_count().unwrap(), 0);
        assert_eq!(install.theme_count().unwrap(), 0);
    }
}
