use std::{path::PathBuf, time::Duration};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExporterConfig {
    /// WordPress document root holding `wp-config.php`.
    pub wordpress_path: PathBuf,
    /// Lookback window for stored series.
    pub window: Duration,
    /// Records older than this are purged.
    pub retention: Duration,
    pub purge_interval: Duration,
    /// Upper bound for a single store call made by a request handler.
    pub store_timeout: Duration,
    pub active_user_window: Duration,
    /// PHP runtime version reported by the host, if known.
    pub runtime_version: Option<String>,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            wordpress_path: PathBuf::from("/var/www/html"),
            window: Duration::from_secs(300),
            retention: Duration::from_secs(3600),
            purge_interval: Duration::from_secs(300),
            store_timeout: Duration::from_secs(5),
            active_user_window: Duration::from_secs(300),
            runtime_version: None,
        }
    }
}
