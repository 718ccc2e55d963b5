pub mod traits;
pub mod wordpress;
pub mod wp_config;

pub use traits::{CacheStats, ConnectionProbe, ContentCounts, HostApplication, ObjectCacheStats};
pub use wordpress::WordPressInstall;
pub use wp_config::WpConfig;
