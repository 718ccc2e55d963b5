use std::time::Duration;

use pressmetrics_common::Result;

/// Point-in-time view of the hosted WordPress site.
///
/// Every read is synchronous and side-effect free. Optional capabilities are
/// exposed as `Option`s: a host that cannot answer simply returns `None` and
/// the corresponding series are left out of the scrape.
pub trait HostApplication: Send + Sync {
    fn version(&self) -> Option<String>;

    fn runtime_version(&self) -> Option<String>;

    fn plugin_count(&self) -> Result<u64>;

    fn theme_count(&self) -> Result<u64>;

    fn content(&self) -> Option<&dyn ContentCounts> {
        None
    }

    fn object_cache(&self) -> Option<&dyn ObjectCacheStats> {
        None
    }

    fn connections(&self) -> Option<&dyn ConnectionProbe> {
        None
    }
}

pub trait ContentCounts: Send + Sync {
    fn published_posts_by_type(&self) -> Result<Vec<(String, u64)>>;

    fn users_by_role(&self) -> Result<Vec<(String, u64)>>;

    fn comments_by_status(&self) -> Result<Vec<(String, u64)>>;

    /// Distinct users with recorded activity inside `within`.
    fn active_users(&self, within: Duration) -> Result<u64>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

pub trait ObjectCacheStats: Send + Sync {
    fn stats(&self) -> Result<CacheStats>;
}

pub trait ConnectionProbe: Send + Sync {
    fn open_connections(&self) -> Result<u64>;
}
