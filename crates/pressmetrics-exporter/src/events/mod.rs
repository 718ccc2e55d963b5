pub mod classify;
pub mod collector;
pub mod scope;

use serde::{Deserialize, Serialize};

pub use classify::{Endpoint, QueryType, RequestFlags};
pub use collector::{Collector, FlushSummary};
pub use scope::{MetricUpdate, RequestScope};

/// Something the host application reports while serving one request.
///
/// `at` fields are the host's clock when the event happened, in unix seconds.
/// Durations missing from an event are derived from these timestamps only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    Login {
        user_id: u64,
        #[serde(default)]
        roles: Vec<String>,
    },
    /// A logged-in user made a request.
    Activity {
        user_id: u64,
    },
    Logout,
    CommentCreated {
        comment_id: u64,
        status: String,
    },
    PostStatusChanged {
        post_type: String,
        old_status: String,
        new_status: String,
    },
    QueryExecuted {
        sql: String,
    },
    CacheGet {
        key: String,
        hit: bool,
    },
    CacheSet {
        key: String,
    },
    PluginsStarted {
        at: Option<f64>,
    },
    PluginsLoaded {
        duration_seconds: Option<f64>,
        at: Option<f64>,
    },
    PageRendered {
        #[serde(default = "default_method")]
        method: String,
        #[serde(default = "default_status")]
        status: u16,
        #[serde(default)]
        request: RequestFlags,
        duration_seconds: Option<f64>,
        at: Option<f64>,
    },
    Error,
    Shutdown {
        memory_usage_bytes: u64,
        memory_peak_bytes: u64,
        query_count: u64,
        generation_seconds: Option<f64>,
        at: Option<f64>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Login,
    Activity,
    Logout,
    CommentCreated,
    PostStatusChanged,
    QueryExecuted,
    CacheGet,
    CacheSet,
    PluginsStarted,
    PluginsLoaded,
    PageRendered,
    Error,
    Shutdown,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Login { .. } => EventKind::Login,
            Self::Activity { .. } => EventKind::Activity,
            Self::Logout => EventKind::Logout,
            Self::CommentCreated { .. } => EventKind::CommentCreated,
            Self::PostStatusChanged { .. } => EventKind::PostStatusChanged,
            Self::QueryExecuted { .. } => EventKind::QueryExecuted,
            Self::CacheGet { .. } => EventKind::CacheGet,
            Self::CacheSet { .. } => EventKind::CacheSet,
            Self::PluginsStarted { .. } => EventKind::PluginsStarted,
            Self::PluginsLoaded { .. } => EventKind::PluginsLoaded,
            Self::PageRendered { .. } => EventKind::PageRendered,
            Self::Error => EventKind::Error,
            Self::Shutdown { .. } => EventKind::Shutdown,
        }
    }
}

fn default_method() -> String {
    "GET".to_string()
}

fn default_status() -> u16 {
    200
}

#[cfg(test)]
mod tests {
    use super::{Event, EventKind, RequestFlags};

    #[test]
    fn decodes_tagged_events() {
        let events: Vec<Event> = serde_json::from_str(
            r#"[
                {"event": "logout"},
                {"event": "login", "user_id": 7, "roles": ["editor", "author"]},
                {"event": "cache_get", "key": "alloptions", "hit": false},
                {"event": "page_rendered", "request": {"is_single": true}},
                {"event": "plugins_started"},
                {"event": "shutdown", "memory_usage_bytes": 1, "memory_peak_bytes": 2,
                 "query_count": 3, "at": 1700000000.5}
            ]"#,
        )
        .unwrap();

        assert_eq!(events[0], Event::Logout);
        assert_eq!(events[1].kind(), EventKind::Login);
        assert_eq!(
            events[3],
            Event::PageRendered {
                method: "GET".to_string(),
                status: 200,
                request: RequestFlags {
                    is_single: true,
                    ..RequestFlags::default()
                },
                duration_seconds: None,
                at: None,
            }
        );
        assert_eq!(events[4], Event::PluginsStarted { at: None });
        assert_eq!(
            events[5],
            Event::Shutdown {
                memory_usage_bytes: 1,
                memory_peak_bytes: 2,
                query_count: 3,
                generation_seconds: None,
                at: Some(1_700_000_000.5),
            }
        );
    }

    #[test]
    fn unknown_event_is_rejected() {
        assert!(serde_json::from_str::<Event>(r#"{"event": "teleport"}"#).is_err());
    }
}
