//! redb table definitions for the sample store.

use redb::TableDefinition;

/// JSON-encoded `SampleRecord`s keyed by their monotonically assigned id.
pub const SAMPLES: TableDefinition<u64, &[u8]> = TableDefinition::new("samples");

/// Id of the newest record of each series, keyed by `{metric}|{canonical labels}`.
pub const LATEST: TableDefinition<&str, u64> = TableDefinition::new("latest");

/// Last activity of each logged-in user, as unix milliseconds keyed by user id.
pub const ACTIVITY: TableDefinition<u64, i64> = TableDefinition::new("activity");

/// Store bookkeeping such as the next record id.
pub const META: TableDefinition<&str, u64> = TableDefinition::new("meta");

pub const NEXT_RECORD_ID: &str = "next_record_id";
