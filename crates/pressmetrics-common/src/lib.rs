pub mod error;
pub mod labels;
pub mod time;

pub use error::{ExporterError, Result};
pub use labels::LabelSet;
pub use time::{Clock, ManualClock, SystemClock};
