use crate::metrics::{
    catalog::ACTIVE_USERS_TOTAL,
    collectors::{LiveSample, LiveSource},
};

/// Users seen within the activity window, counted by the sample store before
/// the scrape resolves.
#[derive(Debug, Clone, Copy)]
pub struct ActiveUsers {
    count: u64,
}

impl ActiveUsers {
    pub fn new(count: u64) -> Self {
        Self { count }
    }
}

impl LiveSource for ActiveUsers {
    fn collect(&self) -> Vec<LiveSample> {
        vec![LiveSample::new(ACTIVE_USERS_TOTAL, self.count as f64)]
    }
}
