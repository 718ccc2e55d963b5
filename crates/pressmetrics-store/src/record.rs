use chrono::{DateTime, Utc};
use pressmetrics_common::LabelSet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    pub id: u64,
    pub metric_name: String,
    pub labels: LabelSet,
    pub value: f64,
    pub recorded_at: DateTime<Utc>,
}

impl SampleRecord {
    pub fn series_key(&self) -> String {
        series_key(&self.metric_name, &self.labels)
    }
}

/// Identity of a series: metric name plus the canonical label serialization.
pub fn series_key(metric_name: &str, labels: &LabelSet) -> String {
    format!("{metric_name}|{}", labels.canonical())
}

#[cfg(test)]
mod tests {
    use pressmetrics_common::LabelSet;

    use super::series_key;

    #[test]
    fn series_key_is_order_insensitive() {
        let left = LabelSet::new().with("old_status", "draft").with("new_status", "publish");
        let right = LabelSet::new().with("new_status", "publish").with("old_status", "draft");
        assert_eq!(
            series_key("wordpress_post_status_changes_total", &left),
            series_key("wordpress_post_status_changes_total", &right)
        );
    }

    #[test]
    fn series_key_separates_metric_names() {
        let labels = LabelSet::new().with("type", "object");
        assert_ne!(
            series_key("wordpress_cache_hits_total", &labels),
            series_key("wordpress_cache_misses_total", &labels)
        );
    }
}
