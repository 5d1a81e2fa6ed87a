pub mod aggregator;
pub mod buf;
pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod histogram;
pub mod metric;
pub mod output;
pub mod pool;
pub mod proto;

use std::time::SystemTime;

pub use metric::{Metric, MetricId, MetricRegistry, MetricType, TagSet, TimeSeries};

/// One observation produced by a virtual user; consumed by the next flush.
#[derive(Debug, Clone)]
pub struct Sample {
    pub series: TimeSeries,
    pub time: SystemTime,
    pub value: f64,
}

/// Samples a producer hands over in one go.
pub type SampleContainer = Vec<Sample>;
