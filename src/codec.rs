use std::time::SystemTime;

use crate::{
    aggregator::{AggregatedSamples, MetricAggregate},
    histogram::Histogram,
    proto::{self, time_series::Samples},
    Metric, MetricType, Sample, TimeSeries,
};

const NAME_LABEL: &str = "__name__";
const TEST_RUN_ID_LABEL: &str = "test_run_id";

/// Encodes one metric's aggregated series.
///
/// `tick` is the flush boundary, used as the time of every trend histogram.
pub fn encode_metric(
    aggregate: &MetricAggregate,
    reference_id: &str,
    tick: SystemTime,
) -> proto::Metric {
    let metric = aggregate.metric();
    proto::Metric {
        name: metric.name().to_owned(),
        r#type: wire_type(metric.metric_type()) as i32,
        time_series: encode_time_series(metric, aggregate.samples(), reference_id, tick),
    }
}

pub fn encode_time_series(
    metric: &Metric,
    aggregated: &AggregatedSamples,
    reference_id: &str,
    tick: SystemTime,
) -> Vec<proto::TimeSeries> {
    aggregated
        .iter()
        .map(|(series, samples)| proto::TimeSeries {
            labels: labels(series, reference_id),
            samples: Some(encode_samples(metric.metric_type(), samples, tick)),
        })
        .collect()
}

fn wire_type(metric_type: MetricType) -> proto::MetricType {
    match metric_type {
        MetricType::Counter => proto::MetricType::Counter,
        MetricType::Gauge => proto::MetricType::Gauge,
        MetricType::Rate => proto::MetricType::Rate,
        MetricType::Trend => proto::MetricType::Trend,
    }
}

fn labels(series: &TimeSeries, reference_id: &str) -> Vec<proto::Label> {
    let tags = series.tags();
    let mut labels = Vec::with_capacity(tags.len() + 2);
    labels.push(label(NAME_LABEL, series.metric().name()));
    labels.push(label(TEST_RUN_ID_LABEL, reference_id));
    labels.extend(tags.iter().map(|(name, value)| label(name, value)));
    labels
}

fn label(name: &str, value: &str) -> proto::Label {
    proto::Label {
        name: name.to_owned(),
        value: value.to_owned(),
    }
}

fn encode_samples(metric_type: MetricType, samples: &[Sample], tick: SystemTime) -> Samples {
    match metric_type {
        MetricType::Counter => Samples::CounterSamples(counter_samples(samples)),
        MetricType::Gauge => Samples::GaugeSamples(gauge_samples(samples)),
        MetricType::Rate => Samples::RateSamples(rate_samples(samples)),
        MetricType::Trend => Samples::TrendHdrSamples(trend_samples(samples, tick)),
    }
}

fn counter_samples(samples: &[Sample]) -> proto::CounterSamples {
    let values = samples
        .iter()
        .map(|sample| proto::CounterValue {
            time: Some(sample.time.into()),
            value: sample.value,
        })
        .collect();
    proto::CounterSamples { values }
}

/// One point per sample, the ingester aggregates them.
fn gauge_samples(samples: &[Sample]) -> proto::GaugeSamples {
    let values = samples
        .iter()
        .map(|sample| proto::GaugeValue {
            time: Some(sample.time.into()),
            last: sample.value,
            min: sample.value,
            max: sample.value,
            avg: sample.value,
        })
        .collect();
    proto::GaugeSamples { values }
}

fn rate_samples(samples: &[Sample]) -> proto::RateSamples {
    let values = samples
        .iter()
        .map(|sample| proto::RateValue {
            time: Some(sample.time.into()),
            nonzero_count: u32::from(sample.value != 0.0),
            total_count: 1,
        })
        .collect();
    proto::RateSamples { values }
}

fn trend_samples(samples: &[Sample], tick: SystemTime) -> proto::TrendHdrSamples {
    let histogram = Histogram::new(samples.iter().map(|sample| sample.value));
    proto::TrendHdrSamples {
        values: vec![histogram.to_proto(tick)],
    }
}
