use std::{collections::HashMap, sync::Arc};

use crate::{buf::SampleSource, Metric, MetricId, Sample, TimeSeries};

/// Samples of one metric grouped by time series, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct AggregatedSamples {
    samples: HashMap<TimeSeries, Vec<Sample>>,
    len: usize,
}
impl AggregatedSamples {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sample(&mut self, sample: Sample) {
        self.samples
            .entry(sample.series.clone())
            .or_default()
            .push(sample);
        self.len += 1;
    }

    /// Empties every series list.
    ///
    /// Series that received samples since the previous clear keep their
    /// storage for the next tick; series that stayed idle are dropped.
    pub fn clear(&mut self) {
        self.samples.retain(|_, samples| {
            let active = !samples.is_empty();
            samples.clear();
            active
        });
        self.len = 0;
    }

    /// Series with at least one sample.
    pub fn iter(&self) -> impl Iterator<Item = (&TimeSeries, &[Sample])> {
        self.samples
            .iter()
            .filter(|(_, samples)| !samples.is_empty())
            .map(|(series, samples)| (series, samples.as_slice()))
    }
    pub fn get(&self, series: &TimeSeries) -> Option<&[Sample]> {
        self.samples.get(series).map(Vec::as_slice)
    }
    pub fn series_count(&self) -> usize {
        self.samples.len()
    }
    /// Number of samples since the last clear.
    pub fn len(&self) -> usize {
        self.len
    }
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[derive(Debug, Clone)]
pub struct MetricAggregate {
    metric: Arc<Metric>,
    samples: AggregatedSamples,
}
impl MetricAggregate {
    pub fn metric(&self) -> &Arc<Metric> {
        &self.metric
    }
    pub fn samples(&self) -> &AggregatedSamples {
        &self.samples
    }
}

/// Per-run aggregation state, keyed by metric.
#[derive(Debug, Clone, Default)]
pub struct ActiveSeries {
    metrics: HashMap<MetricId, MetricAggregate>,
}
impl ActiveSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sample(&mut self, sample: Sample) {
        let metric = sample.series.metric();
        let aggregate = self
            .metrics
            .entry(metric.id())
            .or_insert_with(|| MetricAggregate {
                metric: Arc::clone(metric),
                samples: AggregatedSamples::new(),
            });
        aggregate.samples.add_sample(sample);
    }

    /// Drains `source` once. Returns whether anything was buffered.
    pub fn collect(&mut self, source: &dyn SampleSource) -> bool {
        let containers = source.drain();
        if containers.is_empty() {
            return false;
        }
        for sample in containers.into_iter().flatten() {
            self.add_sample(sample);
        }
        true
    }

    /// Metrics holding samples since the last clear.
    pub fn non_empty(&self) -> impl Iterator<Item = &MetricAggregate> {
        self.metrics
            .values()
            .filter(|aggregate| !aggregate.samples.is_empty())
    }
    pub fn get(&self, id: MetricId) -> Option<&MetricAggregate> {
        self.metrics.get(&id)
    }

    /// Clears every metric while keeping its entry.
    pub fn clear(&mut self) {
        for aggregate in self.metrics.values_mut() {
            aggregate.samples.clear();
        }
    }
    pub fn len(&self) -> usize {
        self.metrics.len()
    }
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}
