use crossbeam::queue::SegQueue;

use crate::SampleContainer;

/// Where the flush cycle takes its samples from.
pub trait SampleSource: Send + Sync {
    /// Non-blocking; returns whatever accumulated since the previous call.
    fn drain(&self) -> Vec<SampleContainer>;
}

/// Multi-producer buffer shared by the virtual users and the flush cycle.
#[derive(Debug, Default)]
pub struct SampleBuffer {
    queue: SegQueue<SampleContainer>,
}
impl SampleBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_samples(&self, samples: SampleContainer) {
        if samples.is_empty() {
            return;
        }
        self.queue.push(samples);
    }
    pub fn len(&self) -> usize {
        self.queue.len()
    }
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
impl SampleSource for SampleBuffer {
    fn drain(&self) -> Vec<SampleContainer> {
        // Containers pushed while draining are left for the next call.
        let pending = self.queue.len();
        let mut drained = Vec::with_capacity(pending);
        for _ in 0..pending {
            let Some(samples) = self.queue.pop() else {
                break;
            };
            drained.push(samples);
        }
        drained
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::SystemTime};

    use super::*;
    use crate::{MetricRegistry, MetricType, Sample, TagSet, TimeSeries};

    fn sample(series: &TimeSeries, value: f64) -> Sample {
        Sample {
            series: series.clone(),
            time: SystemTime::now(),
            value,
        }
    }

    #[test]
    fn drain_returns_containers_in_order() {
        let mut registry = MetricRegistry::new();
        let metric = registry.new_metric("iterations", MetricType::Counter).unwrap();
        let series = TimeSeries::new(metric, Arc::new(TagSet::new()));

        let buf = SampleBuffer::new();
        buf.add_samples(vec![sample(&series, 1.0)]);
        buf.add_samples(vec![]);
        buf.add_samples(vec![sample(&series, 2.0), sample(&series, 3.0)]);
        assert_eq!(buf.len(), 2);

        let drained = buf.drain();
        let values: Vec<f64> = drained.iter().flatten().map(|s| s.value).collect();
        assert_eq!(values, [1.0, 2.0, 3.0]);
        assert!(buf.is_empty());
        assert!(buf.drain().is_empty());
    }

    #[test]
    fn concurrent_producers() {
        let mut registry = MetricRegistry::new();
        let metric = registry.new_metric("iterations", MetricType::Counter).unwrap();
        let series = TimeSeries::new(metric, Arc::new(TagSet::new()));
        let buf = Arc::new(SampleBuffer::new());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let buf = Arc::clone(&buf);
                let series = series.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        buf.add_samples(vec![sample(&series, f64::from(i))]);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        let total: usize = buf.drain().iter().map(Vec::len).sum();
        assert_eq!(total, 400);
    }
}
