use std::{
    sync::Arc,
    time::{Duration, Instant, SystemTime},
};

use tokio::{
    sync::oneshot,
    task::{JoinError, JoinHandle},
    time::MissedTickBehavior,
};
use tracing::{debug, error, info_span, warn};

use crate::{
    aggregator::ActiveSeries,
    buf::SampleSource,
    client::MetricsClient,
    codec::encode_metric,
    config::CloudConfig,
    error::{ConfigError, PushError},
    proto,
};

/// Sends the samples of a test run to the metrics ingestion service.
pub struct CloudOutput {
    client: MetricsClient,
    source: Arc<dyn SampleSource>,
    reference_id: String,
    active_series: ActiveSeries,
}
impl CloudOutput {
    pub fn new(config: &CloudConfig, source: Arc<dyn SampleSource>) -> Result<Self, ConfigError> {
        let client = MetricsClient::new(config)?;
        Ok(Self {
            client,
            source,
            reference_id: String::new(),
            active_series: ActiveSeries::new(),
        })
    }

    pub fn set_reference_id(&mut self, reference_id: impl Into<String>) {
        self.reference_id = reference_id.into();
    }
    pub fn reference_id(&self) -> &str {
        &self.reference_id
    }
    pub fn active_series(&self) -> &ActiveSeries {
        &self.active_series
    }

    /// One flush tick. Failures are logged; the next tick starts from a clean state.
    pub fn flush_metrics(&mut self) {
        let _span = info_span!("output", output = "cloudv2").entered();
        if self.reference_id.is_empty() {
            warn!("No reference ID of the test run yet, skipping the flush");
            return;
        }
        let start = Instant::now();
        match self.flush(SystemTime::now()) {
            Ok(true) => {
                debug!(
                    elapsed = ?start.elapsed(),
                    "Successfully flushed buffered samples to the cloud"
                );
            }
            Ok(false) => {}
            Err(e) => {
                error!(error = %e, "Failed to push metrics");
            }
        }
    }

    /// Returns whether a batch was pushed.
    fn flush(&mut self, tick: SystemTime) -> Result<bool, PushError> {
        if !self.active_series.collect(self.source.as_ref()) {
            return Ok(false);
        }
        let metric_set = self.metric_set(tick);
        // Unsent samples of a failed push are dropped with the rest.
        self.active_series.clear();
        if metric_set.metrics.is_empty() {
            return Ok(false);
        }
        self.client.push(&self.reference_id, &metric_set)?;
        Ok(true)
    }

    fn metric_set(&self, tick: SystemTime) -> proto::MetricSet {
        let metrics = self
            .active_series
            .non_empty()
            .map(|aggregate| encode_metric(aggregate, &self.reference_id, tick))
            .collect();
        proto::MetricSet { metrics }
    }
}
impl core::fmt::Debug for CloudOutput {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CloudOutput")
            .field("client", &self.client)
            .field("reference_id", &self.reference_id)
            .field("active_series", &self.active_series.len())
            .finish()
    }
}

/// Calls [`CloudOutput::flush_metrics`] on a fixed interval, never concurrently.
#[derive(Debug)]
pub struct PeriodicFlusher {
    stop: oneshot::Sender<()>,
    task: JoinHandle<Result<CloudOutput, JoinError>>,
}
impl PeriodicFlusher {
    /// Must be called from within a tokio runtime.
    pub fn start(interval: Duration, output: CloudOutput) -> Result<Self, ConfigError> {
        if interval.is_zero() {
            return Err(ConfigError::ZeroPushInterval);
        }
        let (stop, mut stop_rx) = oneshot::channel();
        let task = tokio::spawn(async move {
            let mut output = output;
            let start = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(start, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = &mut stop_rx => break,
                }
                output = flush_blocking(output).await?;
            }
            flush_blocking(output).await
        });
        Ok(Self { stop, task })
    }

    /// Flushes one last time and hands the output back.
    pub async fn stop(self) -> anyhow::Result<CloudOutput> {
        let _ = self.stop.send(());
        let output = self.task.await??;
        Ok(output)
    }
}

/// The push blocks on network I/O.
async fn flush_blocking(mut output: CloudOutput) -> Result<CloudOutput, JoinError> {
    tokio::task::spawn_blocking(move || {
        output.flush_metrics();
        output
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{buf::SampleBuffer, MetricRegistry, MetricType, Sample, TagSet, TimeSeries};

    fn output(buf: &Arc<SampleBuffer>) -> CloudOutput {
        let config = CloudConfig::new("http://127.0.0.1:1", "token");
        let source: Arc<dyn SampleSource> = Arc::clone(buf) as _;
        CloudOutput::new(&config, source).unwrap()
    }

    fn add_sample(buf: &SampleBuffer, registry: &mut MetricRegistry) {
        let metric = registry.new_metric("http_reqs", MetricType::Counter).unwrap();
        buf.add_samples(vec![Sample {
            series: TimeSeries::new(metric, Arc::new(TagSet::new())),
            time: SystemTime::now(),
            value: 1.0,
        }]);
    }

    #[test]
    fn new_requires_credentials() {
        let buf: Arc<dyn SampleSource> = Arc::new(SampleBuffer::new());
        let config = CloudConfig::new("", "token");
        let err = CloudOutput::new(&config, Arc::clone(&buf)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingHost));
        let config = CloudConfig::new("http://h", "");
        let err = CloudOutput::new(&config, buf).unwrap_err();
        assert!(matches!(err, ConfigError::MissingToken));
    }

    #[test]
    fn flush_without_reference_id_keeps_buffer() {
        let buf = Arc::new(SampleBuffer::new());
        let mut registry = MetricRegistry::new();
        add_sample(&buf, &mut registry);

        let mut output = output(&buf);
        output.flush_metrics();
        assert_eq!(buf.len(), 1);
        assert!(output.active_series().is_empty());
    }

    #[derive(Clone, Default)]
    struct LogBuf(Arc<std::sync::Mutex<Vec<u8>>>);
    impl std::io::Write for LogBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn flush_logs_within_output_span() {
        let logs = LogBuf::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let buf = Arc::new(SampleBuffer::new());
        let mut output = output(&buf);
        tracing::subscriber::with_default(subscriber, || output.flush_metrics());

        let logs = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("No reference ID"), "{logs}");
        assert!(logs.contains(r#"output{output="cloudv2"}"#), "{logs}");
    }

    #[test]
    fn flush_with_empty_buffer_pushes_nothing() {
        let buf = Arc::new(SampleBuffer::new());
        let mut output = output(&buf);
        output.set_reference_id("123");
        assert!(!output.flush(SystemTime::now()).unwrap());
    }

    #[test]
    fn failed_push_drops_the_tick() {
        let buf = Arc::new(SampleBuffer::new());
        let mut registry = MetricRegistry::new();
        add_sample(&buf, &mut registry);

        let mut output = output(&buf);
        output.set_reference_id("123");
        let err = output.flush(SystemTime::now()).unwrap_err();
        assert!(matches!(err, PushError::Transport(_)));
        assert!(buf.is_empty());
        assert_eq!(output.active_series().len(), 1);
        assert_eq!(output.active_series().non_empty().count(), 0);
    }

    #[test]
    fn metric_set_contains_non_empty_metrics() {
        let buf = Arc::new(SampleBuffer::new());
        let mut registry = MetricRegistry::new();
        add_sample(&buf, &mut registry);
        let gauge = registry.new_metric("vus", MetricType::Gauge).unwrap();
        buf.add_samples(vec![Sample {
            series: TimeSeries::new(gauge, Arc::new(TagSet::new())),
            time: SystemTime::now(),
            value: 10.0,
        }]);

        let mut output = output(&buf);
        output.set_reference_id("123");
        assert!(output.active_series.collect(&*buf));
        let mut names: Vec<String> = output
            .metric_set(SystemTime::now())
            .metrics
            .into_iter()
            .map(|m| m.name)
            .collect();
        names.sort();
        assert_eq!(names, ["http_reqs", "vus"]);
    }

    #[tokio::test]
    async fn zero_interval_is_rejected() {
        let buf = Arc::new(SampleBuffer::new());
        let err = PeriodicFlusher::start(Duration::ZERO, output(&buf)).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroPushInterval));
    }

    #[tokio::test]
    async fn stop_flushes_and_returns_output() {
        let buf = Arc::new(SampleBuffer::new());
        let mut output = output(&buf);
        output.set_reference_id("123");
        let mut registry = MetricRegistry::new();
        add_sample(&buf, &mut registry);

        let flusher = PeriodicFlusher::start(Duration::from_secs(3600), output).unwrap();
        let output = flusher.stop().await.unwrap();
        // The final flush drained the buffer even though the push failed.
        assert!(buf.is_empty());
        assert_eq!(output.reference_id(), "123");
    }
}
