// CLOUD_HOST=http://127.0.0.1:8080 CLOUD_TOKEN=abc CLOUD_REFERENCE_ID=123 \
//     cargo run --example push -- 1s 10s

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, SystemTime},
};

use anyhow::Context;
use cloud_metrics::{
    buf::{SampleBuffer, SampleSource},
    config::CloudConfig,
    output::{CloudOutput, PeriodicFlusher},
    MetricRegistry, MetricType, Sample, TagSet, TimeSeries,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let push_interval = match args.next() {
        Some(arg) => humantime::parse_duration(&arg).context("push interval")?,
        None => Duration::from_secs(1),
    };
    let run_for = match args.next() {
        Some(arg) => humantime::parse_duration(&arg).context("run duration")?,
        None => Duration::from_secs(10),
    };

    let mut config = CloudConfig::new(
        std::env::var("CLOUD_HOST").unwrap_or_default(),
        std::env::var("CLOUD_TOKEN").unwrap_or_default(),
    );
    config.push_interval = push_interval;
    config.validate()?;
    let reference_id = std::env::var("CLOUD_REFERENCE_ID").context("CLOUD_REFERENCE_ID")?;

    let mut registry = MetricRegistry::new();
    let iterations = registry.new_metric("iterations", MetricType::Counter)?;
    let vus = registry.new_metric("vus", MetricType::Gauge)?;
    let checks = registry.new_metric("checks", MetricType::Rate)?;
    let duration = registry.new_metric("iteration_duration", MetricType::Trend)?;

    let buf = Arc::new(SampleBuffer::new());
    let running = Arc::new(AtomicBool::new(true));
    let producers: Vec<_> = (0..4)
        .map(|vu| {
            let buf = Arc::clone(&buf);
            let running = Arc::clone(&running);
            let tags = Arc::new(TagSet::new().with("vu", vu.to_string()));
            let iterations = TimeSeries::new(Arc::clone(&iterations), Arc::clone(&tags));
            let vus = TimeSeries::new(Arc::clone(&vus), Arc::clone(&tags));
            let checks = TimeSeries::new(Arc::clone(&checks), Arc::clone(&tags));
            let duration = TimeSeries::new(Arc::clone(&duration), tags);
            std::thread::spawn(move || {
                let mut i: u64 = 0;
                while running.load(Ordering::Relaxed) {
                    let time = SystemTime::now();
                    let sample = |series: &TimeSeries, value: f64| Sample {
                        series: series.clone(),
                        time,
                        value,
                    };
                    buf.add_samples(vec![
                        sample(&iterations, 1.0),
                        sample(&vus, 4.0),
                        sample(&checks, if i % 10 == 0 { 0.0 } else { 1.0 }),
                        sample(&duration, (i % 500) as f64 + 0.5),
                    ]);
                    i += 1;
                    std::thread::sleep(Duration::from_millis(20));
                }
            })
        })
        .collect();

    let source: Arc<dyn SampleSource> = buf;
    let mut output = CloudOutput::new(&config, source)?;
    output.set_reference_id(reference_id);
    let flusher = PeriodicFlusher::start(config.push_interval, output)?;

    tokio::time::sleep(run_for).await;
    running.store(false, Ordering::Relaxed);
    for producer in producers {
        producer
            .join()
            .map_err(|_| anyhow::anyhow!("producer panicked"))?;
    }
    flusher.stop().await?;
    Ok(())
}
