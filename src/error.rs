use thiserror::Error;

use crate::metric::MetricType;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("host is required")]
    MissingHost,
    #[error("token is required")]
    MissingToken,
    #[error("push interval must be greater than zero")]
    ZeroPushInterval,
}

#[derive(Error, Debug)]
pub enum MetricError {
    #[error("metric name is required")]
    EmptyName,
    #[error("metric {name} is already registered as a {registered}, not a {requested}")]
    TypeMismatch {
        name: String,
        registered: MetricType,
        requested: MetricType,
    },
    #[error("too many metrics registered")]
    TooManyMetrics,
}

/// Failure of a single push; none of them are retried.
#[derive(Error, Debug)]
pub enum PushError {
    #[error("a reference ID of the test run is required")]
    MissingReferenceId,
    #[error("encoding series as protobuf write request failed: {0}")]
    Encode(#[from] prost::EncodeError),
    #[error("the protobuf message is too large to be handled by the ingester; size: {size}, limit: {limit}")]
    TooLarge { size: usize, limit: usize },
    #[error("snappy compression failed: {0}")]
    Compress(#[from] snap::Error),
    #[error("failed to push metrics: {0}")]
    Transport(#[source] Box<ureq::Transport>),
    #[error("failed to read push metrics response: {0}")]
    ReadResponse(#[source] std::io::Error),
    #[error("failed to push metrics: push metrics response got an unexpected status code: {code} {status}")]
    Status { code: u16, status: String },
}
