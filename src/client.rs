use std::{io, time::Instant};

use prost::Message;
use tracing::debug;

use crate::{config::CloudConfig, error::ConfigError, error::PushError, pool::BufferPool, proto};

/// Largest accepted serialized batch, before compression.
pub const MAX_REQUEST_SIZE: usize = 100 * 1024;
pub const PROTOCOL_VERSION_HEADER: &str = "K6-Metrics-Protocol-Version";
pub const PROTOCOL_VERSION: &str = "2.0";

/// One for the serialized batch and one for its compressed form.
const POOL_SIZE: usize = 2;

/// Pushes metric sets to the ingestion service.
///
/// Blocking I/O.
#[derive(Debug)]
pub struct MetricsClient {
    agent: ureq::Agent,
    host: String,
    token: String,
    buffers: BufferPool,
}
impl MetricsClient {
    pub fn new(config: &CloudConfig) -> Result<Self, ConfigError> {
        if config.host.is_empty() {
            return Err(ConfigError::MissingHost);
        }
        if config.token.is_empty() {
            return Err(ConfigError::MissingToken);
        }
        let agent = ureq::AgentBuilder::new()
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent())
            .build();
        Ok(Self {
            agent,
            host: config.host.trim_end_matches('/').to_owned(),
            token: config.token.clone(),
            buffers: BufferPool::new(POOL_SIZE),
        })
    }

    pub fn push(&self, reference_id: &str, metric_set: &proto::MetricSet) -> Result<(), PushError> {
        if reference_id.is_empty() {
            return Err(PushError::MissingReferenceId);
        }
        let start = Instant::now();
        let url = format!("{}/v2/metrics/{}", self.host, reference_id);

        let mut raw = self.buffers.acquire();
        let size = encode_request(metric_set, &mut raw)?;
        let mut body = self.buffers.acquire();
        compress(&raw, &mut body)?;

        let resp = self
            .agent
            .post(&url)
            .set("Content-Type", "application/x-protobuf")
            .set("Content-Encoding", "snappy")
            .set(PROTOCOL_VERSION_HEADER, PROTOCOL_VERSION)
            .set("Authorization", &format!("Token {}", self.token))
            .send_bytes(&body)
            .map_err(|e| match e {
                ureq::Error::Status(code, resp) => PushError::Status {
                    code,
                    status: resp.status_text().to_owned(),
                },
                ureq::Error::Transport(transport) => PushError::Transport(Box::new(transport)),
            })?;
        if resp.status() != 200 {
            return Err(PushError::Status {
                code: resp.status(),
                status: resp.status_text().to_owned(),
            });
        }
        // The agent only pools the connection once the body is read to the end.
        io::copy(&mut resp.into_reader(), &mut io::sink()).map_err(PushError::ReadResponse)?;
        debug!(elapsed = ?start.elapsed(), size, "Pushed part to cloud");
        Ok(())
    }
}

/// Serializes `metric_set` into `buf`, refusing anything over [`MAX_REQUEST_SIZE`].
pub fn encode_request(
    metric_set: &proto::MetricSet,
    buf: &mut Vec<u8>,
) -> Result<usize, PushError> {
    let size = metric_set.encoded_len();
    if size > MAX_REQUEST_SIZE {
        return Err(PushError::TooLarge {
            size,
            limit: MAX_REQUEST_SIZE,
        });
    }
    buf.clear();
    buf.reserve(size);
    metric_set.encode(buf)?;
    Ok(size)
}

/// Snappy block format, not the framed one.
fn compress(input: &[u8], out: &mut Vec<u8>) -> Result<(), PushError> {
    out.clear();
    out.resize(snap::raw::max_compress_len(input.len()), 0);
    let n = snap::raw::Encoder::new().compress(input, out)?;
    out.truncate(n);
    Ok(())
}
