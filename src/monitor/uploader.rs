//! Rate-gated cloud upload with an offline replay buffer.
//!
//! A subset of records goes to the remote sink, at most one attempt per
//! rate interval. Payloads that fail to send are buffered and replayed
//! oldest-first once the sink answers again; a sustained outage evicts
//! the oldest buffered payloads rather than growing without bound.

use crate::ingest::risk::RiskLevel;
use serde::Serialize;
use std::collections::VecDeque;
use std::thread;
use std::time::{Duration, Instant};

/// Minimum spacing between upload attempts.
pub const DEFAULT_UPLOAD_INTERVAL: Duration = Duration::from_secs(15);

/// Maximum payloads held while the sink is unreachable.
pub const DEFAULT_BUFFER_CAPACITY: usize = 256;

/// One cloud-sink payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadPayload {
    pub temp: f64,
    pub light: i64,
    pub risk: u8,
}

impl UploadPayload {
    pub fn new(temp: f64, light: i64, risk: RiskLevel) -> Self {
        Self {
            temp,
            light,
            risk: risk.ordinal(),
        }
    }
}

/// Transport failure on the way to the cloud sink.
#[derive(Debug)]
pub enum TransportError {
    /// Network or HTTP-layer error.
    Network(String),
    /// The endpoint answered with something unreadable.
    InvalidResponse(String),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Network(msg) => write!(f, "transport error: {msg}"),
            TransportError::InvalidResponse(msg) => write!(f, "invalid response: {msg}"),
        }
    }
}

impl std::error::Error for TransportError {}

/// Delivery to the remote endpoint.
///
/// `Ok(false)` means the endpoint answered but rejected the payload.
pub trait UploadTransport: Send {
    fn send(&self, payload: &UploadPayload) -> Result<bool, TransportError>;
}

/// Rate-gated uploader that buffers payloads while the sink is down and
/// replays them oldest-first once it recovers.
pub struct CloudUploader {
    transport: Box<dyn UploadTransport>,
    interval: Duration,
    buffer_capacity: usize,
    last_attempt: Option<Instant>,
    pending: VecDeque<UploadPayload>,
}

impl CloudUploader {
    pub fn new(transport: Box<dyn UploadTransport>) -> Self {
        Self::with_settings(transport, DEFAULT_UPLOAD_INTERVAL, DEFAULT_BUFFER_CAPACITY)
    }

    pub fn with_settings(
        transport: Box<dyn UploadTransport>,
        interval: Duration,
        buffer_capacity: usize,
    ) -> Self {
        Self {
            transport,
            interval,
            buffer_capacity: buffer_capacity.max(1),
            last_attempt: None,
            pending: VecDeque::new(),
        }
    }

    /// Offer one reading for upload. A no-op while the rate gate is
    /// closed; otherwise one attempt is made and the gate closes again
    /// regardless of the outcome.
    pub fn offer(&mut self, temp: f64, light: i64, risk: RiskLevel) {
        if let Some(last) = self.last_attempt {
            if last.elapsed() < self.interval {
                return;
            }
        }
        self.last_attempt = Some(Instant::now());

        let payload = UploadPayload::new(temp, light, risk);
        match self.transport.send(&payload) {
            Ok(true) => {
                tracing::info!(temp, light, risk = payload.risk, "uploaded reading");
                self.drain_pending();
            }
            Ok(false) => {
                tracing::warn!("upload rejected, buffering payload");
                self.buffer(payload);
            }
            Err(e) => {
                tracing::warn!(error = %e, "upload failed, buffering payload");
                self.buffer(payload);
            }
        }
    }

    /// Number of payloads waiting for replay.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Replay buffered payloads oldest-first, pausing one rate interval
    /// before each retry. The first retry failure puts its payload back
    /// at the front and stops the drain.
    fn drain_pending(&mut self) {
        while let Some(payload) = self.pending.pop_front() {
            thread::sleep(self.interval);
            match self.transport.send(&payload) {
                Ok(true) => {
                    tracing::info!("uploaded buffered payload");
                }
                Ok(false) | Err(_) => {
                    self.pending.push_front(payload);
                    break;
                }
            }
        }
    }

    fn buffer(&mut self, payload: UploadPayload) {
        if self.pending.len() == self.buffer_capacity {
            self.pending.pop_front();
            tracing::warn!(
                capacity = self.buffer_capacity,
                "upload buffer full, dropping oldest payload"
            );
        }
        self.pending.push_back(payload);
    }
}

/// ThingSpeak-style HTTP transport: GET with `api_key` and `field1..3`
/// query parameters; a body of "0" or an error status is a rejection.
pub struct HttpUploadTransport {
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
    url: String,
    api_key: String,
}

impl HttpUploadTransport {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| TransportError::Network(format!("failed to create runtime: {e}")))?;

        Ok(Self {
            client,
            runtime,
            url: url.into(),
            api_key: api_key.into(),
        })
    }
}

impl UploadTransport for HttpUploadTransport {
    fn send(&self, payload: &UploadPayload) -> Result<bool, TransportError> {
        let temp = payload.temp.to_string();
        let light = payload.light.to_string();
        let risk = payload.risk.to_string();

        self.runtime.block_on(async {
            let response = self
                .client
                .get(&self.url)
                .query(&[
                    ("api_key", self.api_key.as_str()),
                    ("field1", temp.as_str()),
                    ("field2", light.as_str()),
                    ("field3", risk.as_str()),
                ])
                .send()
                .await
                .map_err(|e| TransportError::Network(e.to_string()))?;

            if !response.status().is_success() {
                return Ok(false);
            }

            let body = response
                .text()
                .await
                .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;
            Ok(body.trim() != "0")
        })
    }
}
