//! Metrics sink interface and a writer-backed implementation.

use std::io::Write;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use fleetscope_core::MetricPoint;

use crate::prometheus::render_prometheus;

pub type SinkResult<T> = Result<T, SinkError>;

#[derive(Debug, Error)]
pub enum SinkError {
    /// The sink refused the write; the whole call failed.
    #[error("sink rejected write: {0}")]
    Rejected(String),

    #[error("sink i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Timeseries ingestion. A call succeeds or fails as a unit.
#[async_trait]
pub trait MetricsSink: Send + Sync {
    async fn put_points(&self, namespace: &str, points: &[MetricPoint]) -> SinkResult<()>;
}

/// Rendering used by [`WriterSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One JSON object per write.
    #[default]
    Json,
    /// Prometheus text exposition.
    Prometheus,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct PutRequest<'a> {
    namespace: &'a str,
    metric_data: &'a [MetricPoint],
}

/// Writes every accepted batch to an `io::Write` (stdout in the daemon).
pub struct WriterSink<W> {
    out: Mutex<W>,
    format: OutputFormat,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self {
            out: Mutex::new(out),
            format,
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl<W: Write + Send> MetricsSink for WriterSink<W> {
    async fn put_points(&self, namespace: &str, points: &[MetricPoint]) -> SinkResult<()> {
        let rendered = match self.format {
            OutputFormat::Json => {
                let mut line = serde_json::to_string(&PutRequest {
                    namespace,
                    metric_data: points,
                })?;
                line.push('\n');
                line
            }
            OutputFormat::Prometheus => render_prometheus(namespace, points),
        };

        let mut out = self
            .out
            .lock()
            .map_err(|_| SinkError::Rejected("writer lock poisoned".to_string()))?;
        out.write_all(rendered.as_bytes())?;
        out.flush()?;
        Ok(())
    }
}
