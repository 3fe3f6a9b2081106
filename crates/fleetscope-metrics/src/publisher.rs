//! Metrics publisher: batched writes with a per-point fallback tier.
//!
//! Points are split into batches of at most `batch_size`. Each batch gets
//! one bulk write; if that fails, every point in the batch is written on
//! its own so one bad point cannot take its siblings down. There are no
//! further retries. Batches go out sequentially.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use fleetscope_core::MetricPoint;

use crate::sink::MetricsSink;

/// Failure counters for one `publish` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PublishStats {
    pub batches: usize,
    /// Bulk writes that failed and fell back to per-point writes.
    pub batch_failures: usize,
    pub points_published: usize,
    /// Points dropped after their single write also failed.
    pub point_failures: usize,
}

impl PublishStats {
    pub fn merge(&mut self, other: PublishStats) {
        self.batches += other.batches;
        self.batch_failures += other.batch_failures;
        self.points_published += other.points_published;
        self.point_failures += other.point_failures;
    }
}

pub struct MetricsPublisher {
    sink: Arc<dyn MetricsSink>,
    namespace: String,
    batch_size: usize,
}

impl MetricsPublisher {
    /// Create a publisher. A batch size of zero is raised to one.
    pub fn new(sink: Arc<dyn MetricsSink>, namespace: impl Into<String>, batch_size: usize) -> Self {
        Self {
            sink,
            namespace: namespace.into(),
            batch_size: batch_size.max(1),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Publish every point. Never fails; see the returned counters.
    pub async fn publish(&self, points: &[MetricPoint]) -> PublishStats {
        let mut stats = PublishStats::default();

        for batch in points.chunks(self.batch_size) {
            stats.batches += 1;
            if !self.write_batch(batch, &mut stats).await {
                self.write_points(batch, &mut stats).await;
            }
        }

        info!(
            namespace = %self.namespace,
            points = points.len(),
            batches = stats.batches,
            published = stats.points_published,
            batch_failures = stats.batch_failures,
            point_failures = stats.point_failures,
            "metrics published"
        );
        stats
    }

    /// Bulk tier. Returns false when the batch must fall back.
    async fn write_batch(&self, batch: &[MetricPoint], stats: &mut PublishStats) -> bool {
        match self.sink.put_points(&self.namespace, batch).await {
            Ok(()) => {
                stats.points_published += batch.len();
                debug!(points = batch.len(), "batch written");
                true
            }
            Err(e) => {
                stats.batch_failures += 1;
                warn!(
                    points = batch.len(),
                    error = %e,
                    "batch write failed, falling back to single-point writes"
                );
                false
            }
        }
    }

    /// Per-point tier, sequential.
    async fn write_points(&self, batch: &[MetricPoint], stats: &mut PublishStats) {
        for point in batch {
            match self
                .sink
                .put_points(&self.namespace, std::slice::from_ref(point))
                .await
            {
                Ok(()) => stats.points_published += 1,
                Err(e) => {
                    stats.point_failures += 1;
                    warn!(
                        metric = %point.metric_name,
                        dimensions = ?point.dimensions,
                        error = %e,
                        "point write failed, dropping point"
                    );
                }
            }
        }
    }
}
