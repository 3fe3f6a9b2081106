//! Shared in-memory doubles for inspector integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use fleetscope_core::{InspectorConfig, MetricPoint, TagSet};
use fleetscope_discovery::*;
use fleetscope_metrics::{MetricsSink, SinkError, SinkResult};

/// Registry and history store over a fixed fleet.
#[derive(Default)]
pub struct InMemoryFleet {
    pub units: Vec<(String, TagSet)>,
    pub history: HashMap<String, Vec<TagSet>>,
    pub failing_tags: Vec<String>,
    pub failing_history: Vec<String>,
    pub list_calls: AtomicUsize,
    pub tag_calls: AtomicUsize,
    pub history_calls: AtomicUsize,
}

impl InMemoryFleet {
    pub fn unit(mut self, name: &str, tags: TagSet) -> Self {
        self.units.push((name.to_string(), tags));
        self
    }

    pub fn past(mut self, name: &str, tags: TagSet) -> Self {
        self.history.entry(format!("arn:{name}")).or_default().push(tags);
        self
    }

    pub fn network_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
            + self.tag_calls.load(Ordering::SeqCst)
            + self.history_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FunctionRegistry for InMemoryFleet {
    async fn list_units(&self, _page_token: Option<String>) -> DiscoveryResult<UnitPage> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(UnitPage {
            units: self
                .units
                .iter()
                .map(|(name, _)| UnitSummary {
                    name: name.clone(),
                    handle: format!("arn:{name}"),
                })
                .collect(),
            next_token: None,
        })
    }

    async fn get_tags(&self, handle: &str) -> DiscoveryResult<TagSet> {
        self.tag_calls.fetch_add(1, Ordering::SeqCst);
        let name = handle.trim_start_matches("arn:");
        if self.failing_tags.iter().any(|f| f == name) {
            return Err(DiscoveryError::TagLookup {
                handle: handle.to_string(),
                reason: "AccessDenied".to_string(),
            });
        }
        Ok(self
            .units
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, tags)| tags.clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl ConfigHistoryStore for InMemoryFleet {
    async fn query_history(&self, query: &HistoryQuery) -> DiscoveryResult<SnapshotPage> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        let name = query.resource_id.trim_start_matches("arn:");
        if self.failing_history.iter().any(|f| f == name) {
            return Err(DiscoveryError::HistoryQuery {
                resource_id: query.resource_id.clone(),
                reason: "ThrottlingException".to_string(),
            });
        }
        Ok(SnapshotPage {
            snapshots: self
                .history
                .get(&query.resource_id)
                .into_iter()
                .flatten()
                .map(|tags| TagSnapshot {
                    captured_at: None,
                    tags: tags.clone(),
                })
                .collect(),
            next_token: None,
        })
    }
}

/// Sink that records accepted points; fails the first `fail_calls` writes.
#[derive(Default)]
pub struct RecordingSink {
    pub accepted: Mutex<Vec<MetricPoint>>,
    pub fail_calls: AtomicUsize,
    pub calls: AtomicUsize,
}

impl RecordingSink {
    pub fn points(&self) -> Vec<MetricPoint> {
        self.accepted.lock().unwrap().clone()
    }

    pub fn named(&self, metric: &str) -> Vec<MetricPoint> {
        self.points()
            .into_iter()
            .filter(|p| p.metric_name == metric)
            .collect()
    }
}

#[async_trait]
impl MetricsSink for RecordingSink {
    async fn put_points(&self, _namespace: &str, points: &[MetricPoint]) -> SinkResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.fail_calls.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_calls.store(remaining - 1, Ordering::SeqCst);
            return Err(SinkError::Rejected("Throttling".to_string()));
        }
        self.accepted.lock().unwrap().extend_from_slice(points);
        Ok(())
    }
}

pub fn tags(version: &str, stack: &str, env: &str, build: &str) -> TagSet {
    TagSet::new()
        .with("AppVersion", version)
        .with("Stack", stack)
        .with("Environment", env)
        .with("TerraformVersion", build)
}

pub fn config() -> InspectorConfig {
    InspectorConfig {
        namespace: Some("Fleet/Versions".to_string()),
        ..InspectorConfig::default()
    }
}
