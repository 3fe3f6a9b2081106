//! File-backed registry and history store.
//!
//! Serves a JSON fleet document so a pass can run against a captured or
//! hand-written fleet without any cloud access:
//!
//! ```json
//! { "units": [ { "name": "billing-api", "handle": "arn:...:billing-api",
//!                "tags": { "AppVersion": "1.4.0" },
//!                "history": [ { "captured_at": "2026-01-01T00:00:00Z",
//!                               "tags": { "AppVersion": "1.3.0" } } ] } ] }
//! ```
//!
//! Page tokens are stringified offsets.

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use fleetscope_core::TagSet;

use crate::error::{DiscoveryError, DiscoveryResult};
use crate::registry::{
    ConfigHistoryStore, FunctionRegistry, HistoryQuery, SnapshotPage, TagSnapshot, UnitPage,
    UnitSummary,
};

#[derive(Debug, Clone, Deserialize)]
struct FleetDocument {
    #[serde(default)]
    units: Vec<UnitRecord>,
}

#[derive(Debug, Clone, Deserialize)]
struct UnitRecord {
    name: String,
    /// Defaults to the unit name.
    #[serde(default)]
    handle: Option<String>,
    #[serde(default)]
    tags: TagSet,
    #[serde(default)]
    history: Vec<TagSnapshot>,
}

impl UnitRecord {
    fn handle(&self) -> &str {
        self.handle.as_deref().unwrap_or(&self.name)
    }
}

/// A fleet loaded from a JSON document.
#[derive(Debug, Clone)]
pub struct FileFleet {
    units: Vec<UnitRecord>,
    page_size: usize,
}

impl FileFleet {
    pub fn from_path(path: &Path, page_size: usize) -> DiscoveryResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| DiscoveryError::Load(e.to_string()))?;
        Self::from_json(&content, page_size)
    }

    pub fn from_json(content: &str, page_size: usize) -> DiscoveryResult<Self> {
        let doc: FleetDocument =
            serde_json::from_str(content).map_err(|e| DiscoveryError::Load(e.to_string()))?;
        debug!(units = doc.units.len(), "fleet document loaded");
        Ok(Self {
            units: doc.units,
            page_size: page_size.max(1),
        })
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    fn find(&self, handle: &str) -> Option<&UnitRecord> {
        self.units.iter().find(|u| u.handle() == handle)
    }
}

fn parse_offset(token: Option<&str>) -> DiscoveryResult<usize> {
    match token {
        None => Ok(0),
        Some(t) => t
            .parse()
            .map_err(|_| DiscoveryError::PageToken(t.to_string())),
    }
}

/// Slice `items` at `offset`, returning the page and the next token.
fn page<T: Clone>(items: &[T], offset: usize, size: usize) -> (Vec<T>, Option<String>) {
    let end = (offset + size).min(items.len());
    let slice = items.get(offset..end).map(<[T]>::to_vec).unwrap_or_default();
    let next = (end < items.len()).then(|| end.to_string());
    (slice, next)
}

#[async_trait]
impl FunctionRegistry for FileFleet {
    async fn list_units(&self, page_token: Option<String>) -> DiscoveryResult<UnitPage> {
        let offset = parse_offset(page_token.as_deref())?;
        let summaries: Vec<UnitSummary> = self
            .units
            .iter()
            .map(|u| UnitSummary {
                name: u.name.clone(),
                handle: u.handle().to_string(),
            })
            .collect();
        let (units, next_token) = page(&summaries, offset, self.page_size);
        Ok(UnitPage { units, next_token })
    }

    async fn get_tags(&self, handle: &str) -> DiscoveryResult<TagSet> {
        self.find(handle)
            .map(|u| u.tags.clone())
            .ok_or_else(|| DiscoveryError::TagLookup {
                handle: handle.to_string(),
                reason: "unknown handle".to_string(),
            })
    }
}

#[async_trait]
impl ConfigHistoryStore for FileFleet {
    async fn query_history(&self, query: &HistoryQuery) -> DiscoveryResult<SnapshotPage> {
        let Some(unit) = self.find(&query.resource_id) else {
            return Ok(SnapshotPage::default());
        };
        let offset = parse_offset(query.page_token.as_deref())?;

        // Undated snapshots are treated as inside every window.
        let in_window: Vec<TagSnapshot> = unit
            .history
            .iter()
            .filter(|s| {
                s.captured_at
                    .is_none_or(|at| at >= query.start && at <= query.end)
            })
            .cloned()
            .collect();

        let (snapshots, next_token) = page(&in_window, offset, (query.page_limit as usize).max(1));
        Ok(SnapshotPage {
            snapshots,
            next_token,
        })
    }
}
