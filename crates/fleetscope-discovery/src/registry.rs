//! Interfaces to the function registry and the configuration history store.
//!
//! Both are injected as `Arc<dyn ...>` handles so one client is shared
//! across every worker in a pass.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fleetscope_core::TagSet;

use crate::error::DiscoveryResult;

/// A unit as listed by the registry, before its tags are known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSummary {
    pub name: String,
    pub handle: String,
}

/// One page of the registry listing.
#[derive(Debug, Clone, Default)]
pub struct UnitPage {
    pub units: Vec<UnitSummary>,
    /// Token for the next page; `None` on the last page.
    pub next_token: Option<String>,
}

#[async_trait]
pub trait FunctionRegistry: Send + Sync {
    /// Fetch one listing page. `None` requests the first page.
    async fn list_units(&self, page_token: Option<String>) -> DiscoveryResult<UnitPage>;

    /// Fetch the live tags of a unit.
    async fn get_tags(&self, handle: &str) -> DiscoveryResult<TagSet>;
}

/// A point-in-time history query for one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    pub resource_id: String,
    pub resource_type: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub page_limit: u32,
    pub page_token: Option<String>,
}

/// A recorded configuration snapshot. Only its tags matter here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSnapshot {
    #[serde(default)]
    pub captured_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: TagSet,
}

#[derive(Debug, Clone, Default)]
pub struct SnapshotPage {
    pub snapshots: Vec<TagSnapshot>,
    pub next_token: Option<String>,
}

#[async_trait]
pub trait ConfigHistoryStore: Send + Sync {
    async fn query_history(&self, query: &HistoryQuery) -> DiscoveryResult<SnapshotPage>;
}
