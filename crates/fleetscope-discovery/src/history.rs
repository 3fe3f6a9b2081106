//! History fetcher: recovers the tag sets a unit carried in the past.
//!
//! Queries the configuration history store once per unit (paginated)
//! through a narrower [`WorkerPool`] than the catalog, since the history
//! store enforces a stricter rate limit. A failed query degrades that unit
//! to "no history"; the pass continues on live tags alone.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use fleetscope_core::{ConfigResult, FleetUnit, HistoryByUnit, HistoryWindow, TagSet};

use crate::error::DiscoveryResult;
use crate::pool::WorkerPool;
use crate::registry::{ConfigHistoryStore, HistoryQuery};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HistoryStats {
    pub queried: usize,
    pub failures: usize,
    /// Distinct non-empty snapshots retained across all units.
    pub snapshots: usize,
}

#[derive(Debug, Clone, Default)]
pub struct HistoryReport {
    pub by_unit: HistoryByUnit,
    pub stats: HistoryStats,
}

pub struct HistoryFetcher {
    store: Arc<dyn ConfigHistoryStore>,
    pool: WorkerPool,
    resource_type: String,
    page_limit: u32,
}

/// Outcome of one unit's query, merged after the pool drains.
struct UnitHistory {
    name: String,
    snapshots: BTreeSet<TagSet>,
    failed: bool,
}

impl HistoryFetcher {
    pub fn new(
        store: Arc<dyn ConfigHistoryStore>,
        workers: usize,
        resource_type: impl Into<String>,
        page_limit: u32,
    ) -> Self {
        Self {
            store,
            pool: WorkerPool::new("history", workers),
            resource_type: resource_type.into(),
            page_limit: page_limit.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.pool.width()
    }

    /// Validate a raw window in days, then fetch. Nothing is queried when
    /// the window is invalid.
    pub async fn fetch_history_days(
        &self,
        units: &[FleetUnit],
        earlier_days: i64,
        later_days: i64,
    ) -> ConfigResult<HistoryReport> {
        let window = HistoryWindow::new(earlier_days, later_days)?;
        Ok(self.fetch_history(units, &window).await)
    }

    /// Fetch history for every unit over `window`, relative to now.
    pub async fn fetch_history(&self, units: &[FleetUnit], window: &HistoryWindow) -> HistoryReport {
        self.fetch_history_at(units, window, Utc::now()).await
    }

    pub async fn fetch_history_at(
        &self,
        units: &[FleetUnit],
        window: &HistoryWindow,
        now: DateTime<Utc>,
    ) -> HistoryReport {
        let (start, end) = window.bounds(now);
        debug!(%start, %end, units = units.len(), "querying configuration history");

        let store = self.store.clone();
        let resource_type = self.resource_type.clone();
        let page_limit = self.page_limit;
        let targets: Vec<(String, String)> = units
            .iter()
            .map(|u| (u.name.clone(), u.handle.clone()))
            .collect();

        let outcomes = self
            .pool
            .run(targets, move |(name, handle)| {
                let store = store.clone();
                let query = HistoryQuery {
                    resource_id: handle,
                    resource_type: resource_type.clone(),
                    start,
                    end,
                    page_limit,
                    page_token: None,
                };
                async move {
                    match query_unit(store.as_ref(), query).await {
                        Ok(snapshots) => UnitHistory {
                            name,
                            snapshots,
                            failed: false,
                        },
                        Err(e) => {
                            warn!(unit = %name, error = %e, "history query failed, using live tags only");
                            UnitHistory {
                                name,
                                snapshots: BTreeSet::new(),
                                failed: true,
                            }
                        }
                    }
                }
            })
            .await;

        let mut report = HistoryReport::default();
        report.stats.queried = units.len();
        // Units lost to a panicked worker count as failures too.
        report.stats.failures = units.len() - outcomes.len();
        for outcome in outcomes {
            if outcome.failed {
                report.stats.failures += 1;
            }
            report.stats.snapshots += outcome.snapshots.len();
            report.by_unit.insert(outcome.name, outcome.snapshots);
        }

        info!(
            queried = report.stats.queried,
            failures = report.stats.failures,
            snapshots = report.stats.snapshots,
            "configuration history fetched"
        );
        report
    }
}

/// Drain every page for one resource, keeping snapshots with tags.
async fn query_unit(
    store: &dyn ConfigHistoryStore,
    mut query: HistoryQuery,
) -> DiscoveryResult<BTreeSet<TagSet>> {
    let mut snapshots = BTreeSet::new();
    loop {
        let page = store.query_history(&query).await?;
        snapshots.extend(
            page.snapshots
                .into_iter()
                .map(|s| s.tags)
                .filter(|tags| !tags.is_empty()),
        );
        match page.next_token {
            Some(token) => query.page_token = Some(token),
            None => return Ok(snapshots),
        }
    }
}
