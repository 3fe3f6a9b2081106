//! Catalog fetcher: enumerates the fleet and its live tags.
//!
//! Pagination is sequential because each page token depends on the
//! previous page. Tag lookups fan out through a [`WorkerPool`]. The result
//! keeps only units that carry the version tag, sorted by
//! (environment, stack, service, name).

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use fleetscope_core::FleetUnit;

use crate::pool::WorkerPool;
use crate::registry::{FunctionRegistry, UnitSummary};

/// Counters describing one catalog fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub pages: usize,
    pub listed: usize,
    pub tag_lookup_failures: usize,
    /// Units whose tags lack the version key.
    pub untracked: usize,
    /// Pagination stopped early on a listing error.
    pub listing_truncated: bool,
}

/// The tracked fleet plus fetch counters.
#[derive(Debug, Clone, Default)]
pub struct FleetCatalog {
    pub units: Vec<FleetUnit>,
    pub stats: CatalogStats,
}

pub struct CatalogFetcher {
    registry: Arc<dyn FunctionRegistry>,
    pool: WorkerPool,
}

impl CatalogFetcher {
    pub fn new(registry: Arc<dyn FunctionRegistry>, workers: usize) -> Self {
        Self {
            registry,
            pool: WorkerPool::new("catalog", workers),
        }
    }

    pub fn workers(&self) -> usize {
        self.pool.width()
    }

    /// Fetch every unit carrying the version tag.
    pub async fn fetch_fleet(&self) -> FleetCatalog {
        let mut stats = CatalogStats::default();
        let listed = self.list_all(&mut stats).await;
        stats.listed = listed.len();

        let registry = self.registry.clone();
        let fetched = self
            .pool
            .run(listed, move |summary: UnitSummary| {
                let registry = registry.clone();
                async move {
                    match registry.get_tags(&summary.handle).await {
                        Ok(tags) => Some(FleetUnit::new(summary.name, summary.handle, tags)),
                        Err(e) => {
                            warn!(unit = %summary.name, error = %e, "tag lookup failed, dropping unit");
                            None
                        }
                    }
                }
            })
            .await;

        let resolved: Vec<FleetUnit> = fetched.into_iter().flatten().collect();
        stats.tag_lookup_failures = stats.listed - resolved.len();

        let mut units: Vec<FleetUnit> = resolved
            .into_iter()
            .filter(|unit| {
                let tracked = unit.version().is_some();
                if !tracked {
                    debug!(unit = %unit.name, "no version tag, skipping");
                }
                tracked
            })
            .collect();
        stats.untracked = stats.listed - stats.tag_lookup_failures - units.len();

        sort_units(&mut units);

        info!(
            pages = stats.pages,
            listed = stats.listed,
            tracked = units.len(),
            failures = stats.tag_lookup_failures,
            "fleet catalog fetched"
        );
        FleetCatalog { units, stats }
    }

    async fn list_all(&self, stats: &mut CatalogStats) -> Vec<UnitSummary> {
        let mut listed = Vec::new();
        let mut token = None;

        loop {
            match self.registry.list_units(token.take()).await {
                Ok(page) => {
                    stats.pages += 1;
                    listed.extend(page.units);
                    match page.next_token {
                        Some(next) => token = Some(next),
                        None => break,
                    }
                }
                Err(e) => {
                    error!(
                        pages = stats.pages,
                        listed = listed.len(),
                        error = %e,
                        "unit listing failed, continuing with partial fleet"
                    );
                    stats.listing_truncated = true;
                    break;
                }
            }
        }

        listed
    }
}

/// Order units by (environment, stack, service), then name.
pub fn sort_units(units: &mut [FleetUnit]) {
    units.sort_by_cached_key(|unit| {
        let id = unit.identity();
        (id.environment, id.stack, id.service, unit.name.clone())
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use fleetscope_core::TagSet;

    use crate::error::{DiscoveryError, DiscoveryResult};
    use crate::registry::UnitPage;

    /// Registry serving fixed pages; handles listed in `failing` error out.
    struct StaticRegistry {
        pages: Vec<Vec<(&'static str, TagSet)>>,
        failing: Vec<&'static str>,
        fail_page: Option<usize>,
        calls: Mutex<Vec<Option<String>>>,
    }

    impl StaticRegistry {
        fn new(pages: Vec<Vec<(&'static str, TagSet)>>) -> Self {
            Self {
                pages,
                failing: Vec::new(),
                fail_page: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn tags_by_handle(&self) -> HashMap<String, TagSet> {
            self.pages
                .iter()
                .flatten()
                .map(|(name, tags)| (format!("handle:{name}"), tags.clone()))
                .collect()
        }
    }

    #[async_trait]
    impl FunctionRegistry for StaticRegistry {
        async fn list_units(&self, page_token: Option<String>) -> DiscoveryResult<UnitPage> {
            self.calls.lock().unwrap().push(page_token.clone());
            let index: usize = page_token.map(|t| t.parse().unwrap()).unwrap_or(0);
            if self.fail_page == Some(index) {
                return Err(DiscoveryError::Listing("throttled".to_string()));
            }
            let units = self.pages[index]
                .iter()
                .map(|(name, _)| UnitSummary {
                    name: name.to_string(),
                    handle: format!("handle:{name}"),
                })
                .collect();
            let next_token = (index + 1 < self.pages.len()).then(|| (index + 1).to_string());
            Ok(UnitPage { units, next_token })
        }

        async fn get_tags(&self, handle: &str) -> DiscoveryResult<TagSet> {
            if self.failing.iter().any(|f| handle.ends_with(f)) {
                return Err(DiscoveryError::TagLookup {
                    handle: handle.to_string(),
                    reason: "API Error".to_string(),
                });
            }
            Ok(self.tags_by_handle().remove(handle).unwrap_or_default())
        }
    }

    fn versioned(version: &str, stack: &str, env: &str) -> TagSet {
        TagSet::new()
            .with("AppVersion", version)
            .with("Stack", stack)
            .with("Environment", env)
    }

    #[tokio::test]
    async fn filters_units_without_version_tag() {
        let registry = StaticRegistry::new(vec![vec![
            ("function-with-appversion", versioned("1.0", "test-stack", "dev")),
            ("function-without-appversion", TagSet::new().with("Stack", "test-stack")),
            ("another-function-with-appversion", versioned("2.0", "prod-stack", "prod")),
        ]]);
        let catalog = CatalogFetcher::new(Arc::new(registry), 10).fetch_fleet().await;

        let names: Vec<&str> = catalog.units.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names.len(), 2);
        assert!(!names.contains(&"function-without-appversion"));
        assert_eq!(catalog.stats.untracked, 1);
    }

    #[tokio::test]
    async fn tag_lookup_failure_drops_only_that_unit() {
        let mut registry = StaticRegistry::new(vec![vec![
            ("function-with-error", versioned("1.0", "s", "dev")),
            ("function-normal", versioned("1.0", "test-stack", "dev")),
        ]]);
        registry.failing.push("function-with-error");

        let catalog = CatalogFetcher::new(Arc::new(registry), 10).fetch_fleet().await;
        assert_eq!(catalog.units.len(), 1);
        assert_eq!(catalog.units[0].name, "function-normal");
        assert_eq!(catalog.stats.tag_lookup_failures, 1);
    }

    #[tokio::test]
    async fn paginates_sequentially() {
        let registry = Arc::new(StaticRegistry::new(vec![
            vec![("a", versioned("1", "s", "dev"))],
            vec![("b", versioned("1", "s", "dev"))],
            vec![("c", versioned("1", "s", "dev"))],
        ]));
        let catalog = CatalogFetcher::new(registry.clone(), 2).fetch_fleet().await;

        assert_eq!(catalog.stats.pages, 3);
        assert_eq!(catalog.units.len(), 3);
        let calls = registry.calls.lock().unwrap().clone();
        assert_eq!(calls, vec![None, Some("1".to_string()), Some("2".to_string())]);
    }

    #[tokio::test]
    async fn listing_failure_keeps_earlier_pages() {
        let mut registry = StaticRegistry::new(vec![
            vec![("a", versioned("1", "s", "dev"))],
            vec![("b", versioned("1", "s", "dev"))],
        ]);
        registry.fail_page = Some(1);

        let catalog = CatalogFetcher::new(Arc::new(registry), 2).fetch_fleet().await;
        assert!(catalog.stats.listing_truncated);
        assert_eq!(catalog.units.len(), 1);
        assert_eq!(catalog.units[0].name, "a");
    }

    #[tokio::test]
    async fn sorts_by_environment_stack_service() {
        let registry = StaticRegistry::new(vec![vec![
            ("z", versioned("1", "stack-b", "prod")),
            ("y", versioned("1", "stack-a", "dev")),
            ("x", versioned("1", "stack-c", "dev")),
            ("w", versioned("1", "stack-a", "dev")),
        ]]);
        let catalog = CatalogFetcher::new(Arc::new(registry), 3).fetch_fleet().await;
        let names: Vec<&str> = catalog.units.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["w", "y", "x", "z"]);
    }
}
