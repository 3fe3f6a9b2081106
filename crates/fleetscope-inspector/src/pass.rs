//! Inspection pass orchestration.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use fleetscope_core::{ConfigResult, InspectorConfig, ValidatedConfig};
use fleetscope_discovery::{
    CatalogFetcher, ConfigHistoryStore, FunctionRegistry, HistoryFetcher, HistoryReport,
};
use fleetscope_metrics::{
    MetricsPublisher, MetricsSink, PublishStats, build_tool_point, unit_version_point,
};
use fleetscope_reconcile::VersionReconciler;

/// Status code reported for every completed pass.
pub const STATUS_OK: u16 = 200;

const SUMMARY_OK: &str = "Metrics updated successfully";

/// Parameters of one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunRequest {
    pub include_history: bool,
    pub earlier_days: i64,
    pub later_days: i64,
}

impl RunRequest {
    /// Live tags only.
    pub fn current() -> Self {
        Self {
            include_history: false,
            earlier_days: 365,
            later_days: 14,
        }
    }

    /// Live tags plus the last year of history, ignoring the most recent
    /// two weeks.
    pub fn history() -> Self {
        Self {
            include_history: true,
            ..Self::current()
        }
    }

    /// The pass described by a loaded configuration.
    pub fn from_config(config: &InspectorConfig) -> Self {
        Self {
            include_history: config.include_history,
            earlier_days: config.earlier_days,
            later_days: config.later_days,
        }
    }
}

/// Outcome of a completed pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub status_code: u16,
    pub summary: String,
    pub units_listed: usize,
    pub units_tracked: usize,
    pub tag_lookup_failures: usize,
    pub listing_truncated: bool,
    pub history_units: usize,
    pub history_failures: usize,
    pub services: usize,
    pub unit_version_points: usize,
    pub build_tool_points: usize,
    pub publish: PublishStats,
}

/// Runs passes against injected registry, history, and sink handles.
pub struct Inspector {
    registry: Arc<dyn FunctionRegistry>,
    history: Arc<dyn ConfigHistoryStore>,
    sink: Arc<dyn MetricsSink>,
    config: InspectorConfig,
}

impl Inspector {
    pub fn new(
        registry: Arc<dyn FunctionRegistry>,
        history: Arc<dyn ConfigHistoryStore>,
        sink: Arc<dyn MetricsSink>,
        config: InspectorConfig,
    ) -> Self {
        Self {
            registry,
            history,
            sink,
            config,
        }
    }

    pub fn config(&self) -> &InspectorConfig {
        &self.config
    }

    /// Run one pass. Configuration is validated first; an invalid
    /// configuration aborts before any external call.
    pub async fn run(
        &self,
        include_history: bool,
        earlier_days: i64,
        later_days: i64,
    ) -> ConfigResult<RunSummary> {
        let config = InspectorConfig {
            include_history,
            earlier_days,
            later_days,
            ..self.config.clone()
        }
        .validate()?;
        Ok(self.run_validated(&config).await)
    }

    pub async fn run_request(&self, request: RunRequest) -> ConfigResult<RunSummary> {
        self.run(request.include_history, request.earlier_days, request.later_days)
            .await
    }

    async fn run_validated(&self, config: &ValidatedConfig) -> RunSummary {
        info!(
            namespace = %config.namespace,
            include_history = config.include_history,
            earlier_days = config.window.earlier_days(),
            later_days = config.window.later_days(),
            "inspection pass starting"
        );

        let catalog = CatalogFetcher::new(self.registry.clone(), config.catalog_workers)
            .fetch_fleet()
            .await;

        let history = if config.include_history {
            HistoryFetcher::new(
                self.history.clone(),
                config.history_workers,
                config.resource_type.clone(),
                config.history_page_limit,
            )
            .fetch_history(&catalog.units, &config.window)
            .await
        } else {
            HistoryReport::default()
        };

        let reconciliation =
            VersionReconciler::new(config.grouping).reconcile(&catalog.units, &history.by_unit);

        let unit_points: Vec<_> = reconciliation
            .unit_versions
            .iter()
            .map(unit_version_point)
            .collect();
        let build_points: Vec<_> = reconciliation
            .build_tool_versions
            .iter()
            .map(build_tool_point)
            .collect();

        let publisher =
            MetricsPublisher::new(self.sink.clone(), config.namespace.clone(), config.batch_size);
        let mut publish = publisher.publish(&unit_points).await;
        publish.merge(publisher.publish(&build_points).await);

        let summary = RunSummary {
            status_code: STATUS_OK,
            summary: SUMMARY_OK.to_string(),
            units_listed: catalog.stats.listed,
            units_tracked: catalog.units.len(),
            tag_lookup_failures: catalog.stats.tag_lookup_failures,
            listing_truncated: catalog.stats.listing_truncated,
            history_units: history.by_unit.len(),
            history_failures: history.stats.failures,
            services: reconciliation.services,
            unit_version_points: unit_points.len(),
            build_tool_points: build_points.len(),
            publish,
        };

        info!(
            tracked = summary.units_tracked,
            services = summary.services,
            published = summary.publish.points_published,
            dropped = summary.publish.point_failures,
            "inspection pass complete"
        );
        summary
    }
}
