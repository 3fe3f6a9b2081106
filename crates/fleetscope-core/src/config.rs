//! Inspector configuration.
//!
//! Loaded from an optional TOML file, then overridden field by field from
//! the command line. Every field has a default except the namespace.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::window::HistoryWindow;

/// Largest batch the metrics sink accepts in one call.
pub const MAX_BATCH_SIZE: usize = 1000;

/// Upper bound on either worker pool width.
pub const MAX_WORKERS: usize = 256;

/// How build-tool versions are grouped across units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingMode {
    /// Group by the complete service identity, declared build-tool
    /// version included. Units that declare different versions land in
    /// different groups.
    #[default]
    FullIdentity,
    /// Group by (environment, service, stack) and track build-tool
    /// version drift within the group.
    ServiceScope,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectorConfig {
    /// Metrics namespace. Required.
    pub namespace: Option<String>,
    /// Width of the tag-lookup worker pool.
    pub catalog_workers: usize,
    /// Width of the history-lookup worker pool.
    pub history_workers: usize,
    /// Maximum points per sink write.
    pub batch_size: usize,
    pub earlier_days: i64,
    pub later_days: i64,
    pub include_history: bool,
    /// Page size requested from the history store.
    pub history_page_limit: u32,
    /// Resource type passed to history queries.
    pub resource_type: String,
    /// Page size served by the file-backed registry.
    pub registry_page_size: usize,
    pub grouping: GroupingMode,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            namespace: None,
            catalog_workers: 10,
            history_workers: 3,
            batch_size: 20,
            earlier_days: 365,
            later_days: 14,
            include_history: false,
            history_page_limit: 100,
            resource_type: "AWS::Lambda::Function".to_string(),
            registry_page_size: 50,
            grouping: GroupingMode::FullIdentity,
        }
    }
}

/// Configuration that has passed [`InspectorConfig::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedConfig {
    pub namespace: String,
    pub catalog_workers: usize,
    pub history_workers: usize,
    pub batch_size: usize,
    pub window: HistoryWindow,
    pub include_history: bool,
    pub history_page_limit: u32,
    pub resource_type: String,
    pub grouping: GroupingMode,
}

impl InspectorConfig {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Read(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Check every field. Runs before any external call.
    pub fn validate(&self) -> ConfigResult<ValidatedConfig> {
        let namespace = match self.namespace.as_deref().map(str::trim) {
            Some(ns) if !ns.is_empty() => ns.to_string(),
            _ => return Err(ConfigError::MissingNamespace),
        };

        check_width("catalog", self.catalog_workers)?;
        check_width("history", self.history_workers)?;

        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(ConfigError::InvalidBatchSize {
                size: self.batch_size,
                max: MAX_BATCH_SIZE,
            });
        }
        if self.history_page_limit == 0 {
            return Err(ConfigError::InvalidPageLimit);
        }

        let window = HistoryWindow::new(self.earlier_days, self.later_days)?;

        Ok(ValidatedConfig {
            namespace,
            catalog_workers: self.catalog_workers,
            history_workers: self.history_workers,
            batch_size: self.batch_size,
            window,
            include_history: self.include_history,
            history_page_limit: self.history_page_limit,
            resource_type: self.resource_type.clone(),
            grouping: self.grouping,
        })
    }
}

fn check_width(pool: &'static str, width: usize) -> ConfigResult<()> {
    if width == 0 || width > MAX_WORKERS {
        return Err(ConfigError::InvalidWorkerWidth {
            pool,
            width,
            max: MAX_WORKERS,
        });
    }
    Ok(())
}
