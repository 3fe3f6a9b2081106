//! Domain types shared across the inspector crates.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::tags::{TagKey, TagSet};

/// Unique name of a unit within the fleet.
pub type UnitName = String;

/// Opaque resource reference used for tag and history lookups.
pub type UnitHandle = String;

/// Distinct historical tag snapshots per unit name.
pub type HistoryByUnit = HashMap<UnitName, BTreeSet<TagSet>>;

/// Metric names emitted to the sink.
pub mod metric_names {
    /// One point per (unit, version label).
    pub const UNIT_VERSION: &str = "lambdaTag";
    /// One point per (service identity, build-tool version label).
    pub const BUILD_TOOL_VERSION: &str = "terraformTag";
}

/// Dimension names attached to metric points.
pub mod dimension_names {
    pub const ENV: &str = "Env";
    pub const SERVICE: &str = "Service";
    pub const STACK: &str = "Stack";
    pub const UNIT_NAME: &str = "FunctionName";
    pub const APP_VERSION: &str = "AppVersion";
    pub const BUILD_TOOL_VERSION: &str = "TerraformVersion";
}

// ── Fleet ─────────────────────────────────────────────────────────

/// One deployed function unit as seen by a single discovery pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetUnit {
    pub name: UnitName,
    pub handle: UnitHandle,
    pub tags: TagSet,
}

impl FleetUnit {
    pub fn new(name: impl Into<String>, handle: impl Into<String>, tags: TagSet) -> Self {
        Self {
            name: name.into(),
            handle: handle.into(),
            tags,
        }
    }

    /// Live version label, if the unit carries the version tag.
    pub fn version(&self) -> Option<&str> {
        self.tags.version()
    }

    pub fn identity(&self) -> ServiceIdentity {
        ServiceIdentity::derive(&self.tags)
    }
}

// ── Service identity ──────────────────────────────────────────────

/// Logical-service key derived from a unit's tags.
///
/// Field-wise equality, including the declared build-tool version. Two
/// units that differ only in that field are different identities.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ServiceIdentity {
    pub environment: String,
    pub service: String,
    pub stack: String,
    pub declared_build_tool_version: String,
}

impl ServiceIdentity {
    /// Derive the identity of a tag set. Total: missing tags fall back per
    /// [`TagSet::lookup`].
    pub fn derive(tags: &TagSet) -> Self {
        Self {
            environment: tags.lookup(TagKey::Environment),
            service: tags.lookup(TagKey::Service),
            stack: tags.lookup(TagKey::Stack),
            declared_build_tool_version: tags.lookup(TagKey::BuildToolVersion),
        }
    }
}

// ── Observations ──────────────────────────────────────────────────

/// A version label observed for a unit, live or from history.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VersionObservation {
    pub unit: UnitName,
    pub identity: ServiceIdentity,
    pub label: String,
    /// True only for the label on the unit's live tags.
    pub is_current: bool,
}

/// A build-tool version label observed for a service group.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BuildToolObservation {
    pub identity: ServiceIdentity,
    pub label: String,
    pub is_current: bool,
}

/// Indicator value for an observation: 1 when current, 0 when stale.
pub fn indicator(is_current: bool) -> f64 {
    if is_current { 1.0 } else { 0.0 }
}

// ── Metrics ───────────────────────────────────────────────────────

/// A single name/value dimension on a metric point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

impl Dimension {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Unit attached to a metric point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MetricUnit {
    #[default]
    Count,
}

impl MetricUnit {
    pub const fn as_str(self) -> &'static str {
        match self {
            MetricUnit::Count => "Count",
        }
    }
}

/// The wire-level unit handed to the metrics sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetricPoint {
    pub metric_name: String,
    /// Ordered dimensions; order is part of the emitted layout.
    pub dimensions: Vec<Dimension>,
    pub value: f64,
    pub unit: MetricUnit,
}

impl MetricPoint {
    /// Look up a dimension value by name.
    pub fn dimension(&self, name: &str) -> Option<&str> {
        self.dimensions
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn full_tags() -> TagSet {
        TagSet::new()
            .with("AppVersion", "1.2.3")
            .with("Stack", "production")
            .with("Service", "api")
            .with("Environment", "prod")
            .with("TerraformVersion", "1.5.0")
    }

    #[test]
    fn derive_with_complete_tags() {
        let id = ServiceIdentity::derive(&full_tags());
        assert_eq!(id.environment, "prod");
        assert_eq!(id.service, "api");
        assert_eq!(id.stack, "production");
        assert_eq!(id.declared_build_tool_version, "1.5.0");
    }

    #[test]
    fn derive_with_only_version_tag() {
        let id = ServiceIdentity::derive(&TagSet::new().with("AppVersion", "1.0.0"));
        assert_eq!(id.environment, "Unknown");
        assert_eq!(id.service, "Unknown");
        assert_eq!(id.stack, "Unknown");
        assert_eq!(id.declared_build_tool_version, "Unknown");
    }

    #[test]
    fn derive_service_defaults_to_stack() {
        let tags = TagSet::new().with("AppVersion", "1").with("Stack", "stack-a");
        assert_eq!(ServiceIdentity::derive(&tags).service, "stack-a");
    }

    #[test]
    fn identities_are_value_equal() {
        let a = ServiceIdentity::derive(&full_tags());
        let b = ServiceIdentity::derive(&full_tags());
        let mut set = HashSet::new();
        set.insert(a);
        set.insert(b);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn build_tool_version_splits_identity() {
        let a = ServiceIdentity::derive(&full_tags());
        let b = ServiceIdentity::derive(&full_tags().with("TerraformVersion", "1.6.0"));
        assert_ne!(a, b);
    }

    #[test]
    fn metric_point_serializes_in_sink_layout() {
        let point = MetricPoint {
            metric_name: metric_names::UNIT_VERSION.to_string(),
            dimensions: vec![Dimension::new("Env", "dev")],
            value: 1.0,
            unit: MetricUnit::Count,
        };
        let json = serde_json::to_value(&point).unwrap();
        assert_eq!(json["MetricName"], "lambdaTag");
        assert_eq!(json["Dimensions"][0]["Name"], "Env");
        assert_eq!(json["Unit"], "Count");
        assert_eq!(point.dimension("Env"), Some("dev"));
    }

    #[test]
    fn indicator_values() {
        assert_eq!(indicator(true), 1.0);
        assert_eq!(indicator(false), 0.0);
    }
}
