//! Metric point construction.
//!
//! Dimension order is fixed: `Env`, `Service`, `Stack`, then the
//! point-specific dimensions.

use fleetscope_core::{
    BuildToolObservation, Dimension, MetricPoint, MetricUnit, ServiceIdentity,
    VersionObservation, dimension_names as dim, indicator, metric_names,
};

fn service_dimensions(identity: &ServiceIdentity) -> Vec<Dimension> {
    vec![
        Dimension::new(dim::ENV, &identity.environment),
        Dimension::new(dim::SERVICE, &identity.service),
        Dimension::new(dim::STACK, &identity.stack),
    ]
}

/// Dimensions for a unit-version indicator.
pub fn unit_version_dimensions(identity: &ServiceIdentity, unit: &str, version: &str) -> Vec<Dimension> {
    let mut dims = service_dimensions(identity);
    dims.push(Dimension::new(dim::UNIT_NAME, unit));
    dims.push(Dimension::new(dim::APP_VERSION, version));
    dims
}

/// Dimensions for a build-tool-version indicator.
pub fn build_tool_dimensions(identity: &ServiceIdentity, build_tool_version: &str) -> Vec<Dimension> {
    let mut dims = service_dimensions(identity);
    dims.push(Dimension::new(dim::BUILD_TOOL_VERSION, build_tool_version));
    dims
}

pub fn unit_version_point(obs: &VersionObservation) -> MetricPoint {
    MetricPoint {
        metric_name: metric_names::UNIT_VERSION.to_string(),
        dimensions: unit_version_dimensions(&obs.identity, &obs.unit, &obs.label),
        value: indicator(obs.is_current),
        unit: MetricUnit::Count,
    }
}

pub fn build_tool_point(obs: &BuildToolObservation) -> MetricPoint {
    MetricPoint {
        metric_name: metric_names::BUILD_TOOL_VERSION.to_string(),
        dimensions: build_tool_dimensions(&obs.identity, &obs.label),
        value: indicator(obs.is_current),
        unit: MetricUnit::Count,
    }
}
