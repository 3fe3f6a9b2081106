//! Prometheus text exposition format.
//!
//! Renders metric points for inspection on stdout or scraping by a
//! Prometheus-compatible agent. Metric names are prefixed with the
//! sanitised namespace.

use std::collections::BTreeSet;

use fleetscope_core::MetricPoint;

/// Render points into Prometheus text format, one GAUGE per metric name.
pub fn render_prometheus(namespace: &str, points: &[MetricPoint]) -> String {
    let prefix = sanitize(namespace);
    let names: BTreeSet<&str> = points.iter().map(|p| p.metric_name.as_str()).collect();
    let mut out = String::new();

    for name in names {
        let full = format!("{prefix}_{}", sanitize(name));
        out.push_str(&format!("# TYPE {full} gauge\n"));
        for p in points.iter().filter(|p| p.metric_name == name) {
            let labels: Vec<String> = p
                .dimensions
                .iter()
                .map(|d| format!("{}=\"{}\"", sanitize(&d.name), escape(&d.value)))
                .collect();
            out.push_str(&format!("{full}{{{}}} {}\n", labels.join(","), p.value));
        }
    }

    out
}

/// Map anything outside `[a-zA-Z0-9_]` to `_`; never start with a digit.
fn sanitize(s: &str) -> String {
    let mut out: String = s
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

fn escape(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetscope_core::{Dimension, MetricUnit};

    fn point(name: &str, value: f64, dims: &[(&str, &str)]) -> MetricPoint {
        MetricPoint {
            metric_name: name.to_string(),
            dimensions: dims.iter().map(|(k, v)| Dimension::new(*k, *v)).collect(),
            value,
            unit: MetricUnit::Count,
        }
    }

    #[test]
    fn render_empty() {
        assert!(render_prometheus("Fleet", &[]).is_empty());
    }

    #[test]
    fn render_groups_by_metric_name() {
        let points = vec![
            point("lambdaTag", 1.0, &[("Env", "dev"), ("AppVersion", "1.0")]),
            point("terraformTag", 0.0, &[("Env", "dev")]),
            point("lambdaTag", 0.0, &[("Env", "dev"), ("AppVersion", "0.9")]),
        ];
        let out = render_prometheus("Fleet/Versions", &points);

        assert_eq!(out.matches("# TYPE Fleet_Versions_lambdaTag gauge").count(), 1);
        assert!(out.contains("Fleet_Versions_lambdaTag{Env=\"dev\",AppVersion=\"1.0\"} 1\n"));
        assert!(out.contains("Fleet_Versions_lambdaTag{Env=\"dev\",AppVersion=\"0.9\"} 0\n"));
        assert!(out.contains("Fleet_Versions_terraformTag{Env=\"dev\"} 0\n"));
    }

    #[test]
    fn label_values_are_escaped() {
        let out = render_prometheus("ns", &[point("m", 1.0, &[("K", "a\"b\\c")])]);
        assert!(out.contains("K=\"a\\\"b\\\\c\""));
    }

    #[test]
    fn names_are_sanitized() {
        assert_eq!(sanitize("Fleet/Versions-1"), "Fleet_Versions_1");
        assert_eq!(sanitize("9lives"), "_9lives");
    }
}
