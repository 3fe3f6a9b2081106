//! fleetscope-metrics: turn observations into indicator time-series.
//!
//! # Architecture
//!
//! ```text
//! VersionObservation   ──unit_version_point()──┐
//! BuildToolObservation ──build_tool_point()────┤
//!                                              ▼
//!                                   MetricsPublisher::publish()
//!                                     ├── bulk write per batch (≤ batch_size)
//!                                     └── on failure: one write per point
//!                                              ▼
//!                                        dyn MetricsSink
//!                                     (WriterSink: JSON lines / Prometheus text)
//! ```
//!
//! Publishing never fails the caller. Failures are logged and counted in
//! [`PublishStats`].

pub mod points;
pub mod prometheus;
pub mod publisher;
pub mod sink;

pub use points::{build_tool_point, unit_version_point};
pub use prometheus::render_prometheus;
pub use publisher::{MetricsPublisher, PublishStats};
pub use sink::{MetricsSink, OutputFormat, SinkError, SinkResult, WriterSink};
