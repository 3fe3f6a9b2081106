//! fleetscope-inspector: a single inspection pass.
//!
//! ```text
//! InspectorConfig::validate()      fails fast, before any network call
//!   └── CatalogFetcher::fetch_fleet()
//!         └── HistoryFetcher::fetch_history()     only with include_history
//!               └── VersionReconciler::reconcile()
//!                     └── MetricsPublisher::publish()
//! ```
//!
//! A pass only returns an error for invalid configuration. Everything
//! else degrades per unit or per point and is reported in [`RunSummary`].

pub mod pass;

pub use pass::{Inspector, RunRequest, RunSummary};
