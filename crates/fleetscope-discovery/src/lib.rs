//! fleetscope-discovery: what is deployed, and what was deployed.
//!
//! Two external services are consulted, each through its own bounded
//! worker pool:
//!
//! ```text
//! CatalogFetcher
//!   ├── FunctionRegistry::list_units()   sequential pagination
//!   └── FunctionRegistry::get_tags()     WorkerPool (default width 10)
//!
//! HistoryFetcher
//!   └── ConfigHistoryStore::query_history()   WorkerPool (default width 3)
//! ```
//!
//! Per-unit failures never abort a fetch: a failed tag lookup drops the
//! unit, a failed history query leaves the unit with no history.

pub mod catalog;
pub mod error;
pub mod file;
pub mod history;
pub mod pool;
pub mod registry;

pub use catalog::{CatalogFetcher, CatalogStats, FleetCatalog};
pub use error::{DiscoveryError, DiscoveryResult};
pub use file::FileFleet;
pub use history::{HistoryFetcher, HistoryReport, HistoryStats};
pub use pool::WorkerPool;
pub use registry::{
    ConfigHistoryStore, FunctionRegistry, HistoryQuery, SnapshotPage, TagSnapshot, UnitPage,
    UnitSummary,
};
