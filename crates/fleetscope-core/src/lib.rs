//! fleetscope-core: shared types for the fleet inspector.
//!
//! Holds the data model every other crate speaks (fleet units, tag sets,
//! service identities, version observations, metric points), the one place
//! where tag defaulting rules live, and configuration validation.
//!
//! # Architecture
//!
//! ```text
//! TagSet ──lookup()──► ServiceIdentity::derive()
//!    │
//!    └── FleetUnit { name, handle, tags }
//!
//! InspectorConfig ──validate()──► ValidatedConfig (+ HistoryWindow)
//! ```

pub mod config;
pub mod error;
pub mod tags;
pub mod types;
pub mod window;

pub use config::{GroupingMode, InspectorConfig, ValidatedConfig};
pub use error::{ConfigError, ConfigResult};
pub use tags::{TagKey, TagSet};
pub use types::*;
pub use window::HistoryWindow;
