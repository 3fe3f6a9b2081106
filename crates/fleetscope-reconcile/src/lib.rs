//! fleetscope-reconcile: current versus previously seen versions.
//!
//! # Algorithm
//!
//! ```text
//! for unit in fleet:
//!     versions(unit) = { live }                      current
//!                    ∪ labels(history(unit)) − live   stale
//!     group = key(identity(unit))                     per GroupingMode
//!     build_tools(group) ∪= { declared } ∪ labels(history(unit))
//!
//! for group:
//!     label == declared  →  current (1)
//!     otherwise          →  stale   (0)
//! ```
//!
//! Labels are collected in sets, so a label seen both live and in history
//! appears once.

pub mod reconciler;

pub use reconciler::{Reconciliation, VersionReconciler};
