//! Version reconciler.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use fleetscope_core::{
    BuildToolObservation, FleetUnit, GroupingMode, HistoryByUnit, ServiceIdentity, TagKey,
    VersionObservation,
};

/// Flat output, ready for metric point construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// One entry per (unit, version label).
    pub unit_versions: Vec<VersionObservation>,
    /// One entry per (service group, build-tool version label).
    pub build_tool_versions: Vec<BuildToolObservation>,
    /// Number of distinct service groups.
    pub services: usize,
}

/// Key a unit's identity is grouped under.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct GroupKey {
    environment: String,
    stack: String,
    service: String,
    /// Present only under [`GroupingMode::FullIdentity`].
    declared: Option<String>,
}

impl GroupKey {
    fn new(identity: &ServiceIdentity, mode: GroupingMode) -> Self {
        Self {
            environment: identity.environment.clone(),
            stack: identity.stack.clone(),
            service: identity.service.clone(),
            declared: match mode {
                GroupingMode::FullIdentity => Some(identity.declared_build_tool_version.clone()),
                GroupingMode::ServiceScope => None,
            },
        }
    }
}

struct ServiceGroup {
    /// Identity reported for the group; the smallest member identity.
    identity: ServiceIdentity,
    /// Build-tool versions declared live by members.
    declared: BTreeSet<String>,
    /// Every build-tool version seen, live or historical.
    seen: BTreeSet<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VersionReconciler {
    grouping: GroupingMode,
}

impl VersionReconciler {
    pub fn new(grouping: GroupingMode) -> Self {
        Self { grouping }
    }

    pub fn grouping(&self) -> GroupingMode {
        self.grouping
    }

    /// Merge live tags and history into version observations.
    ///
    /// Units without a live version tag are ignored. `history` may be empty
    /// or miss units; those units contribute their live tags only.
    pub fn reconcile(&self, units: &[FleetUnit], history: &HistoryByUnit) -> Reconciliation {
        let mut unit_versions = Vec::new();
        let mut groups: BTreeMap<GroupKey, ServiceGroup> = BTreeMap::new();

        for unit in units {
            let Some(live) = unit.version() else {
                debug!(unit = %unit.name, "unit without version tag ignored");
                continue;
            };
            let identity = unit.identity();
            let snapshots = history.get(&unit.name);

            let mut previous: BTreeSet<&str> = snapshots
                .into_iter()
                .flatten()
                .filter_map(|tags| tags.version())
                .collect();
            previous.remove(live);

            unit_versions.push(VersionObservation {
                unit: unit.name.clone(),
                identity: identity.clone(),
                label: live.to_string(),
                is_current: true,
            });
            unit_versions.extend(previous.into_iter().map(|label| VersionObservation {
                unit: unit.name.clone(),
                identity: identity.clone(),
                label: label.to_string(),
                is_current: false,
            }));

            let group = groups
                .entry(GroupKey::new(&identity, self.grouping))
                .or_insert_with(|| ServiceGroup {
                    identity: identity.clone(),
                    declared: BTreeSet::new(),
                    seen: BTreeSet::new(),
                });
            if identity < group.identity {
                group.identity = identity.clone();
            }
            group
                .declared
                .insert(identity.declared_build_tool_version.clone());
            group
                .seen
                .insert(identity.declared_build_tool_version.clone());
            group.seen.extend(
                snapshots
                    .into_iter()
                    .flatten()
                    .filter_map(|tags| tags.raw(TagKey::BuildToolVersion))
                    .map(str::to_string),
            );
        }

        let services = groups.len();
        let build_tool_versions: Vec<BuildToolObservation> = groups
            .into_values()
            .flat_map(|group| {
                let ServiceGroup {
                    identity,
                    declared,
                    seen,
                } = group;
                seen.into_iter().map(move |label| BuildToolObservation {
                    identity: identity.clone(),
                    is_current: declared.contains(&label),
                    label,
                })
            })
            .collect();

        info!(
            units = units.len(),
            unit_versions = unit_versions.len(),
            services,
            build_tool_versions = build_tool_versions.len(),
            grouping = ?self.grouping,
            "versions reconciled"
        );

        Reconciliation {
            unit_versions,
            build_tool_versions,
            services,
        }
    }
}
