//! Tag sets and the defaulting policy for well-known tag keys.
//!
//! Tags arrive from the registry and the history store as free-form
//! string maps. Every read of a well-known key goes through
//! [`TagSet::lookup`] so fallback behaviour cannot drift between callers.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Value substituted for a missing well-known tag.
pub const UNKNOWN: &str = "Unknown";

/// Tag keys the inspector understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKey {
    /// Release version of the unit. Units without it are not tracked.
    AppVersion,
    /// Build-tool (infrastructure tooling) version declared for the unit.
    BuildToolVersion,
    Environment,
    Service,
    Stack,
}

impl TagKey {
    pub const fn as_str(self) -> &'static str {
        match self {
            TagKey::AppVersion => "AppVersion",
            TagKey::BuildToolVersion => "TerraformVersion",
            TagKey::Environment => "Environment",
            TagKey::Service => "Service",
            TagKey::Stack => "Stack",
        }
    }
}

/// An immutable-by-convention mapping of tag key to tag value.
///
/// Ordered so that two tag sets with the same entries compare and hash
/// equal, which lets history snapshots be deduplicated in a set.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(BTreeMap<String, String>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for tests and adapters.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Raw value for an arbitrary key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Raw value for a well-known key, without defaulting.
    pub fn raw(&self, key: TagKey) -> Option<&str> {
        self.get(key.as_str())
    }

    pub fn contains(&self, key: TagKey) -> bool {
        self.0.contains_key(key.as_str())
    }

    /// The version label, if the unit carries one.
    pub fn version(&self) -> Option<&str> {
        self.raw(TagKey::AppVersion)
    }

    /// Resolve a well-known key, applying the fallback policy.
    ///
    /// `Service` falls back to the resolved `Stack` value; every other key
    /// falls back to [`UNKNOWN`].
    pub fn lookup(&self, key: TagKey) -> String {
        match (key, self.raw(key)) {
            (_, Some(value)) => value.to_string(),
            (TagKey::Service, None) => self.lookup(TagKey::Stack),
            (_, None) => UNKNOWN.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TagSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<HashMap<String, String>> for TagSet {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map.into_iter().collect())
    }
}

impl From<BTreeMap<String, String>> for TagSet {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_returns_present_values() {
        let tags = TagSet::new()
            .with("Environment", "prod")
            .with("Stack", "billing")
            .with("Service", "api");
        assert_eq!(tags.lookup(TagKey::Environment), "prod");
        assert_eq!(tags.lookup(TagKey::Stack), "billing");
        assert_eq!(tags.lookup(TagKey::Service), "api");
    }

    #[test]
    fn missing_keys_fall_back_to_unknown() {
        let tags = TagSet::new().with("AppVersion", "1.0");
        assert_eq!(tags.lookup(TagKey::Environment), UNKNOWN);
        assert_eq!(tags.lookup(TagKey::BuildToolVersion), UNKNOWN);
        assert_eq!(tags.lookup(TagKey::Stack), UNKNOWN);
        assert_eq!(tags.lookup(TagKey::Service), UNKNOWN);
    }

    #[test]
    fn service_falls_back_to_stack() {
        let tags = TagSet::new().with("Stack", "stack-a");
        assert_eq!(tags.lookup(TagKey::Service), "stack-a");
    }

    #[test]
    fn version_is_presence_based() {
        assert_eq!(TagSet::new().with("AppVersion", "").version(), Some(""));
        assert_eq!(TagSet::new().with("Stack", "x").version(), None);
    }

    #[test]
    fn equal_entries_compare_equal() {
        let a: TagSet = [("AppVersion", "1.0"), ("Stack", "s")].into_iter().collect();
        let b = TagSet::new().with("Stack", "s").with("AppVersion", "1.0");
        assert_eq!(a, b);
    }

    #[test]
    fn deserializes_from_plain_map() {
        let tags: TagSet = serde_json::from_str(r#"{"AppVersion":"2.0","Stack":"s"}"#).unwrap();
        assert_eq!(tags.version(), Some("2.0"));
        assert_eq!(tags.len(), 2);
    }
}
