//! Named finite value sets used to validate enum-typed parameters.
//!
//! Enums are built once while a catalog loads and shared by `Arc` between
//! the descriptors that reference them. Membership is an exact,
//! case-sensitive string match.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
/// Ordered set of permitted string values.
pub struct EnumSet {
    name: String,
    values: Vec<String>,
}

impl EnumSet {
    /// Build an enum from its values. Duplicate values are accepted as-is.
    pub fn new<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Values in declaration order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|candidate| candidate == value)
    }
}

#[derive(Clone, Debug, Default)]
/// Enums keyed by name. Redefining a name replaces the earlier set.
pub struct EnumRegistry {
    enums: BTreeMap<String, Arc<EnumSet>>,
}

impl EnumRegistry {
    pub fn define<I, S>(&mut self, name: &str, values: I) -> Arc<EnumSet>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set = Arc::new(EnumSet::new(name, values));
        if self.enums.insert(name.to_string(), Arc::clone(&set)).is_some() {
            tracing::warn!(enum_name = name, "enum redefined; last definition wins");
        }
        set
    }

    pub fn get(&self, name: &str) -> Option<&Arc<EnumSet>> {
        self.enums.get(name)
    }

    /// Iterates enums in stable (name) order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<EnumSet>> {
        self.enums.values()
    }

    pub fn len(&self) -> usize {
        self.enums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enums.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_is_case_sensitive() {
        let conditions = EnumSet::new(
            "ItemConditions",
            ["New", "Used", "Collectible", "Refurbished", "Club"],
        );
        assert!(conditions.contains("New"));
        assert!(conditions.contains("Club"));
        assert!(!conditions.contains("new"));
        assert!(!conditions.contains("Bogus"));
        assert!(!conditions.contains(""));
    }

    #[test]
    fn duplicate_values_are_tolerated() {
        let set = EnumSet::new("Dupes", ["A", "A", "B"]);
        assert_eq!(set.values().len(), 3);
        assert!(set.contains("A"));
    }

    #[test]
    fn redefinition_replaces_previous_set() {
        let mut registry = EnumRegistry::default();
        let first = registry.define("Colors", ["Red"]);
        let second = registry.define("Colors", ["Blue"]);
        assert!(first.contains("Red"));
        assert_eq!(registry.len(), 1);
        let current = registry.get("Colors").expect("enum defined");
        assert!(Arc::ptr_eq(current, &second));
        assert!(!current.contains("Red"));
    }
}
