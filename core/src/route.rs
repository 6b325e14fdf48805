//! Route descriptors exchanged with the host router.
//!
//! The engine does not match paths or load components. It only needs to
//! know where a navigation is going, where it came from, and the chain of
//! matched route records (root first) with the outposts each one declares.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A redirect target: a route name or a path, plus optional params/query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteLocation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub query: BTreeMap<String, String>,
}

impl RouteLocation {
    /// Target a route by name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Target a route by path.
    pub fn path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Default::default()
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// A location must point somewhere: a non-empty name or path.
    pub fn is_addressable(&self) -> bool {
        let filled = |s: &Option<String>| s.as_deref().is_some_and(|v| !v.is_empty());
        filled(&self.name) || filled(&self.path)
    }
}

impl From<&str> for RouteLocation {
    fn from(path: &str) -> Self {
        RouteLocation::path(path)
    }
}

/// One record of the matched chain, as known to the host route table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRecord {
    pub name: Option<String>,
    pub path: String,
    /// Route-scoped outpost names declared in this record's metadata.
    #[serde(default)]
    pub outposts: Vec<String>,
}

impl RouteRecord {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_outposts<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outposts.extend(names.into_iter().map(Into::into));
        self
    }
}

/// A navigation endpoint (`to` or `from`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub name: Option<String>,
    pub path: String,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    #[serde(default)]
    pub query: BTreeMap<String, String>,
    /// Matched records from root to leaf.
    #[serde(default)]
    pub matched: Vec<RouteRecord>,
}

impl Route {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// The empty starting location used before the first navigation.
    pub fn start() -> Self {
        Self::new("/")
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_matched(mut self, matched: Vec<RouteRecord>) -> Self {
        self.matched = matched;
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// A location that points back at this route.
    pub fn location(&self) -> RouteLocation {
        RouteLocation {
            name: self.name.clone(),
            path: Some(self.path.clone()),
            params: self.params.clone(),
            query: self.query.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_needs_name_or_path() {
        assert!(RouteLocation::named("login").is_addressable());
        assert!(RouteLocation::path("/login").is_addressable());
        assert!(!RouteLocation::default().is_addressable());
        assert!(!RouteLocation::named("").is_addressable());
    }

    #[test]
    fn location_deserializes_from_partial_object() {
        let loc: RouteLocation =
            serde_json::from_value(serde_json::json!({ "name": "user", "params": { "id": "7" } }))
                .unwrap();
        assert_eq!(loc, RouteLocation::named("user").with_param("id", "7"));
    }
}
