//! Navigation lifecycle phases and outpost scopes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A point in the navigation lifecycle at which a pipeline pass runs.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    #[default]
    BeforeNavigate,
    BeforeResolve,
    AfterNavigate,
}

impl Phase {
    /// All phases in lifecycle order.
    pub const ALL: [Phase; 3] = [
        Phase::BeforeNavigate,
        Phase::BeforeResolve,
        Phase::AfterNavigate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::BeforeNavigate => "before-navigate",
            Phase::BeforeResolve => "before-resolve",
            Phase::AfterNavigate => "after-navigate",
        }
    }

    /// Whether the host acts on the outcome of this phase.
    ///
    /// `AfterNavigate` is a notification: its pipeline still runs but a
    /// stop or redirect is only logged.
    pub fn is_consumable(&self) -> bool {
        !matches!(self, Phase::AfterNavigate)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a phase name is not one of the lifecycle phases.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown phase `{0}`")]
pub struct UnknownPhase(pub String);

impl FromStr for Phase {
    type Err = UnknownPhase;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "before-navigate" | "beforeNavigate" => Ok(Phase::BeforeNavigate),
            "before-resolve" | "beforeResolve" => Ok(Phase::BeforeResolve),
            "after-navigate" | "afterNavigate" => Ok(Phase::AfterNavigate),
            other => Err(UnknownPhase(other.to_string())),
        }
    }
}

/// Where an outpost is registered.
///
/// Global outposts run on every navigation; route outposts only for routes
/// they are attached to (directly or through an ancestor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Global,
    Route,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Global => "global",
            Scope::Route => "route",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kebab_and_camel_names() {
        assert_eq!("before-resolve".parse::<Phase>(), Ok(Phase::BeforeResolve));
        assert_eq!("afterNavigate".parse::<Phase>(), Ok(Phase::AfterNavigate));
        assert_eq!(
            "sideways".parse::<Phase>(),
            Err(UnknownPhase("sideways".to_string()))
        );
    }

    #[test]
    fn only_after_navigate_is_notification() {
        assert!(Phase::BeforeNavigate.is_consumable());
        assert!(Phase::BeforeResolve.is_consumable());
        assert!(!Phase::AfterNavigate.is_consumable());
    }
}
