//! Host Router Seam
//!
//! The engine never routes. A host router tells it where a navigation is
//! going and what the matched chain is, and it answers each phase with a
//! [`HostSignal`].

use async_trait::async_trait;
use outpost_core::{Outcome, Phase, Route, RouteLocation, RouteRecord};
use std::sync::Arc;

/// What the host should do with the navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostSignal {
    Proceed,
    Cancel,
    Redirect(RouteLocation),
}

impl From<Outcome> for HostSignal {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Continue => HostSignal::Proceed,
            Outcome::Stop => HostSignal::Cancel,
            Outcome::Redirect(loc) => HostSignal::Redirect(loc),
        }
    }
}

/// Handle for one phase subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HookId(pub u64);

/// Called by the host at each lifecycle phase.
#[async_trait]
pub trait PhaseHook: Send + Sync + 'static {
    async fn on_navigation(&self, phase: Phase, to: Arc<Route>, from: Arc<Route>) -> HostSignal;
}

pub trait HostRouter: Send + Sync + 'static {
    /// Whether the route table currently holds a route with this name.
    fn has_route(&self, name: &str) -> bool;

    /// Matched records for `to`, root first.
    fn matched(&self, to: &Route) -> Vec<RouteRecord> {
        to.matched.clone()
    }

    /// Outpost names declared in the metadata of the named route's record.
    fn declared(&self, _route: &str) -> Vec<String> {
        Vec::new()
    }

    fn subscribe(&self, phase: Phase, hook: Arc<dyn PhaseHook>) -> HookId;

    fn unsubscribe(&self, id: HookId);
}
