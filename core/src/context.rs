use crate::outcome::Reply;
use crate::phase::Phase;
use crate::route::{Route, RouteLocation};
use std::sync::Arc;
use uuid::Uuid;

/// Everything a handler sees about the navigation it is judging.
///
/// Cheap to clone: routes are shared.
#[derive(Debug, Clone)]
pub struct NavContext {
    /// Identifies one navigation attempt across its phases.
    pub attempt: Uuid,
    pub phase: Phase,
    pub to: Arc<Route>,
    pub from: Arc<Route>,
}

impl NavContext {
    pub fn new(phase: Phase, to: Arc<Route>, from: Arc<Route>) -> Self {
        Self {
            attempt: Uuid::new_v4(),
            phase,
            to,
            from,
        }
    }

    pub fn with_attempt(mut self, attempt: Uuid) -> Self {
        self.attempt = attempt;
        self
    }

    /// Let the navigation proceed to the next outpost.
    pub fn next(&self) -> Reply {
        Reply::Next
    }

    /// Block the navigation.
    pub fn abort(&self) -> Reply {
        Reply::Abort
    }

    /// Send the navigation somewhere else.
    pub fn redirect(&self, target: impl Into<RouteLocation>) -> Reply {
        Reply::Location(target.into())
    }

    /// Redirect to a named route.
    pub fn redirect_to(&self, name: &str) -> Reply {
        Reply::Location(RouteLocation::named(name))
    }
}
