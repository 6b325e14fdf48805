//! Router-agnostic data model for Outpost navigation guards.

pub mod config;
pub mod context;
pub mod error;
pub mod handler;
pub mod names;
pub mod outcome;
pub mod outpost;
pub mod phase;
pub mod policy;
pub mod report;
pub mod route;

pub use config::{DebugEvent, DebugHook, DebugStage, EngineConfig, Settings};
pub use context::NavContext;
pub use error::{DefinitionError, LookupError, SettingsError, UnitError};
pub use handler::{Handler, HandlerResult, Loader, handler_fn, loader_fn};
pub use names::IntoNames;
pub use outcome::{Outcome, Reply};
pub use outpost::{DEFAULT_PRIORITY, HandlerSource, Outpost, OutpostDef};
pub use phase::{Phase, Scope, UnknownPhase};
pub use policy::{ErrorPolicy, TimeoutPolicy, error_policy_fn, timeout_policy_fn};
pub use report::{MemorySink, Report, ReportKind, ReportSink, Reporter, Severity, TracingSink};
pub use route::{Route, RouteLocation, RouteRecord};

pub mod prelude {
    pub use crate::config::{EngineConfig, Settings};
    pub use crate::context::NavContext;
    pub use crate::error::UnitError;
    pub use crate::handler::{Handler, HandlerResult, Loader, handler_fn, loader_fn};
    pub use crate::names::IntoNames;
    pub use crate::outcome::{Outcome, Reply};
    pub use crate::outpost::OutpostDef;
    pub use crate::phase::{Phase, Scope};
    pub use crate::policy::{error_policy_fn, timeout_policy_fn};
    pub use crate::route::{Route, RouteLocation, RouteRecord};
}
