//! Outpost definitions and registered outposts.

use crate::context::NavContext;
use crate::error::{DefinitionError, UnitError};
use crate::handler::{Handler, HandlerResult, Loader, handler_fn};
use crate::phase::{Phase, Scope};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

pub const DEFAULT_PRIORITY: i32 = 100;

/// How an outpost obtains its decision logic.
#[derive(Clone)]
pub enum HandlerSource {
    Eager(Arc<dyn Handler>),
    /// Resolved on first execution, then cached for the registry's lifetime.
    Lazy(Arc<dyn Loader>),
}

/// A caller-supplied outpost definition, validated at registration.
#[derive(Clone)]
pub struct OutpostDef {
    name: String,
    scope: Scope,
    source: Option<HandlerSource>,
    priority: Option<i32>,
    phases: Option<Vec<Phase>>,
    unknown_phases: Vec<String>,
    timeout: Option<Duration>,
}

impl OutpostDef {
    pub fn new(scope: Scope, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scope,
            source: None,
            priority: None,
            phases: None,
            unknown_phases: Vec::new(),
            timeout: None,
        }
    }

    pub fn global(name: impl Into<String>) -> Self {
        Self::new(Scope::Global, name)
    }

    pub fn route(name: impl Into<String>) -> Self {
        Self::new(Scope::Route, name)
    }

    pub fn handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.source = Some(HandlerSource::Eager(handler));
        self
    }

    /// Shorthand for `handler(handler_fn(f))`.
    pub fn decide<F, Fut>(self, decide_fn: F) -> Self
    where
        F: Fn(NavContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.handler(handler_fn(decide_fn))
    }

    pub fn lazy(mut self, loader: Arc<dyn Loader>) -> Self {
        self.source = Some(HandlerSource::Lazy(loader));
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn phases<I>(mut self, phases: I) -> Self
    where
        I: IntoIterator<Item = Phase>,
    {
        let mut set = Vec::new();
        for phase in phases {
            if !set.contains(&phase) {
                set.push(phase);
            }
        }
        self.phases = Some(set);
        self
    }

    /// Declare phases by name. Names that are not lifecycle phases are kept
    /// aside and turn the definition into a configuration error.
    pub fn phase_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut known = Vec::new();
        self.unknown_phases.clear();
        for name in names {
            match name.as_ref().parse::<Phase>() {
                Ok(phase) if !known.contains(&phase) => known.push(phase),
                Ok(_) => {}
                Err(_) => self.unknown_phases.push(name.as_ref().to_string()),
            }
        }
        self.phases = Some(known);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn timeout_ms(self, ms: u64) -> Self {
        self.timeout(Duration::from_millis(ms))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Turn the definition into a registered outpost.
    ///
    /// A missing name or handler rejects the definition. Phase problems do
    /// not: the outpost is returned with its configuration error attached and
    /// never runs until it is registered again with valid phases.
    pub fn build(self, default_priority: i32, seq: u64) -> Result<Outpost, DefinitionError> {
        if self.name.trim().is_empty() {
            return Err(DefinitionError::MissingName);
        }
        let source = self
            .source
            .ok_or_else(|| DefinitionError::MissingHandler(self.name.clone()))?;

        let phases = self.phases.unwrap_or_else(|| vec![Phase::BeforeNavigate]);
        let config_error = if !self.unknown_phases.is_empty() {
            Some(DefinitionError::UnknownPhases {
                name: self.name.clone(),
                phases: self.unknown_phases,
            })
        } else if phases.is_empty() {
            Some(DefinitionError::EmptyPhases(self.name.clone()))
        } else {
            None
        };

        let slot = match source {
            HandlerSource::Eager(handler) => HandlerSlot::Eager(handler),
            HandlerSource::Lazy(loader) => HandlerSlot::Lazy {
                loader,
                resolved: OnceCell::new(),
            },
        };

        Ok(Outpost {
            name: self.name,
            scope: self.scope,
            priority: self.priority.unwrap_or(default_priority),
            phases,
            timeout: self.timeout,
            seq,
            config_error,
            slot,
        })
    }
}

impl fmt::Debug for OutpostDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutpostDef")
            .field("name", &self.name)
            .field("scope", &self.scope)
            .field("priority", &self.priority)
            .field("phases", &self.phases)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

enum HandlerSlot {
    Eager(Arc<dyn Handler>),
    Lazy {
        loader: Arc<dyn Loader>,
        resolved: OnceCell<Arc<dyn Handler>>,
    },
}

/// A registered outpost. Immutable apart from its lazily resolved handler.
pub struct Outpost {
    name: String,
    scope: Scope,
    priority: i32,
    phases: Vec<Phase>,
    timeout: Option<Duration>,
    seq: u64,
    config_error: Option<DefinitionError>,
    slot: HandlerSlot,
}

impl Outpost {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Registration sequence number, the tie-breaker for equal priorities.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn config_error(&self) -> Option<&DefinitionError> {
        self.config_error.as_ref()
    }

    /// Whether this outpost takes part in `phase` pipelines.
    pub fn runs_in(&self, phase: Phase) -> bool {
        self.config_error.is_none() && self.phases.contains(&phase)
    }

    pub fn is_lazy(&self) -> bool {
        matches!(self.slot, HandlerSlot::Lazy { .. })
    }

    /// Eager outposts are always loaded.
    pub fn is_loaded(&self) -> bool {
        match &self.slot {
            HandlerSlot::Eager(_) => true,
            HandlerSlot::Lazy { resolved, .. } => resolved.initialized(),
        }
    }

    /// The handler to run, loading it first if the outpost is lazy.
    ///
    /// Concurrent first calls share a single load. A failed load is not
    /// cached, so the next navigation tries again.
    pub async fn handler(&self) -> Result<Arc<dyn Handler>, UnitError> {
        match &self.slot {
            HandlerSlot::Eager(handler) => Ok(Arc::clone(handler)),
            HandlerSlot::Lazy { loader, resolved } => resolved
                .get_or_try_init(|| loader.load())
                .await
                .map(Arc::clone),
        }
    }
}

impl fmt::Debug for Outpost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Outpost")
            .field("name", &self.name)
            .field("scope", &self.scope)
            .field("priority", &self.priority)
            .field("phases", &self.phases)
            .field("timeout", &self.timeout)
            .field("seq", &self.seq)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
