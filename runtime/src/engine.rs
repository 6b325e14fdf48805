//! # Engine: the host-facing surface
//!
//! `Engine::install` builds the registry, attachment table and pipeline
//! from an [`EngineConfig`], registers the initial outposts and subscribes
//! to every lifecycle phase of the host router. `teardown` undoes all of it.

use crate::attachments::AttachmentTable;
use crate::executor::Executor;
use crate::host::{HookId, HostRouter, HostSignal, PhaseHook};
use crate::pipeline::{PhaseResult, PipelineRunner};
use crate::registry::Registry;
use async_trait::async_trait;
use outpost_core::{
    EngineConfig, IntoNames, LookupError, NavContext, Outpost, OutpostDef, Phase, ReportKind,
    Reporter, Route, Scope, Settings,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

struct EngineInner {
    router: Arc<dyn HostRouter>,
    registry: Arc<Registry>,
    attachments: Arc<AttachmentTable>,
    runner: PipelineRunner,
    reporter: Reporter,
    settings: Settings,
    hooks: Mutex<Vec<HookId>>,
    torn_down: AtomicBool,
}

impl EngineInner {
    fn live(&self, operation: &str) -> bool {
        if self.torn_down.load(Ordering::SeqCst) {
            self.reporter.warn(
                ReportKind::TornDown,
                None,
                format!("`{operation}` ignored: {}", LookupError::TornDown),
            );
            return false;
        }
        true
    }
}

/// Guard-chain engine bound to one host router.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

impl Engine {
    /// Build an engine without subscribing to the router. The host drives
    /// it through [`Engine::run_phase`].
    pub fn new(router: Arc<dyn HostRouter>, config: EngineConfig) -> Self {
        let reporter = config.reporter();
        let settings = config.settings.clone();

        let registry = Arc::new(Registry::new(settings.default_priority, reporter.clone()));
        let attachments = Arc::new(AttachmentTable::new(reporter.clone()));
        let executor = Executor::new(reporter.clone())
            .with_default_timeout(settings.default_timeout())
            .with_error_policy(config.on_error.clone())
            .with_timeout_policy(config.on_timeout.clone());
        let runner = PipelineRunner::new(
            Arc::clone(&registry),
            Arc::clone(&attachments),
            Arc::clone(&router),
            executor,
            reporter.clone(),
        )
        .with_debug_hook(config.active_debug_hook());

        registry.register_all(config.outposts);

        tracing::debug!(
            default_priority = settings.default_priority,
            default_timeout_ms = ?settings.default_timeout_ms,
            "outpost engine created"
        );

        Self {
            inner: Arc::new(EngineInner {
                router,
                registry,
                attachments,
                runner,
                reporter,
                settings,
                hooks: Mutex::new(Vec::new()),
                torn_down: AtomicBool::new(false),
            }),
        }
    }

    /// Build an engine and subscribe it to every phase of `router`.
    pub fn install(router: Arc<dyn HostRouter>, config: EngineConfig) -> Self {
        let engine = Self::new(Arc::clone(&router), config);
        let hook: Arc<dyn PhaseHook> = Arc::new(EngineHook {
            engine: Arc::downgrade(&engine.inner),
        });
        let ids: Vec<HookId> = Phase::ALL
            .iter()
            .map(|phase| router.subscribe(*phase, Arc::clone(&hook)))
            .collect();
        engine.inner.hooks.lock().extend(ids);
        engine
    }

    pub fn register_unit(&self, def: OutpostDef) {
        if self.inner.live("register_unit") {
            self.inner.registry.register(def);
        }
    }

    pub fn register_units<I>(&self, defs: I)
    where
        I: IntoIterator<Item = OutpostDef>,
    {
        if self.inner.live("register_units") {
            self.inner.registry.register_all(defs);
        }
    }

    pub fn remove_unit(&self, scope: Scope, names: impl IntoNames) -> bool {
        self.inner.live("remove_unit") && self.inner.registry.unregister(scope, names)
    }

    /// Names in execution order.
    pub fn list_unit_names(&self, scope: Scope) -> Vec<String> {
        if !self.inner.live("list_unit_names") {
            return Vec::new();
        }
        self.inner.registry.list_names(scope)
    }

    pub fn list_unit_names_for(&self, scope: Scope, phase: Phase) -> Vec<String> {
        if !self.inner.live("list_unit_names_for") {
            return Vec::new();
        }
        self.inner.registry.list_names_for(scope, phase)
    }

    pub fn find_outpost(&self, scope: Scope, name: &str) -> Option<Arc<Outpost>> {
        if !self.inner.live("find_outpost") {
            return None;
        }
        self.inner.registry.find(scope, name)
    }

    pub fn attach_to_route(&self, route: &str, names: impl IntoNames) -> bool {
        self.inner.live("attach_to_route")
            && self
                .inner
                .attachments
                .attach(self.inner.router.as_ref(), route, names)
    }

    pub fn detach_from_route(&self, route: &str, names: impl IntoNames) -> bool {
        self.inner.live("detach_from_route")
            && self
                .inner
                .attachments
                .detach(self.inner.router.as_ref(), route, names)
    }

    /// Outposts attached to `route` at runtime (not those declared on its
    /// record).
    pub fn attached(&self, route: &str) -> Vec<String> {
        self.inner.attachments.attached(route)
    }

    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    /// Run one phase for one navigation. After teardown every phase is
    /// allowed without running anything.
    pub async fn run_phase(&self, phase: Phase, to: Arc<Route>, from: Arc<Route>) -> PhaseResult {
        self.run_context(NavContext::new(phase, to, from)).await
    }

    /// Like [`Engine::run_phase`] with a caller-built context, so that
    /// several phases can share one attempt id.
    pub async fn run_context(&self, ctx: NavContext) -> PhaseResult {
        if !self.inner.live("run_phase") {
            return PhaseResult {
                phase: ctx.phase,
                state: crate::pipeline::PassState::Allowed,
                executed: Vec::new(),
                decided_by: None,
            };
        }
        self.inner.runner.run(ctx).await
    }

    pub fn is_torn_down(&self) -> bool {
        self.inner.torn_down.load(Ordering::SeqCst)
    }

    /// Unsubscribe from the router and drop every outpost and attachment.
    /// The engine must not be used afterwards.
    pub fn teardown(&self) {
        if self.inner.torn_down.swap(true, Ordering::SeqCst) {
            return;
        }
        for id in self.inner.hooks.lock().drain(..) {
            self.inner.router.unsubscribe(id);
        }
        self.inner.registry.clear();
        self.inner.attachments.clear();
        tracing::debug!("outpost engine torn down");
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("registry", &self.inner.registry)
            .field("attachments", &self.inner.attachments)
            .field("settings", &self.inner.settings)
            .field("torn_down", &self.is_torn_down())
            .finish()
    }
}

/// The subscription handed to the router. Holds the engine weakly so the
/// router does not keep it alive.
struct EngineHook {
    engine: Weak<EngineInner>,
}

#[async_trait]
impl PhaseHook for EngineHook {
    async fn on_navigation(&self, phase: Phase, to: Arc<Route>, from: Arc<Route>) -> HostSignal {
        let Some(inner) = self.engine.upgrade() else {
            return HostSignal::Proceed;
        };
        if inner.torn_down.load(Ordering::SeqCst) {
            return HostSignal::Proceed;
        }
        inner
            .runner
            .run(NavContext::new(phase, to, from))
            .await
            .signal()
    }
}
