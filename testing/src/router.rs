//! In-memory host router.
//!
//! Holds a flat route table, keeps phase subscriptions and simulates a
//! navigation by firing the subscribed hooks phase by phase, following
//! redirects the way a real router would.

use outpost_core::{Phase, Route, RouteLocation, RouteRecord};
use outpost_runtime::{HookId, HostRouter, HostSignal, PhaseHook};
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Redirects followed in one navigation before it is abandoned.
pub const MAX_REDIRECTS: usize = 10;

/// How a simulated navigation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// The router landed on this route.
    Completed(Arc<Route>),
    /// A hook cancelled the navigation during `phase`.
    Cancelled { phase: Phase, to: Arc<Route> },
    /// The target does not resolve to any route.
    NotFound(RouteLocation),
    TooManyRedirects,
}

impl Navigation {
    pub fn is_completed(&self) -> bool {
        matches!(self, Navigation::Completed(_))
    }

    /// Path of the route the navigation landed on.
    pub fn landed_path(&self) -> Option<&str> {
        match self {
            Navigation::Completed(route) => Some(route.path.as_str()),
            _ => None,
        }
    }
}

struct Subscription {
    phase: Phase,
    hook: Arc<dyn PhaseHook>,
}

/// A [`HostRouter`] backed by in-memory tables.
///
/// Each route is registered with its full matched chain (root first); the
/// last record names and addresses the route.
pub struct MemoryRouter {
    routes: RwLock<Vec<Vec<RouteRecord>>>,
    hooks: Mutex<BTreeMap<HookId, Subscription>>,
    next_id: AtomicU64,
    current: RwLock<Arc<Route>>,
    redirects: Mutex<Vec<RouteLocation>>,
}

impl Default for MemoryRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRouter {
    pub fn new() -> Self {
        Self {
            routes: RwLock::new(Vec::new()),
            hooks: Mutex::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
            current: RwLock::new(Arc::new(Route::start())),
            redirects: Mutex::new(Vec::new()),
        }
    }

    /// Add a route given its matched chain, root first.
    pub fn with_route(self, chain: Vec<RouteRecord>) -> Self {
        self.add_route(chain);
        self
    }

    /// Add a single top-level route.
    pub fn with_simple_route(self, name: &str, path: &str) -> Self {
        self.with_route(vec![RouteRecord::new(path).named(name)])
    }

    pub fn add_route(&self, chain: Vec<RouteRecord>) {
        if chain.is_empty() {
            return;
        }
        self.routes.write().push(chain);
    }

    /// Remove the route whose last record carries `name`.
    pub fn remove_route(&self, name: &str) -> bool {
        let mut routes = self.routes.write();
        let before = routes.len();
        routes.retain(|chain| leaf_name(chain) != Some(name));
        routes.len() != before
    }

    /// Build the full route descriptor for a location, if it resolves.
    pub fn resolve(&self, target: &RouteLocation) -> Option<Route> {
        let routes = self.routes.read();
        let chain = routes.iter().find(|chain| {
            let Some(leaf) = chain.last() else {
                return false;
            };
            match (&target.name, &target.path) {
                (Some(name), _) => leaf.name.as_deref() == Some(name.as_str()),
                (None, Some(path)) => leaf.path == *path,
                (None, None) => false,
            }
        })?;
        let leaf = chain.last()?;

        let mut route = Route::new(leaf.path.clone()).with_matched(chain.clone());
        route.name = leaf.name.clone();
        route.params = target.params.clone();
        route.query = target.query.clone();
        Some(route)
    }

    /// Route the router currently sits on.
    pub fn current(&self) -> Arc<Route> {
        Arc::clone(&self.current.read())
    }

    /// Every redirect followed since the router was created, in order.
    pub fn redirects(&self) -> Vec<RouteLocation> {
        self.redirects.lock().clone()
    }

    pub fn hook_count(&self) -> usize {
        self.hooks.lock().len()
    }

    pub fn hook_count_for(&self, phase: Phase) -> usize {
        self.hooks
            .lock()
            .values()
            .filter(|sub| sub.phase == phase)
            .count()
    }

    /// Simulate a navigation to `target`.
    ///
    /// Hooks of each phase run in subscription order and the first one
    /// that does not proceed decides. After-navigate hooks are notified
    /// once the route has changed; their answer is not consulted.
    pub async fn navigate(&self, target: impl Into<RouteLocation>) -> Navigation {
        let mut target = target.into();
        for _ in 0..=MAX_REDIRECTS {
            let Some(to) = self.resolve(&target) else {
                tracing::debug!(?target, "navigation target not found");
                return Navigation::NotFound(target);
            };
            let to = Arc::new(to);
            let from = self.current();

            match self.consult(Phase::BeforeNavigate, &to, &from).await {
                HostSignal::Proceed => {}
                HostSignal::Cancel => {
                    return Navigation::Cancelled {
                        phase: Phase::BeforeNavigate,
                        to,
                    };
                }
                HostSignal::Redirect(next) => {
                    self.redirects.lock().push(next.clone());
                    target = next;
                    continue;
                }
            }

            match self.consult(Phase::BeforeResolve, &to, &from).await {
                HostSignal::Proceed => {}
                HostSignal::Cancel => {
                    return Navigation::Cancelled {
                        phase: Phase::BeforeResolve,
                        to,
                    };
                }
                HostSignal::Redirect(next) => {
                    self.redirects.lock().push(next.clone());
                    target = next;
                    continue;
                }
            }

            *self.current.write() = Arc::clone(&to);
            let _ = self.consult(Phase::AfterNavigate, &to, &from).await;
            return Navigation::Completed(to);
        }
        tracing::warn!("navigation abandoned after {MAX_REDIRECTS} redirects");
        Navigation::TooManyRedirects
    }

    async fn consult(&self, phase: Phase, to: &Arc<Route>, from: &Arc<Route>) -> HostSignal {
        let hooks: Vec<Arc<dyn PhaseHook>> = self
            .hooks
            .lock()
            .values()
            .filter(|sub| sub.phase == phase)
            .map(|sub| Arc::clone(&sub.hook))
            .collect();

        for hook in hooks {
            let signal = hook
                .on_navigation(phase, Arc::clone(to), Arc::clone(from))
                .await;
            if signal != HostSignal::Proceed {
                return signal;
            }
        }
        HostSignal::Proceed
    }
}

fn leaf_name(chain: &[RouteRecord]) -> Option<&str> {
    chain.last().and_then(|leaf| leaf.name.as_deref())
}

impl HostRouter for MemoryRouter {
    fn has_route(&self, name: &str) -> bool {
        self.routes
            .read()
            .iter()
            .any(|chain| chain.iter().any(|record| record.name.as_deref() == Some(name)))
    }

    fn declared(&self, route: &str) -> Vec<String> {
        self.routes
            .read()
            .iter()
            .flatten()
            .find(|record| record.name.as_deref() == Some(route))
            .map(|record| record.outposts.clone())
            .unwrap_or_default()
    }

    fn subscribe(&self, phase: Phase, hook: Arc<dyn PhaseHook>) -> HookId {
        let id = HookId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.hooks.lock().insert(id, Subscription { phase, hook });
        id
    }

    fn unsubscribe(&self, id: HookId) {
        self.hooks.lock().remove(&id);
    }
}

impl std::fmt::Debug for MemoryRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryRouter")
            .field("routes", &self.routes.read().len())
            .field("hooks", &self.hook_count())
            .field("current", &self.current.read().path)
            .finish()
    }
}
