#![allow(dead_code)]

use outpost_core::{EngineConfig, MemorySink, Route, RouteLocation, RouteRecord};
use outpost_runtime::{Engine, HostRouter};
use outpost_test::MemoryRouter;
use std::sync::Arc;

/// home, login, admin and admin/users (child of admin).
pub fn app_router() -> Arc<MemoryRouter> {
    outpost_test::init_tracing();
    Arc::new(
        MemoryRouter::new()
            .with_simple_route("home", "/home")
            .with_simple_route("login", "/login")
            .with_route(vec![RouteRecord::new("/admin").named("admin")])
            .with_route(vec![
                RouteRecord::new("/admin").named("admin"),
                RouteRecord::new("/admin/users").named("users"),
            ]),
    )
}

/// Install an engine on `router` with reports collected in memory.
pub fn install(router: &Arc<MemoryRouter>, config: EngineConfig) -> (Engine, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let host: Arc<dyn HostRouter> = router.clone();
    let engine = Engine::install(host, config.sink(sink.clone()));
    (engine, sink)
}

/// Resolved route descriptor for a named route.
pub fn to(router: &MemoryRouter, name: &str) -> Arc<Route> {
    Arc::new(
        router
            .resolve(&RouteLocation::named(name))
            .expect("route exists"),
    )
}

pub fn start() -> Arc<Route> {
    Arc::new(Route::start())
}
