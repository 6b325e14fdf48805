mod common;

use common::{app_router, install, start, to};
use outpost_core::{EngineConfig, OutpostDef, Phase, Reply, ReportKind, RouteRecord};
use outpost_runtime::PassState;
use outpost_test::helpers::{allow, deny, recording};
use outpost_test::{CallLog, MemoryRouter};
use std::sync::Arc;

fn route_unit(log: &CallLog, name: &str, priority: i32) -> OutpostDef {
    OutpostDef::route(name)
        .priority(priority)
        .handler(recording(log, name, Reply::Next))
}

#[tokio::test]
async fn attaching_twice_runs_the_outpost_once() {
    let router = app_router();
    let (engine, _) = install(&router, EngineConfig::new());
    let log = CallLog::new();
    engine.register_unit(route_unit(&log, "auth", 1));

    assert!(engine.attach_to_route("admin", "auth"));
    assert!(engine.attach_to_route("admin", ["auth", "auth"]));
    assert_eq!(engine.attached("admin"), vec!["auth"]);

    engine
        .run_phase(Phase::BeforeNavigate, to(&router, "admin"), start())
        .await;
    assert_eq!(log.calls(), vec!["auth"]);
}

#[tokio::test]
async fn parent_and_child_attachments_are_deduplicated() {
    let router = Arc::new(
        MemoryRouter::new()
            .with_route(vec![RouteRecord::new("/admin").named("admin")])
            .with_route(vec![
                RouteRecord::new("/admin")
                    .named("admin")
                    .with_outposts(["auth"]),
                RouteRecord::new("/admin/users")
                    .named("users")
                    .with_outposts(["paging"]),
            ]),
    );
    let (engine, _) = install(&router, EngineConfig::new());
    let log = CallLog::new();
    engine.register_units([
        route_unit(&log, "paging", 1),
        route_unit(&log, "auth", 2),
        route_unit(&log, "audit", 3),
    ]);
    assert!(engine.attach_to_route("admin", ["audit"]));
    assert!(engine.attach_to_route("users", ["auth", "audit"]));

    let result = engine
        .run_phase(Phase::BeforeNavigate, to(&router, "users"), start())
        .await;
    assert_eq!(result.state, PassState::Allowed);
    assert_eq!(log.calls(), vec!["paging", "auth", "audit"]);
}

#[tokio::test]
async fn globals_run_before_routes_whatever_the_priority() {
    let router = app_router();
    let (engine, _) = install(&router, EngineConfig::new());
    let log = CallLog::new();
    engine.register_units([
        route_unit(&log, "route-urgent", 1),
        OutpostDef::global("global-lazy")
            .priority(500)
            .handler(recording(&log, "global-lazy", Reply::Next)),
    ]);
    engine.attach_to_route("admin", "route-urgent");

    let result = engine
        .run_phase(Phase::BeforeNavigate, to(&router, "admin"), start())
        .await;
    assert_eq!(result.executed, vec!["global-lazy", "route-urgent"]);
    assert_eq!(log.calls(), vec!["global-lazy", "route-urgent"]);
}

#[tokio::test]
async fn route_outposts_stay_on_their_routes() {
    let router = app_router();
    let (engine, _) = install(&router, EngineConfig::new());
    let log = CallLog::new();
    engine.register_unit(route_unit(&log, "auth", 1));
    engine.attach_to_route("admin", "auth");

    engine
        .run_phase(Phase::BeforeNavigate, to(&router, "home"), start())
        .await;
    assert!(log.is_empty());
}

#[tokio::test]
async fn detaching_stops_the_outpost_from_running() {
    let router = app_router();
    let (engine, sink) = install(&router, EngineConfig::new());
    let log = CallLog::new();
    engine.register_unit(route_unit(&log, "auth", 1));
    engine.attach_to_route("admin", "auth");

    assert!(engine.detach_from_route("admin", ["auth", "never-attached"]));
    assert_eq!(sink.count(ReportKind::NotAttached), 1);

    engine
        .run_phase(Phase::BeforeNavigate, to(&router, "admin"), start())
        .await;
    assert!(log.is_empty());
}

#[tokio::test]
async fn declared_outposts_can_be_detached_and_reattached() {
    let router = Arc::new(
        MemoryRouter::new()
            .with_simple_route("login", "/login")
            .with_route(vec![
                RouteRecord::new("/admin")
                    .named("admin")
                    .with_outposts(["gate"]),
            ]),
    );
    let (engine, sink) = install(&router, EngineConfig::new());
    engine.register_unit(OutpostDef::route("gate").handler(deny()));

    let blocked = engine
        .run_phase(Phase::BeforeNavigate, to(&router, "admin"), start())
        .await;
    assert_eq!(blocked.state, PassState::Blocked);

    assert!(engine.detach_from_route("admin", "gate"));
    assert_eq!(sink.count(ReportKind::NotAttached), 0);
    let open = engine
        .run_phase(Phase::BeforeNavigate, to(&router, "admin"), start())
        .await;
    assert_eq!(open.state, PassState::Allowed);
    assert!(open.executed.is_empty());

    assert!(engine.attach_to_route("admin", "gate"));
    let again = engine
        .run_phase(Phase::BeforeNavigate, to(&router, "admin"), start())
        .await;
    assert_eq!(again.state, PassState::Blocked);
    assert_eq!(again.executed, vec!["gate"]);
}

#[test]
fn unknown_routes_are_rejected() {
    let router = app_router();
    let (engine, sink) = install(&router, EngineConfig::new());
    assert!(!engine.attach_to_route("ghost", "auth"));
    assert!(!engine.detach_from_route("ghost", "auth"));
    assert_eq!(sink.count(ReportKind::UnknownRoute), 2);
    assert!(engine.attached("ghost").is_empty());
}

#[tokio::test]
async fn attached_but_unregistered_names_are_skipped_with_a_warning() {
    let router = app_router();
    let (engine, sink) = install(&router, EngineConfig::new());
    engine.register_unit(OutpostDef::route("real").handler(allow()));
    engine.attach_to_route("admin", ["phantom", "real"]);

    let result = engine
        .run_phase(Phase::BeforeNavigate, to(&router, "admin"), start())
        .await;
    assert_eq!(result.executed, vec!["real"]);
    assert_eq!(sink.count(ReportKind::UnknownOutpost), 1);
}

#[tokio::test]
async fn nothing_to_run_stays_silent_even_with_unregistered_names() {
    let router = app_router();
    let (engine, sink) = install(&router, EngineConfig::new());
    engine.attach_to_route("admin", "phantom");
    sink.clear();

    let result = engine
        .run_phase(Phase::BeforeNavigate, to(&router, "admin"), start())
        .await;
    assert_eq!(result.state, PassState::Allowed);
    assert!(result.executed.is_empty());
    assert!(sink.is_empty());
}

#[tokio::test]
async fn removing_a_unit_takes_it_out_of_attached_routes() {
    let router = app_router();
    let (engine, _) = install(&router, EngineConfig::new());
    let log = CallLog::new();
    engine.register_units([route_unit(&log, "a", 1), route_unit(&log, "b", 2)]);
    engine.attach_to_route("admin", ["a", "b"]);
    assert!(engine.remove_unit(outpost_core::Scope::Route, "a"));

    engine
        .run_phase(Phase::BeforeNavigate, to(&router, "admin"), start())
        .await;
    assert_eq!(log.calls(), vec!["b"]);
}
