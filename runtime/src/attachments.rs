//! Route attachment table.
//!
//! Holds the route-scoped outpost names attached to each route at runtime,
//! plus the declared names that were detached. Names declared in route
//! records are not copied here; they are read from the matched chain when a
//! navigation is resolved, because the host's route tree can change between
//! navigations.

use crate::host::HostRouter;
use outpost_core::{IntoNames, LookupError, ReportKind, Reporter, RouteRecord};
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Default)]
struct RouteEntry {
    attached: Vec<String>,
    /// Declared names removed with `detach`; hidden until re-attached.
    masked: Vec<String>,
}

impl RouteEntry {
    fn is_empty(&self) -> bool {
        self.attached.is_empty() && self.masked.is_empty()
    }
}

pub struct AttachmentTable {
    routes: RwLock<HashMap<String, RouteEntry>>,
    reporter: Reporter,
}

impl AttachmentTable {
    pub fn new(reporter: Reporter) -> Self {
        Self {
            routes: RwLock::new(HashMap::new()),
            reporter,
        }
    }

    /// Attach outposts to a route. Already attached names are left alone,
    /// and a detached declared name is restored.
    /// Returns `false` if the router does not know the route.
    pub fn attach(&self, router: &dyn HostRouter, route: &str, names: impl IntoNames) -> bool {
        if !router.has_route(route) {
            self.reporter.warn(
                ReportKind::UnknownRoute,
                None,
                format!("cannot attach: {}", LookupError::UnknownRoute(route.to_string())),
            );
            return false;
        }

        let declared = router.declared(route);
        let mut routes = self.routes.write();
        let entry = routes.entry(route.to_string()).or_default();
        for name in names.into_names() {
            let unmasked = remove_name(&mut entry.masked, &name);
            let present = unmasked || declared.contains(&name) || entry.attached.contains(&name);
            if present && !unmasked {
                continue;
            }
            self.reporter.info(
                ReportKind::Attached,
                Some(&name),
                format!("attached to route `{route}`"),
            );
            if !present {
                entry.attached.push(name);
            }
        }
        if entry.is_empty() {
            routes.remove(route);
        }
        true
    }

    /// Detach outposts from a route, whether they were attached at runtime
    /// or declared on the route's record. Names in neither are reported but
    /// do not fail the call; only an unknown route does.
    pub fn detach(&self, router: &dyn HostRouter, route: &str, names: impl IntoNames) -> bool {
        if !router.has_route(route) {
            self.reporter.warn(
                ReportKind::UnknownRoute,
                None,
                format!("cannot detach: {}", LookupError::UnknownRoute(route.to_string())),
            );
            return false;
        }

        let declared = router.declared(route);
        let mut routes = self.routes.write();
        let entry = routes.entry(route.to_string()).or_default();
        for name in names.into_names() {
            let mut removed = remove_name(&mut entry.attached, &name);
            if declared.contains(&name) && !entry.masked.contains(&name) {
                entry.masked.push(name.clone());
                removed = true;
            }
            if removed {
                self.reporter.info(
                    ReportKind::Detached,
                    Some(&name),
                    format!("detached from route `{route}`"),
                );
            } else {
                self.reporter.warn(
                    ReportKind::NotAttached,
                    Some(&name),
                    LookupError::NotAttached {
                        route: route.to_string(),
                        name: name.clone(),
                    }
                    .to_string(),
                );
            }
        }
        if entry.is_empty() {
            routes.remove(route);
        }
        true
    }

    /// Names attached to `route` at runtime, in attachment order.
    pub fn attached(&self, route: &str) -> Vec<String> {
        self.routes
            .read()
            .get(route)
            .map(|entry| entry.attached.clone())
            .unwrap_or_default()
    }

    /// Union of the outposts declared on each record of the matched chain
    /// and those attached at runtime, root first, each name once. Declared
    /// names detached from a record are left out.
    ///
    /// The result is in first-seen order; callers sort it by priority.
    pub fn resolve(&self, chain: &[RouteRecord]) -> Vec<String> {
        let routes = self.routes.read();
        let mut resolved: Vec<String> = Vec::new();
        for record in chain {
            let entry = record.name.as_deref().and_then(|name| routes.get(name));
            let declared = record
                .outposts
                .iter()
                .filter(|name| entry.is_none_or(|entry| !entry.masked.contains(*name)));
            let dynamic = entry.into_iter().flat_map(|entry| entry.attached.iter());
            for name in declared.chain(dynamic) {
                if !resolved.contains(name) {
                    resolved.push(name.clone());
                }
            }
        }
        resolved
    }

    pub fn clear(&self) {
        self.routes.write().clear();
    }
}

fn remove_name(names: &mut Vec<String>, name: &str) -> bool {
    match names.iter().position(|n| n == name) {
        Some(index) => {
            names.remove(index);
            true
        }
        None => false,
    }
}

impl std::fmt::Debug for AttachmentTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttachmentTable")
            .field("routes", &*self.routes.read())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HookId, PhaseHook};
    use outpost_core::{MemorySink, Phase};
    use std::sync::Arc;

    struct Routes(Vec<&'static str>);

    impl HostRouter for Routes {
        fn has_route(&self, name: &str) -> bool {
            self.0.iter().any(|route| *route == name)
        }

        fn declared(&self, route: &str) -> Vec<String> {
            if route == "admin" {
                vec!["gate".to_string()]
            } else {
                Vec::new()
            }
        }

        fn subscribe(&self, _phase: Phase, _hook: Arc<dyn PhaseHook>) -> HookId {
            HookId(0)
        }

        fn unsubscribe(&self, _id: HookId) {}
    }

    fn table() -> (AttachmentTable, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        (AttachmentTable::new(Reporter::new(false, sink.clone())), sink)
    }

    #[test]
    fn attach_is_idempotent() {
        let (table, _) = table();
        let router = Routes(vec!["admin"]);
        assert!(table.attach(&router, "admin", "auth"));
        assert!(table.attach(&router, "admin", ["auth", "audit"]));
        assert!(table.attach(&router, "admin", "auth"));
        assert_eq!(table.attached("admin"), vec!["auth", "audit"]);
    }

    #[test]
    fn unknown_route_fails_attach_and_detach() {
        let (table, sink) = table();
        let router = Routes(vec![]);
        assert!(!table.attach(&router, "ghost", "auth"));
        assert!(!table.detach(&router, "ghost", "auth"));
        assert_eq!(sink.count(ReportKind::UnknownRoute), 2);
        assert!(table.attached("ghost").is_empty());
    }

    #[test]
    fn detach_missing_name_warns_but_succeeds() {
        let (table, sink) = table();
        let router = Routes(vec!["admin"]);
        table.attach(&router, "admin", ["auth", "audit"]);
        assert!(table.detach(&router, "admin", ["auth", "never"]));
        assert_eq!(table.attached("admin"), vec!["audit"]);
        assert_eq!(sink.count(ReportKind::NotAttached), 1);
    }

    #[test]
    fn resolve_dedupes_across_the_chain_ancestors_first() {
        let (table, _) = table();
        let router = Routes(vec!["admin", "users"]);
        table.attach(&router, "users", ["auth", "rate"]);
        let chain = vec![
            RouteRecord::new("/admin")
                .named("admin")
                .with_outposts(["auth", "audit"]),
            RouteRecord::new("/admin/users")
                .named("users")
                .with_outposts(["audit", "paging"]),
        ];
        assert_eq!(
            table.resolve(&chain),
            vec!["auth", "audit", "paging", "rate"]
        );
    }

    #[test]
    fn unnamed_records_still_contribute_declared_outposts() {
        let (table, _) = table();
        let chain = vec![RouteRecord::new("/").with_outposts(["root"])];
        assert_eq!(table.resolve(&chain), vec!["root"]);
    }

    #[test]
    fn detaching_a_declared_name_masks_it_until_reattached() {
        let (table, sink) = table();
        let router = Routes(vec!["admin"]);
        let chain = vec![
            RouteRecord::new("/admin")
                .named("admin")
                .with_outposts(["gate", "audit"]),
        ];

        assert!(table.detach(&router, "admin", "gate"));
        assert_eq!(sink.count(ReportKind::NotAttached), 0);
        assert_eq!(table.resolve(&chain), vec!["audit"]);
        assert!(table.attached("admin").is_empty());

        assert!(table.attach(&router, "admin", "gate"));
        assert_eq!(table.resolve(&chain), vec!["gate", "audit"]);
        assert!(table.attached("admin").is_empty());
    }
}
