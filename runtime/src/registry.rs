//! # Registry: outposts by scope, kept in execution order
//!
//! Each scope keeps its outposts by name plus a cached list sorted by
//! `(priority, registration sequence)`. The cache is rebuilt on every
//! mutation, under the write lock, and swapped in whole: a pipeline pass
//! reads either the old list or the new one and never pays for sorting.

use outpost_core::{
    IntoNames, LookupError, Outpost, OutpostDef, Phase, ReportKind, Reporter, Scope,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

struct ScopeTable {
    outposts: HashMap<String, Arc<Outpost>>,
    sorted: Arc<[Arc<Outpost>]>,
}

impl ScopeTable {
    fn new() -> Self {
        Self {
            outposts: HashMap::new(),
            sorted: Arc::from(Vec::new()),
        }
    }

    fn resort(&mut self) {
        let mut sorted: Vec<Arc<Outpost>> = self.outposts.values().cloned().collect();
        sorted.sort_by_key(|o| (o.priority(), o.seq()));
        self.sorted = sorted.into();
    }
}

pub struct Registry {
    global: RwLock<ScopeTable>,
    route: RwLock<ScopeTable>,
    seq: AtomicU64,
    default_priority: i32,
    reporter: Reporter,
}

impl Registry {
    pub fn new(default_priority: i32, reporter: Reporter) -> Self {
        Self {
            global: RwLock::new(ScopeTable::new()),
            route: RwLock::new(ScopeTable::new()),
            seq: AtomicU64::new(0),
            default_priority,
            reporter,
        }
    }

    fn table(&self, scope: Scope) -> &RwLock<ScopeTable> {
        match scope {
            Scope::Global => &self.global,
            Scope::Route => &self.route,
        }
    }

    pub fn register(&self, def: OutpostDef) {
        self.register_all([def]);
    }

    /// Register a batch. Malformed definitions are reported and skipped; the
    /// rest of the batch still lands. A name already present in its scope is
    /// overwritten and takes a fresh registration sequence.
    pub fn register_all<I>(&self, defs: I)
    where
        I: IntoIterator<Item = OutpostDef>,
    {
        let mut global = Vec::new();
        let mut route = Vec::new();

        for def in defs {
            let seq = self.seq.fetch_add(1, Ordering::SeqCst);
            let outpost = match def.build(self.default_priority, seq) {
                Ok(outpost) => outpost,
                Err(err) => {
                    self.reporter
                        .error(ReportKind::InvalidDefinition, None, err.to_string());
                    continue;
                }
            };
            if let Some(err) = outpost.config_error() {
                self.reporter
                    .error(ReportKind::InvalidConfig, Some(outpost.name()), err.to_string());
            }
            match outpost.scope() {
                Scope::Global => global.push(outpost),
                Scope::Route => route.push(outpost),
            }
        }

        self.insert(Scope::Global, global);
        self.insert(Scope::Route, route);
    }

    fn insert(&self, scope: Scope, outposts: Vec<Outpost>) {
        if outposts.is_empty() {
            return;
        }
        let mut table = self.table(scope).write();
        for outpost in outposts {
            let name = outpost.name().to_string();
            if table.outposts.insert(name.clone(), Arc::new(outpost)).is_some() {
                self.reporter.warn(
                    ReportKind::DuplicateName,
                    Some(&name),
                    format!("{scope} outpost `{name}` already registered, overwriting"),
                );
            } else {
                self.reporter.info(
                    ReportKind::Registered,
                    Some(&name),
                    format!("{scope} outpost `{name}` registered"),
                );
            }
        }
        table.resort();
    }

    /// Remove outposts by name. Returns `true` only if every name existed;
    /// the ones that did exist are removed either way.
    pub fn unregister(&self, scope: Scope, names: impl IntoNames) -> bool {
        let names = names.into_names();
        let mut table = self.table(scope).write();
        let mut all_found = true;
        for name in &names {
            if table.outposts.remove(name).is_some() {
                self.reporter.info(
                    ReportKind::Removed,
                    Some(name),
                    format!("{scope} outpost `{name}` removed"),
                );
            } else {
                all_found = false;
                self.reporter.warn(
                    ReportKind::UnknownOutpost,
                    Some(name),
                    format!(
                        "cannot remove: {}",
                        LookupError::UnknownOutpost {
                            scope,
                            name: name.clone(),
                        }
                    ),
                );
            }
        }
        table.resort();
        all_found
    }

    /// Names in execution order.
    pub fn list_names(&self, scope: Scope) -> Vec<String> {
        self.snapshot(scope)
            .iter()
            .map(|o| o.name().to_string())
            .collect()
    }

    /// Names in execution order, limited to outposts that run in `phase`.
    pub fn list_names_for(&self, scope: Scope, phase: Phase) -> Vec<String> {
        self.phase_outposts(scope, phase)
            .iter()
            .map(|o| o.name().to_string())
            .collect()
    }

    pub fn find(&self, scope: Scope, name: &str) -> Option<Arc<Outpost>> {
        self.table(scope).read().outposts.get(name).cloned()
    }

    pub fn contains(&self, scope: Scope, name: &str) -> bool {
        self.table(scope).read().outposts.contains_key(name)
    }

    pub fn len(&self, scope: Scope) -> usize {
        self.table(scope).read().outposts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len(Scope::Global) == 0 && self.len(Scope::Route) == 0
    }

    /// The sorted cache as it is right now.
    pub fn snapshot(&self, scope: Scope) -> Arc<[Arc<Outpost>]> {
        Arc::clone(&self.table(scope).read().sorted)
    }

    pub fn phase_outposts(&self, scope: Scope, phase: Phase) -> Vec<Arc<Outpost>> {
        self.snapshot(scope)
            .iter()
            .filter(|o| o.runs_in(phase))
            .cloned()
            .collect()
    }

    /// Look up `names` in `scope`, keep the ones running in `phase` and put
    /// them in execution order. Names with no registered outpost come back
    /// in the second list, unreported.
    pub fn sort_named(
        &self,
        scope: Scope,
        names: &[String],
        phase: Phase,
    ) -> (Vec<Arc<Outpost>>, Vec<String>) {
        let table = self.table(scope).read();
        let mut picked = Vec::with_capacity(names.len());
        let mut unknown = Vec::new();
        for name in names {
            match table.outposts.get(name) {
                Some(outpost) => {
                    if outpost.runs_in(phase) {
                        picked.push(Arc::clone(outpost));
                    }
                }
                None => unknown.push(name.clone()),
            }
        }
        drop(table);
        picked.sort_by_key(|o| (o.priority(), o.seq()));
        (picked, unknown)
    }

    /// Warn about attached names that have no registered outpost.
    pub fn report_unknown(&self, scope: Scope, names: &[String]) {
        for name in names {
            self.reporter.warn(
                ReportKind::UnknownOutpost,
                Some(name),
                format!(
                    "attached to the route but skipped: {}",
                    LookupError::UnknownOutpost {
                        scope,
                        name: name.clone(),
                    }
                ),
            );
        }
    }

    pub fn clear(&self) {
        for scope in [Scope::Global, Scope::Route] {
            let mut table = self.table(scope).write();
            table.outposts.clear();
            table.resort();
        }
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("global", &self.list_names(Scope::Global))
            .field("route", &self.list_names(Scope::Route))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use outpost_core::{MemorySink, Reply, ReportKind};

    fn def(scope: Scope, name: &str, priority: i32) -> OutpostDef {
        OutpostDef::new(scope, name)
            .priority(priority)
            .decide(|_ctx| async { Ok(Reply::Next) })
    }

    fn registry() -> (Registry, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        (Registry::new(100, Reporter::new(false, sink.clone())), sink)
    }

    #[test]
    fn sorts_by_priority_then_registration_order() {
        let (registry, _) = registry();
        registry.register_all([
            def(Scope::Global, "c", 50),
            def(Scope::Global, "a", 10),
            def(Scope::Global, "b", 50),
            def(Scope::Global, "d", 100),
        ]);
        assert_eq!(registry.list_names(Scope::Global), vec!["a", "c", "b", "d"]);
        assert!(registry.list_names(Scope::Route).is_empty());
    }

    #[test]
    fn order_survives_unrelated_removals_and_additions() {
        let (registry, _) = registry();
        registry.register_all([
            def(Scope::Global, "x", 5),
            def(Scope::Global, "y", 5),
            def(Scope::Global, "z", 5),
        ]);
        assert!(registry.unregister(Scope::Global, "y"));
        registry.register(def(Scope::Global, "w", 1));
        registry.register(def(Scope::Global, "v", 5));
        assert_eq!(
            registry.list_names(Scope::Global),
            vec!["w", "x", "z", "v"]
        );
    }

    #[test]
    fn reregistration_overwrites_and_moves_to_back_of_its_tier() {
        let (registry, sink) = registry();
        registry.register_all([def(Scope::Route, "a", 1), def(Scope::Route, "b", 1)]);
        registry.register(def(Scope::Route, "a", 1));
        assert_eq!(registry.list_names(Scope::Route), vec!["b", "a"]);
        assert_eq!(sink.count(ReportKind::DuplicateName), 1);

        registry.register(def(Scope::Route, "a", 0));
        assert_eq!(registry.list_names(Scope::Route), vec!["a", "b"]);
        assert_eq!(registry.find(Scope::Route, "a").unwrap().priority(), 0);
    }

    #[test]
    fn unregister_reports_partial_misses() {
        let (registry, sink) = registry();
        registry.register_all([def(Scope::Global, "a", 1), def(Scope::Global, "b", 2)]);
        assert!(!registry.unregister(Scope::Global, ["a", "ghost"]));
        assert_eq!(registry.list_names(Scope::Global), vec!["b"]);
        assert_eq!(sink.count(ReportKind::UnknownOutpost), 1);
    }

    #[test]
    fn scopes_are_independent() {
        let (registry, _) = registry();
        registry.register_all([def(Scope::Global, "auth", 1), def(Scope::Route, "auth", 1)]);
        assert!(registry.unregister(Scope::Route, "auth"));
        assert!(registry.contains(Scope::Global, "auth"));
        assert!(!registry.contains(Scope::Route, "auth"));
    }

    #[test]
    fn malformed_definitions_are_skipped_from_batch() {
        let (registry, sink) = registry();
        registry.register_all([
            OutpostDef::global("no-handler"),
            def(Scope::Global, "ok", 1),
            OutpostDef::global("").decide(|_ctx| async { Ok(Reply::Next) }),
        ]);
        assert_eq!(registry.list_names(Scope::Global), vec!["ok"]);
        assert_eq!(sink.count(ReportKind::InvalidDefinition), 2);
    }

    #[test]
    fn misconfigured_outposts_are_stored_but_never_listed_for_a_phase() {
        let (registry, sink) = registry();
        registry.register(
            OutpostDef::global("typo")
                .phase_names(["before-navigte"])
                .decide(|_ctx| async { Ok(Reply::Next) }),
        );
        assert_eq!(sink.count(ReportKind::InvalidConfig), 1);
        assert_eq!(registry.list_names(Scope::Global), vec!["typo"]);
        for phase in Phase::ALL {
            assert!(registry.list_names_for(Scope::Global, phase).is_empty());
        }
    }

    #[test]
    fn phase_filtering() {
        let (registry, _) = registry();
        registry.register_all([
            def(Scope::Global, "nav", 1),
            def(Scope::Global, "resolve", 2).phases([Phase::BeforeResolve]),
            def(Scope::Global, "both", 3).phases([Phase::BeforeNavigate, Phase::AfterNavigate]),
        ]);
        assert_eq!(
            registry.list_names_for(Scope::Global, Phase::BeforeNavigate),
            vec!["nav", "both"]
        );
        assert_eq!(
            registry.list_names_for(Scope::Global, Phase::BeforeResolve),
            vec!["resolve"]
        );
    }

    #[test]
    fn sort_named_orders_by_priority_not_by_name_order() {
        let (registry, sink) = registry();
        registry.register_all([def(Scope::Route, "late", 200), def(Scope::Route, "early", 1)]);
        let names = vec!["late".to_string(), "missing".to_string(), "early".to_string()];
        let (picked, unknown) = registry.sort_named(Scope::Route, &names, Phase::BeforeNavigate);
        let picked: Vec<_> = picked.iter().map(|o| o.name()).collect();
        assert_eq!(picked, vec!["early", "late"]);
        assert_eq!(unknown, vec!["missing"]);
        assert_eq!(sink.count(ReportKind::UnknownOutpost), 0);

        registry.report_unknown(Scope::Route, &unknown);
        assert_eq!(sink.count(ReportKind::UnknownOutpost), 1);
    }

    #[test]
    fn snapshot_is_unaffected_by_later_mutation() {
        let (registry, _) = registry();
        registry.register(def(Scope::Global, "a", 1));
        let before = registry.snapshot(Scope::Global);
        registry.register(def(Scope::Global, "b", 0));
        registry.clear();
        assert_eq!(before.len(), 1);
        assert!(registry.is_empty());
    }

    mod interleavings {
        use super::*;
        use proptest::prelude::*;

        const NAMES: [&str; 5] = ["a", "b", "c", "d", "e"];

        #[derive(Debug, Clone)]
        enum Op {
            Register(usize, i32),
            Unregister(usize),
        }

        fn op_strategy() -> impl Strategy<Value = Vec<Op>> {
            prop::collection::vec(
                prop_oneof![
                    3 => (0..NAMES.len(), 0i32..4).prop_map(|(n, p)| Op::Register(n, p)),
                    1 => (0..NAMES.len()).prop_map(Op::Unregister),
                ],
                0..40,
            )
        }

        proptest! {
            #[test]
            fn listing_matches_priority_then_last_registration(ops in op_strategy()) {
                let (registry, _) = registry();
                // name -> (priority, index of its last registration)
                let mut model: Vec<(&str, i32, usize)> = Vec::new();

                for (index, op) in ops.into_iter().enumerate() {
                    match op {
                        Op::Register(n, priority) => {
                            registry.register(def(Scope::Global, NAMES[n], priority));
                            model.retain(|(name, _, _)| *name != NAMES[n]);
                            model.push((NAMES[n], priority, index));
                        }
                        Op::Unregister(n) => {
                            let existed = model.iter().any(|(name, _, _)| *name == NAMES[n]);
                            prop_assert_eq!(registry.unregister(Scope::Global, NAMES[n]), existed);
                            model.retain(|(name, _, _)| *name != NAMES[n]);
                        }
                    }

                    let mut expected = model.clone();
                    expected.sort_by_key(|(_, priority, index)| (*priority, *index));
                    let expected: Vec<String> =
                        expected.iter().map(|(name, _, _)| name.to_string()).collect();
                    prop_assert_eq!(registry.list_names(Scope::Global), expected);
                }
            }
        }
    }
}
