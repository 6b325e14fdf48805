//! # Pipeline: one phase of one navigation attempt
//!
//! The plan is the phase's global outposts in priority order followed by
//! the resolved route outposts in priority order. Scope beats priority: a
//! global outpost at priority 500 still runs before a route outpost at 1.
//!
//! Outposts run one at a time. The first `Stop` or `Redirect` ends the
//! pass; if every outpost continues the navigation is allowed.

use crate::attachments::AttachmentTable;
use crate::executor::Executor;
use crate::host::{HostRouter, HostSignal};
use crate::registry::Registry;
use outpost_core::{
    DebugEvent, DebugHook, DebugStage, NavContext, Outcome, Outpost, Phase, ReportKind, Reporter,
    RouteLocation, Scope,
};
use std::sync::Arc;
use tracing::Instrument;

/// Where a pipeline pass ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassState {
    Allowed,
    Blocked,
    Redirecting(RouteLocation),
}

impl PassState {
    pub fn outcome(&self) -> Outcome {
        match self {
            PassState::Allowed => Outcome::Continue,
            PassState::Blocked => Outcome::Stop,
            PassState::Redirecting(loc) => Outcome::Redirect(loc.clone()),
        }
    }
}

impl From<Outcome> for PassState {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Continue => PassState::Allowed,
            Outcome::Stop => PassState::Blocked,
            Outcome::Redirect(loc) => PassState::Redirecting(loc),
        }
    }
}

/// Result of one pipeline pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseResult {
    pub phase: Phase,
    pub state: PassState,
    /// Outposts that ran, in order.
    pub executed: Vec<String>,
    /// The outpost whose outcome ended the pass, if any.
    pub decided_by: Option<String>,
}

impl PhaseResult {
    fn allowed(phase: Phase) -> Self {
        Self {
            phase,
            state: PassState::Allowed,
            executed: Vec::new(),
            decided_by: None,
        }
    }

    /// What the host should do. Notification phases always proceed.
    pub fn signal(&self) -> HostSignal {
        if self.phase.is_consumable() {
            self.state.outcome().into()
        } else {
            HostSignal::Proceed
        }
    }
}

pub struct PipelineRunner {
    registry: Arc<Registry>,
    attachments: Arc<AttachmentTable>,
    router: Arc<dyn HostRouter>,
    executor: Executor,
    reporter: Reporter,
    debug_hook: Option<DebugHook>,
}

impl PipelineRunner {
    pub fn new(
        registry: Arc<Registry>,
        attachments: Arc<AttachmentTable>,
        router: Arc<dyn HostRouter>,
        executor: Executor,
        reporter: Reporter,
    ) -> Self {
        Self {
            registry,
            attachments,
            router,
            executor,
            reporter,
            debug_hook: None,
        }
    }

    pub fn with_debug_hook(mut self, hook: Option<DebugHook>) -> Self {
        self.debug_hook = hook;
        self
    }

    /// The ordered outposts that apply to `ctx`, read from the registry as
    /// it stands now. Unregistered route names are only reported when
    /// something is left to run.
    pub fn plan(&self, ctx: &NavContext) -> Vec<Arc<Outpost>> {
        let mut plan = self.registry.phase_outposts(Scope::Global, ctx.phase);
        let chain = self.router.matched(&ctx.to);
        if chain.is_empty() {
            return plan;
        }
        let names = self.attachments.resolve(&chain);
        if names.is_empty() {
            return plan;
        }
        let (picked, unknown) = self.registry.sort_named(Scope::Route, &names, ctx.phase);
        plan.extend(picked);
        if !plan.is_empty() {
            self.registry.report_unknown(Scope::Route, &unknown);
        }
        plan
    }

    pub async fn run(&self, ctx: NavContext) -> PhaseResult {
        let span = tracing::info_span!(
            "pipeline",
            outpost.phase = %ctx.phase,
            outpost.attempt = %ctx.attempt,
            outpost.to = %ctx.to.path,
        );
        self.run_inner(ctx).instrument(span).await
    }

    async fn run_inner(&self, ctx: NavContext) -> PhaseResult {
        let phase = ctx.phase;
        let plan = self.plan(&ctx);
        if plan.is_empty() {
            tracing::trace!("no outposts for this phase");
            return PhaseResult::allowed(phase);
        }

        tracing::debug!(outposts = plan.len(), "pipeline running");
        let mut result = PhaseResult::allowed(phase);

        for outpost in plan {
            let name = outpost.name().to_string();
            self.reporter.info(
                ReportKind::Processing,
                Some(&name),
                format!("processing {} outpost `{name}` ({phase})", outpost.scope()),
            );
            self.debug(phase, &name, DebugStage::BeforeRun);

            let outcome = self
                .executor
                .execute(&outpost, &ctx)
                .instrument(tracing::debug_span!(
                    "outpost",
                    outpost.name = %name,
                    outpost.scope = %outpost.scope(),
                    outpost.priority = outpost.priority(),
                ))
                .await;

            self.debug(phase, &name, DebugStage::AfterRun(outcome.clone()));
            result.executed.push(name.clone());

            if outcome.is_terminal() {
                tracing::debug!(outpost.name = %name, outcome = outcome.label(), "pipeline ended");
                if !phase.is_consumable() {
                    self.reporter.info(
                        ReportKind::IgnoredOutcome,
                        Some(&name),
                        format!(
                            "outpost `{name}` returned {} during {phase}; ignored",
                            outcome.label()
                        ),
                    );
                }
                result.state = outcome.into();
                result.decided_by = Some(name);
                return result;
            }
        }

        result
    }

    fn debug(&self, phase: Phase, outpost: &str, stage: DebugStage) {
        if let Some(hook) = &self.debug_hook {
            hook(&DebugEvent {
                phase,
                outpost: outpost.to_string(),
                stage,
            });
        }
    }
}

impl std::fmt::Debug for PipelineRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineRunner")
            .field("executor", &self.executor)
            .field("debug_hook", &self.debug_hook.is_some())
            .finish_non_exhaustive()
    }
}
