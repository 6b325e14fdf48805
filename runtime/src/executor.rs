//! Executor - runs one outpost against one navigation
//!
//! Loads lazy handlers, races the handler against its timeout, normalizes
//! the reply and applies the error and timeout policies. Whatever happens,
//! the caller gets an [`Outcome`]; failures never escape as errors.

use futures_util::FutureExt;
use outpost_core::{
    ErrorPolicy, NavContext, Outcome, Outpost, ReportKind, Reporter, TimeoutPolicy, UnitError,
};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

#[derive(Clone)]
pub struct Executor {
    default_timeout: Option<Duration>,
    on_error: Option<Arc<dyn ErrorPolicy>>,
    on_timeout: Option<Arc<dyn TimeoutPolicy>>,
    reporter: Reporter,
}

impl Executor {
    pub fn new(reporter: Reporter) -> Self {
        Self {
            default_timeout: None,
            on_error: None,
            on_timeout: None,
            reporter,
        }
    }

    pub fn with_default_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn with_error_policy(mut self, policy: Option<Arc<dyn ErrorPolicy>>) -> Self {
        self.on_error = policy;
        self
    }

    pub fn with_timeout_policy(mut self, policy: Option<Arc<dyn TimeoutPolicy>>) -> Self {
        self.on_timeout = policy;
        self
    }

    /// The timeout in effect for `outpost`: its own, else the default.
    pub fn timeout_for(&self, outpost: &Outpost) -> Option<Duration> {
        outpost.timeout().or(self.default_timeout)
    }

    pub async fn execute(&self, outpost: &Outpost, ctx: &NavContext) -> Outcome {
        let handler = match outpost.handler().await {
            Ok(handler) => handler,
            Err(err) => return self.recover_error(outpost, err, ctx).await,
        };

        let result = match self.timeout_for(outpost) {
            None => AssertUnwindSafe(handler.decide(ctx.clone()))
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| Err(UnitError::Panicked(panic_message(&*panic)))),
            Some(limit) => {
                // Spawned so that a timed-out handler keeps running detached
                // instead of being dropped mid-flight.
                let task_ctx = ctx.clone();
                let task = tokio::spawn(
                    async move { handler.decide(task_ctx).await }.in_current_span(),
                );
                match tokio::time::timeout(limit, task).await {
                    Ok(Ok(result)) => result,
                    Ok(Err(join_err)) => Err(UnitError::Panicked(join_err.to_string())),
                    Err(_) => return self.recover_timeout(outpost, limit, ctx).await,
                }
            }
        };

        match result {
            Ok(reply) => Outcome::normalize(reply),
            Err(err) => self.recover_error(outpost, err, ctx).await,
        }
    }

    async fn recover_error(&self, outpost: &Outpost, err: UnitError, ctx: &NavContext) -> Outcome {
        self.reporter.error(
            ReportKind::ExecutionFailed,
            Some(outpost.name()),
            format!(
                "outpost `{}` failed during {}: {err}",
                outpost.name(),
                ctx.phase
            ),
        );

        if let Some(policy) = &self.on_error {
            match policy.on_error(&err, ctx).await {
                Ok(reply) => match Outcome::recognize(reply) {
                    Some(outcome) => return outcome,
                    None => self.reporter.error(
                        ReportKind::ExecutionFailed,
                        Some(outpost.name()),
                        "error policy returned an unrecognized reply, stopping",
                    ),
                },
                Err(policy_err) => self.reporter.error(
                    ReportKind::ExecutionFailed,
                    Some(outpost.name()),
                    format!("error policy failed: {policy_err}, stopping"),
                ),
            }
        }
        Outcome::Stop
    }

    async fn recover_timeout(&self, outpost: &Outpost, limit: Duration, ctx: &NavContext) -> Outcome {
        self.reporter.warn(
            ReportKind::Timeout,
            Some(outpost.name()),
            format!(
                "outpost `{}` timed out after {}ms during {}",
                outpost.name(),
                limit.as_millis(),
                ctx.phase
            ),
        );

        if let Some(policy) = &self.on_timeout {
            match policy.on_timeout(outpost.name(), ctx).await {
                Ok(reply) => match Outcome::recognize(reply) {
                    Some(outcome) => return outcome,
                    None => self.reporter.error(
                        ReportKind::Timeout,
                        Some(outpost.name()),
                        "timeout policy returned an unrecognized reply, stopping",
                    ),
                },
                Err(policy_err) => self.reporter.error(
                    ReportKind::Timeout,
                    Some(outpost.name()),
                    format!("timeout policy failed: {policy_err}, stopping"),
                ),
            }
        }
        Outcome::Stop
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("default_timeout", &self.default_timeout)
            .field("on_error", &self.on_error.is_some())
            .field("on_timeout", &self.on_timeout.is_some())
            .finish()
    }
}
