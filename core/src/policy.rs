//! Custom recovery policies for failed and timed-out outposts.
//!
//! A policy answers with a [`Reply`] that is normalized like a handler's.
//! When the answer is an error or is not recognized, the executor falls back
//! to its default policy: stop, and report.

use crate::context::NavContext;
use crate::error::UnitError;
use crate::handler::HandlerResult;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait ErrorPolicy: Send + Sync + 'static {
    async fn on_error(&self, error: &UnitError, ctx: &NavContext) -> HandlerResult;
}

#[async_trait]
pub trait TimeoutPolicy: Send + Sync + 'static {
    async fn on_timeout(&self, outpost: &str, ctx: &NavContext) -> HandlerResult;
}

struct ClosureErrorPolicy<F> {
    policy_fn: F,
}

#[async_trait]
impl<F> ErrorPolicy for ClosureErrorPolicy<F>
where
    F: Fn(&UnitError, &NavContext) -> HandlerResult + Send + Sync + 'static,
{
    async fn on_error(&self, error: &UnitError, ctx: &NavContext) -> HandlerResult {
        (self.policy_fn)(error, ctx)
    }
}

/// Build an error policy from a synchronous closure.
pub fn error_policy_fn<F>(policy_fn: F) -> Arc<dyn ErrorPolicy>
where
    F: Fn(&UnitError, &NavContext) -> HandlerResult + Send + Sync + 'static,
{
    Arc::new(ClosureErrorPolicy { policy_fn })
}

struct ClosureTimeoutPolicy<F> {
    policy_fn: F,
}

#[async_trait]
impl<F> TimeoutPolicy for ClosureTimeoutPolicy<F>
where
    F: Fn(&str, &NavContext) -> HandlerResult + Send + Sync + 'static,
{
    async fn on_timeout(&self, outpost: &str, ctx: &NavContext) -> HandlerResult {
        (self.policy_fn)(outpost, ctx)
    }
}

/// Build a timeout policy from a synchronous closure.
pub fn timeout_policy_fn<F>(policy_fn: F) -> Arc<dyn TimeoutPolicy>
where
    F: Fn(&str, &NavContext) -> HandlerResult + Send + Sync + 'static,
{
    Arc::new(ClosureTimeoutPolicy { policy_fn })
}
