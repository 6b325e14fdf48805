//! Handler and loader contracts.
//!
//! A handler is the decision logic of an outpost. A loader produces a
//! handler on first use for outposts declared lazy.

use crate::context::NavContext;
use crate::error::UnitError;
use crate::outcome::Reply;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

pub type HandlerResult = Result<Reply, UnitError>;

/// The decision logic of one outpost.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn decide(&self, ctx: NavContext) -> HandlerResult;
}

/// Resolves a lazy outpost's handler.
#[async_trait]
pub trait Loader: Send + Sync + 'static {
    async fn load(&self) -> Result<Arc<dyn Handler>, UnitError>;
}

/// Handler implementation using a closure.
pub struct FnHandler<F> {
    decide_fn: F,
}

#[async_trait]
impl<F, Fut> Handler for FnHandler<F>
where
    F: Fn(NavContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    async fn decide(&self, ctx: NavContext) -> HandlerResult {
        (self.decide_fn)(ctx).await
    }
}

/// Wrap an async closure as a handler.
///
/// ```rust,ignore
/// let auth = handler_fn(|ctx: NavContext| async move {
///     if ctx.to.query.contains_key("token") { Ok(ctx.next()) } else { Ok(ctx.redirect_to("login")) }
/// });
/// ```
pub fn handler_fn<F, Fut>(decide_fn: F) -> Arc<dyn Handler>
where
    F: Fn(NavContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(FnHandler { decide_fn })
}

/// Loader implementation using a closure.
pub struct FnLoader<F> {
    load_fn: F,
}

#[async_trait]
impl<F, Fut> Loader for FnLoader<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Arc<dyn Handler>, UnitError>> + Send + 'static,
{
    async fn load(&self) -> Result<Arc<dyn Handler>, UnitError> {
        (self.load_fn)().await
    }
}

/// Wrap an async closure as a loader.
pub fn loader_fn<F, Fut>(load_fn: F) -> Arc<dyn Loader>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Arc<dyn Handler>, UnitError>> + Send + 'static,
{
    Arc::new(FnLoader { load_fn })
}
