use async_trait::async_trait;
use outpost_core::{Handler, HandlerResult, NavContext, RouteLocation};
use std::sync::Arc;

/// Aborts the navigation unless the predicate holds.
pub struct FilterOutpost<F> {
    pub predicate: Arc<F>,
}

impl<F> FilterOutpost<F>
where
    F: Fn(&NavContext) -> bool + Send + Sync + 'static,
{
    pub fn new(predicate: F) -> Self {
        Self {
            predicate: Arc::new(predicate),
        }
    }
}

impl<F> Clone for FilterOutpost<F> {
    fn clone(&self) -> Self {
        Self {
            predicate: self.predicate.clone(),
        }
    }
}

impl<F> std::fmt::Debug for FilterOutpost<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterOutpost").finish()
    }
}

#[async_trait]
impl<F> Handler for FilterOutpost<F>
where
    F: Fn(&NavContext) -> bool + Send + Sync + 'static,
{
    async fn decide(&self, ctx: NavContext) -> HandlerResult {
        if (self.predicate)(&ctx) {
            Ok(ctx.next())
        } else {
            Ok(ctx.abort())
        }
    }
}

/// Redirects to `target` unless the predicate holds.
pub struct RedirectUnless<F> {
    pub target: RouteLocation,
    pub predicate: Arc<F>,
}

impl<F> RedirectUnless<F>
where
    F: Fn(&NavContext) -> bool + Send + Sync + 'static,
{
    pub fn new(target: impl Into<RouteLocation>, predicate: F) -> Self {
        Self {
            target: target.into(),
            predicate: Arc::new(predicate),
        }
    }
}

impl<F> Clone for RedirectUnless<F> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
            predicate: self.predicate.clone(),
        }
    }
}

impl<F> std::fmt::Debug for RedirectUnless<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedirectUnless")
            .field("target", &self.target)
            .finish()
    }
}

#[async_trait]
impl<F> Handler for RedirectUnless<F>
where
    F: Fn(&NavContext) -> bool + Send + Sync + 'static,
{
    async fn decide(&self, ctx: NavContext) -> HandlerResult {
        if (self.predicate)(&ctx) {
            Ok(ctx.next())
        } else {
            Ok(ctx.redirect(self.target.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use outpost_core::{Outcome, Phase, Route};

    fn ctx(path: &str) -> NavContext {
        NavContext::new(
            Phase::BeforeNavigate,
            Arc::new(Route::new(path)),
            Arc::new(Route::start()),
        )
    }

    #[tokio::test]
    async fn filter_aborts_when_predicate_fails() {
        let unit = FilterOutpost::new(|ctx: &NavContext| !ctx.to.path.starts_with("/admin"));
        let open = unit.decide(ctx("/home")).await.unwrap();
        let closed = unit.decide(ctx("/admin")).await.unwrap();
        assert_eq!(Outcome::normalize(open), Outcome::Continue);
        assert_eq!(Outcome::normalize(closed), Outcome::Stop);
    }

    #[tokio::test]
    async fn redirect_unless_sends_to_target() {
        let unit = RedirectUnless::new(RouteLocation::named("login"), |ctx: &NavContext| {
            ctx.to.query.contains_key("token")
        });
        let reply = unit.decide(ctx("/account")).await.unwrap();
        assert_eq!(
            Outcome::normalize(reply),
            Outcome::Redirect(RouteLocation::named("login"))
        );
    }
}
