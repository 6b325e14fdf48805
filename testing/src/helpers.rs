//! Ready-made handlers and loaders for tests.

use outpost_core::{
    Handler, Loader, NavContext, Reply, RouteLocation, UnitError, handler_fn, loader_fn,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Shared record of which outposts ran, in order.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, name: impl Into<String>) {
        self.calls.lock().push(name.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.lock().is_empty()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

/// Records `name` in `log`, then answers `reply`.
pub fn recording(log: &CallLog, name: &str, reply: Reply) -> Arc<dyn Handler> {
    let log = log.clone();
    let name = name.to_string();
    handler_fn(move |_ctx: NavContext| {
        log.push(name.clone());
        let reply = reply.clone();
        async move { Ok(reply) }
    })
}

pub fn allow() -> Arc<dyn Handler> {
    handler_fn(|ctx: NavContext| async move { Ok(ctx.next()) })
}

pub fn deny() -> Arc<dyn Handler> {
    handler_fn(|ctx: NavContext| async move { Ok(ctx.abort()) })
}

pub fn redirect(target: impl Into<RouteLocation>) -> Arc<dyn Handler> {
    let target = target.into();
    handler_fn(move |ctx: NavContext| {
        let target = target.clone();
        async move { Ok(ctx.redirect(target)) }
    })
}

pub fn failing(message: &str) -> Arc<dyn Handler> {
    let message = message.to_string();
    handler_fn(move |_ctx: NavContext| {
        let message = message.clone();
        async move { Err(UnitError::failed(message)) }
    })
}

/// Sleeps for `delay` before answering `reply`.
pub fn slow(delay: Duration, reply: Reply) -> Arc<dyn Handler> {
    handler_fn(move |_ctx: NavContext| {
        let reply = reply.clone();
        async move {
            tokio::time::sleep(delay).await;
            Ok(reply)
        }
    })
}

/// A loader that counts its invocations and hands out `handler`.
pub fn counting_loader(counter: Arc<AtomicUsize>, handler: Arc<dyn Handler>) -> Arc<dyn Loader> {
    loader_fn(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        let handler = Arc::clone(&handler);
        async move { Ok(handler) }
    })
}

/// A loader that always fails.
pub fn broken_loader(message: &str) -> Arc<dyn Loader> {
    let message = message.to_string();
    loader_fn(move || {
        let message = message.clone();
        async move { Err(UnitError::load(message)) }
    })
}
