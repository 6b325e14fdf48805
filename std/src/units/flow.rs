use async_trait::async_trait;
use outpost_core::{Handler, HandlerResult, NavContext};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Sleeps, then continues. Useful for exercising timeouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelayOutpost {
    pub duration_ms: u64,
}

impl DelayOutpost {
    pub fn new(duration_ms: u64) -> Self {
        Self { duration_ms }
    }
}

#[async_trait]
impl Handler for DelayOutpost {
    async fn decide(&self, ctx: NavContext) -> HandlerResult {
        tokio::time::sleep(Duration::from_millis(self.duration_ms)).await;
        Ok(ctx.next())
    }
}
