use async_trait::async_trait;
use outpost_core::{Handler, HandlerResult, NavContext};
use serde::{Deserialize, Serialize};

/// Logs every navigation it sees and lets it through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogOutpost {
    pub message: String,
    pub level: String,
}

impl LogOutpost {
    pub fn new(message: impl Into<String>, level: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: level.into(),
        }
    }
}

#[async_trait]
impl Handler for LogOutpost {
    async fn decide(&self, ctx: NavContext) -> HandlerResult {
        let (phase, from, to) = (ctx.phase, &ctx.from.path, &ctx.to.path);
        match self.level.as_str() {
            "error" => tracing::error!(%phase, %from, %to, "{}", self.message),
            "warn" => tracing::warn!(%phase, %from, %to, "{}", self.message),
            "debug" => tracing::debug!(%phase, %from, %to, "{}", self.message),
            _ => tracing::info!(%phase, %from, %to, "{}", self.message),
        }
        Ok(ctx.next())
    }
}
