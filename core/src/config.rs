//! Engine configuration.
//!
//! [`Settings`] holds the plain, serializable knobs and can be layered from
//! a TOML document, a key-value store and the environment.
//! [`EngineConfig`] adds the programmatic parts: initial outposts, recovery
//! policies, the debug hook and the report sink.

use crate::error::SettingsError;
use crate::outcome::Outcome;
use crate::outpost::{DEFAULT_PRIORITY, OutpostDef};
use crate::phase::Phase;
use crate::policy::{ErrorPolicy, TimeoutPolicy};
use crate::report::{ReportSink, Reporter, TracingSink};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

pub const ENV_PREFIX: &str = "OUTPOST_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Priority given to definitions that do not set one.
    pub default_priority: i32,
    /// Pipeline-wide timeout; `None` means outposts may run forever.
    pub default_timeout_ms: Option<u64>,
    /// Deliver informational reports (registration, processing).
    pub log: bool,
    /// Invoke the debug hook around every outpost execution.
    pub debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_priority: DEFAULT_PRIORITY,
            default_timeout_ms: None,
            log: false,
            debug: false,
        }
    }
}

impl Settings {
    pub fn from_toml_str(src: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(src)?)
    }

    pub fn default_timeout(&self) -> Option<Duration> {
        self.default_timeout_ms.map(Duration::from_millis)
    }

    /// Apply key-value overrides (`default_priority`, `default_timeout_ms`,
    /// `log`, `debug`). Unknown keys are ignored.
    ///
    /// An empty or `none` timeout value clears the default timeout.
    pub fn apply_overrides<I, K, V>(&mut self, pairs: I) -> Result<(), SettingsError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in pairs {
            let key = key.as_ref().trim().to_ascii_lowercase();
            let raw = value.as_ref().trim();
            let invalid = || SettingsError::InvalidValue {
                key: key.clone(),
                value: raw.to_string(),
            };
            match key.as_str() {
                "default_priority" => {
                    self.default_priority = raw.parse().map_err(|_| invalid())?;
                }
                "default_timeout_ms" => {
                    self.default_timeout_ms = match raw {
                        "" | "none" => None,
                        ms => Some(ms.parse().map_err(|_| invalid())?),
                    };
                }
                "log" => self.log = parse_flag(raw).ok_or_else(invalid)?,
                "debug" => self.debug = parse_flag(raw).ok_or_else(invalid)?,
                _ => {}
            }
        }
        Ok(())
    }

    /// Defaults overridden by `OUTPOST_*` environment variables.
    pub fn from_env() -> Result<Self, SettingsError> {
        let mut settings = Self::default();
        settings.apply_env()?;
        Ok(settings)
    }

    pub fn apply_env(&mut self) -> Result<(), SettingsError> {
        let pairs = std::env::vars().filter_map(|(key, value)| {
            key.strip_prefix(ENV_PREFIX)
                .map(|rest| (rest.to_ascii_lowercase(), value))
        });
        self.apply_overrides(pairs)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Where the debug hook was triggered.
#[derive(Debug, Clone, PartialEq)]
pub enum DebugStage {
    BeforeRun,
    AfterRun(Outcome),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DebugEvent {
    pub phase: Phase,
    pub outpost: String,
    pub stage: DebugStage,
}

pub type DebugHook = Arc<dyn Fn(&DebugEvent) + Send + Sync>;

/// Everything the engine is constructed with.
#[derive(Clone)]
pub struct EngineConfig {
    pub settings: Settings,
    pub outposts: Vec<OutpostDef>,
    pub on_error: Option<Arc<dyn ErrorPolicy>>,
    pub on_timeout: Option<Arc<dyn TimeoutPolicy>>,
    pub debug_hook: Option<DebugHook>,
    pub sink: Arc<dyn ReportSink>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            settings: Settings::default(),
            outposts: Vec::new(),
            on_error: None,
            on_timeout: None,
            debug_hook: None,
            sink: Arc::new(TracingSink),
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn outpost(mut self, def: OutpostDef) -> Self {
        self.outposts.push(def);
        self
    }

    pub fn outposts<I>(mut self, defs: I) -> Self
    where
        I: IntoIterator<Item = OutpostDef>,
    {
        self.outposts.extend(defs);
        self
    }

    pub fn default_priority(mut self, priority: i32) -> Self {
        self.settings.default_priority = priority;
        self
    }

    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        let millis = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self.settings.default_timeout_ms = Some(millis);
        self
    }

    pub fn on_error(mut self, policy: Arc<dyn ErrorPolicy>) -> Self {
        self.on_error = Some(policy);
        self
    }

    pub fn on_timeout(mut self, policy: Arc<dyn TimeoutPolicy>) -> Self {
        self.on_timeout = Some(policy);
        self
    }

    pub fn log(mut self, enabled: bool) -> Self {
        self.settings.log = enabled;
        self
    }

    /// Install a debug hook and turn debugging on.
    pub fn debug_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&DebugEvent) + Send + Sync + 'static,
    {
        self.debug_hook = Some(Arc::new(hook));
        self.settings.debug = true;
        self
    }

    pub fn sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn reporter(&self) -> Reporter {
        Reporter::new(self.settings.log, Arc::clone(&self.sink))
    }

    /// The hook to call, if debugging is on.
    pub fn active_debug_hook(&self) -> Option<DebugHook> {
        if self.settings.debug {
            self.debug_hook.clone()
        } else {
            None
        }
    }
}

impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfig")
            .field("settings", &self.settings)
            .field("outposts", &self.outposts)
            .field("on_error", &self.on_error.is_some())
            .field("on_timeout", &self.on_timeout.is_some())
            .field("debug_hook", &self.debug_hook.is_some())
            .finish()
    }
}
