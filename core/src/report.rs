//! # Report: the error-reporting channel
//!
//! Every component reports through an explicit [`Reporter`] handed to it at
//! construction. Errors and warnings are critical and always delivered;
//! informational reports are delivered only when verbose logging is on.

use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    /// Critical reports bypass the verbosity gate.
    pub fn is_critical(&self) -> bool {
        !matches!(self, Severity::Info)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    /// Definition rejected (missing name or handler).
    InvalidDefinition,
    /// Stored, but excluded from execution (bad phases).
    InvalidConfig,
    DuplicateName,
    UnknownOutpost,
    UnknownRoute,
    NotAttached,
    ExecutionFailed,
    Timeout,
    /// Non-consumable phase produced a stop or redirect.
    IgnoredOutcome,
    TornDown,
    Registered,
    Removed,
    Attached,
    Detached,
    Processing,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub severity: Severity,
    pub kind: ReportKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outpost: Option<String>,
    pub message: String,
}

pub trait ReportSink: Send + Sync + 'static {
    fn emit(&self, report: &Report);
}

/// Forwards reports to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn emit(&self, report: &Report) {
        let outpost = report.outpost.as_deref().unwrap_or("-");
        match report.severity {
            Severity::Error => tracing::error!(
                outpost.name = %outpost,
                kind = ?report.kind,
                "{}",
                report.message
            ),
            Severity::Warning => tracing::warn!(
                outpost.name = %outpost,
                kind = ?report.kind,
                "{}",
                report.message
            ),
            Severity::Info => tracing::info!(
                outpost.name = %outpost,
                kind = ?report.kind,
                "{}",
                report.message
            ),
        }
    }
}

/// In-memory sink for inspection and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    reports: RwLock<Vec<Report>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<Report> {
        self.reports.read().clone()
    }

    pub fn len(&self) -> usize {
        self.reports.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.read().is_empty()
    }

    pub fn count(&self, kind: ReportKind) -> usize {
        self.reports.read().iter().filter(|r| r.kind == kind).count()
    }

    pub fn clear(&self) {
        self.reports.write().clear();
    }
}

impl ReportSink for MemorySink {
    fn emit(&self, report: &Report) {
        self.reports.write().push(report.clone());
    }
}

/// Severity-aware front of a [`ReportSink`].
#[derive(Clone)]
pub struct Reporter {
    verbose: bool,
    sink: Arc<dyn ReportSink>,
}

impl Reporter {
    pub fn new(verbose: bool, sink: Arc<dyn ReportSink>) -> Self {
        Self { verbose, sink }
    }

    /// Tracing sink, informational reports off.
    pub fn quiet() -> Self {
        Self::new(false, Arc::new(TracingSink))
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn report(&self, report: Report) {
        if report.severity.is_critical() || self.verbose {
            self.sink.emit(&report);
        }
    }

    pub fn error(&self, kind: ReportKind, outpost: Option<&str>, message: impl Into<String>) {
        self.report(Report {
            severity: Severity::Error,
            kind,
            outpost: outpost.map(str::to_string),
            message: message.into(),
        });
    }

    pub fn warn(&self, kind: ReportKind, outpost: Option<&str>, message: impl Into<String>) {
        self.report(Report {
            severity: Severity::Warning,
            kind,
            outpost: outpost.map(str::to_string),
            message: message.into(),
        });
    }

    pub fn info(&self, kind: ReportKind, outpost: Option<&str>, message: impl Into<String>) {
        if !self.verbose {
            return;
        }
        self.report(Report {
            severity: Severity::Info,
            kind,
            outpost: outpost.map(str::to_string),
            message: message.into(),
        });
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::quiet()
    }
}

impl std::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter")
            .field("verbose", &self.verbose)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_is_gated_by_verbosity() {
        let sink = Arc::new(MemorySink::new());
        let quiet = Reporter::new(false, sink.clone());
        quiet.info(ReportKind::Registered, Some("auth"), "registered");
        quiet.warn(ReportKind::DuplicateName, Some("auth"), "overwritten");
        quiet.error(ReportKind::Timeout, Some("auth"), "timed out");
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.count(ReportKind::Registered), 0);

        let verbose = Reporter::new(true, sink.clone());
        verbose.info(ReportKind::Registered, Some("auth"), "registered");
        assert_eq!(sink.count(ReportKind::Registered), 1);
    }
}
