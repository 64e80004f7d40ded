//! Provisioning scripts.
//!
//! Each script validates its input up front (returning `InvalidInput` before
//! anything is written), then performs its steps against an `Inventory`
//! while collecting a user-facing log. A failure after the first write is
//! recorded in the log instead of being returned, so the caller always sees
//! what was already created.

pub mod provision;
pub mod vlans;

use serde::Serialize;
use std::fmt;

use crate::importer::ImportReport;

pub use provision::{deploy_site, new_branch};
pub use vlans::{create_vlans, import_vlans};

pub const NEW_BRANCH: &str = "new_branch";
pub const DEPLOY_SITE: &str = "deploy_site";
pub const CREATE_VLANS: &str = "create_vlans";
pub const IMPORT_VLANS: &str = "import_vlans";

/// Script input rejected before any record was written
#[derive(Debug)]
pub struct InvalidInput(pub String);

impl fmt::Display for InvalidInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for InvalidInput {}

/// Shorthand for an `InvalidInput` wrapped in `anyhow::Error`
pub(crate) fn invalid(msg: impl Into<String>) -> anyhow::Error {
    InvalidInput(msg.into()).into()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Warning, message)
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Failure, message)
    }
}

/// Collects a script's log and mirrors each entry to tracing
pub struct ScriptLog {
    script: &'static str,
    entries: Vec<LogEntry>,
}

impl ScriptLog {
    pub fn new(script: &'static str) -> Self {
        Self {
            script,
            entries: Vec::new(),
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(LogEntry::new(LogLevel::Info, message));
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(LogEntry::success(message));
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(LogEntry::warning(message));
    }

    pub fn failure(&mut self, message: impl Into<String>) {
        self.push(LogEntry::failure(message));
    }

    fn push(&mut self, entry: LogEntry) {
        match entry.level {
            LogLevel::Info | LogLevel::Success => {
                tracing::info!(script = self.script, "{}", entry.message)
            }
            LogLevel::Warning => tracing::warn!(script = self.script, "{}", entry.message),
            LogLevel::Failure => tracing::error!(script = self.script, "{}", entry.message),
        }
        self.entries.push(entry);
    }

    /// Append entries that were already traced elsewhere (e.g. import rows)
    pub fn extend(&mut self, entries: Vec<LogEntry>) {
        self.entries.extend(entries);
    }

    pub fn has_failures(&self) -> bool {
        self.entries.iter().any(|e| e.level == LogLevel::Failure)
    }

    pub fn finish(self, output: Option<String>, report: Option<ImportReport>) -> ScriptOutput {
        ScriptOutput {
            script: self.script,
            success: !self.has_failures(),
            log: self.entries,
            output,
            report,
        }
    }
}

/// What a script run returns to the caller
#[derive(Debug, Clone, Serialize)]
pub struct ScriptOutput {
    pub script: &'static str,
    pub success: bool,
    pub log: Vec<LogEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ImportReport>,
}
