//! User-facing reports and command errors

use std::fmt;

use rigkit_core::{SceneError, SkeletonError};
use serde::{Deserialize, Serialize};

/// Severity of a status message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportLevel {
    Info,
    Warning,
    Error,
}

impl ReportLevel {
    pub fn label(&self) -> &'static str {
        match self {
            ReportLevel::Info => "INFO",
            ReportLevel::Warning => "WARNING",
            ReportLevel::Error => "ERROR",
        }
    }
}

/// A status message shown to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub level: ReportLevel,
    pub message: String,
}

impl Report {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: ReportLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: ReportLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: ReportLevel::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level.label(), self.message)
    }
}

/// Result of a command that ran to completion
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandOutcome {
    pub reports: Vec<Report>,
}

impl CommandOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outcome with a single info message
    pub fn with_info(message: impl Into<String>) -> Self {
        let mut outcome = Self::new();
        outcome.info(message);
        outcome
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.reports.push(Report::info(message));
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.reports.push(Report::warning(message));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.reports.push(Report::error(message));
    }

    pub fn has_errors(&self) -> bool {
        self.reports.iter().any(|r| r.level == ReportLevel::Error)
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.reports.iter().map(|r| r.message.as_str())
    }
}

/// Why a command refused to run; nothing was changed
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    /// Wrong active object, mode or selection
    #[error("{0}")]
    Precondition(String),
    /// Same as `Precondition` but shown as a warning
    #[error("{0}")]
    Refused(String),
    #[error("Selected bones do not form a direct parent-child chain.")]
    NotALineage,
    #[error("Selected bone has zero length; cannot determine direction.")]
    ZeroLengthJoint,
    #[error("Selected faces have zero total area")]
    ZeroAreaSelection,
    #[error("Range start and end cannot be the same")]
    ZeroWidthRange,
    #[error(transparent)]
    Scene(#[from] SceneError),
}

impl CommandError {
    pub fn precondition(message: impl Into<String>) -> Self {
        CommandError::Precondition(message.into())
    }

    pub fn refused(message: impl Into<String>) -> Self {
        CommandError::Refused(message.into())
    }

    /// The report a host shows for this failure
    pub fn report(&self) -> Report {
        match self {
            CommandError::Refused(message) => Report::warning(message.clone()),
            other => Report::error(other.to_string()),
        }
    }
}

impl From<SkeletonError> for CommandError {
    fn from(e: SkeletonError) -> Self {
        CommandError::Scene(SceneError::Skeleton(e))
    }
}
