use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::Domain;

#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub succeeded: Vec<ItemSuccess>,
    pub failed: Vec<ItemFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemSuccess {
    pub domain: Domain,
    pub subject: String,
    pub language: String,
    pub path: String,
    pub bytes: usize,
}

/// A work item or a whole subject that could not be cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub domain: Domain,
    pub subject: String,
    /// `None` when the subject failed before any language was attempted.
    pub language: Option<String>,
    pub kind: FailureKind,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    Remote,
    Write,
    Configuration,
}

impl GenerationReport {
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn finish(mut self) -> Self {
        self.finished_at = Some(Utc::now());
        self
    }

    pub fn merge(mut self, other: GenerationReport) -> Self {
        self.started_at = self.started_at.min(other.started_at);
        self.finished_at = match (self.finished_at, other.finished_at) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        self.succeeded.extend(other.succeeded);
        self.failed.extend(other.failed);
        self
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    pub fn succeeded_count(&self) -> usize {
        self.succeeded.len()
    }
}
