//! Diagnostic trail returned alongside every report
//!
//! Recoverable conditions never abort a run. They are recorded here and
//! echoed to the tracing subscriber as they happen.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::error::Stage;

/// Kind of a trail entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailKind {
    /// Progress note
    Info,
    /// Grid rows not divisible by the samples-per-set count
    ShapeMismatch,
    /// A NET has no numeric samples
    EmptySample,
    /// Vendor key not found (or no vendor sheet)
    LookupMiss,
    /// The reference write-back failed
    ExternalWriteFailure,
}

impl TrailKind {
    pub fn is_warning(&self) -> bool {
        !matches!(self, TrailKind::Info)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailEntry {
    pub stage: Stage,
    pub kind: TrailKind,
    /// 0-based NET index the entry concerns, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net: Option<usize>,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trail {
    entries: Vec<TrailEntry>,
}

impl Trail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, stage: Stage, message: impl Into<String>) {
        let message = message.into();
        info!(stage = %stage, "{}", message);
        self.entries.push(TrailEntry {
            stage,
            kind: TrailKind::Info,
            net: None,
            message,
        });
    }

    pub fn warn(
        &mut self,
        stage: Stage,
        kind: TrailKind,
        net: Option<usize>,
        message: impl Into<String>,
    ) {
        let message = message.into();
        warn!(stage = %stage, kind = ?kind, net = ?net, "{}", message);
        self.entries.push(TrailEntry {
            stage,
            kind,
            net,
            message,
        });
    }

    pub fn entries(&self) -> &[TrailEntry] {
        &self.entries
    }

    pub fn warnings(&self) -> impl Iterator<Item = &TrailEntry> {
        self.entries.iter().filter(|e| e.kind.is_warning())
    }

    pub fn count(&self, kind: TrailKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
