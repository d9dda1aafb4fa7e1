//! Report returned by a limits run

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::reshape::ReshapeSummary;
use crate::core::trail::{Trail, TrailEntry};
use crate::entities::net::{NetStatistics, ResultRecord, ResultRow};

/// Outcome of the reference write-back
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub path: PathBuf,
    /// Rows written; 0 when the write failed
    pub updated_rows: usize,
    pub succeeded: bool,
}

/// Everything a run produced, in NET order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    /// Samples per set read from the reference sheet
    pub samples_per_set: usize,
    pub summary: ReshapeSummary,
    pub statistics: Vec<NetStatistics>,
    pub rows: Vec<ResultRow>,
    /// Internal pair per NET for the reference write-back
    pub internal_pairs: Vec<Option<(i64, i64)>>,
    /// SHA-256 over the grid, reference and vendor inputs
    pub input_digest: String,
    pub trail: Trail,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync: Option<SyncOutcome>,
}

impl PipelineReport {
    pub fn records(&self) -> Vec<ResultRecord> {
        self.rows.iter().map(ResultRow::to_record).collect()
    }

    pub fn warnings(&self) -> Vec<&TrailEntry> {
        self.trail.warnings().collect()
    }

    pub fn net_count(&self) -> usize {
        self.rows.len()
    }
}
