//! Pipeline stages and fatal errors

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::core::trail::Trail;
use crate::sheet::SheetError;

/// Stages of a limits run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    LoadInputs,
    FilterRows,
    Reshape,
    Statistics,
    DeriveLimits,
    ResolveVendorSpecs,
    Emit,
    SyncReference,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::LoadInputs => "load-inputs",
            Stage::FilterRows => "filter-rows",
            Stage::Reshape => "reshape",
            Stage::Statistics => "statistics",
            Stage::DeriveLimits => "derive-limits",
            Stage::ResolveVendorSpecs => "resolve-vendor-specs",
            Stage::Emit => "emit",
            Stage::SyncReference => "sync-reference",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fatal errors; a run that returns one produced no result table
#[derive(Debug, Error, Diagnostic)]
pub enum LimitsError {
    #[error("[{stage}] required input missing: {what}")]
    #[diagnostic(
        code(netlimits::input_missing),
        help("Check the file paths passed on the command line or in netlimits.yaml")
    )]
    InputMissing { stage: Stage, what: String },

    #[error("[{stage}] no usable data: {reason}")]
    #[diagnostic(
        code(netlimits::empty_input),
        help("Check the grid layout offsets and the discriminator value")
    )]
    EmptyInput { stage: Stage, reason: String },

    #[error("[{stage}] malformed input: {message}")]
    #[diagnostic(code(netlimits::malformed))]
    Malformed { stage: Stage, message: String },

    #[error("[{stage}] {source}")]
    #[diagnostic(code(netlimits::io))]
    Io {
        stage: Stage,
        #[source]
        source: std::io::Error,
    },
}

impl LimitsError {
    pub fn stage(&self) -> Stage {
        match self {
            LimitsError::InputMissing { stage, .. }
            | LimitsError::EmptyInput { stage, .. }
            | LimitsError::Malformed { stage, .. }
            | LimitsError::Io { stage, .. } => *stage,
        }
    }

    /// Attach a pipeline stage to a sheet error
    pub fn from_sheet(stage: Stage, err: SheetError) -> Self {
        match err {
            SheetError::NotFound { path } => LimitsError::InputMissing {
                stage,
                what: format!("file not found: {}", path.display()),
            },
            SheetError::Csv { path, source } => LimitsError::Malformed {
                stage,
                message: format!("{}: {}", path.display(), source),
            },
            SheetError::Io { source, .. } => LimitsError::Io { stage, source },
        }
    }
}

/// A fatal error with the trail recorded by the stages that ran before it
#[derive(Debug, Error, Diagnostic)]
#[error("{error}")]
#[diagnostic(forward(error))]
pub struct PipelineFailure {
    pub error: LimitsError,
    pub trail: Trail,
}

impl PipelineFailure {
    pub fn new(error: LimitsError, trail: Trail) -> Self {
        Self { error, trail }
    }

    pub fn stage(&self) -> Stage {
        self.error.stage()
    }
}

impl From<LimitsError> for PipelineFailure {
    fn from(error: LimitsError) -> Self {
        Self::new(error, Trail::new())
    }
}
