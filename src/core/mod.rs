//! Core module - layouts, statistics, limits and the pipeline

pub mod config;
pub mod error;
pub mod formula;
pub mod layout;
pub mod limits;
pub mod pipeline;
pub mod reference;
pub mod reshape;
pub mod stats;
pub mod trail;
pub mod vendor;

pub use config::{Config, ConfigError};
pub use error::{LimitsError, PipelineFailure, Stage};
pub use formula::{column_letter, JudgementFormulas, StatFormulas, StatSheetRows};
pub use layout::{GridLayout, ReferenceLayout, VendorLayout};
pub use limits::LimitResult;
pub use pipeline::{LimitsPipeline, LoadedInputs, PipelineInputs};
pub use reference::{ReferenceSheet, ReferenceSync};
pub use reshape::{reshape, MeasurementGrid, ReshapeSummary, Reshaped};
pub use stats::StatisticsResult;
pub use trail::{Trail, TrailEntry, TrailKind};
pub use vendor::{VendorSpecEntry, VendorSpecs};
