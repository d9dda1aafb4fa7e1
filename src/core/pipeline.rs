//! The limits pipeline
//!
//! Stages run in a fixed order: load inputs, filter rows, reshape, compute
//! per-NET statistics, derive limits, resolve vendor specs, emit. Fatal
//! conditions abort with a [`PipelineFailure`] naming the stage and holding
//! the trail recorded so far; everything else is recorded on the report's
//! trail. Writing back into the reference
//! file is a separate, explicit step ([`LimitsPipeline::sync_reference`]).

use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::core::config::Config;
use crate::core::error::{LimitsError, PipelineFailure, Stage};
use crate::core::limits::{apply_sentinel, LimitResult};
use crate::core::reference::{ReferenceSheet, ReferenceSync};
use crate::core::reshape::{reshape, MeasurementGrid, ReshapeSummary};
use crate::core::stats::StatisticsResult;
use crate::core::trail::{Trail, TrailKind};
use crate::core::vendor::VendorSpecs;
use crate::entities::{NetStatistics, PipelineReport, ResultRow, SyncOutcome};
use crate::sheet::{Sheet, SheetError};

/// File inputs of one run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineInputs {
    pub grid: PathBuf,
    pub reference: PathBuf,
    /// Optional; every lookup misses without it
    pub vendor: Option<PathBuf>,
}

/// Inputs already parsed into sheets
#[derive(Debug, Clone)]
pub struct LoadedInputs {
    pub grid: Sheet,
    pub reference: ReferenceSheet,
    pub vendor: VendorSpecs,
    /// Hex SHA-256 of the raw input bytes
    pub input_digest: String,
}

pub struct LimitsPipeline {
    config: Config,
}

impl LimitsPipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Read every input file and run all stages
    pub fn run(&self, inputs: &PipelineInputs) -> Result<PipelineReport, PipelineFailure> {
        let loaded = self.load(inputs)?;
        self.run_loaded(loaded)
    }

    /// LoadInputs: read the grid, reference and vendor sheets
    ///
    /// A missing grid or reference file is fatal. A missing vendor file is
    /// not. The digest covers the bytes of every file that was read.
    pub fn load(&self, inputs: &PipelineInputs) -> Result<LoadedInputs, LimitsError> {
        let mut hasher = Sha256::new();

        let grid_bytes = read_input(&inputs.grid, "grid")?;
        let grid = parse_sheet(&grid_bytes, &inputs.grid)?;
        hash_part(&mut hasher, &grid_bytes);

        let reference_bytes = read_input(&inputs.reference, "reference")?;
        let reference = ReferenceSheet::new(
            parse_sheet(&reference_bytes, &inputs.reference)?,
            self.config.reference.clone(),
        );
        hash_part(&mut hasher, &reference_bytes);

        let vendor = match &inputs.vendor {
            Some(path) if path.exists() => {
                let bytes = read_input(path, "vendor")?;
                hash_part(&mut hasher, &bytes);
                VendorSpecs::from_sheet(&parse_sheet(&bytes, path)?, &self.config.vendor)
            }
            _ => {
                hash_part(&mut hasher, &[]);
                VendorSpecs::default()
            }
        };

        Ok(LoadedInputs {
            grid,
            reference,
            vendor,
            input_digest: format!("{:x}", hasher.finalize()),
        })
    }

    /// Run every stage after LoadInputs on already parsed sheets
    pub fn run_loaded(&self, inputs: LoadedInputs) -> Result<PipelineReport, PipelineFailure> {
        let LoadedInputs {
            grid,
            reference,
            vendor,
            input_digest,
        } = inputs;
        let mut trail = Trail::new();

        let x = reference.samples_per_set();
        if x == 0 {
            let error = LimitsError::InputMissing {
                stage: Stage::LoadInputs,
                what: format!(
                    "samples-per-set count (no positive number in reference column {})",
                    crate::core::formula::column_letter(self.config.reference.x_col)
                ),
            };
            return Err(PipelineFailure::new(error, trail));
        }
        trail.info(
            Stage::LoadInputs,
            format!(
                "{} grid rows, {} samples per set, {} vendor entries",
                grid.row_count(),
                x,
                vendor.len()
            ),
        );

        // FilterRows
        let selection = MeasurementGrid::from_sheet(&grid, &self.config.grid);
        if selection.grid.is_empty() {
            let error = LimitsError::EmptyInput {
                stage: Stage::FilterRows,
                reason: format!(
                    "no data rows left after the filter ({} read, {} excluded)",
                    selection.data_rows, selection.excluded_rows
                ),
            };
            return Err(PipelineFailure::new(error, trail));
        }
        trail.info(
            Stage::FilterRows,
            format!(
                "kept {} of {} data rows",
                selection.grid.row_count(),
                selection.data_rows
            ),
        );
        let measurements = selection.grid;

        // Reshape
        let reshaped = reshape(&measurements, x);
        if reshaped.dropped_rows > 0 {
            trail.warn(
                Stage::Reshape,
                TrailKind::ShapeMismatch,
                None,
                format!(
                    "{} rows is not a multiple of {}; dropped {} trailing rows",
                    measurements.row_count(),
                    x,
                    reshaped.dropped_rows
                ),
            );
        }
        let summary = ReshapeSummary::new(&measurements, &reshaped, selection.excluded_rows);
        trail.info(
            Stage::Reshape,
            format!(
                "{} NETs x {} sets x {} pieces",
                summary.net_count, summary.sets_per_piece, summary.piece_count
            ),
        );

        // PerNetStatistics
        let statistics: Vec<NetStatistics> = reshaped
            .samples
            .iter()
            .enumerate()
            .map(|(net, samples)| {
                let stats = StatisticsResult::compute(samples);
                if stats.is_empty() {
                    trail.warn(
                        Stage::Statistics,
                        TrailKind::EmptySample,
                        Some(net),
                        format!("NET {} has no numeric samples", net + 1),
                    );
                } else {
                    debug!(
                        net = net + 1,
                        count = stats.count,
                        trimmed_mean = stats.trimmed_mean,
                        trimmed_stdev = stats.trimmed_stdev,
                        "statistics"
                    );
                }
                NetStatistics { net, stats }
            })
            .collect();

        // DeriveLimits
        let mut limits: Vec<Option<LimitResult>> = statistics
            .iter()
            .map(|s| LimitResult::from_statistics(&s.stats))
            .collect();
        apply_sentinel(&mut limits);
        trail.info(
            Stage::DeriveLimits,
            format!(
                "derived limits for {} of {} NETs",
                limits.iter().filter(|l| l.is_some()).count(),
                limits.len()
            ),
        );

        // ResolveVendorSpecs
        let mut rows = Vec::with_capacity(limits.len());
        for (net, limit) in limits.iter().enumerate() {
            let mut identity = reference.identity(net);
            if let Some((pin_a, pin_b)) = measurements.pins(net) {
                identity.pin_a = pin_a.clone();
                identity.pin_b = pin_b.clone();
            }

            let key = identity.vendor_key();
            let spec = key.as_deref().and_then(|k| vendor.get(k)).copied();
            if spec.is_none() {
                let message = match &key {
                    Some(k) if vendor.is_empty() => {
                        format!("no vendor sheet loaded for key {}", k)
                    }
                    Some(k) => format!("vendor key {} not found", k),
                    None => format!("NET {} has no BtoB/ACF pins to look up", net + 1),
                };
                trail.warn(
                    Stage::ResolveVendorSpecs,
                    TrailKind::LookupMiss,
                    Some(net),
                    message,
                );
            }

            rows.push(ResultRow::new(identity, vendor.resolve(key.as_deref()), *limit));
        }

        // Emit
        let internal_pairs: Vec<Option<(i64, i64)>> = limits
            .iter()
            .map(|l| l.map(|l| l.internal_pair()))
            .collect();
        trail.info(Stage::Emit, format!("{} result rows", rows.len()));

        Ok(PipelineReport {
            samples_per_set: x,
            summary,
            statistics,
            rows,
            internal_pairs,
            input_digest,
            trail,
            sync: None,
        })
    }

    /// Write the report's internal pairs into the reference file
    ///
    /// Failure is recorded on the report as an `ExternalWriteFailure`; the
    /// result rows stay valid either way.
    pub fn sync_reference(&self, report: &mut PipelineReport, path: &Path) {
        let sync = ReferenceSync::new(path, self.config.reference.clone());
        let outcome = match sync.apply(&report.internal_pairs) {
            Ok(updated_rows) => {
                report.trail.info(
                    Stage::SyncReference,
                    format!("wrote {} rows to {}", updated_rows, path.display()),
                );
                SyncOutcome {
                    path: path.to_path_buf(),
                    updated_rows,
                    succeeded: true,
                }
            }
            Err(e) => {
                report.trail.warn(
                    Stage::SyncReference,
                    TrailKind::ExternalWriteFailure,
                    None,
                    format!("reference write-back failed: {}", e),
                );
                SyncOutcome {
                    path: path.to_path_buf(),
                    updated_rows: 0,
                    succeeded: false,
                }
            }
        };
        report.sync = Some(outcome);
    }
}

fn read_input(path: &Path, what: &str) -> Result<Vec<u8>, LimitsError> {
    if !path.exists() {
        return Err(LimitsError::InputMissing {
            stage: Stage::LoadInputs,
            what: format!("{} file not found: {}", what, path.display()),
        });
    }
    info!(path = %path.display(), "reading {}", what);
    fs::read(path).map_err(|source| LimitsError::Io {
        stage: Stage::LoadInputs,
        source,
    })
}

fn parse_sheet(bytes: &[u8], path: &Path) -> Result<Sheet, LimitsError> {
    Sheet::from_reader(bytes, path)
        .map_err(|e: SheetError| LimitsError::from_sheet(Stage::LoadInputs, e))
}

/// Length-prefix each part so moving bytes between files changes the digest
fn hash_part(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}
