//! Companion reference sheet
//!
//! The reference sheet is both an input and the target of the only side
//! effect of a run. It supplies the samples-per-set count (the last numeric
//! value in its `x_col`) and one identity row per NET. After a successful
//! calculation it receives the internal limit pair of every NET.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::core::layout::ReferenceLayout;
use crate::entities::NetIdentity;
use crate::sheet::{CellValue, Sheet, SheetError};

/// Loaded reference sheet
#[derive(Debug, Clone)]
pub struct ReferenceSheet {
    sheet: Sheet,
    layout: ReferenceLayout,
}

impl ReferenceSheet {
    pub fn new(sheet: Sheet, layout: ReferenceLayout) -> Self {
        Self { sheet, layout }
    }

    pub fn load(path: &Path, layout: &ReferenceLayout) -> Result<Self, SheetError> {
        Ok(Self::new(Sheet::from_csv_path(path)?, layout.clone()))
    }

    /// Samples per set: the last numeric value in the `x_col` column
    ///
    /// Fractions are truncated. Returns 0 if the column holds no number or
    /// the last number is not positive.
    pub fn samples_per_set(&self) -> usize {
        let last = (0..self.sheet.row_count())
            .filter_map(|row| self.sheet.cell(row, self.layout.x_col).as_number())
            .last()
            .unwrap_or(0.0);
        if last >= 1.0 {
            last.trunc() as usize
        } else {
            0
        }
    }

    /// Number of populated identity rows from `data_start_row` on
    pub fn net_rows(&self) -> usize {
        (self.layout.data_start_row..self.sheet.row_count())
            .filter(|row| !self.sheet.cell(*row, self.layout.no_col).is_missing())
            .count()
    }

    /// Identity fields of NET `net` (0-based)
    ///
    /// Name and pin fields keep their source text, so `08` stays `08`.
    /// Rows past the end of the sheet give an identity with only the
    /// 1-based NET number filled in.
    pub fn identity(&self, net: usize) -> NetIdentity {
        let row = self.layout.data_start_row + net;
        let cell = |col: usize| self.sheet.label(row, col);

        let no = match self.sheet.cell(row, self.layout.no_col) {
            CellValue::Missing => CellValue::Number((net + 1) as f64),
            other => other.clone(),
        };

        NetIdentity {
            index: net,
            no,
            net_name: cell(self.layout.net_name_col),
            btob_name: cell(self.layout.btob_name_col),
            btob_pin: cell(self.layout.btob_pin_col),
            acf_name: cell(self.layout.acf_name_col),
            acf_pin: cell(self.layout.acf_pin_col),
            pin_a: CellValue::Missing,
            pin_b: CellValue::Missing,
        }
    }

    pub fn sheet(&self) -> &Sheet {
        &self.sheet
    }
}

/// Write-back of the internal limit pair into the reference file
#[derive(Debug, Clone)]
pub struct ReferenceSync {
    path: PathBuf,
    layout: ReferenceLayout,
}

impl ReferenceSync {
    pub fn new(path: impl Into<PathBuf>, layout: ReferenceLayout) -> Self {
        Self {
            path: path.into(),
            layout,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the "3 sigma spec" and "on machine" columns
    ///
    /// `pairs[n]` goes to row `data_start_row + n`. `None` entries leave the
    /// row untouched. The file is re-read right before writing and replaced
    /// in one rename. Returns the number of rows written.
    pub fn apply(&self, pairs: &[Option<(i64, i64)>]) -> Result<usize, SheetError> {
        let mut sheet = Sheet::from_csv_path(&self.path)?;
        let mut updated = 0;

        for (net, pair) in pairs.iter().enumerate() {
            let Some((lsl, usl)) = pair else {
                continue;
            };
            let row = self.layout.data_start_row + net;
            sheet.set(row, self.layout.sigma_lsl_col, CellValue::from(*lsl));
            sheet.set(row, self.layout.sigma_usl_col, CellValue::from(*usl));
            sheet.set(row, self.layout.machine_lsl_col, CellValue::from(*lsl));
            sheet.set(row, self.layout.machine_usl_col, CellValue::from(*usl));
            debug!(net = net + 1, lsl, usl, "reference row updated");
            updated += 1;
        }

        sheet.write_csv_path(&self.path)?;
        info!(path = %self.path.display(), rows = updated, "reference file synchronized");
        Ok(updated)
    }
}
