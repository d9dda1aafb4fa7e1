//! Grid reshaping: flat measurement grid to per-NET sample collections
//!
//! A raw grid stacks `x` rows per set (one row per NET) and one column per
//! piece. Reshaping gathers, for every NET offset inside a set block, the
//! value at that offset from every complete set and every piece.

use serde::{Deserialize, Serialize};

use crate::core::layout::GridLayout;
use crate::sheet::{CellValue, Sheet};

/// Numeric measurement grid, `rows = sets × x`, `cols = pieces`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementGrid {
    rows: Vec<Vec<Option<f64>>>,
    cols: usize,
    /// Pin pair metadata of each kept row, in row order
    pins: Vec<(CellValue, CellValue)>,
}

/// Grid extracted from a sheet, plus the row filter's bookkeeping
#[derive(Debug, Clone, PartialEq)]
pub struct GridSelection {
    pub grid: MeasurementGrid,
    /// Data rows below the header
    pub data_rows: usize,
    /// Data rows excluded by the discriminator
    pub excluded_rows: usize,
}

impl MeasurementGrid {
    /// Build a grid directly from numeric rows (no pin metadata)
    pub fn from_values(rows: Vec<Vec<Option<f64>>>) -> Self {
        let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
        Self {
            pins: vec![(CellValue::Missing, CellValue::Missing); rows.len()],
            rows,
            cols,
        }
    }

    /// Apply a layout to a raw sheet: skip headers, keep discriminated rows,
    /// and take every column from `data_start_col` on
    pub fn from_sheet(sheet: &Sheet, layout: &GridLayout) -> GridSelection {
        let cols = sheet.col_count().saturating_sub(layout.data_start_col);
        let data_rows = sheet.row_count().saturating_sub(layout.header_rows);

        let mut rows = Vec::new();
        let mut pins = Vec::new();
        let mut excluded_rows = 0;

        for row_idx in layout.header_rows..sheet.row_count() {
            if let Some(col) = layout.discriminator_col {
                if sheet.cell(row_idx, col).as_number() != Some(layout.discriminator_value) {
                    excluded_rows += 1;
                    continue;
                }
            }

            rows.push(
                (0..cols)
                    .map(|c| sheet.cell(row_idx, layout.data_start_col + c).as_number())
                    .collect(),
            );
            pins.push((
                sheet.label(row_idx, layout.pin_a_col),
                sheet.label(row_idx, layout.pin_b_col),
            ));
        }

        GridSelection {
            grid: Self { rows, cols, pins },
            data_rows,
            excluded_rows,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn value(&self, row: usize, col: usize) -> Option<f64> {
        self.rows.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    /// Pin pair recorded on grid row `row`
    ///
    /// The first set block lists the NETs in order, so row `n` carries the
    /// pins of NET `n`.
    pub fn pins(&self, row: usize) -> Option<&(CellValue, CellValue)> {
        self.pins.get(row)
    }
}

/// Per-NET sample collections produced by [`reshape`]
#[derive(Debug, Clone, PartialEq)]
pub struct Reshaped {
    /// One collection per NET, indexed by NET offset
    pub samples: Vec<Vec<f64>>,
    /// Number of complete set blocks
    pub sets: usize,
    /// Trailing rows that did not fill a complete set
    pub dropped_rows: usize,
}

impl Reshaped {
    pub fn net_count(&self) -> usize {
        self.samples.len()
    }
}

/// Slice the grid into `floor(rows / x)` blocks of `x` rows
///
/// Sample `n` of every block and every column belongs to NET `n`. Values
/// are gathered set-major, then column by column; missing cells are
/// skipped. `x == 0` yields no NETs, `rows < x` yields `x` empty NETs.
pub fn reshape(grid: &MeasurementGrid, x: usize) -> Reshaped {
    if x == 0 {
        return Reshaped {
            samples: Vec::new(),
            sets: 0,
            dropped_rows: grid.row_count(),
        };
    }

    let sets = grid.row_count() / x;
    let dropped_rows = grid.row_count() - sets * x;

    let samples = (0..x)
        .map(|net| {
            let mut values = Vec::with_capacity(sets * grid.col_count());
            for set_idx in 0..sets {
                let row = set_idx * x + net;
                for col in 0..grid.col_count() {
                    if let Some(v) = grid.value(row, col) {
                        values.push(v);
                    }
                }
            }
            values
        })
        .collect();

    Reshaped {
        samples,
        sets,
        dropped_rows,
    }
}

/// Shape of a reshaped run, reported with the results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReshapeSummary {
    /// Samples per set (the NET count)
    pub net_count: usize,
    /// Measurement columns in the grid
    pub piece_count: usize,
    /// Complete set blocks per piece
    pub sets_per_piece: usize,
    /// `piece_count × sets_per_piece`
    pub total_measurements: usize,
    /// Trailing rows dropped by the reshape
    pub dropped_rows: usize,
    /// Data rows excluded by the discriminator
    pub filtered_out_rows: usize,
}

impl ReshapeSummary {
    pub fn new(grid: &MeasurementGrid, reshaped: &Reshaped, excluded_rows: usize) -> Self {
        Self {
            net_count: reshaped.net_count(),
            piece_count: grid.col_count(),
            sets_per_piece: reshaped.sets,
            total_measurements: grid.col_count() * reshaped.sets,
            dropped_rows: reshaped.dropped_rows,
            filtered_out_rows: excluded_rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[f64]]) -> MeasurementGrid {
        MeasurementGrid::from_values(
            rows.iter()
                .map(|r| r.iter().map(|v| Some(*v)).collect())
                .collect(),
        )
    }

    #[test]
    fn test_reshape_collects_net_offsets() {
        // x = 3, 2 sets, 2 pieces
        let g = grid(&[
            &[1.0, 10.0],
            &[2.0, 20.0],
            &[3.0, 30.0],
            &[4.0, 40.0],
            &[5.0, 50.0],
            &[6.0, 60.0],
        ]);
        let r = reshape(&g, 3);
        assert_eq!(r.sets, 2);
        assert_eq!(r.dropped_rows, 0);
        assert_eq!(r.samples[0], vec![1.0, 10.0, 4.0, 40.0]);
        assert_eq!(r.samples[1], vec![2.0, 20.0, 5.0, 50.0]);
        assert_eq!(r.samples[2], vec![3.0, 30.0, 6.0, 60.0]);
    }

    #[test]
    fn test_reshape_drops_trailing_rows() {
        let g = grid(&[&[1.0], &[2.0], &[3.0], &[4.0], &[5.0]]);
        let r = reshape(&g, 2);
        assert_eq!(r.sets, 2);
        assert_eq!(r.dropped_rows, 1);
        assert_eq!(r.samples[0], vec![1.0, 3.0]);
        assert_eq!(r.samples[1], vec![2.0, 4.0]);
    }

    #[test]
    fn test_reshape_zero_x_has_no_nets() {
        let g = grid(&[&[1.0], &[2.0]]);
        let r = reshape(&g, 0);
        assert_eq!(r.net_count(), 0);
        assert_eq!(r.sets, 0);
    }

    #[test]
    fn test_reshape_fewer_rows_than_x_gives_empty_nets() {
        let g = grid(&[&[1.0], &[2.0]]);
        let r = reshape(&g, 4);
        assert_eq!(r.net_count(), 4);
        assert!(r.samples.iter().all(Vec::is_empty));
        assert_eq!(r.dropped_rows, 2);
    }

    #[test]
    fn test_reshape_skips_missing_cells() {
        let g = MeasurementGrid::from_values(vec![
            vec![Some(1.0), None],
            vec![None, Some(2.0)],
        ]);
        let r = reshape(&g, 1);
        assert_eq!(r.samples[0], vec![1.0, 2.0]);
    }

    #[test]
    fn test_from_sheet_filters_on_discriminator() {
        let sheet = Sheet::from_rows(&[
            vec!["PinA", "PinB", "ID", "Method", "L", "U", "P1", "P2"],
            vec!["A1", "B1", "1", "3", "", "", "1.0", "2.0"],
            vec!["A2", "B2", "2", "1", "", "", "9.0", "9.0"],
            vec!["A3", "B3", "3", "3", "", "", "OPEN", "4.0"],
        ]);
        let sel = MeasurementGrid::from_sheet(&sheet, &GridLayout::default());

        assert_eq!(sel.data_rows, 3);
        assert_eq!(sel.excluded_rows, 1);
        assert_eq!(sel.grid.row_count(), 2);
        assert_eq!(sel.grid.col_count(), 2);
        assert_eq!(sel.grid.value(0, 1), Some(2.0));
        assert_eq!(sel.grid.value(1, 0), None);
        assert_eq!(
            sel.grid.pins(1),
            Some(&(CellValue::Text("A3".into()), CellValue::Text("B3".into())))
        );
    }

    #[test]
    fn test_from_sheet_without_discriminator_keeps_all_rows() {
        let sheet = Sheet::from_rows(&[vec!["h", "h"], vec!["x", "1"], vec!["y", "2"]]);
        let layout = GridLayout {
            header_rows: 1,
            data_start_col: 1,
            discriminator_col: None,
            ..GridLayout::default()
        };
        let sel = MeasurementGrid::from_sheet(&sheet, &layout);
        assert_eq!(sel.excluded_rows, 0);
        assert_eq!(sel.grid.row_count(), 2);
        assert_eq!(sel.grid.col_count(), 1);
    }
}
