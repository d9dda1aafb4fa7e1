//! Spreadsheet formula rendering
//!
//! A report layer that materializes results into a workbook places these
//! formulas next to the computed values. Evaluated, each one must equal the
//! value this crate computes for the same cell.

use serde::Serialize;

use crate::core::limits::{INTERNAL_MARGIN, INTERNAL_SCALE, LIMIT_DECIMALS, SIGMA_K};
use crate::core::stats::DIAGNOSTIC_FENCE_K;

/// Row numbers (1-based) of the statistics sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatSheetRows {
    pub iqr: usize,
    pub trimmed_mean: usize,
    pub trimmed_stdev: usize,
    /// First row of the measurement block
    pub data_start: usize,
}

impl Default for StatSheetRows {
    fn default() -> Self {
        Self {
            iqr: 14,
            trimmed_mean: 17,
            trimmed_stdev: 18,
            data_start: 21,
        }
    }
}

/// Statistic formulas for one NET column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatFormulas {
    pub column: String,
    pub min: String,
    pub max: String,
    pub average: String,
    pub median: String,
    pub stdev: String,
    pub iqr: String,
    pub lower_fence: String,
    pub upper_fence: String,
    pub lsl: String,
    pub usl: String,
}

impl StatFormulas {
    /// Formulas for the NET stored in column `col` (0-based) with
    /// `measurements` samples below `rows.data_start`
    pub fn for_column(col: usize, measurements: usize, rows: &StatSheetRows) -> Self {
        let c = column_letter(col);
        let last = rows.data_start + measurements.max(1) - 1;
        let range = format!("{c}${}:{c}${last}", rows.data_start);
        let q1 = format!("QUARTILE({range},1)");
        let q3 = format!("QUARTILE({range},3)");
        let iqr_cell = format!("{c}{}", rows.iqr);
        let a = format!("{c}{}", rows.trimmed_mean);
        let b = format!("{c}{}", rows.trimmed_stdev);
        let k = format_factor(DIAGNOSTIC_FENCE_K);
        let s = format_factor(SIGMA_K);

        Self {
            min: format!("=MIN({range})"),
            max: format!("=MAX({range})"),
            average: format!("=AVERAGE({range})"),
            median: format!("=MEDIAN({range})"),
            stdev: format!("=STDEV({range})"),
            iqr: format!("={q3}-{q1}"),
            lower_fence: format!(
                "=IF({q1}-({k}*{iqr_cell})<0,0,{q1}-({k}*{iqr_cell}))"
            ),
            upper_fence: format!("={q3}+({k}*{iqr_cell})"),
            lsl: format!(
                "=ROUNDDOWN(IF({a}-({s}*{b})<0,0,{a}-({s}*{b})),{LIMIT_DECIMALS})"
            ),
            usl: format!("=ROUNDUP({a}+({s}*{b}),{LIMIT_DECIMALS})"),
            column: c,
        }
    }
}

/// Judgement-sheet formulas for one result row (1-based `row`)
///
/// Columns: H/I vendor LSL/USL, J/K internal rounded, N/O internal raw,
/// Q/R calculated, S/T scaled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JudgementFormulas {
    pub row: usize,
    pub internal_lsl: String,
    pub internal_usl: String,
    pub judge_lsl: String,
    pub judge_usl: String,
    pub internal_raw_lsl: String,
    pub internal_raw_usl: String,
    pub scaled_lsl: String,
    pub scaled_usl: String,
}

impl JudgementFormulas {
    pub fn for_row(row: usize) -> Self {
        let scale = format_factor(INTERNAL_SCALE);
        Self {
            row,
            internal_lsl: format!("=ROUNDUP(N{row},0)"),
            internal_usl: format!("=ROUNDDOWN(O{row},0)"),
            judge_lsl: format!(r#"=IF(H{row}="","",IF(J{row}<H{row},"NG","OK"))"#),
            judge_usl: format!(r#"=IF(I{row}="","",IF(K{row}>I{row},"NG","OK"))"#),
            internal_raw_lsl: format!("=S{row}-{INTERNAL_MARGIN}"),
            internal_raw_usl: format!("=T{row}+{INTERNAL_MARGIN}"),
            scaled_lsl: format!("=Q{row}*{scale}"),
            scaled_usl: format!("=R{row}*{scale}"),
        }
    }
}

/// Spreadsheet column name of a 0-based index: 0 → A, 25 → Z, 26 → AA
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

fn format_factor(k: f64) -> String {
    crate::sheet::cell::format_number(k)
}
