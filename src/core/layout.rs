//! Named sheet offsets
//!
//! Every position is 0-based. Defaults match the exports produced by the
//! test equipment and the reference workbook used on the line.

use serde::{Deserialize, Serialize};

/// Where measurement data lives inside a raw grid sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridLayout {
    /// Rows to skip before the first data row
    pub header_rows: usize,

    /// First column holding measurements (one column per piece)
    pub data_start_col: usize,

    /// Column used to select rows, if any (the "Method" column)
    pub discriminator_col: Option<usize>,

    /// Value the discriminator must equal for a row to be kept
    pub discriminator_value: f64,

    /// Column with the first pin of the measured pair
    pub pin_a_col: usize,

    /// Column with the second pin of the measured pair
    pub pin_b_col: usize,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            header_rows: 1,
            data_start_col: 6,
            discriminator_col: Some(3),
            discriminator_value: 3.0,
            pin_a_col: 0,
            pin_b_col: 1,
        }
    }
}

/// Column layout of the vendor specification sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VendorLayout {
    /// Rows to skip before the first spec row
    pub header_rows: usize,

    /// Column with `part1.pin1`
    pub pin1_col: usize,

    /// Column with `part2.pin2`
    pub pin2_col: usize,

    pub nominal_col: usize,
    pub usl_col: usize,
    pub lsl_col: usize,
}

impl Default for VendorLayout {
    fn default() -> Self {
        Self {
            header_rows: 9,
            pin1_col: 6,
            pin2_col: 7,
            nominal_col: 14,
            usl_col: 15,
            lsl_col: 16,
        }
    }
}

/// Layout of the companion reference sheet
///
/// The reference sheet supplies the samples-per-set count, the identity of
/// each NET, and receives the write-back of the internal limit pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceLayout {
    /// Column whose last numeric value is the samples-per-set count
    pub x_col: usize,

    /// Row of the first NET
    pub data_start_row: usize,

    pub no_col: usize,
    pub net_name_col: usize,
    pub btob_name_col: usize,
    pub btob_pin_col: usize,
    pub acf_name_col: usize,
    pub acf_pin_col: usize,

    /// "3 sigma spec" columns (L/M)
    pub sigma_lsl_col: usize,
    pub sigma_usl_col: usize,

    /// "On machine" columns (N/O)
    pub machine_lsl_col: usize,
    pub machine_usl_col: usize,
}

impl Default for ReferenceLayout {
    fn default() -> Self {
        Self {
            x_col: 2,
            data_start_row: 3,
            no_col: 2,
            net_name_col: 3,
            btob_name_col: 4,
            btob_pin_col: 5,
            acf_name_col: 6,
            acf_pin_col: 7,
            sigma_lsl_col: 11,
            sigma_usl_col: 12,
            machine_lsl_col: 13,
            machine_usl_col: 14,
        }
    }
}
