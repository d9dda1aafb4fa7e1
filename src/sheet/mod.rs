//! Tabular sheet input/output
//!
//! Worksheets are exchanged as headerless CSV files. Every cell is coerced
//! into a [`CellValue`] on read.

pub mod cell;
pub mod reader;

pub use cell::CellValue;
pub use reader::{Sheet, SheetError};
