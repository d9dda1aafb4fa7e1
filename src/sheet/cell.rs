//! Cell values with explicit coercion rules

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single worksheet cell, resolved at ingestion
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Finite numeric value (integers are stored as whole floats)
    Number(f64),
    /// Anything that did not parse as a number
    Text(String),
    /// Blank cell or a cell outside the sheet
    #[default]
    Missing,
}

impl CellValue {
    /// Coerce raw cell text into a value
    ///
    /// The text is trimmed first. Empty text is `Missing`. Text without a
    /// decimal point must parse as an integer, text with one as a float.
    /// Everything else, including non-finite floats, stays `Text`.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return CellValue::Missing;
        }

        if !trimmed.contains('.') {
            return match trimmed.parse::<i64>() {
                Ok(n) => CellValue::Number(n as f64),
                Err(_) => CellValue::Text(trimmed.to_string()),
            };
        }

        match trimmed.parse::<f64>() {
            Ok(f) if f.is_finite() => CellValue::Number(f),
            _ => CellValue::Text(trimmed.to_string()),
        }
    }

    /// Numeric value, if this is a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Text content, if this is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    /// Render the cell the way a spreadsheet would show it
    ///
    /// Whole numbers have no trailing `.0`, so pin `18` renders as `"18"`.
    /// Missing cells render as the empty string.
    pub fn render(&self) -> String {
        match self {
            CellValue::Number(n) => format_number(*n),
            CellValue::Text(s) => s.clone(),
            CellValue::Missing => String::new(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        if value.is_finite() {
            CellValue::Number(value)
        } else {
            CellValue::Missing
        }
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::parse(value)
    }
}

/// Shortest round-trip rendering, with whole numbers printed as integers
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
