//! Vendor specification lookup
//!
//! The vendor sheet lists one pin pair per row, `part1.pin1` and
//! `part2.pin2` in two columns. Rows are indexed by the two strings
//! concatenated with no separator, e.g. `"J_TELE.18U0200.8"`.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::layout::VendorLayout;
use crate::sheet::{CellValue, Sheet, SheetError};

/// Nominal and bounds of one vendor row
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VendorSpecEntry {
    pub nominal: Option<f64>,
    pub usl: Option<f64>,
    pub lsl: Option<f64>,
}

impl VendorSpecEntry {
    /// The "not found" triple
    pub const MISS: VendorSpecEntry = VendorSpecEntry {
        nominal: None,
        usl: None,
        lsl: None,
    };
}

/// Composite-key lookup table built once per run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VendorSpecs {
    entries: HashMap<String, VendorSpecEntry>,
    /// Keys in first-seen sheet order
    order: Vec<String>,
}

impl VendorSpecs {
    /// Index a vendor sheet
    ///
    /// Scanning starts after `layout.header_rows`. Rows with either pin cell
    /// empty are skipped. A key seen twice keeps the last row's values.
    pub fn from_sheet(sheet: &Sheet, layout: &VendorLayout) -> Self {
        let mut specs = Self::default();

        for row in layout.header_rows..sheet.row_count() {
            let pin1 = sheet.text(row, layout.pin1_col);
            let pin2 = sheet.text(row, layout.pin2_col);
            if pin1.is_empty() || pin2.is_empty() {
                continue;
            }

            let key = format!("{}{}", pin1, pin2);
            let entry = VendorSpecEntry {
                nominal: sheet.cell(row, layout.nominal_col).as_number(),
                usl: sheet.cell(row, layout.usl_col).as_number(),
                lsl: sheet.cell(row, layout.lsl_col).as_number(),
            };
            specs.insert(key, entry);
        }

        debug!(entries = specs.len(), "indexed vendor sheet");
        specs
    }

    /// Load the vendor sheet at `path`
    ///
    /// An absent path or a missing file gives an empty table, so every
    /// lookup misses. Any other read failure is returned.
    pub fn load(path: Option<&Path>, layout: &VendorLayout) -> Result<Self, SheetError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        match Sheet::from_csv_path(path) {
            Ok(sheet) => Ok(Self::from_sheet(&sheet, layout)),
            Err(SheetError::NotFound { .. }) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    pub fn insert(&mut self, key: String, entry: VendorSpecEntry) {
        if self.entries.insert(key.clone(), entry).is_none() {
            self.order.push(key);
        }
    }

    /// Exact-match lookup
    pub fn get(&self, key: &str) -> Option<&VendorSpecEntry> {
        self.entries.get(key)
    }

    /// Lookup that turns a miss (or no key) into the all-`None` triple
    pub fn resolve(&self, key: Option<&str>) -> VendorSpecEntry {
        key.and_then(|k| self.get(k))
            .copied()
            .unwrap_or(VendorSpecEntry::MISS)
    }

    /// Entries in sheet order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &VendorSpecEntry)> {
        self.order
            .iter()
            .filter_map(|k| self.entries.get(k).map(|e| (k.as_str(), e)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build `"{part1}.{pin1}{part2}.{pin2}"` from reference identity cells
    ///
    /// Returns `None` when any of the four parts is empty.
    pub fn composite_key(
        part1: &CellValue,
        pin1: &CellValue,
        part2: &CellValue,
        pin2: &CellValue,
    ) -> Option<String> {
        let parts = [part1, pin1, part2, pin2].map(CellValue::render);
        if parts.iter().any(|p| p.is_empty()) {
            return None;
        }
        Some(format!(
            "{}.{}{}.{}",
            parts[0], parts[1], parts[2], parts[3]
        ))
    }
}
