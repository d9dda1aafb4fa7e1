//! CSV-backed worksheets

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::sheet::cell::CellValue;

static MISSING: CellValue = CellValue::Missing;

/// Errors raised while reading or writing a sheet
#[derive(Debug, Error)]
pub enum SheetError {
    #[error("Sheet not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read sheet {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A ragged grid of cells, addressed by 0-based (row, col)
///
/// Each cell keeps the field text it was read from next to its coerced
/// value. Writing a sheet back out emits that text, so only cells changed
/// through [`Sheet::set`] differ from the source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    rows: Vec<Vec<CellValue>>,
    raw: Vec<Vec<String>>,
}

impl Sheet {
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        let raw = rows
            .iter()
            .map(|r| r.iter().map(CellValue::render).collect())
            .collect();
        Self { rows, raw }
    }

    /// Build a sheet from raw string rows, coercing each cell
    pub fn from_rows<S: AsRef<str>>(rows: &[Vec<S>]) -> Self {
        let mut sheet = Self::default();
        for row in rows {
            sheet.push_row(row.iter().map(|c| c.as_ref()));
        }
        sheet
    }

    fn push_row<'a>(&mut self, fields: impl Iterator<Item = &'a str>) {
        let raw: Vec<String> = fields.map(str::to_string).collect();
        self.rows.push(raw.iter().map(|f| CellValue::parse(f)).collect());
        self.raw.push(raw);
    }

    /// Read a headerless CSV from any reader
    pub fn from_reader<R: Read>(reader: R, origin: &Path) -> Result<Self, SheetError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut sheet = Self::default();
        for record in csv_reader.records() {
            let record = record.map_err(|source| SheetError::Csv {
                path: origin.to_path_buf(),
                source,
            })?;
            sheet.push_row(record.iter());
        }

        Ok(sheet)
    }

    /// Read a headerless CSV file
    pub fn from_csv_path(path: &Path) -> Result<Self, SheetError> {
        if !path.exists() {
            return Err(SheetError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let file = fs::File::open(path).map_err(|source| SheetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file, path)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row
    pub fn col_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at (row, col), `Missing` when out of range
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&MISSING)
    }

    /// Trimmed source text of the cell at (row, col), `""` when out of range
    ///
    /// Unlike [`CellValue::render`] this keeps leading zeros and signs, so
    /// pin `08` stays `"08"`.
    pub fn text(&self, row: usize, col: usize) -> &str {
        self.raw
            .get(row)
            .and_then(|r| r.get(col))
            .map(|s| s.trim())
            .unwrap_or("")
    }

    /// The cell as a label: its source text, or `Missing` when blank
    pub fn label(&self, row: usize, col: usize) -> CellValue {
        match self.text(row, col) {
            "" => CellValue::Missing,
            text => CellValue::Text(text.to_string()),
        }
    }

    /// Cells of one row (empty slice when out of range)
    pub fn row(&self, row: usize) -> &[CellValue] {
        self.rows.get(row).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[CellValue]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Overwrite one cell, growing the sheet as needed
    pub fn set(&mut self, row: usize, col: usize, value: CellValue) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
            self.raw.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        let raw = &mut self.raw[row];
        if cells.len() <= col {
            cells.resize(col + 1, CellValue::Missing);
            raw.resize(col + 1, String::new());
        }
        raw[col] = value.render();
        cells[col] = value;
    }

    /// Serialize as CSV into any writer
    pub fn write_to<W: Write>(&self, writer: W, origin: &Path) -> Result<(), SheetError> {
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_writer(writer);

        let csv_err = |source| SheetError::Csv {
            path: origin.to_path_buf(),
            source,
        };

        for row in &self.raw {
            // A zero-field record would come back as a skipped blank line
            if row.is_empty() {
                csv_writer.write_record([""]).map_err(csv_err)?;
                continue;
            }
            csv_writer.write_record(row).map_err(csv_err)?;
        }
        csv_writer.flush().map_err(|source| SheetError::Io {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Write the sheet to `path` without ever leaving a partial file behind
    ///
    /// The content goes to a sibling temporary file that is then renamed
    /// over the target.
    pub fn write_csv_path(&self, path: &Path) -> Result<(), SheetError> {
        let io_err = |source| SheetError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = path.with_file_name(tmp_name);

        {
            let file = fs::File::create(&tmp_path).map_err(io_err)?;
            if let Err(e) = self.write_to(file, path) {
                let _ = fs::remove_file(&tmp_path);
                return Err(e);
            }
        }

        fs::rename(&tmp_path, path).map_err(|source| {
            let _ = fs::remove_file(&tmp_path);
            SheetError::Io {
                path: path.to_path_buf(),
                source,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_from_reader_is_ragged_and_headerless() {
        let data = "a,b,c\n1,2\n\n3.5,,x\n";
        let sheet = Sheet::from_reader(data.as_bytes(), Path::new("mem.csv")).unwrap();
        // csv skips fully blank lines
        assert_eq!(sheet.row_count(), 3);
        assert_eq!(sheet.col_count(), 3);
        assert_eq!(sheet.cell(0, 0), &CellValue::Text("a".into()));
        assert_eq!(sheet.cell(1, 1), &CellValue::Number(2.0));
        assert_eq!(sheet.cell(1, 2), &CellValue::Missing);
        assert_eq!(sheet.cell(2, 1), &CellValue::Missing);
        assert_eq!(sheet.cell(99, 99), &CellValue::Missing);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = Sheet::from_csv_path(Path::new("/nonexistent/grid.csv")).unwrap_err();
        assert!(matches!(err, SheetError::NotFound { .. }));
    }

    #[test]
    fn test_set_grows_sheet() {
        let mut sheet = Sheet::default();
        sheet.set(2, 3, CellValue::Number(7.0));
        assert_eq!(sheet.row_count(), 3);
        assert_eq!(sheet.cell(2, 3), &CellValue::Number(7.0));
        assert!(sheet.cell(2, 0).is_missing());
    }

    #[test]
    fn test_write_then_read_back() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("out.csv");
        let sheet = Sheet::from_rows(&[vec!["No", "1"], vec!["x", "2.5", "tail"]]);
        sheet.write_csv_path(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "No,1\nx,2.5,tail\n");
        assert!(!tmp.path().join("out.csv.tmp").exists());
    }

    #[test]
    fn test_untouched_cells_keep_source_text() {
        let data = "No,01,1.50,+5,x\n";
        let mut sheet = Sheet::from_reader(data.as_bytes(), Path::new("mem.csv")).unwrap();
        assert_eq!(sheet.cell(0, 1), &CellValue::Number(1.0));
        assert_eq!(sheet.text(0, 1), "01");
        assert_eq!(sheet.text(5, 5), "");
        assert_eq!(sheet.label(0, 1), CellValue::Text("01".into()));
        assert!(sheet.label(0, 9).is_missing());

        sheet.set(0, 6, CellValue::from(1221i64));
        let mut out = Vec::new();
        sheet.write_to(&mut out, Path::new("mem.csv")).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No,01,1.50,+5,x,,1221\n");
    }
}
