use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Reader, Sheets};
use chrono::NaiveDateTime;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::Source;
use crate::utils::normalize_column_name;

#[derive(Error, Debug)]
pub enum WorkbookImportError {
    #[error("Failed to open workbook: {0}")]
    WorkbookOpen(String),

    #[error("No {0} sheet found (expected a sheet name containing {hint})", hint = sheet_hint(.0))]
    MissingSheet(Source),

    #[error("Failed to read sheet {sheet}: {msg}")]
    SheetRead { sheet: String, msg: String },
}

fn sheet_hint(source: &Source) -> &'static str {
    match source {
        Source::Internal => "\"interno\" or \"internal\"",
        Source::External => "\"externo\" or \"external\"",
    }
}

/// A spreadsheet cell reduced to the shapes the normalizer cares about
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl From<&Data> for CellValue {
    fn from(data: &Data) -> Self {
        match data {
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Float(f) => CellValue::Number(*f),
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(datetime) => CellValue::DateTime(datetime),
                None => CellValue::Number(dt.as_f64()),
            },
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(_) | Data::Empty => CellValue::Empty,
        }
    }
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

/// A sheet as read from the workbook: normalized headers plus raw rows
#[derive(Debug, Clone, Default)]
pub struct RawSheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawSheet {
    /// Build a sheet from a header row and data rows, normalizing the headers
    pub fn new(name: impl Into<String>, raw_headers: &[&str], rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.into(),
            headers: raw_headers.iter().map(|h| normalize_column_name(h)).collect(),
            rows,
        }
    }

    /// Position of the first column whose normalized header matches `column`
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }
}

/// The internal and external sheets of a refueling workbook
#[derive(Debug, Clone)]
pub struct RawWorkbook {
    pub internal: RawSheet,
    pub external: RawSheet,
}

/// Reader for refueling workbooks (xlsx, xls, xlsb, ods)
///
/// Parsing is synchronous; async callers should use `spawn_blocking`.
pub struct WorkbookImporter<RS: Read + Seek> {
    workbook: Sheets<RS>,
}

impl WorkbookImporter<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, WorkbookImportError> {
        let path = path.as_ref();
        info!("Opening workbook: {}", path.display());
        let workbook = open_workbook_auto(path)
            .map_err(|e| WorkbookImportError::WorkbookOpen(e.to_string()))?;
        Ok(Self { workbook })
    }
}

impl WorkbookImporter<Cursor<Vec<u8>>> {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, WorkbookImportError> {
        debug!("Opening workbook from {} bytes", bytes.len());
        let workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
            .map_err(|e| WorkbookImportError::WorkbookOpen(e.to_string()))?;
        Ok(Self { workbook })
    }
}

impl<RS: Read + Seek> WorkbookImporter<RS> {
    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names()
    }

    /// Name of the first sheet whose name marks it as `source`
    pub fn find_sheet(&self, source: Source) -> Option<String> {
        self.sheet_names()
            .into_iter()
            .find(|name| Source::from_sheet_name(name) == Some(source))
    }

    /// Read a sheet, taking its first row as the header row
    ///
    /// Fully blank rows are skipped.
    pub fn read_sheet(&mut self, sheet_name: &str) -> Result<RawSheet, WorkbookImportError> {
        let range =
            self.workbook
                .worksheet_range(sheet_name)
                .map_err(|e| WorkbookImportError::SheetRead {
                    sheet: sheet_name.to_string(),
                    msg: e.to_string(),
                })?;

        let mut rows = range.rows();
        let headers: Vec<String> = match rows.next() {
            Some(header_row) => header_row.iter().map(header_text).collect(),
            None => {
                warn!("Sheet {} is empty", sheet_name);
                Vec::new()
            }
        };

        let data_rows: Vec<Vec<CellValue>> = rows
            .map(|row| row.iter().map(CellValue::from).collect::<Vec<_>>())
            .filter(|row| !row.iter().all(CellValue::is_empty))
            .collect();

        debug!(
            "Sheet {}: {} columns, {} data rows, headers {:?}",
            sheet_name,
            headers.len(),
            data_rows.len(),
            headers
        );

        Ok(RawSheet {
            name: sheet_name.to_string(),
            headers,
            rows: data_rows,
        })
    }

    /// Locate and read both the internal and external sheets
    pub fn read_source_sheets(&mut self) -> Result<RawWorkbook, WorkbookImportError> {
        let internal_name = self
            .find_sheet(Source::Internal)
            .ok_or(WorkbookImportError::MissingSheet(Source::Internal))?;
        let external_name = self
            .find_sheet(Source::External)
            .ok_or(WorkbookImportError::MissingSheet(Source::External))?;

        info!(
            "Using sheet '{}' as internal and '{}' as external",
            internal_name, external_name
        );

        Ok(RawWorkbook {
            internal: self.read_sheet(&internal_name)?,
            external: self.read_sheet(&external_name)?,
        })
    }
}

/// Normalized header text for a header cell
fn header_text(cell: &Data) -> String {
    let raw = match cell {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 => format!("{f:.0}"),
        Data::Float(f) => f.to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    };
    normalize_column_name(&raw)
}
