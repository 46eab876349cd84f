// ! Refueling workbook ingestion: sheet detection and normalization

pub mod normalizer;
pub mod workbook_importer;

use std::path::Path;

// Re-export commonly used items
pub use normalizer::{build_dataset, normalize_sheet};
pub use workbook_importer::{CellValue, RawSheet, RawWorkbook, WorkbookImportError, WorkbookImporter};

use crate::models::Dataset;

/// Load and normalize a workbook from disk
pub fn load_dataset_from_path(path: impl AsRef<Path>) -> Result<Dataset, WorkbookImportError> {
    let path = path.as_ref();
    let mut importer = WorkbookImporter::open(path)?;
    let workbook = importer.read_source_sheets()?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(build_dataset(file_name, &workbook))
}

/// Load and normalize an uploaded workbook
pub fn load_dataset_from_bytes(
    file_name: impl Into<String>,
    bytes: Vec<u8>,
) -> Result<Dataset, WorkbookImportError> {
    let mut importer = WorkbookImporter::from_bytes(bytes)?;
    let workbook = importer.read_source_sheets()?;
    Ok(build_dataset(file_name, &workbook))
}
