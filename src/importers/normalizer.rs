//! Turns raw sheets into normalized refueling records
//!
//! Expected (normalized) columns: `placa`, `tipo_combustivel`, `km_atual`,
//! `quantidade_de_litros`, `valor_total`, `valor_unitario`, `data`.

use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};
use tracing::{debug, info, warn};

use super::workbook_importer::{CellValue, RawSheet, RawWorkbook};
use crate::models::{Dataset, RefuelingRecord, SheetStats, Source, UNKNOWN_FUEL_TYPE};
use crate::utils::{normalize_label, parse_money_checked};

pub const PLATE_COLUMN: &str = "placa";
pub const FUEL_TYPE_COLUMN: &str = "tipo_combustivel";
pub const ODOMETER_COLUMN: &str = "km_atual";
pub const LITERS_COLUMN: &str = "quantidade_de_litros";
pub const TOTAL_VALUE_COLUMN: &str = "valor_total";
pub const UNIT_VALUE_COLUMN: &str = "valor_unitario";
pub const DATE_COLUMN: &str = "data";

/// Plate used on internal sheets for tank-fill entries
const TANK_FILL_PLATE: &str = "-";

const DATE_FORMATS: [&str; 4] = ["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%d/%m/%y"];
const DATETIME_FORMATS: [&str; 4] = [
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// Column positions of one sheet
#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    plate: Option<usize>,
    fuel_type: Option<usize>,
    odometer: Option<usize>,
    liters: Option<usize>,
    total_value: Option<usize>,
    unit_value: Option<usize>,
    date: Option<usize>,
}

impl ColumnMap {
    fn for_sheet(sheet: &RawSheet) -> Self {
        let map = Self {
            plate: sheet.column_index(PLATE_COLUMN),
            fuel_type: sheet.column_index(FUEL_TYPE_COLUMN),
            odometer: sheet.column_index(ODOMETER_COLUMN),
            liters: sheet.column_index(LITERS_COLUMN),
            total_value: sheet.column_index(TOTAL_VALUE_COLUMN),
            unit_value: sheet.column_index(UNIT_VALUE_COLUMN),
            date: sheet.column_index(DATE_COLUMN),
        };

        for (column, index) in [
            (PLATE_COLUMN, map.plate),
            (ODOMETER_COLUMN, map.odometer),
            (LITERS_COLUMN, map.liters),
        ] {
            if index.is_none() {
                warn!(
                    "Sheet {} has no '{}' column, every row will be dropped",
                    sheet.name, column
                );
            }
        }

        map
    }
}

static EMPTY_CELL: CellValue = CellValue::Empty;

fn cell(row: &[CellValue], index: Option<usize>) -> &CellValue {
    index.and_then(|i| row.get(i)).unwrap_or(&EMPTY_CELL)
}

/// Normalize one sheet into records
///
/// Rows without a plate, odometer or liters value are dropped. On the
/// internal sheet, tank-fill rows (plate `-`) are dropped as well.
pub fn normalize_sheet(sheet: &RawSheet, source: Source) -> (Vec<RefuelingRecord>, SheetStats) {
    let columns = ColumnMap::for_sheet(sheet);
    let mut records = Vec::with_capacity(sheet.rows.len());
    let mut money_fallbacks = 0;

    for (row_idx, row) in sheet.rows.iter().enumerate() {
        let Some(plate) = text_value(cell(row, columns.plate)) else {
            debug!("Row {} of {}: no plate, dropping", row_idx, sheet.name);
            continue;
        };
        let plate = normalize_label(&plate);

        if source == Source::Internal && plate == TANK_FILL_PLATE {
            debug!("Row {} of {}: tank fill, dropping", row_idx, sheet.name);
            continue;
        }

        let (Some(odometer_km), Some(liters)) = (
            numeric_value(cell(row, columns.odometer)),
            numeric_value(cell(row, columns.liters)),
        ) else {
            debug!(
                "Row {} of {}: odometer or liters not numeric, dropping",
                row_idx, sheet.name
            );
            continue;
        };

        let fuel_type = text_value(cell(row, columns.fuel_type))
            .map(|s| normalize_label(&s))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| UNKNOWN_FUEL_TYPE.to_string());

        let total_value = parse_money_checked(cell(row, columns.total_value));
        let unit_value = parse_money_checked(cell(row, columns.unit_value));
        money_fallbacks += [total_value, unit_value]
            .iter()
            .filter(|m| !m.parsed)
            .count();

        records.push(RefuelingRecord {
            plate,
            fuel_type,
            odometer_km,
            liters,
            total_value: total_value.amount,
            unit_value: unit_value.amount,
            date: parse_date(cell(row, columns.date)),
            source,
        });
    }

    let stats = SheetStats {
        sheet_name: sheet.name.clone(),
        rows_read: sheet.rows.len(),
        rows_kept: records.len(),
        rows_dropped: sheet.rows.len() - records.len(),
        money_fallbacks,
    };

    if stats.money_fallbacks > 0 {
        debug!(
            "Sheet {}: {} monetary cells unreadable, counted as 0.0",
            sheet.name, stats.money_fallbacks
        );
    }

    info!(
        "Normalized {} sheet '{}': kept {} of {} rows",
        source, sheet.name, stats.rows_kept, stats.rows_read
    );

    (records, stats)
}

/// Normalize both sheets of a workbook into a dataset
pub fn build_dataset(file_name: impl Into<String>, workbook: &RawWorkbook) -> Dataset {
    let (internal, internal_stats) = normalize_sheet(&workbook.internal, Source::Internal);
    let (external, external_stats) = normalize_sheet(&workbook.external, Source::External);

    Dataset {
        file_name: file_name.into(),
        loaded_at: Utc::now(),
        internal,
        external,
        internal_stats,
        external_stats,
    }
}

/// Text content of a cell; `None` only for empty cells
fn text_value(value: &CellValue) -> Option<String> {
    match value {
        CellValue::Empty => None,
        CellValue::Text(s) => Some(s.clone()),
        CellValue::Number(n) if n.fract() == 0.0 => Some(format!("{n:.0}")),
        CellValue::Number(n) => Some(n.to_string()),
        CellValue::Bool(b) => Some(b.to_string()),
        CellValue::DateTime(dt) => Some(dt.to_string()),
    }
}

/// Numeric coercion for odometer and liters; `None` means missing
fn numeric_value(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Number(n) if n.is_finite() => Some(*n),
        CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Day-first date parsing; anything unreadable becomes `None`
pub fn parse_date(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::DateTime(dt) => Some(dt.date()),
        CellValue::Number(serial) if *serial >= 1.0 => excel_serial_to_date(*serial),
        CellValue::Text(s) => parse_date_text(s.trim()),
        _ => None,
    }
}

fn parse_date_text(s: &str) -> Option<NaiveDate> {
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
        // ISO dates last
        .or_else(|| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

/// Largest serial Excel can display (9999-12-31)
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

/// Convert an Excel date serial (days since 1899-12-30) to a date
///
/// Serials outside Excel's date range yield `None`.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial > MAX_EXCEL_SERIAL {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    Duration::try_days(serial as i64).and_then(|days| epoch.checked_add_signed(days))
}
