use fuel_dashboard_service::importers::{normalizer, WorkbookImporter};
use fuel_dashboard_service::models::Source;
use std::env;

const EXPECTED_COLUMNS: [&str; 7] = [
    normalizer::PLATE_COLUMN,
    normalizer::FUEL_TYPE_COLUMN,
    normalizer::ODOMETER_COLUMN,
    normalizer::LITERS_COLUMN,
    normalizer::TOTAL_VALUE_COLUMN,
    normalizer::UNIT_VALUE_COLUMN,
    normalizer::DATE_COLUMN,
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let Some(file_path) = args.get(1) else {
        return Err("usage: examine-workbook <workbook.xlsx>".into());
    };

    println!("Opening workbook: {file_path}");
    let mut importer = WorkbookImporter::open(file_path)?;

    println!("\nSheet names:");
    for (i, name) in importer.sheet_names().iter().enumerate() {
        let detected = Source::from_sheet_name(name)
            .map(|s| format!(" -> {s}"))
            .unwrap_or_default();
        println!("  {i}: {name}{detected}");
    }

    for source in Source::ALL {
        println!("\n{}", "=".repeat(80));
        let Some(sheet_name) = importer.find_sheet(source) else {
            println!("No {source} sheet found");
            continue;
        };
        println!("{source} sheet: {sheet_name}");
        println!("{}", "=".repeat(80));

        let sheet = importer.read_sheet(&sheet_name)?;
        println!("Data rows: {}", sheet.rows.len());
        println!("Normalized headers:");
        for (col_idx, header) in sheet.headers.iter().enumerate() {
            println!("  Col {:3}: {}", col_idx + 1, header);
        }

        let missing: Vec<&str> = EXPECTED_COLUMNS
            .iter()
            .copied()
            .filter(|column| sheet.column_index(column).is_none())
            .collect();
        if missing.is_empty() {
            println!("All expected columns present");
        } else {
            println!("Missing columns: {}", missing.join(", "));
        }

        let (records, stats) = normalizer::normalize_sheet(&sheet, source);
        println!(
            "Rows kept: {} / {} (dropped {}, unreadable money cells {})",
            stats.rows_kept, stats.rows_read, stats.rows_dropped, stats.money_fallbacks
        );
        println!("First records:");
        for record in records.iter().take(5) {
            println!(
                "  {:<10} {:<12} km {:>10.1}  {:>8.2} l  R$ {:>10.2}  {}",
                record.plate,
                record.fuel_type,
                record.odometer_km,
                record.liters,
                record.total_value,
                record
                    .date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".to_string())
            );
        }
    }

    Ok(())
}
