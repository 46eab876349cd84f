use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::Datelike;

use crate::models::{
    CategoryChart, CategoryPoint, ConsumptionEstimate, ConsumptionRanking, FilterOptions,
    MonthlyChart, MonthlyPoint, RefuelingRecord, SourceTotals, INSUFFICIENT_DATA,
};

fn notice_if_empty(is_empty: bool) -> Option<String> {
    is_empty.then(|| INSUFFICIENT_DATA.to_string())
}

/// Normalize -0.0 to 0.0 for cleaner responses
fn normalize_zero(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}

pub fn source_totals(records: &[RefuelingRecord]) -> SourceTotals {
    SourceTotals {
        records: records.len(),
        total_liters: normalize_zero(records.iter().map(|r| r.liters).sum()),
        total_value: normalize_zero(records.iter().map(|r| r.total_value).sum()),
    }
}

#[derive(Default)]
struct MonthAccumulator {
    liters: f64,
    total_value: f64,
    unit_value_sum: f64,
    unit_value_count: usize,
}

/// Liters, value and mean unit price per calendar month; undated records are skipped
pub fn monthly_chart(records: &[RefuelingRecord]) -> MonthlyChart {
    let mut months: BTreeMap<(i32, u32), MonthAccumulator> = BTreeMap::new();

    for record in records {
        let Some(date) = record.date else { continue };
        let month = months.entry((date.year(), date.month())).or_default();
        month.liters += record.liters;
        month.total_value += record.total_value;
        if record.unit_value > 0.0 {
            month.unit_value_sum += record.unit_value;
            month.unit_value_count += 1;
        }
    }

    let points: Vec<MonthlyPoint> = months
        .into_iter()
        .map(|((year, month), acc)| MonthlyPoint {
            month: format!("{year:04}-{month:02}"),
            liters: normalize_zero(acc.liters),
            total_value: normalize_zero(acc.total_value),
            average_unit_value: (acc.unit_value_count > 0)
                .then(|| acc.unit_value_sum / acc.unit_value_count as f64),
        })
        .collect();

    MonthlyChart {
        notice: notice_if_empty(points.is_empty()),
        points,
    }
}

fn category_chart<'a>(
    records: impl Iterator<Item = &'a RefuelingRecord>,
    key: impl Fn(&RefuelingRecord) -> &str,
) -> CategoryChart {
    let mut groups: HashMap<&str, (f64, f64)> = HashMap::new();
    for record in records {
        let entry = groups.entry(key(record)).or_default();
        entry.0 += record.liters;
        entry.1 += record.total_value;
    }

    let mut points: Vec<CategoryPoint> = groups
        .into_iter()
        .map(|(label, (liters, total_value))| CategoryPoint {
            label: label.to_string(),
            liters: normalize_zero(liters),
            total_value: normalize_zero(total_value),
        })
        .collect();

    // Liters descending, label ascending for ties so output is deterministic
    points.sort_by(|a, b| b.liters.total_cmp(&a.liters).then_with(|| a.label.cmp(&b.label)));

    CategoryChart {
        notice: notice_if_empty(points.is_empty()),
        points,
    }
}

/// Liters and value per vehicle; records without a vehicle are skipped
pub fn by_vehicle_chart(records: &[RefuelingRecord]) -> CategoryChart {
    category_chart(records.iter().filter(|r| r.has_vehicle()), |r| r.plate.as_str())
}

pub fn by_fuel_type_chart(records: &[RefuelingRecord]) -> CategoryChart {
    category_chart(records.iter(), |r| r.fuel_type.as_str())
}

/// The `size` best consumption estimates (estimates arrive sorted)
pub fn consumption_ranking(estimates: &[ConsumptionEstimate], size: usize) -> ConsumptionRanking {
    let entries: Vec<ConsumptionEstimate> = estimates.iter().take(size).cloned().collect();
    ConsumptionRanking {
        notice: notice_if_empty(entries.is_empty()),
        entries,
    }
}

/// Values available for the plate and fuel-type selectors, plus the date bounds
pub fn filter_options<'a>(records: impl IntoIterator<Item = &'a RefuelingRecord>) -> FilterOptions {
    let mut plates = BTreeSet::new();
    let mut fuel_types = BTreeSet::new();
    let mut first_date = None;
    let mut last_date = None;

    for record in records {
        if record.has_vehicle() {
            plates.insert(record.plate.clone());
        }
        fuel_types.insert(record.fuel_type.clone());
        if let Some(date) = record.date {
            first_date = Some(first_date.map_or(date, |d: chrono::NaiveDate| d.min(date)));
            last_date = Some(last_date.map_or(date, |d: chrono::NaiveDate| d.max(date)));
        }
    }

    FilterOptions {
        plates: plates.into_iter().collect(),
        fuel_types: fuel_types.into_iter().collect(),
        first_date,
        last_date,
    }
}
