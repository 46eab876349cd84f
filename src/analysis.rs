//! Pure computations over a loaded dataset: filtering, consumption
//! estimation and the aggregates behind the dashboard views.

pub mod aggregates;
pub mod consumption;
pub mod filter;

pub use consumption::estimate_consumption;
pub use filter::{filter_records, DateRange, FilterCriteria, Selection};

use tracing::{debug, warn};

use crate::models::{
    ConsumptionReport, DashboardView, Dataset, RecordTable, RefuelingRecord, Source, SourceView,
    SummaryMetrics,
};

/// Default number of entries in the consumption rankings
pub const DEFAULT_RANKING_SIZE: usize = 5;

fn logged_warnings(criteria: &FilterCriteria) -> Vec<String> {
    let warnings = criteria.warnings();
    for warning in &warnings {
        warn!("{}", warning);
    }
    warnings
}

fn source_view(source: Source, records: &[RefuelingRecord], ranking_size: usize) -> SourceView {
    let estimates = estimate_consumption(records);
    SourceView {
        source,
        monthly: aggregates::monthly_chart(records),
        by_vehicle: aggregates::by_vehicle_chart(records),
        by_fuel_type: aggregates::by_fuel_type_chart(records),
        consumption_top: aggregates::consumption_ranking(&estimates, ranking_size),
    }
}

/// Build every dashboard view for the records selected by `criteria`
pub fn build_dashboard(
    dataset: &Dataset,
    criteria: &FilterCriteria,
    ranking_size: usize,
) -> DashboardView {
    let warnings = logged_warnings(criteria);
    let internal = filter_records(&dataset.internal, criteria);
    let external = filter_records(&dataset.external, criteria);

    debug!(
        "Dashboard selection: {} internal, {} external records",
        internal.len(),
        external.len()
    );

    DashboardView {
        metrics: SummaryMetrics {
            internal: aggregates::source_totals(&internal),
            external: aggregates::source_totals(&external),
        },
        internal: source_view(Source::Internal, &internal, ranking_size),
        external: source_view(Source::External, &external, ranking_size),
        warnings,
    }
}

/// The filtered rows of one source
pub fn record_table(dataset: &Dataset, source: Source, criteria: &FilterCriteria) -> RecordTable {
    let records = filter_records(dataset.records(source), criteria);
    RecordTable {
        source,
        total: records.len(),
        records,
        warnings: logged_warnings(criteria),
    }
}

/// Every consumption estimate for both sources
pub fn consumption_report(dataset: &Dataset, criteria: &FilterCriteria) -> ConsumptionReport {
    ConsumptionReport {
        internal: estimate_consumption(&filter_records(&dataset.internal, criteria)),
        external: estimate_consumption(&filter_records(&dataset.external, criteria)),
        warnings: logged_warnings(criteria),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SheetStats, INSUFFICIENT_DATA};
    use chrono::{NaiveDate, Utc};

    fn record(source: Source, plate: &str, km: f64, liters: f64, day: u32) -> RefuelingRecord {
        RefuelingRecord {
            plate: plate.to_string(),
            fuel_type: "DIESEL".to_string(),
            odometer_km: km,
            liters,
            total_value: liters * 6.0,
            unit_value: 6.0,
            date: NaiveDate::from_ymd_opt(2024, 1, day),
            source,
        }
    }

    fn dataset() -> Dataset {
        Dataset {
            file_name: "abastecimentos.xlsx".to_string(),
            loaded_at: Utc::now(),
            internal: vec![
                record(Source::Internal, "ABC1234", 100.0, 10.0, 1),
                record(Source::Internal, "ABC1234", 150.0, 5.0, 10),
                record(Source::Internal, "ABC1234", 200.0, 10.0, 20),
            ],
            external: vec![record(Source::External, "DEF5678", 1000.0, 40.0, 5)],
            internal_stats: SheetStats::default(),
            external_stats: SheetStats::default(),
        }
    }

    #[test]
    fn test_build_dashboard_unfiltered() {
        let view = build_dashboard(&dataset(), &FilterCriteria::default(), DEFAULT_RANKING_SIZE);

        assert_eq!(view.metrics.internal.total_liters, 25.0);
        assert_eq!(view.metrics.internal.total_value, 150.0);
        assert_eq!(view.metrics.external.total_liters, 40.0);
        assert_eq!(view.internal.consumption_top.entries.len(), 1);
        assert!(
            (view.internal.consumption_top.entries[0].average_km_per_liter - 100.0 / 15.0).abs()
                < 1e-9
        );
        // a single external fill cannot produce an estimate
        assert!(view.external.consumption_top.entries.is_empty());
        assert_eq!(
            view.external.consumption_top.notice.as_deref(),
            Some(INSUFFICIENT_DATA)
        );
        assert!(view.warnings.is_empty());
    }

    #[test]
    fn test_build_dashboard_empty_selection() {
        let criteria = FilterCriteria {
            plate: Selection::parse("ZZZ0000"),
            ..FilterCriteria::default()
        };

        let view = build_dashboard(&dataset(), &criteria, DEFAULT_RANKING_SIZE);

        assert_eq!(view.metrics.internal.records, 0);
        assert_eq!(view.metrics.external.total_liters, 0.0);
        for source_view in [&view.internal, &view.external] {
            assert!(source_view.monthly.notice.is_some());
            assert!(source_view.by_vehicle.notice.is_some());
            assert!(source_view.by_fuel_type.notice.is_some());
            assert!(source_view.consumption_top.notice.is_some());
        }
    }

    #[test]
    fn test_inverted_range_reported() {
        let criteria = FilterCriteria {
            date_range: Some(DateRange::new(
                NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            )),
            ..FilterCriteria::default()
        };

        let table = record_table(&dataset(), Source::Internal, &criteria);

        assert_eq!(table.total, 0);
        assert_eq!(table.warnings.len(), 1);
    }

    #[test]
    fn test_record_table_filters_by_source() {
        let table = record_table(&dataset(), Source::External, &FilterCriteria::default());

        assert_eq!(table.source, Source::External);
        assert_eq!(table.total, 1);
        assert_eq!(table.records[0].plate, "DEF5678");
    }

    #[test]
    fn test_consumption_report_date_window() {
        let criteria = FilterCriteria {
            date_range: Some(DateRange::new(
                NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            )),
            ..FilterCriteria::default()
        };

        let report = consumption_report(&dataset(), &criteria);

        // only the fills at 150 and 200 km remain: 50 km on 10 l
        assert_eq!(report.internal.len(), 1);
        assert!((report.internal[0].average_km_per_liter - 5.0).abs() < 1e-9);
        assert!(report.external.is_empty());
    }
}
