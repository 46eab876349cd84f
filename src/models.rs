use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Plate values that stand for "no vehicle" (tank fills, missing data)
pub const NO_VEHICLE_PLATES: [&str; 3] = ["-", "N/A", ""];

/// Fuel type used when the sheet has no value for it
pub const UNKNOWN_FUEL_TYPE: &str = "N/A";

/// Message attached to charts and rankings that have nothing to show
pub const INSUFFICIENT_DATA: &str = "Insufficient data for the selected filters";

/// Which sheet a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Internal,
    External,
}

impl Source {
    pub const ALL: [Source; 2] = [Source::Internal, Source::External];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Internal => "internal",
            Source::External => "external",
        }
    }

    /// Detect the source from a sheet name ("Abastecimento Interno", "EXTERNAL", ...)
    pub fn from_sheet_name(sheet_name: &str) -> Option<Self> {
        let lower = sheet_name.to_lowercase();
        if lower.contains("interno") || lower.contains("internal") {
            Some(Source::Internal)
        } else if lower.contains("externo") || lower.contains("external") {
            Some(Source::External)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "internal" | "interno" => Ok(Source::Internal),
            "external" | "externo" => Ok(Source::External),
            other => Err(format!("unknown source: {other}")),
        }
    }
}

/// A single normalized refueling event
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RefuelingRecord {
    pub plate: String,
    pub fuel_type: String,
    pub odometer_km: f64,
    pub liters: f64,
    pub total_value: f64,
    pub unit_value: f64,
    pub date: Option<NaiveDate>,
    pub source: Source,
}

impl RefuelingRecord {
    /// Whether the record belongs to an identifiable vehicle
    pub fn has_vehicle(&self) -> bool {
        !NO_VEHICLE_PLATES.contains(&self.plate.as_str())
    }
}

/// Row accounting for one normalized sheet
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct SheetStats {
    pub sheet_name: String,
    pub rows_read: usize,
    pub rows_kept: usize,
    pub rows_dropped: usize,
    /// Monetary cells that could not be parsed and were counted as 0.0
    pub money_fallbacks: usize,
}

/// The normalized contents of one uploaded workbook
#[derive(Debug, Clone)]
pub struct Dataset {
    pub file_name: String,
    pub loaded_at: DateTime<Utc>,
    pub internal: Vec<RefuelingRecord>,
    pub external: Vec<RefuelingRecord>,
    pub internal_stats: SheetStats,
    pub external_stats: SheetStats,
}

impl Dataset {
    pub fn records(&self, source: Source) -> &[RefuelingRecord] {
        match source {
            Source::Internal => &self.internal,
            Source::External => &self.external,
        }
    }

    pub fn overview(&self) -> DatasetOverview {
        DatasetOverview {
            file_name: self.file_name.clone(),
            loaded_at: self.loaded_at,
            internal: self.internal_stats.clone(),
            external: self.external_stats.clone(),
        }
    }
}

// API response DTOs

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DatasetOverview {
    pub file_name: String,
    pub loaded_at: DateTime<Utc>,
    pub internal: SheetStats,
    pub external: SheetStats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct SourceTotals {
    pub records: usize,
    pub total_liters: f64,
    pub total_value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct SummaryMetrics {
    pub internal: SourceTotals,
    pub external: SourceTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MonthlyPoint {
    /// Calendar month as `YYYY-MM`
    pub month: String,
    pub liters: f64,
    pub total_value: f64,
    pub average_unit_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MonthlyChart {
    pub points: Vec<MonthlyPoint>,
    pub notice: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CategoryPoint {
    pub label: String,
    pub liters: f64,
    pub total_value: f64,
}

/// Bar/pie chart data keyed by a category (plate or fuel type)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CategoryChart {
    pub points: Vec<CategoryPoint>,
    pub notice: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ConsumptionEstimate {
    pub plate: String,
    pub fuel_type: String,
    pub average_km_per_liter: f64,
    pub total_distance_km: f64,
    pub total_liters: f64,
    pub valid_pairs: usize,
    pub discarded_pairs: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ConsumptionRanking {
    pub entries: Vec<ConsumptionEstimate>,
    pub notice: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SourceView {
    pub source: Source,
    pub monthly: MonthlyChart,
    pub by_vehicle: CategoryChart,
    pub by_fuel_type: CategoryChart,
    pub consumption_top: ConsumptionRanking,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DashboardView {
    pub metrics: SummaryMetrics,
    pub internal: SourceView,
    pub external: SourceView,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FilterOptions {
    pub plates: Vec<String>,
    pub fuel_types: Vec<String>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecordTable {
    pub source: Source,
    pub total: usize,
    pub records: Vec<RefuelingRecord>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ConsumptionReport {
    pub internal: Vec<ConsumptionEstimate>,
    pub external: Vec<ConsumptionEstimate>,
    pub warnings: Vec<String>,
}
