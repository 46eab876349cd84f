use chrono::NaiveDate;

use crate::models::RefuelingRecord;

/// Value a selector uses to mean "do not filter"
pub const ALL: &str = "all";

/// A plate or fuel-type selector
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    /// Build a selection from user input; `"all"` (any case) or blank selects everything
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL) {
            Selection::All
        } else {
            Selection::Only(trimmed.to_uppercase())
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(expected) => expected == value,
        }
    }
}

/// Inclusive date range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// The user's filter selection for one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// `None` disables date filtering; undated records only survive then
    pub date_range: Option<DateRange>,
    pub plate: Selection,
    pub fuel_type: Selection,
}

impl FilterCriteria {
    /// Criteria from optional period bounds and selector values
    ///
    /// A missing bound leaves that side of the period open; with both
    /// missing, dates are not filtered at all.
    pub fn from_bounds(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        plate: &str,
        fuel_type: &str,
    ) -> Self {
        let date_range = match (start, end) {
            (None, None) => None,
            (start, end) => Some(DateRange::new(
                start.unwrap_or(NaiveDate::MIN),
                end.unwrap_or(NaiveDate::MAX),
            )),
        };
        Self {
            date_range,
            plate: Selection::parse(plate),
            fuel_type: Selection::parse(fuel_type),
        }
    }

    /// Validation messages for the user; none of them block filtering
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if let Some(range) = self.date_range.filter(DateRange::is_inverted) {
            warnings.push(format!(
                "Start date {} is after end date {}; the selection will likely be empty",
                range.start, range.end
            ));
        }
        warnings
    }

    pub fn matches(&self, record: &RefuelingRecord) -> bool {
        let date_ok = match self.date_range {
            None => true,
            Some(range) => record.date.is_some_and(|d| range.contains(d)),
        };
        date_ok && self.plate.matches(&record.plate) && self.fuel_type.matches(&record.fuel_type)
    }
}

/// Records matching `criteria`, as a new list; the input is left untouched
pub fn filter_records(records: &[RefuelingRecord], criteria: &FilterCriteria) -> Vec<RefuelingRecord> {
    records
        .iter()
        .filter(|record| criteria.matches(record))
        .cloned()
        .collect()
}
