use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// A raw per-item sales row as the ingestion pipeline stored it.
///
/// Dates are kept as text and units as nullable because ingestion makes no
/// promises beyond "one row per observation": the series validator owns
/// parsing, de-duplication, and gap filling.
#[derive(Debug, Clone)]
pub struct RawSalesRow {
    pub sale_date: String,
    pub units_sold: Option<f64>,
}

impl RawSalesRow {
    pub fn new(sale_date: impl Into<String>, units_sold: Option<f64>) -> Self {
        Self {
            sale_date: sale_date.into(),
            units_sold,
        }
    }
}

/// A gap-free daily series: one non-negative value per calendar day starting
/// at `start`. Only the validator constructs these, which is what lets every
/// downstream consumer (classifier, models) skip re-checking the invariants.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySeries {
    start: NaiveDate,
    values: Vec<f64>,
}

impl DailySeries {
    pub fn new(start: NaiveDate, values: Vec<f64>) -> Self {
        Self { start, values }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last date covered by the series.
    pub fn end(&self) -> NaiveDate {
        self.start + Duration::days(self.values.len() as i64 - 1)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Iterate (date, value) pairs in ascending date order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(i, v)| (self.start + Duration::days(i as i64), *v))
    }
}

/// What to do with missing values once the series has been reindexed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum NanPolicy {
    /// Treat missing as zero demand. The right default for sales series.
    Zero,
    /// Carry the last observed value forward.
    ForwardFill,
    /// Fill with a configured constant.
    Value { value: f64 },
    /// Reject the series instead of guessing.
    Error,
}

impl Default for NanPolicy {
    fn default() -> Self {
        NanPolicy::Zero
    }
}

/// Everything the validator did to a series, for callers that need to audit
/// or surface the cleanup.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub original_rows: usize,
    pub cleaned_rows: usize,
    pub filled_dates: usize,
    pub replaced_nans: usize,
    pub dropped_duplicates: usize,
    pub warnings: Vec<String>,
}
