//! Series validation and normalization.
//!
//! Turns the raw rows ingestion stored into a gap-free, strictly numeric
//! daily series, or rejects them with a report of what went wrong. The
//! cleanup order is fixed (parse, sort, de-dup, reindex, fill, clip,
//! minimum-history check) because the ML models downstream require exactly
//! these preconditions and the statistical models tolerate sparsity but
//! not missing values.

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{DailySeries, NanPolicy, RawSalesRow, ValidationReport};

/// Date format used by the ingestion pipeline.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Knobs for a validation pass. Defaults match what demand series need:
/// fill gaps, treat missing as zero demand, require 30 days of history.
#[derive(Debug, Clone)]
pub struct ValidatorOptions {
    pub fill_missing_dates: bool,
    pub nan_policy: NanPolicy,
    pub min_history_days: usize,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            fill_missing_dates: true,
            nan_policy: NanPolicy::Zero,
            min_history_days: 30,
        }
    }
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("insufficient history: {actual} days after cleanup, need at least {required}")]
    InsufficientHistory {
        actual: usize,
        required: usize,
        report: ValidationReport,
    },

    #[error("invalid series: {reason}")]
    InvalidSeries {
        reason: String,
        report: ValidationReport,
    },
}

impl ValidationError {
    /// The cleanup report accumulated before the series was rejected.
    pub fn report(&self) -> &ValidationReport {
        match self {
            Self::InsufficientHistory { report, .. } => report,
            Self::InvalidSeries { report, .. } => report,
        }
    }
}

/// Validate and normalize one item's raw sales rows.
///
/// On success the returned series has continuous daily timestamps, no
/// missing values, no negatives, and at least `min_history_days` points.
pub fn validate_series(
    rows: &[RawSalesRow],
    options: &ValidatorOptions,
) -> Result<(DailySeries, ValidationReport), ValidationError> {
    let mut report = ValidationReport {
        original_rows: rows.len(),
        ..Default::default()
    };

    // Parse dates, dropping rows we cannot interpret.
    let mut parsed: Vec<(NaiveDate, Option<f64>)> = Vec::with_capacity(rows.len());
    let mut unparseable = 0usize;
    for row in rows {
        match NaiveDate::parse_from_str(row.sale_date.trim(), DATE_FORMAT) {
            Ok(date) => parsed.push((date, row.units_sold)),
            Err(_) => unparseable += 1,
        }
    }
    if unparseable > 0 {
        report
            .warnings
            .push(format!("unparseable_dates_dropped:{unparseable}"));
    }
    if parsed.is_empty() {
        return Err(ValidationError::InvalidSeries {
            reason: "no rows with parseable dates".to_string(),
            report,
        });
    }

    // Sort ascending; stable sort keeps first occurrence first for de-dup.
    parsed.sort_by_key(|(date, _)| *date);

    // Keep the first occurrence of each date.
    let mut deduped: Vec<(NaiveDate, Option<f64>)> = Vec::with_capacity(parsed.len());
    for (date, value) in parsed {
        match deduped.last() {
            Some((last, _)) if *last == date => report.dropped_duplicates += 1,
            _ => deduped.push((date, value)),
        }
    }

    // Daily frequency is required. Gaps are either filled below or flagged.
    let start = deduped[0].0;
    let end = deduped[deduped.len() - 1].0;
    let span_days = (end - start).num_days() as usize + 1;
    let gap_days = span_days - deduped.len();
    if gap_days > 0 && !options.fill_missing_dates {
        report
            .warnings
            .push(format!("irregular_frequency_gaps:{gap_days}"));
    }

    // Reindex over the continuous daily range, inserting missing points.
    let values: Vec<Option<f64>> = if options.fill_missing_dates && gap_days > 0 {
        let mut reindexed = vec![None; span_days];
        for (date, value) in &deduped {
            let offset = (*date - start).num_days() as usize;
            reindexed[offset] = *value;
        }
        report.filled_dates = gap_days;
        reindexed
    } else {
        deduped.iter().map(|(_, value)| *value).collect()
    };

    // Missing values that came in as NULL rows (as opposed to inserted
    // dates) are what the NaN policy is really about; both go through it.
    let originally_missing = values
        .iter()
        .filter(|value| value.map_or(true, |v| v.is_nan()))
        .count()
        .saturating_sub(report.filled_dates);
    report.replaced_nans = originally_missing;

    let mut filled: Vec<f64> = Vec::with_capacity(values.len());
    let mut last_valid: Option<f64> = None;
    let mut leading_fallback = 0usize;
    for value in &values {
        let resolved = match value {
            Some(v) if !v.is_nan() => {
                last_valid = Some(*v);
                *v
            }
            _ => match options.nan_policy {
                NanPolicy::Zero => 0.0,
                NanPolicy::Value { value } => value,
                NanPolicy::ForwardFill => match last_valid {
                    Some(v) => v,
                    None => {
                        leading_fallback += 1;
                        0.0
                    }
                },
                NanPolicy::Error => {
                    return Err(ValidationError::InvalidSeries {
                        reason: "series contains missing values and the fill policy is 'error'"
                            .to_string(),
                        report,
                    });
                }
            },
        };
        filled.push(resolved);
    }
    if leading_fallback > 0 {
        report
            .warnings
            .push(format!("leading_missing_zero_filled:{leading_fallback}"));
    }

    // Demand cannot be negative; clip and record.
    let mut negatives = 0usize;
    for value in &mut filled {
        if *value < 0.0 {
            *value = 0.0;
            negatives += 1;
        }
    }
    if negatives > 0 {
        report
            .warnings
            .push(format!("negative_values_clipped:{negatives}"));
    }

    report.cleaned_rows = filled.len();

    if filled.len() < options.min_history_days {
        return Err(ValidationError::InsufficientHistory {
            actual: filled.len(),
            required: options.min_history_days,
            report,
        });
    }

    Ok((DailySeries::new(start, filled), report))
}
