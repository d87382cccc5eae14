//! SKU classification: volume (ABC), variability (XYZ), demand pattern,
//! forecastability, and the method recommendation the router reads.
//!
//! Everything here is a pure function of the validated training series plus
//! the caller-supplied revenue share. ABC ranking happens across a client's
//! whole catalog, so the orchestrator aggregates revenue and hands each item
//! its cumulative share.

use crate::forecasting::method;
use crate::models::{AbcClass, DailySeries, DemandPattern, SkuClassification, XyzClass};

/// Cumulative revenue share cutoffs for the Pareto classes.
const ABC_A_CUTOFF: f64 = 0.80;
const ABC_B_CUTOFF: f64 = 0.95;

/// CV cutoffs for XYZ.
const XYZ_X_CUTOFF: f64 = 0.5;
const XYZ_Y_CUTOFF: f64 = 1.0;

/// Syntetos-Boylan quadrant thresholds.
const ADI_REGULAR_THRESHOLD: f64 = 1.32;
const CV2_SMOOTH_THRESHOLD: f64 = 0.49;

/// Items with fewer than this share of non-zero days get a sparsity warning.
const SPARSE_DEMAND_SHARE: f64 = 0.10;

/// Classify an item from its validated series and its cumulative revenue
/// share within the client (0.0 ..= 1.0, lower = bigger earner).
pub fn classify_sku(series: &DailySeries, revenue_share: f64) -> SkuClassification {
    let values = series.values();
    let n = values.len() as f64;

    let mean_val = mean(values);
    let std_dev = std_dev(values, mean_val);
    let cv = if mean_val > 0.0 { std_dev / mean_val } else { 0.0 };

    let non_zero: Vec<f64> = values.iter().copied().filter(|v| *v > 0.0).collect();
    let zero_only = non_zero.is_empty();

    // Average demand interval: periods per demand event. A series with no
    // demand at all has no finite interval; we pin it to the window length
    // (the largest observable interval) and force the lumpy label.
    let adi = if zero_only {
        n
    } else {
        n / non_zero.len() as f64
    };

    // Squared coefficient of variation of demand *size*, non-zero days only.
    let cv_squared = if zero_only {
        0.0
    } else {
        let size_mean = mean(&non_zero);
        let size_var = variance_of(&non_zero, size_mean);
        if size_mean > 0.0 {
            size_var / (size_mean * size_mean)
        } else {
            0.0
        }
    };

    let demand_pattern = if zero_only {
        DemandPattern::Lumpy
    } else if adi < ADI_REGULAR_THRESHOLD {
        DemandPattern::Regular
    } else if cv_squared < CV2_SMOOTH_THRESHOLD {
        DemandPattern::Intermittent
    } else {
        DemandPattern::Lumpy
    };

    let abc_class = abc_from_share(revenue_share);
    let xyz_class = xyz_from_cv(cv);

    let forecastability_score = forecastability(cv, adi, demand_pattern);
    let expected_mape_range = expected_mape_range(abc_class, xyz_class, demand_pattern);

    let mut warnings = Vec::new();
    if zero_only {
        warnings.push("no demand observed in training window".to_string());
    }
    if cv >= XYZ_Y_CUTOFF {
        warnings.push(format!("high demand variability (CV {cv:.2} >= 1.0)"));
    }
    if adi >= ADI_REGULAR_THRESHOLD {
        warnings.push(format!("intermittent demand (ADI {adi:.2} >= 1.32)"));
    }
    let non_zero_share = non_zero.len() as f64 / n;
    if non_zero_share < SPARSE_DEMAND_SHARE {
        warnings.push(format!(
            "demand on only {:.1}% of days",
            non_zero_share * 100.0
        ));
    }

    let recommended_method =
        recommend_method(abc_class, xyz_class, demand_pattern).to_string();

    SkuClassification {
        abc_class,
        xyz_class,
        demand_pattern,
        adi,
        cv_squared,
        forecastability_score,
        recommended_method,
        expected_mape_range,
        warnings,
    }
}

/// Pareto class from a precomputed cumulative revenue share.
pub fn abc_from_share(cumulative_share: f64) -> AbcClass {
    if cumulative_share <= ABC_A_CUTOFF {
        AbcClass::A
    } else if cumulative_share <= ABC_B_CUTOFF {
        AbcClass::B
    } else {
        AbcClass::C
    }
}

fn xyz_from_cv(cv: f64) -> XyzClass {
    if cv < XYZ_X_CUTOFF {
        XyzClass::X
    } else if cv < XYZ_Y_CUTOFF {
        XyzClass::Y
    } else {
        XyzClass::Z
    }
}

/// Routing table: pattern first, then volume/variability for regular items.
fn recommend_method(abc: AbcClass, xyz: XyzClass, pattern: DemandPattern) -> &'static str {
    match pattern {
        DemandPattern::Lumpy => method::SBA,
        DemandPattern::Intermittent => method::CROSTON,
        DemandPattern::Regular => match (abc, xyz) {
            (AbcClass::C, XyzClass::Z) => method::MIN_MAX,
            (AbcClass::C, _) => method::MA7,
            _ => method::CHRONOS2,
        },
    }
}

/// Score in [0, 1], monotonically decreasing in CV and ADI, with a fixed
/// penalty for lumpy demand.
fn forecastability(cv: f64, adi: f64, pattern: DemandPattern) -> f64 {
    let cv_penalty = 0.4 * cv.min(2.0) / 2.0;
    let adi_penalty = 0.4 * (adi - 1.0).clamp(0.0, 3.0) / 3.0;
    let lumpy_penalty = if pattern == DemandPattern::Lumpy {
        0.2
    } else {
        0.0
    };
    (1.0 - cv_penalty - adi_penalty - lumpy_penalty).clamp(0.0, 1.0)
}

/// Expected MAPE band, in percent, keyed by the full classification.
/// Fixed lookup so the numbers are comparable across items and over time.
fn expected_mape_range(abc: AbcClass, xyz: XyzClass, pattern: DemandPattern) -> (f64, f64) {
    match pattern {
        DemandPattern::Regular => {
            let (low, high) = match xyz {
                XyzClass::X => (10.0, 20.0),
                XyzClass::Y => (15.0, 30.0),
                XyzClass::Z => (25.0, 45.0),
            };
            // Low-volume items score a bit worse in practice.
            if abc == AbcClass::C {
                (low + 5.0, high + 10.0)
            } else {
                (low, high)
            }
        }
        DemandPattern::Intermittent => (30.0, 60.0),
        DemandPattern::Lumpy => (45.0, 90.0),
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn variance_of(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
}

fn std_dev(values: &[f64], mean: f64) -> f64 {
    variance_of(values, mean).sqrt()
}
