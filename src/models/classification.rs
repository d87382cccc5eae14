use serde::{Deserialize, Serialize};

/// Pareto class by revenue contribution within a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbcClass {
    A,
    B,
    C,
}

impl AbcClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "A" => Self::A,
            "B" => Self::B,
            _ => Self::C,
        }
    }
}

/// Variability class by coefficient of variation of daily demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum XyzClass {
    X,
    Y,
    Z,
}

impl XyzClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::X => "X",
            Self::Y => "Y",
            Self::Z => "Z",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "X" => Self::X,
            "Y" => Self::Y,
            _ => Self::Z,
        }
    }
}

/// Demand shape derived from ADI and CV² (Syntetos-Boylan quadrants).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemandPattern {
    Regular,
    Intermittent,
    Lumpy,
}

impl DemandPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Intermittent => "intermittent",
            Self::Lumpy => "lumpy",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "regular" => Self::Regular,
            "intermittent" => Self::Intermittent,
            _ => Self::Lumpy,
        }
    }
}

/// Full per-SKU classification, stored as the source of truth for routing.
///
/// `recommended_method` records the engine's opinion; the method actually
/// executed is whatever the caller requested, so the two can disagree and
/// both remain observable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkuClassification {
    pub abc_class: AbcClass,
    pub xyz_class: XyzClass,
    pub demand_pattern: DemandPattern,
    pub adi: f64,
    pub cv_squared: f64,
    pub forecastability_score: f64,
    pub recommended_method: String,
    /// (low, high), both in percent.
    pub expected_mape_range: (f64, f64),
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abc_round_trip() {
        for class in [AbcClass::A, AbcClass::B, AbcClass::C] {
            assert_eq!(AbcClass::from_str(class.as_str()), class);
        }
    }

    #[test]
    fn test_pattern_serializes_snake_case() {
        let json = serde_json::to_string(&DemandPattern::Intermittent).unwrap();
        assert_eq!(json, "\"intermittent\"");
    }
}
