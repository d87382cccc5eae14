//! Method registry and router.
//!
//! Read-only after startup: the registry owns the per-method configuration
//! (smoothing constants, min/max band, the pipeline handle) and constructs a
//! fresh model instance per item, so no model state leaks across items or
//! requests.

use std::sync::Arc;

use serde::Serialize;

use super::{
    Chronos2Model, ChronosPipeline, CrostonModel, ForecastModel, MinMaxModel, ModelFamily,
    MovingAverageModel, SbaModel, method,
};

/// Capability row for one registered method.
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub id: &'static str,
    pub family: ModelFamily,
    pub produces_quantiles: bool,
}

/// The routed sequence of methods for one item, plus any routing warnings
/// (an unknown primary falling back to the recommendation).
#[derive(Debug, Clone)]
pub struct MethodPlan {
    pub methods: Vec<String>,
    pub warnings: Vec<String>,
}

pub struct ModelRegistry {
    croston_alpha: f64,
    min_max_floor: f64,
    min_max_ceiling: f64,
    chronos: Arc<ChronosPipeline>,
}

impl ModelRegistry {
    pub fn new(
        croston_alpha: f64,
        min_max_floor: f64,
        min_max_ceiling: f64,
        chronos: Arc<ChronosPipeline>,
    ) -> Self {
        Self {
            croston_alpha,
            min_max_floor,
            min_max_ceiling,
            chronos,
        }
    }

    /// All registered method ids, in the stable run-all order.
    pub fn method_ids(&self) -> &'static [&'static str] {
        &method::ALL
    }

    pub fn contains(&self, id: &str) -> bool {
        method::ALL.contains(&id)
    }

    /// Construct a fresh, unfitted model for a method id.
    pub fn create(&self, id: &str) -> Option<Box<dyn ForecastModel>> {
        match id {
            method::CHRONOS2 => Some(Box::new(Chronos2Model::new(self.chronos.clone()))),
            method::MA7 => Some(Box::new(MovingAverageModel::new())),
            method::SBA => Some(Box::new(SbaModel::new(self.croston_alpha))),
            method::CROSTON => Some(Box::new(CrostonModel::new(self.croston_alpha))),
            method::MIN_MAX => Some(Box::new(MinMaxModel::new(
                self.min_max_floor,
                self.min_max_ceiling,
            ))),
            _ => None,
        }
    }

    /// Capabilities of every registered method.
    pub fn list_models(&self) -> Vec<ModelInfo> {
        method::ALL
            .iter()
            .filter_map(|id| self.create(id))
            .map(|model| ModelInfo {
                id: model.id(),
                family: model.family(),
                produces_quantiles: model.produces_quantiles(),
            })
            .collect()
    }

    /// The ordered method sequence for one item.
    ///
    /// `run_all` expands to every registered method. Otherwise the primary
    /// runs (falling back to `recommended` with a warning when the primary
    /// id is unknown), with the moving-average baseline appended when
    /// requested and not already present.
    pub fn plan(
        &self,
        primary: &str,
        include_baseline: bool,
        run_all: bool,
        recommended: &str,
    ) -> MethodPlan {
        if run_all {
            return MethodPlan {
                methods: method::ALL.iter().map(|id| id.to_string()).collect(),
                warnings: Vec::new(),
            };
        }

        let mut warnings = Vec::new();
        let effective = if self.contains(primary) {
            primary
        } else {
            warnings.push(format!(
                "unknown method '{primary}', falling back to recommended '{recommended}'"
            ));
            recommended
        };

        let mut methods = vec![effective.to_string()];
        if include_baseline && effective != method::MA7 {
            methods.push(method::MA7.to_string());
        }

        MethodPlan { methods, warnings }
    }
}
