mod orchestrator;
mod quality;

use std::sync::Arc;

pub use orchestrator::{ForecastService, ForecastServiceError};
pub use quality::QualityService;

use crate::{config::ForecastingConfig, db::DbPool, forecasting::ModelRegistry};

/// Service layer container, created once at startup.
#[derive(Clone)]
pub struct Services {
    pub forecasts: ForecastService,
    pub quality: QualityService,
}

impl Services {
    pub fn new(db: Arc<DbPool>, registry: Arc<ModelRegistry>, config: ForecastingConfig) -> Self {
        Self {
            forecasts: ForecastService::new(db.clone(), registry, config),
            quality: QualityService::new(db),
        }
    }
}
