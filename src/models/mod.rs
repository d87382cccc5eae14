mod classification;
mod forecast;
mod quality;
mod series;

pub use classification::{AbcClass, DemandPattern, SkuClassification, XyzClass};
pub use forecast::{
    ActualObservation, BackfillActualsRequest, BackfillActualsResponse, CreateForecastRun,
    ForecastResultRow, ForecastRun, GenerateForecastRequest, GenerateForecastResponse,
    ItemFailure, ItemFailureKind, ItemForecast, Prediction, PredictionOut, Quantiles,
    QuantilesOut, RunStatus,
};
pub use quality::MethodQuality;
pub use series::{DailySeries, NanPolicy, RawSalesRow, ValidationReport};
