mod classifications;
mod results;
mod runs;
mod sales;

use chrono::NaiveDate;

pub use classifications::SkuClassificationRepo;
pub use results::{ForecastResultRepo, ScoredResult};
pub use runs::ForecastRunRepo;
pub use sales::{ItemRevenue, SalesHistoryRepo};

/// Optional date bounds for read queries. `None` on either side means
/// unbounded in that direction.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateWindow {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }
}
