pub mod types;
pub mod repository;
pub mod service;

pub use types::{AnalyticsSnapshot, Distribution, AGE_BANDS};
pub use repository::{AnalyticsRepository, SqliteAnalyticsRepository};
pub use service::{AnalyticsService, AnalyticsServiceImpl};
