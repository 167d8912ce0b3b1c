pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod service;
pub mod startup;
pub mod store;

use std::sync::Arc;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use handlers::MetricsState;
pub use service::RescheduleService;
pub use store::postgres::PgStore;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub reschedule: RescheduleService<PgStore>,
    pub config: AppConfig,
    pub metrics: Arc<MetricsState>,
}
