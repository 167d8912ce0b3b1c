pub mod metrics;
pub mod request_id;
pub mod sweep_auth;

pub use metrics::metrics_middleware;
pub use request_id::request_id_middleware;
pub use sweep_auth::require_sweep_key;
