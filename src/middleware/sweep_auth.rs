use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;

use crate::AppState;

/// Middleware that requires a valid X-Sweep-Key header.
///
/// The expiry sweep is driven by an out-of-process scheduler, not a
/// staff session, so it authenticates with a shared secret instead of
/// an actor id.
pub async fn require_sweep_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let expected_key = state.config.sweep_key.as_bytes();

    let provided_key = request
        .headers()
        .get("X-Sweep-Key")
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // Constant-time comparison to prevent timing attacks
    if expected_key.ct_eq(provided_key.as_bytes()).into() {
        Ok(next.run(request).await)
    } else {
        tracing::warn!("Unauthorized sweep endpoint access attempt");
        Err(StatusCode::UNAUTHORIZED)
    }
}
