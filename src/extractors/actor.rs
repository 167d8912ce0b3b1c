use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use moka::future::Cache;
use once_cell::sync::Lazy;
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::models::{Actor, StaffRole};
use crate::store::StaffDirectory;
use crate::AppState;

// Role lookups hit on every authenticated request; cache them briefly so
// a deactivation propagates within seconds without a query per call.
static ROLE_CACHE: Lazy<Cache<Uuid, StaffRole>> = Lazy::new(|| {
    Cache::builder()
        .time_to_live(Duration::from_secs(30))
        .max_capacity(10_000)
        .build()
});

/// Resolves the calling staff member from the `X-Staff-Id` header.
///
/// Session management lives at the gateway; by the time a request
/// reaches this service the caller identity is a plain header, and the
/// extractor only turns it into an id plus a role.
impl FromRequestParts<Arc<AppState>> for Actor {
    type Rejection = (StatusCode, axum::Json<serde_json::Value>);

    fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let raw = parts
            .headers
            .get("X-Staff-Id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let state = state.clone();

        async move {
            let raw = raw.ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    axum::Json(json!({"error": "Missing X-Staff-Id header"})),
                )
            })?;

            let staff_id = Uuid::parse_str(&raw).map_err(|_| {
                (
                    StatusCode::UNAUTHORIZED,
                    axum::Json(json!({"error": "X-Staff-Id must be a UUID"})),
                )
            })?;

            if let Some(role) = ROLE_CACHE.get(&staff_id).await {
                return Ok(Actor { staff_id, role });
            }

            let role = state
                .reschedule
                .store()
                .role_of(staff_id)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, %staff_id, "Staff role lookup failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        axum::Json(json!({"error": "Database error"})),
                    )
                })?
                .ok_or_else(|| {
                    tracing::warn!(%staff_id, "Unknown or inactive staff id on request");
                    (
                        StatusCode::UNAUTHORIZED,
                        axum::Json(json!({"error": "Unknown or inactive staff member"})),
                    )
                })?;

            ROLE_CACHE.insert(staff_id, role).await;

            Ok(Actor { staff_id, role })
        }
    }
}
