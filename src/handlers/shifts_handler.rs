use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    models::{Actor, Shift},
    AppError, AppResult, AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct GetShiftsQuery {
    #[serde(rename = "staffId")]
    pub staff_id: Option<Uuid>,
    #[serde(rename = "branchId")]
    pub branch_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// GET /api/shifts?staffId=&branchId=&from=&to=
#[utoipa::path(
    get,
    path = "/api/shifts",
    params(GetShiftsQuery),
    responses(
        (status = 200, description = "Shifts matching the filters, ordered by start time", body = Vec<Shift>)
    ),
    tag = "shifts"
)]
pub async fn get_shifts(
    State(state): State<Arc<AppState>>,
    _actor: Actor,
    Query(query): Query<GetShiftsQuery>,
) -> AppResult<Json<Vec<Shift>>> {
    let mut sql = String::from(
        r#"
        SELECT id, staff_id, branch_id, label, starts_at, ends_at, status, created_at
        FROM shifts
        WHERE 1=1
        "#,
    );
    let mut idx = 0;

    if query.staff_id.is_some() {
        idx += 1;
        sql.push_str(&format!(" AND staff_id = ${idx}"));
    }
    if query.branch_id.is_some() {
        idx += 1;
        sql.push_str(&format!(" AND branch_id = ${idx}"));
    }
    if query.from.is_some() {
        idx += 1;
        sql.push_str(&format!(" AND ends_at > ${idx}"));
    }
    if query.to.is_some() {
        idx += 1;
        sql.push_str(&format!(" AND starts_at < ${idx}"));
    }
    sql.push_str(" ORDER BY starts_at");

    let mut query_builder = sqlx::query_as::<_, Shift>(&sql);
    if let Some(staff_id) = query.staff_id {
        query_builder = query_builder.bind(staff_id);
    }
    if let Some(branch_id) = query.branch_id {
        query_builder = query_builder.bind(branch_id);
    }
    if let Some(from) = query.from {
        query_builder = query_builder.bind(from);
    }
    if let Some(to) = query.to {
        query_builder = query_builder.bind(to);
    }

    let shifts = query_builder.fetch_all(&state.db).await?;

    tracing::debug!(count = shifts.len(), "Fetched shifts");
    Ok(Json(shifts))
}

/// GET /api/shifts/{id}
#[utoipa::path(
    get,
    path = "/api/shifts/{id}",
    params(("id" = Uuid, Path, description = "Shift ID")),
    responses(
        (status = 200, description = "The shift", body = Shift),
        (status = 404, description = "Shift not found")
    ),
    tag = "shifts"
)]
pub async fn get_shift(
    State(state): State<Arc<AppState>>,
    _actor: Actor,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Shift>> {
    let shift = sqlx::query_as::<_, Shift>(
        r#"
        SELECT id, staff_id, branch_id, label, starts_at, ends_at, status, created_at
        FROM shifts
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Shift {} not found", id)))?;

    Ok(Json(shift))
}
