use axum::{extract::State, Json};
use std::sync::Arc;

use crate::{
    models::{Actor, StaffMember},
    AppError, AppResult, AppState,
};

/// GET /api/staff - active staff roster
#[utoipa::path(
    get,
    path = "/api/staff",
    responses(
        (status = 200, description = "Active staff members", body = Vec<StaffMember>)
    ),
    tag = "staff"
)]
pub async fn get_staff_list(
    State(state): State<Arc<AppState>>,
    _actor: Actor,
) -> AppResult<Json<Vec<StaffMember>>> {
    let staff = sqlx::query_as::<_, StaffMember>(
        r#"
        SELECT id, full_name, role, branch_id, is_active, created_at
        FROM staff_members
        WHERE is_active = true
        ORDER BY full_name
        "#,
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(staff))
}

/// GET /api/staff/me - the calling staff member
#[utoipa::path(
    get,
    path = "/api/staff/me",
    responses(
        (status = 200, description = "The calling staff member", body = StaffMember),
        (status = 401, description = "Unknown staff id")
    ),
    tag = "staff",
    security(("staff_header" = []))
)]
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    actor: Actor,
) -> AppResult<Json<StaffMember>> {
    let staff = sqlx::query_as::<_, StaffMember>(
        r#"
        SELECT id, full_name, role, branch_id, is_active, created_at
        FROM staff_members
        WHERE id = $1
        "#,
    )
    .bind(actor.staff_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound("Staff member not found".to_string()))?;

    Ok(Json(staff))
}
