//! Postgres-backed store for the reschedule workflow.
//!
//! Optimistic concurrency: every transition commit is an `UPDATE ...
//! WHERE id = $n AND status = $m`. Zero rows affected means another
//! actor (or the sweep) won the race, and the caller gets
//! `ConcurrentModification` with nothing written.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{RequestFilter, RequestStore, ShiftEffect, ShiftStore, StaffDirectory};
use crate::error::{AppError, AppResult};
use crate::models::{
    Priority, RequestStatus, RescheduleRequest, Shift, ShiftStatus, StaffMember, StateChange,
    SwapType,
};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RequestRow {
    id: Uuid,
    original_shift_id: Uuid,
    requester_staff_id: Uuid,
    target_staff_id: Option<Uuid>,
    target_shift_id: Option<Uuid>,
    swap_type: SwapType,
    priority: Priority,
    reason: String,
    status: RequestStatus,
    rejection_reason: Option<String>,
    expires_at: DateTime<Utc>,
    state_history: Json<Vec<StateChange>>,
    branch_id: Uuid,
    created_at: DateTime<Utc>,
}

impl From<RequestRow> for RescheduleRequest {
    fn from(row: RequestRow) -> Self {
        RescheduleRequest {
            id: row.id,
            original_shift_id: row.original_shift_id,
            requester_staff_id: row.requester_staff_id,
            target_staff_id: row.target_staff_id,
            target_shift_id: row.target_shift_id,
            swap_type: row.swap_type,
            priority: row.priority,
            reason: row.reason,
            status: row.status,
            rejection_reason: row.rejection_reason,
            expires_at: row.expires_at,
            state_history: row.state_history.0,
            branch_id: row.branch_id,
            created_at: row.created_at,
        }
    }
}

const REQUEST_COLUMNS: &str = r#"
    id, original_shift_id, requester_staff_id, target_staff_id, target_shift_id,
    swap_type, priority, reason, status, rejection_reason, expires_at,
    state_history, branch_id, created_at
"#;

const UNRESOLVED_STATUSES: [RequestStatus; 3] = [
    RequestStatus::PendingBroadcast,
    RequestStatus::PendingAcceptance,
    RequestStatus::PendingApproval,
];

#[async_trait]
impl RequestStore for PgStore {
    async fn insert_request(&self, request: &RescheduleRequest) -> AppResult<()> {
        sqlx::query(&format!(
            r#"
            INSERT INTO reschedule_requests ({REQUEST_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#
        ))
        .bind(request.id)
        .bind(request.original_shift_id)
        .bind(request.requester_staff_id)
        .bind(request.target_staff_id)
        .bind(request.target_shift_id)
        .bind(request.swap_type)
        .bind(request.priority)
        .bind(&request.reason)
        .bind(request.status)
        .bind(&request.rejection_reason)
        .bind(request.expires_at)
        .bind(Json(&request.state_history))
        .bind(request.branch_id)
        .bind(request.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_request(&self, id: Uuid) -> AppResult<Option<RescheduleRequest>> {
        let row = sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM reschedule_requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(RescheduleRequest::from))
    }

    async fn list_requests(&self, filter: &RequestFilter) -> AppResult<Vec<RescheduleRequest>> {
        let mut sql = format!(
            "SELECT {REQUEST_COLUMNS} FROM reschedule_requests WHERE 1=1"
        );
        let mut idx = 0;

        if !filter.statuses.is_empty() {
            let placeholders: Vec<String> = filter
                .statuses
                .iter()
                .map(|_| {
                    idx += 1;
                    format!("${idx}")
                })
                .collect();
            sql.push_str(&format!(" AND status IN ({})", placeholders.join(", ")));
        }
        if filter.requester_staff_id.is_some() {
            idx += 1;
            sql.push_str(&format!(" AND requester_staff_id = ${idx}"));
        }
        if filter.target_staff_id.is_some() {
            idx += 1;
            sql.push_str(&format!(" AND target_staff_id = ${idx}"));
        }
        if filter.branch_id.is_some() {
            idx += 1;
            sql.push_str(&format!(" AND branch_id = ${idx}"));
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut query = sqlx::query_as::<_, RequestRow>(&sql);
        for status in &filter.statuses {
            query = query.bind(*status);
        }
        if let Some(requester) = filter.requester_staff_id {
            query = query.bind(requester);
        }
        if let Some(target) = filter.target_staff_id {
            query = query.bind(target);
        }
        if let Some(branch) = filter.branch_id {
            query = query.bind(branch);
        }

        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(RescheduleRequest::from).collect())
    }

    async fn find_unresolved_for_shift(
        &self,
        shift_id: Uuid,
    ) -> AppResult<Option<RescheduleRequest>> {
        let row = sqlx::query_as::<_, RequestRow>(&format!(
            r#"
            SELECT {REQUEST_COLUMNS} FROM reschedule_requests
            WHERE original_shift_id = $1 AND status IN ($2, $3, $4)
            LIMIT 1
            "#
        ))
        .bind(shift_id)
        .bind(UNRESOLVED_STATUSES[0])
        .bind(UNRESOLVED_STATUSES[1])
        .bind(UNRESOLVED_STATUSES[2])
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(RescheduleRequest::from))
    }

    async fn list_lapsed(&self, now: DateTime<Utc>) -> AppResult<Vec<RescheduleRequest>> {
        let rows = sqlx::query_as::<_, RequestRow>(&format!(
            r#"
            SELECT {REQUEST_COLUMNS} FROM reschedule_requests
            WHERE status IN ($1, $2, $3) AND expires_at < $4
            ORDER BY expires_at
            "#
        ))
        .bind(UNRESOLVED_STATUSES[0])
        .bind(UNRESOLVED_STATUSES[1])
        .bind(UNRESOLVED_STATUSES[2])
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(RescheduleRequest::from).collect())
    }

    async fn commit_transition(
        &self,
        updated: &RescheduleRequest,
        expected: RequestStatus,
        effects: &[ShiftEffect],
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let rows = sqlx::query(
            r#"
            UPDATE reschedule_requests
            SET status = $1, target_staff_id = $2, target_shift_id = $3,
                reason = $4, priority = $5, rejection_reason = $6, state_history = $7
            WHERE id = $8 AND status = $9
            "#,
        )
        .bind(updated.status)
        .bind(updated.target_staff_id)
        .bind(updated.target_shift_id)
        .bind(&updated.reason)
        .bind(updated.priority)
        .bind(&updated.rejection_reason)
        .bind(Json(&updated.state_history))
        .bind(updated.id)
        .bind(expected)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if rows == 0 {
            // Dropping the transaction rolls it back.
            return Err(AppError::ConcurrentModification);
        }

        for effect in effects {
            match effect {
                ShiftEffect::Reassign {
                    shift_id,
                    to_staff_id,
                } => {
                    let rows = sqlx::query(
                        "UPDATE shifts SET staff_id = $1 WHERE id = $2 AND status = $3",
                    )
                    .bind(to_staff_id)
                    .bind(shift_id)
                    .bind(ShiftStatus::Scheduled)
                    .execute(&mut *tx)
                    .await?
                    .rows_affected();

                    if rows == 0 {
                        return Err(AppError::ShiftReassignment(format!(
                            "shift {} is no longer reschedulable",
                            shift_id
                        )));
                    }
                }
            }
        }

        tx.commit().await.map_err(|e| {
            tracing::error!(
                error = %e,
                request_id = %updated.id,
                "Failed to commit reschedule transition"
            );
            AppError::Database(e)
        })?;

        Ok(())
    }
}

#[async_trait]
impl ShiftStore for PgStore {
    async fn get_shift(&self, id: Uuid) -> AppResult<Option<Shift>> {
        let shift = sqlx::query_as::<_, Shift>(
            r#"
            SELECT id, staff_id, branch_id, label, starts_at, ends_at, status, created_at
            FROM shifts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(shift)
    }

    async fn shifts_for_staff(
        &self,
        staff_id: Uuid,
        status: ShiftStatus,
    ) -> AppResult<Vec<Shift>> {
        let shifts = sqlx::query_as::<_, Shift>(
            r#"
            SELECT id, staff_id, branch_id, label, starts_at, ends_at, status, created_at
            FROM shifts
            WHERE staff_id = $1 AND status = $2
            ORDER BY starts_at
            "#,
        )
        .bind(staff_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(shifts)
    }
}

#[async_trait]
impl StaffDirectory for PgStore {
    async fn get_staff(&self, id: Uuid) -> AppResult<Option<StaffMember>> {
        let staff = sqlx::query_as::<_, StaffMember>(
            r#"
            SELECT id, full_name, role, branch_id, is_active, created_at
            FROM staff_members
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(staff)
    }
}
