use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Authority level of a staff member within their branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "TEXT", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StaffRole {
    Staff,
    Manager,
    Owner,
}

impl StaffRole {
    /// Managers and owners hold approval authority over reschedule requests.
    pub fn can_approve(&self) -> bool {
        matches!(self, StaffRole::Manager | StaffRole::Owner)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StaffMember {
    pub id: Uuid,
    pub full_name: String,
    pub role: StaffRole,
    pub branch_id: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// The resolved caller identity the workflow consumes. Session handling
/// lives upstream; by the time a request reaches the core it has been
/// reduced to an id and a role.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub staff_id: Uuid,
    pub role: StaffRole,
}
