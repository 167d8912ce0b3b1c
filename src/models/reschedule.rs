use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Workflow status of a reschedule request.
///
/// `Approved` is transient: the executor folds it into `Completed` within
/// the same unit of work, so it never appears as an at-rest status. It
/// still shows up in the state history for auditing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "TEXT", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    PendingBroadcast,
    PendingAcceptance,
    PendingApproval,
    Approved,
    Rejected,
    Cancelled,
    Expired,
    Completed,
}

impl RequestStatus {
    /// Terminal statuses admit no further transition; the request is
    /// read-only from then on.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RequestStatus::Approved
                | RequestStatus::Rejected
                | RequestStatus::Cancelled
                | RequestStatus::Expired
                | RequestStatus::Completed
        )
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RequestStatus::PendingBroadcast => "PENDING_BROADCAST",
            RequestStatus::PendingAcceptance => "PENDING_ACCEPTANCE",
            RequestStatus::PendingApproval => "PENDING_APPROVAL",
            RequestStatus::Approved => "APPROVED",
            RequestStatus::Rejected => "REJECTED",
            RequestStatus::Cancelled => "CANCELLED",
            RequestStatus::Expired => "EXPIRED",
            RequestStatus::Completed => "COMPLETED",
        };
        f.write_str(s)
    }
}

/// How the shift should change hands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "TEXT", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwapType {
    /// Broadcast to all eligible staff, first conflict-free acceptor wins.
    FindReplacement,
    /// Two named staff trade shifts, pending approval.
    DirectSwap,
    /// A manager hands the shift to a named staff member directly.
    ManagerAssign,
}

/// Informational urgency marker; has no effect on transition logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema, Default)]
#[sqlx(type_name = "TEXT", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

/// One entry in the append-only state history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StateChange {
    pub state: RequestStatus,
    pub changed_at: DateTime<Utc>,
    pub reason: Option<String>,
}

/// The shift-coverage negotiation aggregate. One request per shift
/// give-up; it reaches end-of-life by entering a terminal status, never
/// by deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RescheduleRequest {
    pub id: Uuid,
    pub original_shift_id: Uuid,
    pub requester_staff_id: Uuid,
    pub target_staff_id: Option<Uuid>,
    pub target_shift_id: Option<Uuid>,
    pub swap_type: SwapType,
    pub priority: Priority,
    pub reason: String,
    pub status: RequestStatus,
    pub rejection_reason: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub state_history: Vec<StateChange>,
    pub branch_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl RescheduleRequest {
    /// The most recent history entry. Non-empty by construction: creation
    /// seeds the history with the initial state.
    pub fn last_change(&self) -> &StateChange {
        self.state_history
            .last()
            .expect("state_history is seeded at creation and append-only")
    }
}
