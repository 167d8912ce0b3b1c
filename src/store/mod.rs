//! Persistence traits the reschedule workflow runs against.
//!
//! The workflow core never talks to a database directly: it loads a
//! request, decides the transition, and hands the updated aggregate back
//! through [`RequestStore::commit_transition`] together with the shift
//! effects that must land in the same unit of work. Implementations
//! guarantee compare-and-swap semantics on `(id, expected status)` so
//! racing actors get at most one winner.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{
    RequestStatus, RescheduleRequest, Shift, ShiftStatus, StaffMember, StaffRole,
};

pub mod postgres;

/// A shift mutation that must commit atomically with a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftEffect {
    /// Hand the shift to a new holder. The previous holder's assignment
    /// is released by the same write.
    Reassign { shift_id: Uuid, to_staff_id: Uuid },
}

/// Filter for request listings. Empty `statuses` matches any status.
#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    pub statuses: Vec<RequestStatus>,
    pub requester_staff_id: Option<Uuid>,
    pub target_staff_id: Option<Uuid>,
    pub branch_id: Option<Uuid>,
}

#[async_trait]
pub trait RequestStore: Send + Sync {
    async fn insert_request(&self, request: &RescheduleRequest) -> AppResult<()>;

    async fn get_request(&self, id: Uuid) -> AppResult<Option<RescheduleRequest>>;

    async fn list_requests(&self, filter: &RequestFilter) -> AppResult<Vec<RescheduleRequest>>;

    /// The unresolved negotiation for a shift, if one exists. At most one
    /// is ever live per shift.
    async fn find_unresolved_for_shift(
        &self,
        shift_id: Uuid,
    ) -> AppResult<Option<RescheduleRequest>>;

    /// Unresolved requests whose deadline has passed, for the sweep.
    async fn list_lapsed(&self, now: DateTime<Utc>) -> AppResult<Vec<RescheduleRequest>>;

    /// Persist `updated` only if the stored row still carries `expected`
    /// as its status, applying `effects` in the same transaction.
    ///
    /// Errors: `ConcurrentModification` when the status moved underneath
    /// the caller, `ShiftReassignment` when an effect cannot be applied;
    /// in both cases nothing is written.
    async fn commit_transition(
        &self,
        updated: &RescheduleRequest,
        expected: RequestStatus,
        effects: &[ShiftEffect],
    ) -> AppResult<()>;
}

#[async_trait]
pub trait ShiftStore: Send + Sync {
    async fn get_shift(&self, id: Uuid) -> AppResult<Option<Shift>>;

    async fn shifts_for_staff(&self, staff_id: Uuid, status: ShiftStatus)
        -> AppResult<Vec<Shift>>;
}

#[async_trait]
pub trait StaffDirectory: Send + Sync {
    async fn get_staff(&self, id: Uuid) -> AppResult<Option<StaffMember>>;

    /// Role of an active staff member; `None` for unknown or deactivated
    /// ids.
    async fn role_of(&self, id: Uuid) -> AppResult<Option<StaffRole>> {
        Ok(self
            .get_staff(id)
            .await?
            .filter(|staff| staff.is_active)
            .map(|staff| staff.role))
    }
}
