//! Pure actor-permission checks for reschedule actions.
//!
//! Storage never enters the picture: callers hand over the request as
//! read, plus the resolved actor id and role. A `false` here surfaces as
//! `PermissionDenied`; transition legality is checked separately.

use uuid::Uuid;

use super::state::RequestAction;
use crate::models::{RequestStatus, RescheduleRequest, StaffRole};

/// May `actor` perform `action` on `request` right now?
pub fn can_perform(
    action: RequestAction,
    request: &RescheduleRequest,
    role: StaffRole,
    actor_id: Uuid,
) -> bool {
    // Terminal requests deny everything, regardless of role.
    if request.status.is_terminal() {
        return false;
    }

    let is_requester = actor_id == request.requester_staff_id;

    match action {
        RequestAction::Accept => match request.status {
            // An open broadcast may be taken by anyone but the requester.
            // Once a target is named (direct swap, or a directed offer)
            // only that staff member may take it.
            RequestStatus::PendingBroadcast => {
                !is_requester
                    && request
                        .target_staff_id
                        .map_or(true, |target| target == actor_id)
            }
            RequestStatus::PendingAcceptance => request.target_staff_id == Some(actor_id),
            _ => false,
        },
        RequestAction::Propose => {
            request.status == RequestStatus::PendingBroadcast && is_requester
        }
        RequestAction::Decline => {
            request.status == RequestStatus::PendingAcceptance
                && request.target_staff_id == Some(actor_id)
        }
        RequestAction::Approve | RequestAction::Reject => {
            // No self-approval restriction: a manager who requested the
            // reschedule may still decide it.
            request.status == RequestStatus::PendingApproval && role.can_approve()
        }
        RequestAction::Cancel => {
            matches!(
                request.status,
                RequestStatus::PendingBroadcast | RequestStatus::PendingAcceptance
            ) && is_requester
        }
        // Completion is executor-internal, never actor-initiated. Expiry
        // is driven by the clock, not an actor.
        RequestAction::Complete | RequestAction::Expire => false,
    }
}

/// May `actor` still edit the mutable fields (reason, priority)?
pub fn can_edit(request: &RescheduleRequest, actor_id: Uuid) -> bool {
    request.status == RequestStatus::PendingBroadcast && actor_id == request.requester_staff_id
}
