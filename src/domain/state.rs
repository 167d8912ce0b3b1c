//! The reschedule-request state machine.
//!
//! All transition legality lives in one table keyed by
//! `(current status, action)`. The executor in `service` decides *who*
//! may act (permissions) and *whether* side conditions hold (conflicts,
//! expiry); this module only answers whether a transition exists and
//! applies it to the aggregate.

use chrono::{DateTime, Utc};

use crate::error::{AppError, AppResult};
use crate::models::{RequestStatus, RescheduleRequest, StateChange};

/// Everything an actor can do to a reschedule request.
///
/// `Complete` is only ever applied by the executor itself, immediately
/// after `Approve`, once the shift reassignment is part of the same unit
/// of work. `Expire` is applied by the sweep or lazily on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestAction {
    Accept,
    Propose,
    Decline,
    Approve,
    Complete,
    Reject,
    Cancel,
    Expire,
}

impl std::fmt::Display for RequestAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RequestAction::Accept => "accept",
            RequestAction::Propose => "propose",
            RequestAction::Decline => "decline",
            RequestAction::Approve => "approve",
            RequestAction::Complete => "complete",
            RequestAction::Reject => "reject",
            RequestAction::Cancel => "cancel",
            RequestAction::Expire => "expire",
        };
        f.write_str(s)
    }
}

use self::RequestAction as A;
use crate::models::RequestStatus as S;

/// `(from, action) -> to`. Anything not listed is illegal.
const TRANSITIONS: &[(S, A, S)] = &[
    (S::PendingBroadcast, A::Accept, S::PendingApproval),
    (S::PendingAcceptance, A::Accept, S::PendingApproval),
    (S::PendingBroadcast, A::Propose, S::PendingAcceptance),
    (S::PendingAcceptance, A::Decline, S::PendingBroadcast),
    (S::PendingApproval, A::Approve, S::Approved),
    (S::Approved, A::Complete, S::Completed),
    (S::PendingApproval, A::Reject, S::Rejected),
    (S::PendingBroadcast, A::Cancel, S::Cancelled),
    (S::PendingAcceptance, A::Cancel, S::Cancelled),
    (S::PendingBroadcast, A::Expire, S::Expired),
    (S::PendingAcceptance, A::Expire, S::Expired),
    (S::PendingApproval, A::Expire, S::Expired),
];

/// Look up the successor status for `action` from `from`, if any.
pub fn next_status(from: RequestStatus, action: RequestAction) -> Option<RequestStatus> {
    TRANSITIONS
        .iter()
        .find(|(f, a, _)| *f == from && *a == action)
        .map(|(_, _, to)| *to)
}

/// Check that `action` has a row out of the request's current status,
/// returning the successor. The executor runs this before any
/// actor-specific rule so that acting on a finalized request reads as
/// `InvalidTransition`, not a permissions problem.
pub fn ensure_legal(request: &RescheduleRequest, action: RequestAction) -> AppResult<RequestStatus> {
    // The table has no rows out of a terminal status (the internal
    // Approved -> Completed fold excepted), so legality is decided
    // entirely by the lookup; the terminal branch only picks the message.
    next_status(request.status, action).ok_or_else(|| {
        if request.status.is_terminal() {
            AppError::InvalidTransition(format!(
                "request {} is {} and can no longer change",
                request.id, request.status
            ))
        } else {
            AppError::InvalidTransition(format!(
                "cannot {} a request in {}",
                action, request.status
            ))
        }
    })
}

/// Apply `action` to the request, appending exactly one history entry.
///
/// Fails with `InvalidTransition` and leaves the request untouched when
/// the request is terminal or the table has no row for
/// `(status, action)`.
pub fn apply(
    request: &mut RescheduleRequest,
    action: RequestAction,
    at: DateTime<Utc>,
    note: Option<String>,
) -> AppResult<()> {
    let to = ensure_legal(request, action)?;

    request.status = to;
    request.state_history.push(StateChange {
        state: to,
        changed_at: at,
        reason: note,
    });

    Ok(())
}
