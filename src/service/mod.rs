//! The reschedule transition executor.
//!
//! Every mutating operation follows the same shape: load the request,
//! gate on expiry, check transition legality, check actor permission,
//! check side conditions (conflicts, targets), apply the transition to
//! the in-memory aggregate, then commit through the store with the
//! status the request was read at. The store's compare-and-swap turns
//! lost races into `ConcurrentModification`; the caller re-reads and
//! decides whether to retry.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::state::{self, RequestAction};
use crate::domain::{conflict, expiry, permissions};
use crate::error::{AppError, AppResult};
use crate::models::{
    Actor, CreateRescheduleInput, RequestStatus, RescheduleRequest, Shift, ShiftStatus,
    StaffMember, StateChange, SwapType, UpdateRescheduleInput,
};
use crate::store::{RequestFilter, RequestStore, ShiftEffect, ShiftStore, StaffDirectory};

const MAX_REASON_CHARS: usize = 500;

#[derive(Clone)]
pub struct RescheduleService<S> {
    store: S,
    request_ttl: Duration,
}

impl<S> RescheduleService<S>
where
    S: RequestStore + ShiftStore + StaffDirectory,
{
    pub fn new(store: S, request_ttl: Duration) -> Self {
        Self { store, request_ttl }
    }

    /// Direct access to the underlying collaborators, for read paths
    /// that bypass the workflow (actor resolution, shift listings).
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Open a new shift-coverage negotiation.
    pub async fn create(
        &self,
        actor: Actor,
        input: CreateRescheduleInput,
    ) -> AppResult<RescheduleRequest> {
        let now = Utc::now();
        let reason = validate_reason(&input.reason)?;

        let shift = self
            .store
            .get_shift(input.original_shift_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Shift {} not found", input.original_shift_id))
            })?;

        if shift.status != ShiftStatus::Scheduled {
            return Err(AppError::Validation(
                "only scheduled shifts can be given up".to_string(),
            ));
        }
        if shift.starts_at <= now {
            return Err(AppError::Validation(
                "the shift has already started".to_string(),
            ));
        }

        match input.swap_type {
            SwapType::FindReplacement | SwapType::DirectSwap => {
                if shift.staff_id != Some(actor.staff_id) {
                    return Err(AppError::PermissionDenied(
                        "you can only give up your own shifts".to_string(),
                    ));
                }
            }
            SwapType::ManagerAssign => {
                if !actor.role.can_approve() {
                    return Err(AppError::PermissionDenied(
                        "direct assignment requires a manager or owner".to_string(),
                    ));
                }
            }
        }

        if self
            .store
            .find_unresolved_for_shift(shift.id)
            .await?
            .is_some()
        {
            return Err(AppError::Validation(
                "the shift already has an unresolved reschedule request".to_string(),
            ));
        }

        let (target_staff_id, target_shift_id) = match input.swap_type {
            SwapType::FindReplacement => (None, None),
            SwapType::DirectSwap => {
                let target = input.target_staff_id.ok_or_else(|| {
                    AppError::Validation("target_staff_id is required for a direct swap".into())
                })?;
                let offered_id = input.target_shift_id.ok_or_else(|| {
                    AppError::Validation("target_shift_id is required for a direct swap".into())
                })?;
                if target == actor.staff_id {
                    return Err(AppError::Validation(
                        "cannot swap a shift with yourself".to_string(),
                    ));
                }
                self.ensure_active_staff(target).await?;

                let offered = self.store.get_shift(offered_id).await?.ok_or_else(|| {
                    AppError::NotFound(format!("Shift {} not found", offered_id))
                })?;
                if offered.staff_id != Some(target) {
                    return Err(AppError::Validation(
                        "the offered shift does not belong to the swap partner".to_string(),
                    ));
                }
                if offered.status != ShiftStatus::Scheduled {
                    return Err(AppError::Validation(
                        "the offered shift is not scheduled".to_string(),
                    ));
                }
                (Some(target), Some(offered_id))
            }
            SwapType::ManagerAssign => {
                let target = input.target_staff_id.ok_or_else(|| {
                    AppError::Validation(
                        "target_staff_id is required for direct assignment".into(),
                    )
                })?;
                if shift.staff_id == Some(target) {
                    return Err(AppError::Validation(
                        "the shift is already assigned to that staff member".to_string(),
                    ));
                }
                self.ensure_active_staff(target).await?;
                // There is no accept step to run the conflict scan, so it
                // runs here against the assignee.
                self.ensure_no_conflict(target, &shift, None).await?;
                (Some(target), None)
            }
        };

        let status = match input.swap_type {
            SwapType::ManagerAssign => RequestStatus::PendingApproval,
            _ => RequestStatus::PendingBroadcast,
        };

        let request = RescheduleRequest {
            id: Uuid::new_v4(),
            original_shift_id: shift.id,
            requester_staff_id: actor.staff_id,
            target_staff_id,
            target_shift_id,
            swap_type: input.swap_type,
            priority: input.priority.unwrap_or_default(),
            reason,
            status,
            rejection_reason: None,
            expires_at: now + self.request_ttl,
            state_history: vec![StateChange {
                state: status,
                changed_at: now,
                reason: None,
            }],
            branch_id: shift.branch_id,
            created_at: now,
        };

        self.store.insert_request(&request).await?;

        tracing::info!(
            request_id = %request.id,
            shift_id = %shift.id,
            requester = %actor.staff_id,
            swap_type = ?request.swap_type,
            "Reschedule request opened"
        );

        Ok(request)
    }

    /// Fetch a request, lazily downgrading it to `EXPIRED` if its
    /// deadline passed while unresolved.
    pub async fn get(&self, id: Uuid) -> AppResult<RescheduleRequest> {
        let now = Utc::now();
        let request = self.load(id).await?;
        if expiry::is_expired(&request, now) {
            return self.force_expire(request, now).await;
        }
        Ok(request)
    }

    pub async fn list(&self, filter: &RequestFilter) -> AppResult<Vec<RescheduleRequest>> {
        self.store.list_requests(filter).await
    }

    /// Volunteer for (or, as the directed target, take) a broadcast
    /// shift. Moves the request to `PENDING_APPROVAL`.
    pub async fn accept(&self, id: Uuid, actor: Actor) -> AppResult<RescheduleRequest> {
        let now = Utc::now();
        let mut request = self.load_live(id, now).await?;
        let expected = request.status;

        state::ensure_legal(&request, RequestAction::Accept)?;
        self.ensure_permitted(RequestAction::Accept, &request, actor)?;

        let original = self.original_shift(&request).await?;
        let excluding = match request.swap_type {
            SwapType::DirectSwap => request.target_shift_id,
            _ => None,
        };
        self.ensure_no_conflict(actor.staff_id, &original, excluding)
            .await?;

        state::apply(&mut request, RequestAction::Accept, now, None)?;
        request.target_staff_id = Some(actor.staff_id);

        self.store
            .commit_transition(&request, expected, &[])
            .await?;

        tracing::info!(
            request_id = %id,
            acceptor = %actor.staff_id,
            "Reschedule request accepted, pending approval"
        );

        Ok(request)
    }

    /// Direct an open broadcast at one peer, who must then accept or
    /// decline.
    pub async fn propose(
        &self,
        id: Uuid,
        actor: Actor,
        target_staff_id: Uuid,
    ) -> AppResult<RescheduleRequest> {
        let now = Utc::now();
        let mut request = self.load_live(id, now).await?;
        let expected = request.status;

        state::ensure_legal(&request, RequestAction::Propose)?;
        self.ensure_permitted(RequestAction::Propose, &request, actor)?;

        if request.swap_type != SwapType::FindReplacement {
            return Err(AppError::Validation(
                "only replacement broadcasts can be directed at a peer".to_string(),
            ));
        }
        if target_staff_id == request.requester_staff_id {
            return Err(AppError::Validation(
                "cannot direct a request at its requester".to_string(),
            ));
        }
        self.ensure_active_staff(target_staff_id).await?;

        state::apply(&mut request, RequestAction::Propose, now, None)?;
        request.target_staff_id = Some(target_staff_id);

        self.store
            .commit_transition(&request, expected, &[])
            .await?;

        tracing::info!(
            request_id = %id,
            target = %target_staff_id,
            "Broadcast directed at a peer, awaiting their response"
        );

        Ok(request)
    }

    /// The directed peer turns a proposal down; the request goes back on
    /// open broadcast.
    pub async fn decline(
        &self,
        id: Uuid,
        actor: Actor,
        note: Option<String>,
    ) -> AppResult<RescheduleRequest> {
        let now = Utc::now();
        let mut request = self.load_live(id, now).await?;
        let expected = request.status;

        state::ensure_legal(&request, RequestAction::Decline)?;
        self.ensure_permitted(RequestAction::Decline, &request, actor)?;

        state::apply(&mut request, RequestAction::Decline, now, note)?;
        request.target_staff_id = None;

        self.store
            .commit_transition(&request, expected, &[])
            .await?;

        tracing::info!(request_id = %id, peer = %actor.staff_id, "Directed offer declined, request re-broadcast");

        Ok(request)
    }

    /// Manager/owner approval. Reassigns the shift (both shifts for a
    /// direct swap) and finalizes the request as `COMPLETED` in one unit
    /// of work; a failed reassignment rolls the whole transition back.
    pub async fn approve(&self, id: Uuid, actor: Actor) -> AppResult<RescheduleRequest> {
        let now = Utc::now();
        let mut request = self.load_live(id, now).await?;
        let expected = request.status;

        state::ensure_legal(&request, RequestAction::Approve)?;
        self.ensure_permitted(RequestAction::Approve, &request, actor)?;

        let target = request.target_staff_id.ok_or_else(|| {
            AppError::BadRequest("the request has no replacement candidate".to_string())
        })?;

        let mut effects = vec![ShiftEffect::Reassign {
            shift_id: request.original_shift_id,
            to_staff_id: target,
        }];
        if request.swap_type == SwapType::DirectSwap {
            let offered = request.target_shift_id.ok_or_else(|| {
                AppError::BadRequest("direct swap without an offered shift".to_string())
            })?;
            effects.push(ShiftEffect::Reassign {
                shift_id: offered,
                to_staff_id: request.requester_staff_id,
            });
        }

        state::apply(&mut request, RequestAction::Approve, now, None)?;
        state::apply(&mut request, RequestAction::Complete, now, None)?;

        self.store
            .commit_transition(&request, expected, &effects)
            .await?;

        tracing::info!(
            request_id = %id,
            approver = %actor.staff_id,
            new_holder = %target,
            "Reschedule request approved and completed"
        );

        Ok(request)
    }

    /// Manager/owner rejection. The shift assignment is untouched.
    pub async fn reject(
        &self,
        id: Uuid,
        actor: Actor,
        rejection_reason: String,
    ) -> AppResult<RescheduleRequest> {
        let now = Utc::now();
        let rejection_reason = rejection_reason.trim().to_string();
        if rejection_reason.is_empty() {
            return Err(AppError::Validation(
                "a rejection reason is required".to_string(),
            ));
        }

        let mut request = self.load_live(id, now).await?;
        let expected = request.status;

        state::ensure_legal(&request, RequestAction::Reject)?;
        self.ensure_permitted(RequestAction::Reject, &request, actor)?;

        state::apply(
            &mut request,
            RequestAction::Reject,
            now,
            Some(rejection_reason.clone()),
        )?;
        request.rejection_reason = Some(rejection_reason);

        self.store
            .commit_transition(&request, expected, &[])
            .await?;

        tracing::info!(request_id = %id, approver = %actor.staff_id, "Reschedule request rejected");

        Ok(request)
    }

    /// Requester withdraws the request before anyone is committed.
    pub async fn cancel(&self, id: Uuid, actor: Actor) -> AppResult<RescheduleRequest> {
        let now = Utc::now();
        let mut request = self.load_live(id, now).await?;
        let expected = request.status;

        state::ensure_legal(&request, RequestAction::Cancel)?;
        self.ensure_permitted(RequestAction::Cancel, &request, actor)?;

        state::apply(&mut request, RequestAction::Cancel, now, None)?;

        self.store
            .commit_transition(&request, expected, &[])
            .await?;

        tracing::info!(request_id = %id, requester = %actor.staff_id, "Reschedule request cancelled");

        Ok(request)
    }

    /// Edit the mutable fields (reason, priority) while the request is
    /// still on open broadcast. Not a transition: no history entry.
    pub async fn edit(
        &self,
        id: Uuid,
        actor: Actor,
        input: UpdateRescheduleInput,
    ) -> AppResult<RescheduleRequest> {
        let now = Utc::now();
        let mut request = self.load_live(id, now).await?;
        let expected = request.status;

        if request.status != RequestStatus::PendingBroadcast {
            return Err(AppError::InvalidTransition(format!(
                "cannot edit a request in {}",
                request.status
            )));
        }
        if !permissions::can_edit(&request, actor.staff_id) {
            return Err(AppError::PermissionDenied(
                "only the requester may edit a request".to_string(),
            ));
        }

        if let Some(reason) = input.reason {
            request.reason = validate_reason(&reason)?;
        }
        if let Some(priority) = input.priority {
            request.priority = priority;
        }

        self.store
            .commit_transition(&request, expected, &[])
            .await?;

        Ok(request)
    }

    /// Downgrade every unresolved request whose deadline has passed.
    /// Idempotent: requests that already left the pending statuses are
    /// skipped, and a request resolved mid-sweep just loses the race.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let lapsed = self.store.list_lapsed(now).await?;
        let mut count = 0u64;

        for mut request in lapsed {
            if !expiry::is_expired(&request, now) {
                continue;
            }
            let expected = request.status;
            if state::apply(
                &mut request,
                RequestAction::Expire,
                now,
                Some("deadline passed".to_string()),
            )
            .is_err()
            {
                continue;
            }

            match self.store.commit_transition(&request, expected, &[]).await {
                Ok(()) => count += 1,
                Err(AppError::ConcurrentModification) => continue,
                Err(e) => return Err(e),
            }
        }

        if count > 0 {
            tracing::info!(expired = count, "Expiry sweep downgraded unresolved requests");
        }

        Ok(count)
    }

    async fn load(&self, id: Uuid) -> AppResult<RescheduleRequest> {
        self.store.get_request(id).await?.ok_or_else(|| {
            AppError::NotFound(format!("Reschedule request {} not found", id))
        })
    }

    /// Load for a mutation: a lapsed request is downgraded on the spot
    /// and the attempted action reported as an invalid transition.
    async fn load_live(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<RescheduleRequest> {
        let request = self.load(id).await?;
        if expiry::is_expired(&request, now) {
            self.force_expire(request, now).await?;
            return Err(AppError::InvalidTransition(
                "the request has expired".to_string(),
            ));
        }
        Ok(request)
    }

    /// Commit the `EXPIRED` downgrade, tolerating a concurrent resolver.
    async fn force_expire(
        &self,
        mut request: RescheduleRequest,
        now: DateTime<Utc>,
    ) -> AppResult<RescheduleRequest> {
        let expected = request.status;
        state::apply(
            &mut request,
            RequestAction::Expire,
            now,
            Some("deadline passed".to_string()),
        )?;

        match self.store.commit_transition(&request, expected, &[]).await {
            Ok(()) => Ok(request),
            // Someone else transitioned it first; their outcome stands.
            Err(AppError::ConcurrentModification) => self.load(request.id).await,
            Err(e) => Err(e),
        }
    }

    fn ensure_permitted(
        &self,
        action: RequestAction,
        request: &RescheduleRequest,
        actor: Actor,
    ) -> AppResult<()> {
        if permissions::can_perform(action, request, actor.role, actor.staff_id) {
            Ok(())
        } else {
            Err(AppError::PermissionDenied(format!(
                "staff member {} may not {} this request",
                actor.staff_id, action
            )))
        }
    }

    async fn ensure_active_staff(&self, id: Uuid) -> AppResult<StaffMember> {
        let staff = self
            .store
            .get_staff(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Staff member {} not found", id)))?;
        if !staff.is_active {
            return Err(AppError::Validation(format!(
                "staff member {} is not active",
                id
            )));
        }
        Ok(staff)
    }

    async fn original_shift(&self, request: &RescheduleRequest) -> AppResult<Shift> {
        self.store
            .get_shift(request.original_shift_id)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "shift {} referenced by request {} is missing",
                    request.original_shift_id, request.id
                ))
            })
    }

    async fn ensure_no_conflict(
        &self,
        candidate: Uuid,
        original: &Shift,
        excluding: Option<Uuid>,
    ) -> AppResult<()> {
        let existing = self
            .store
            .shifts_for_staff(candidate, ShiftStatus::Scheduled)
            .await?;

        if let Some(clash) = conflict::find_conflict(
            &existing,
            original.starts_at,
            original.ends_at,
            excluding,
        ) {
            return Err(AppError::ScheduleConflict(format!(
                "staff member {} already works '{}' from {} to {}",
                candidate, clash.label, clash.starts_at, clash.ends_at
            )));
        }
        Ok(())
    }
}

fn validate_reason(raw: &str) -> AppResult<String> {
    let reason = raw.trim().to_string();
    if reason.is_empty() {
        return Err(AppError::Validation("a reason is required".to_string()));
    }
    if reason.chars().count() > MAX_REASON_CHARS {
        return Err(AppError::Validation(format!(
            "the reason must be at most {} characters",
            MAX_REASON_CHARS
        )));
    }
    Ok(reason)
}
