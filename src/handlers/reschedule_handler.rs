use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    models::{
        Actor, CreateRescheduleInput, ProposeInput, RejectInput, RequestStatus,
        RescheduleMutationResponse, RescheduleRequest, RespondInput, SweepResponse,
        UpdateRescheduleInput,
    },
    store::RequestFilter,
    AppError, AppResult, AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct RescheduleListQuery {
    #[serde(rename = "branchId")]
    pub branch_id: Option<Uuid>,
}

/// GET /api/reschedule/open?branchId=
#[utoipa::path(
    get,
    path = "/api/reschedule/open",
    params(RescheduleListQuery),
    responses(
        (status = 200, description = "Broadcast requests open for acceptance", body = Vec<RescheduleRequest>)
    ),
    tag = "reschedule"
)]
pub async fn get_open_requests(
    State(state): State<Arc<AppState>>,
    _actor: Actor,
    Query(query): Query<RescheduleListQuery>,
) -> AppResult<Json<Vec<RescheduleRequest>>> {
    let filter = RequestFilter {
        statuses: vec![RequestStatus::PendingBroadcast],
        branch_id: query.branch_id,
        ..Default::default()
    };

    let requests = state.reschedule.list(&filter).await?;
    tracing::debug!(count = requests.len(), "Fetched open reschedule requests");
    Ok(Json(requests))
}

/// GET /api/reschedule/my
#[utoipa::path(
    get,
    path = "/api/reschedule/my",
    responses(
        (status = 200, description = "Requests created by the calling staff member", body = Vec<RescheduleRequest>)
    ),
    tag = "reschedule",
    security(("staff_header" = []))
)]
pub async fn get_my_requests(
    State(state): State<Arc<AppState>>,
    actor: Actor,
) -> AppResult<Json<Vec<RescheduleRequest>>> {
    let filter = RequestFilter {
        requester_staff_id: Some(actor.staff_id),
        ..Default::default()
    };

    let requests = state.reschedule.list(&filter).await?;
    tracing::debug!(
        staff_id = %actor.staff_id,
        count = requests.len(),
        "Fetched staff member's own reschedule requests"
    );
    Ok(Json(requests))
}

/// GET /api/reschedule/incoming
///
/// Requests waiting on the calling staff member: directed offers plus
/// direct swaps naming them as the partner.
#[utoipa::path(
    get,
    path = "/api/reschedule/incoming",
    responses(
        (status = 200, description = "Requests directed at the calling staff member", body = Vec<RescheduleRequest>)
    ),
    tag = "reschedule",
    security(("staff_header" = []))
)]
pub async fn get_incoming_requests(
    State(state): State<Arc<AppState>>,
    actor: Actor,
) -> AppResult<Json<Vec<RescheduleRequest>>> {
    let filter = RequestFilter {
        statuses: vec![
            RequestStatus::PendingBroadcast,
            RequestStatus::PendingAcceptance,
        ],
        target_staff_id: Some(actor.staff_id),
        ..Default::default()
    };

    let requests = state.reschedule.list(&filter).await?;
    tracing::debug!(
        staff_id = %actor.staff_id,
        count = requests.len(),
        "Fetched incoming reschedule requests"
    );
    Ok(Json(requests))
}

/// GET /api/reschedule/approvals?branchId=
#[utoipa::path(
    get,
    path = "/api/reschedule/approvals",
    params(RescheduleListQuery),
    responses(
        (status = 200, description = "Requests waiting on a manager decision", body = Vec<RescheduleRequest>),
        (status = 403, description = "Caller is not a manager or owner")
    ),
    tag = "reschedule",
    security(("staff_header" = []))
)]
pub async fn get_approval_queue(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Query(query): Query<RescheduleListQuery>,
) -> AppResult<Json<Vec<RescheduleRequest>>> {
    if !actor.role.can_approve() {
        tracing::warn!(
            staff_id = %actor.staff_id,
            "Staff member tried to read the approval queue"
        );
        return Err(AppError::PermissionDenied(
            "the approval queue is restricted to managers and owners".to_string(),
        ));
    }

    let filter = RequestFilter {
        statuses: vec![RequestStatus::PendingApproval],
        branch_id: query.branch_id,
        ..Default::default()
    };

    let requests = state.reschedule.list(&filter).await?;
    tracing::debug!(
        approver = %actor.staff_id,
        count = requests.len(),
        "Fetched approval queue"
    );
    Ok(Json(requests))
}

/// GET /api/reschedule/dashboard
#[utoipa::path(
    get,
    path = "/api/reschedule/dashboard",
    responses(
        (status = 200, description = "Counts of open, own and incoming requests")
    ),
    tag = "reschedule",
    security(("staff_header" = []))
)]
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    actor: Actor,
) -> AppResult<Json<serde_json::Value>> {
    let open = state
        .reschedule
        .list(&RequestFilter {
            statuses: vec![RequestStatus::PendingBroadcast],
            ..Default::default()
        })
        .await?
        .len();

    let my = state
        .reschedule
        .list(&RequestFilter {
            requester_staff_id: Some(actor.staff_id),
            ..Default::default()
        })
        .await?
        .len();

    let incoming = state
        .reschedule
        .list(&RequestFilter {
            statuses: vec![
                RequestStatus::PendingBroadcast,
                RequestStatus::PendingAcceptance,
            ],
            target_staff_id: Some(actor.staff_id),
            ..Default::default()
        })
        .await?
        .len();

    Ok(Json(serde_json::json!({
        "open": open,
        "my": my,
        "incoming": incoming
    })))
}

/// GET /api/reschedule/requests/{id}
#[utoipa::path(
    get,
    path = "/api/reschedule/requests/{id}",
    params(("id" = Uuid, Path, description = "Reschedule request ID")),
    responses(
        (status = 200, description = "The request", body = RescheduleRequest),
        (status = 404, description = "Request not found")
    ),
    tag = "reschedule"
)]
pub async fn get_request(
    State(state): State<Arc<AppState>>,
    _actor: Actor,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RescheduleRequest>> {
    let request = state.reschedule.get(id).await?;
    Ok(Json(request))
}

/// POST /api/reschedule/requests - give up a shift
#[utoipa::path(
    post,
    path = "/api/reschedule/requests",
    request_body = CreateRescheduleInput,
    responses(
        (status = 200, description = "Reschedule request opened", body = RescheduleRequest),
        (status = 403, description = "Shift belongs to someone else, or manager role missing"),
        (status = 404, description = "Shift not found"),
        (status = 409, description = "The assignee already has an overlapping shift"),
        (status = 422, description = "Missing or malformed fields")
    ),
    tag = "reschedule",
    security(("staff_header" = []))
)]
pub async fn create_request(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Json(input): Json<CreateRescheduleInput>,
) -> AppResult<Json<RescheduleRequest>> {
    let request = state.reschedule.create(actor, input).await?;
    Ok(Json(request))
}

/// PUT /api/reschedule/requests/{id} - edit reason/priority pre-acceptance
#[utoipa::path(
    put,
    path = "/api/reschedule/requests/{id}",
    params(("id" = Uuid, Path, description = "Reschedule request ID")),
    request_body = UpdateRescheduleInput,
    responses(
        (status = 200, description = "Request updated", body = RescheduleRequest),
        (status = 403, description = "Only the requester may edit"),
        (status = 409, description = "Request is no longer editable")
    ),
    tag = "reschedule",
    security(("staff_header" = []))
)]
pub async fn update_request(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    actor: Actor,
    Json(input): Json<UpdateRescheduleInput>,
) -> AppResult<Json<RescheduleRequest>> {
    let request = state.reschedule.edit(id, actor, input).await?;
    Ok(Json(request))
}

/// POST /api/reschedule/requests/{id}/accept - take a broadcast shift
#[utoipa::path(
    post,
    path = "/api/reschedule/requests/{id}/accept",
    params(("id" = Uuid, Path, description = "Reschedule request ID")),
    responses(
        (status = 200, description = "Accepted, now pending approval", body = RescheduleRequest),
        (status = 403, description = "Requester self-accept, or not the named target"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Not acceptable in its current state, schedule conflict, or lost race")
    ),
    tag = "reschedule",
    security(("staff_header" = []))
)]
pub async fn accept_request(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    actor: Actor,
) -> AppResult<Json<RescheduleRequest>> {
    let request = state.reschedule.accept(id, actor).await?;
    Ok(Json(request))
}

/// POST /api/reschedule/requests/{id}/propose - direct a broadcast at one peer
#[utoipa::path(
    post,
    path = "/api/reschedule/requests/{id}/propose",
    params(("id" = Uuid, Path, description = "Reschedule request ID")),
    request_body = ProposeInput,
    responses(
        (status = 200, description = "Offer directed at the peer", body = RescheduleRequest),
        (status = 403, description = "Only the requester may direct their broadcast"),
        (status = 404, description = "Request or peer not found"),
        (status = 409, description = "Request is not on open broadcast")
    ),
    tag = "reschedule",
    security(("staff_header" = []))
)]
pub async fn propose_request(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    actor: Actor,
    Json(input): Json<ProposeInput>,
) -> AppResult<Json<RescheduleRequest>> {
    let request = state
        .reschedule
        .propose(id, actor, input.target_staff_id)
        .await?;
    Ok(Json(request))
}

/// POST /api/reschedule/requests/{id}/respond - directed peer answers
#[utoipa::path(
    post,
    path = "/api/reschedule/requests/{id}/respond",
    params(("id" = Uuid, Path, description = "Reschedule request ID")),
    request_body = RespondInput,
    responses(
        (status = 200, description = "Offer taken (pending approval) or declined (re-broadcast)", body = RescheduleRequest),
        (status = 403, description = "Caller is not the directed peer"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "No directed offer outstanding, or schedule conflict")
    ),
    tag = "reschedule",
    security(("staff_header" = []))
)]
pub async fn respond_to_offer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    actor: Actor,
    Json(input): Json<RespondInput>,
) -> AppResult<Json<RescheduleRequest>> {
    let request = if input.accept {
        state.reschedule.accept(id, actor).await?
    } else {
        state.reschedule.decline(id, actor, None).await?
    };
    Ok(Json(request))
}

/// POST /api/reschedule/requests/{id}/approve - manager/owner decision
#[utoipa::path(
    post,
    path = "/api/reschedule/requests/{id}/approve",
    params(("id" = Uuid, Path, description = "Reschedule request ID")),
    responses(
        (status = 200, description = "Approved; shift reassigned and request completed", body = RescheduleRequest),
        (status = 403, description = "Caller is not a manager or owner"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Not pending approval, or lost race"),
        (status = 502, description = "Shift reassignment failed; request still pending approval")
    ),
    tag = "reschedule",
    security(("staff_header" = []))
)]
pub async fn approve_request(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    actor: Actor,
) -> AppResult<Json<RescheduleRequest>> {
    let request = state.reschedule.approve(id, actor).await?;
    Ok(Json(request))
}

/// POST /api/reschedule/requests/{id}/reject - manager/owner decision
#[utoipa::path(
    post,
    path = "/api/reschedule/requests/{id}/reject",
    params(("id" = Uuid, Path, description = "Reschedule request ID")),
    request_body = RejectInput,
    responses(
        (status = 200, description = "Rejected; shift assignment unchanged", body = RescheduleRequest),
        (status = 403, description = "Caller is not a manager or owner"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Not pending approval"),
        (status = 422, description = "Missing rejection reason")
    ),
    tag = "reschedule",
    security(("staff_header" = []))
)]
pub async fn reject_request(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    actor: Actor,
    Json(input): Json<RejectInput>,
) -> AppResult<Json<RescheduleRequest>> {
    let request = state
        .reschedule
        .reject(id, actor, input.rejection_reason)
        .await?;
    Ok(Json(request))
}

/// DELETE /api/reschedule/requests/{id} - requester withdraws
#[utoipa::path(
    delete,
    path = "/api/reschedule/requests/{id}",
    params(("id" = Uuid, Path, description = "Reschedule request ID")),
    responses(
        (status = 200, description = "Request cancelled", body = RescheduleMutationResponse),
        (status = 403, description = "Only the requester may cancel"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request already resolved")
    ),
    tag = "reschedule",
    security(("staff_header" = []))
)]
pub async fn cancel_request(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    actor: Actor,
) -> AppResult<Json<RescheduleMutationResponse>> {
    state.reschedule.cancel(id, actor).await?;
    Ok(Json(RescheduleMutationResponse {
        success: true,
        message: Some("Request cancelled".to_string()),
    }))
}

/// POST /api/reschedule/sweep - downgrade lapsed requests
///
/// Driven by an external scheduler; authenticated with the shared
/// sweep key, not a staff session.
#[utoipa::path(
    post,
    path = "/api/reschedule/sweep",
    responses(
        (status = 200, description = "Number of requests downgraded to EXPIRED", body = SweepResponse),
        (status = 401, description = "Missing or invalid X-Sweep-Key")
    ),
    tag = "reschedule",
    security(("sweep_key" = []))
)]
pub async fn sweep_expired(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<SweepResponse>> {
    let expired = state.reschedule.sweep_expired(Utc::now()).await?;
    Ok(Json(SweepResponse { expired }))
}
