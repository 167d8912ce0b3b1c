use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::reschedule::{Priority, SwapType};

/// Input for opening a new reschedule request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateRescheduleInput {
    pub original_shift_id: Uuid,
    pub swap_type: SwapType,
    pub reason: String,
    pub priority: Option<Priority>,
    pub target_staff_id: Option<Uuid>,
    pub target_shift_id: Option<Uuid>,
}

/// Input for editing reason/priority while the request is still broadcast
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateRescheduleInput {
    pub reason: Option<String>,
    pub priority: Option<Priority>,
}

/// Input for directing an open broadcast at one peer
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProposeInput {
    pub target_staff_id: Uuid,
}

/// Input for the directed peer's answer to a proposal
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RespondInput {
    pub accept: bool, // true = take the shift, false = turn it down
}

/// Input for a manager/owner rejection
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RejectInput {
    pub rejection_reason: String,
}

/// Response for reschedule mutations that do not return the request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RescheduleMutationResponse {
    pub success: bool,
    pub message: Option<String>,
}

/// Response of an expiry sweep run
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SweepResponse {
    pub expired: u64,
}
