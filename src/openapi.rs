use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::Modify;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "GymShift API",
        version = "1.0.0",
        description = "Back-office API for staff shift scheduling and the shift reschedule workflow",
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    paths(
        // Health
        crate::handlers::health::health_check,

        // Staff
        crate::handlers::staff_handler::get_staff_list,
        crate::handlers::staff_handler::get_me,

        // Shifts
        crate::handlers::shifts_handler::get_shifts,
        crate::handlers::shifts_handler::get_shift,

        // Reschedule workflow
        crate::handlers::reschedule_handler::get_open_requests,
        crate::handlers::reschedule_handler::get_my_requests,
        crate::handlers::reschedule_handler::get_incoming_requests,
        crate::handlers::reschedule_handler::get_approval_queue,
        crate::handlers::reschedule_handler::get_dashboard,
        crate::handlers::reschedule_handler::get_request,
        crate::handlers::reschedule_handler::create_request,
        crate::handlers::reschedule_handler::update_request,
        crate::handlers::reschedule_handler::accept_request,
        crate::handlers::reschedule_handler::propose_request,
        crate::handlers::reschedule_handler::respond_to_offer,
        crate::handlers::reschedule_handler::approve_request,
        crate::handlers::reschedule_handler::reject_request,
        crate::handlers::reschedule_handler::cancel_request,
        crate::handlers::reschedule_handler::sweep_expired,
    ),
    components(
        schemas(
            // Core models
            crate::models::StaffMember,
            crate::models::staff::StaffRole,
            crate::models::Shift,
            crate::models::shift::ShiftStatus,
            crate::models::RescheduleRequest,
            crate::models::RequestStatus,
            crate::models::SwapType,
            crate::models::Priority,
            crate::models::StateChange,

            // Input models
            crate::models::CreateRescheduleInput,
            crate::models::UpdateRescheduleInput,
            crate::models::ProposeInput,
            crate::models::RespondInput,
            crate::models::RejectInput,
            crate::models::RescheduleMutationResponse,
            crate::models::SweepResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check"),
        (name = "staff", description = "Staff roster"),
        (name = "shifts", description = "Work shift listings"),
        (name = "reschedule", description = "Shift reschedule request workflow"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "staff_header",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-Staff-Id"))),
            );
            components.add_security_scheme(
                "sweep_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-Sweep-Key"))),
            );
        }
    }
}
