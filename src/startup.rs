use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    response::Html,
    routing::{delete, get, post, put},
    Json, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

use crate::{handlers, middleware as mw, openapi::ApiDoc};

pub fn build_router(state: Arc<crate::AppState>) -> Router {
    // CORS configuration
    let cors_origin = state
        .config
        .cors_origin
        .parse::<HeaderValue>()
        .unwrap_or_else(|_| HeaderValue::from_static("http://localhost:3000"));
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static("x-staff-id"),
        ])
        .allow_credentials(true);

    // Staff routes
    let staff_routes = Router::new()
        .route("/", get(handlers::staff_handler::get_staff_list))
        .route("/me", get(handlers::staff_handler::get_me));

    // Shift routes (read-only; mutation happens through the workflow)
    let shift_routes = Router::new()
        .route("/", get(handlers::shifts_handler::get_shifts))
        .route("/{id}", get(handlers::shifts_handler::get_shift));

    // Reschedule workflow routes
    let reschedule_routes = Router::new()
        .route("/open", get(handlers::reschedule_handler::get_open_requests))
        .route("/my", get(handlers::reschedule_handler::get_my_requests))
        .route("/incoming", get(handlers::reschedule_handler::get_incoming_requests))
        .route("/approvals", get(handlers::reschedule_handler::get_approval_queue))
        .route("/dashboard", get(handlers::reschedule_handler::get_dashboard))
        .route("/requests", post(handlers::reschedule_handler::create_request))
        .route("/requests/{id}", get(handlers::reschedule_handler::get_request))
        .route("/requests/{id}", put(handlers::reschedule_handler::update_request))
        .route("/requests/{id}", delete(handlers::reschedule_handler::cancel_request))
        .route("/requests/{id}/accept", post(handlers::reschedule_handler::accept_request))
        .route("/requests/{id}/propose", post(handlers::reschedule_handler::propose_request))
        .route("/requests/{id}/respond", post(handlers::reschedule_handler::respond_to_offer))
        .route("/requests/{id}/approve", post(handlers::reschedule_handler::approve_request))
        .route("/requests/{id}/reject", post(handlers::reschedule_handler::reject_request));

    // The sweep is scheduler-driven and keyed, not session-bound
    let sweep_routes = Router::new()
        .route("/sweep", post(handlers::reschedule_handler::sweep_expired))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            mw::require_sweep_key,
        ));

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .nest("/api/staff", staff_routes)
        .nest("/api/shifts", shift_routes)
        .nest("/api/reschedule", reschedule_routes.merge(sweep_routes))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .route("/swagger-ui", get(swagger_ui))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(mw::request_id_middleware))
                .layer(middleware::from_fn(mw::metrics_middleware))
                .layer(cors),
        )
        .with_state(state)
}

async fn swagger_ui() -> Html<&'static str> {
    Html(r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>GymShift API Documentation</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = () => {
            window.ui = SwaggerUIBundle({
                url: '/api-docs/openapi.json',
                dom_id: '#swagger-ui',
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                layout: "StandaloneLayout"
            });
        };
    </script>
</body>
</html>
    "#)
}
