// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, put},
    middleware,
};

use shared_utils::extractor::auth_middleware;
use shared_utils::AppState;

use crate::handlers;

/// Appointment routes, mounted under `/api`. Every route requires an identity.
pub fn appointment_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/appointments", get(handlers::get_appointments).post(handlers::book_appointment))
        .route(
            "/appointments/{appointment_id}",
            put(handlers::update_appointment).delete(handlers::cancel_appointment),
        )
        .route(
            "/mobile/appointments",
            get(handlers::get_appointments_mobile).post(handlers::book_appointment_mobile),
        )
        .route_layer(middleware::from_fn_with_state(Arc::clone(&state), auth_middleware))
        .with_state(state)
}
