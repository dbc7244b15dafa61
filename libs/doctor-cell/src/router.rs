use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use shared_utils::AppState;

use crate::handlers;

/// Public doctor directory routes, mounted under `/api`.
pub fn doctor_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/doctors", get(handlers::get_doctors))
        .route("/doctors/{doctor_id}", get(handlers::get_doctor_by_id))
        .route("/mobile/doctors", get(handlers::get_doctors_mobile))
        .route("/mobile/search/doctors", get(handlers::search_doctors_mobile))
        .with_state(state)
}
