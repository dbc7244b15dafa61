use std::sync::Arc;

use axum::{
    Json,
    Router,
    routing::get,
};
use serde_json::{json, Value};

use appointment_cell::router::appointment_routes;
use doctor_cell::router::doctor_routes;
use shared_utils::AppState;

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "Hospital API is running"
    }))
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .merge(doctor_routes(Arc::clone(&state)))
        .merge(appointment_routes(state));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
}
