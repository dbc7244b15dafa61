use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;
use shared_models::pagination::PageRequest;
use shared_models::response::{MobileError, MobileResponse};
use shared_utils::AppState;

use crate::models::DoctorError;
use crate::services::DoctorService;

// Numbers arrive as strings so bad values fall back to defaults instead of
// being rejected by the extractor.
#[derive(Debug, Deserialize)]
pub struct MobileDoctorsQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub specialization: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchDoctorsQuery {
    pub q: Option<String>,
    pub specialization: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

// ==============================================================================
// LEGACY HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_doctors(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, AppError> {
    let doctor_service = DoctorService::new(Arc::clone(&state.supabase));

    let listing = doctor_service.list_doctors(None, None).await?;

    Ok(Json(json!({
        "doctors": listing.items
    })))
}

#[axum::debug_handler]
pub async fn get_doctor_by_id(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    // An id that is not a UUID cannot match any row.
    let doctor_id = Uuid::parse_str(&doctor_id).map_err(|_| AppError::from(DoctorError::NotFound))?;

    let doctor_service = DoctorService::new(Arc::clone(&state.supabase));
    let doctor = doctor_service.get_doctor(doctor_id).await?;

    Ok(Json(json!({
        "doctor": doctor
    })))
}

// ==============================================================================
// MOBILE HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_doctors_mobile(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MobileDoctorsQuery>,
) -> Result<Json<MobileResponse<Value>>, MobileError> {
    let page = PageRequest::from_page_query(query.page.as_deref(), query.limit.as_deref());
    let doctor_service = DoctorService::new(Arc::clone(&state.supabase));

    let listing = doctor_service
        .list_doctors(non_empty(&query.specialization), Some(page))
        .await
        .map_err(AppError::from)?;

    Ok(Json(MobileResponse::ok(
        "Doctors fetched successfully",
        json!({
            "doctors": listing.items,
            "pagination": listing.pagination,
        }),
    )))
}

#[axum::debug_handler]
pub async fn search_doctors_mobile(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchDoctorsQuery>,
) -> Result<Json<MobileResponse<Value>>, MobileError> {
    let query_text = non_empty(&query.q);
    let specialization = non_empty(&query.specialization);

    let doctor_service = DoctorService::new(Arc::clone(&state.supabase));
    let doctors = doctor_service
        .search_doctors(query_text, specialization)
        .await
        .map_err(AppError::from)?;

    Ok(Json(MobileResponse::ok(
        "Search completed successfully",
        json!({
            "doctors": doctors,
            "query": query_text.unwrap_or_default(),
            "specialization": specialization.unwrap_or_default(),
        }),
    )))
}
