// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_models::auth::AuthUser;
use shared_models::error::AppError;
use shared_models::pagination::PageRequest;
use shared_models::response::{MobileError, MobileResponse};
use shared_utils::AppState;

use crate::models::{AppointmentError, BookAppointmentRequest, UpdateAppointmentRequest};
use crate::services::AppointmentBookingService;

// ==============================================================================
// QUERY PARAMETER STRUCTS
// ==============================================================================

// Numbers arrive as strings so bad values fall back to defaults.
#[derive(Debug, Deserialize)]
pub struct AppointmentListQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MobileAppointmentListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

fn request_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(request)| request).map_err(|rejection| {
        debug!("Rejected request body: {}", rejection);
        AppError::BadRequest("Invalid request data".to_string())
    })
}

fn appointment_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::from(AppointmentError::NotFound))
}

// ==============================================================================
// LEGACY HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<BookAppointmentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let request = request_body(body)?;
    let booking_service = AppointmentBookingService::new(Arc::clone(&state.supabase));

    let booked = booking_service.book_appointment(&user.id, request).await?;

    Ok((StatusCode::CREATED, Json(json!({
        "message": "Appointment created successfully",
        "appointment_id": booked.id
    }))))
}

#[axum::debug_handler]
pub async fn get_appointments(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<AppointmentListQuery>,
) -> Result<Json<Value>, AppError> {
    let page = PageRequest::from_offset_query(query.limit.as_deref(), query.offset.as_deref());
    let booking_service = AppointmentBookingService::new(Arc::clone(&state.supabase));

    let listing = booking_service.list_appointments(&user.id, page).await?;

    Ok(Json(json!({
        "appointments": listing.items
    })))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(appointment_id_raw): Path<String>,
    body: Result<Json<UpdateAppointmentRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let appointment_id = appointment_id(&appointment_id_raw)?;
    let request = request_body(body)?;
    let booking_service = AppointmentBookingService::new(Arc::clone(&state.supabase));

    booking_service.update_appointment(appointment_id, &user.id, request).await?;

    Ok(Json(json!({
        "message": "Appointment updated successfully"
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(appointment_id_raw): Path<String>,
) -> Result<Json<Value>, AppError> {
    let appointment_id = appointment_id(&appointment_id_raw)?;
    let booking_service = AppointmentBookingService::new(Arc::clone(&state.supabase));

    booking_service.cancel_appointment(appointment_id, &user.id).await?;

    Ok(Json(json!({
        "message": "Appointment cancelled successfully"
    })))
}

// ==============================================================================
// MOBILE HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn book_appointment_mobile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<BookAppointmentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MobileResponse<Value>>), MobileError> {
    let request = request_body(body)?;
    let booking_service = AppointmentBookingService::new(Arc::clone(&state.supabase));

    let booked = booking_service
        .book_appointment(&user.id, request)
        .await
        .map_err(AppError::from)?;

    Ok(MobileResponse::ok(
        "Appointment created successfully",
        json!({
            "appointment_id": booked.id,
            "appointment_date": booked.appointment_date.format("%Y-%m-%d").to_string(),
            "appointment_time": booked.appointment_date.format("%H:%M").to_string(),
            "slot": booked.slot,
        }),
    )
    .with_status(StatusCode::CREATED))
}

#[axum::debug_handler]
pub async fn get_appointments_mobile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<MobileAppointmentListQuery>,
) -> Result<Json<MobileResponse<Value>>, MobileError> {
    let page = PageRequest::from_page_query(query.page.as_deref(), query.limit.as_deref());
    let booking_service = AppointmentBookingService::new(Arc::clone(&state.supabase));

    let listing = booking_service
        .list_appointments(&user.id, page)
        .await
        .map_err(AppError::from)?;

    Ok(Json(MobileResponse::ok(
        "Appointments fetched successfully",
        json!({
            "appointments": listing.items,
            "pagination": listing.pagination,
        }),
    )))
}
