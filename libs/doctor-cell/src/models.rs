use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use shared_models::datetime::strict_utc;
use shared_models::error::AppError;
use shared_models::user::UserSummary;

/// Weekday or date key mapped to the ordered slot labels offered on it.
pub type AvailableSlots = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub user_id: Uuid,
    pub specialization: String,
    pub years_experience: i32,
    pub phone: String,
    pub available_slots: AvailableSlots,
    #[serde(with = "strict_utc")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "strict_utc")]
    pub updated_at: DateTime<Utc>,
    pub user: UserSummary,
}

/// Row of the `doctor_directory` view (doctors joined with their user).
#[derive(Debug, Clone, Deserialize)]
pub struct DoctorRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub specialization: String,
    #[serde(default)]
    pub years_experience: i32,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub available_slots: Value,
    #[serde(with = "strict_utc")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "strict_utc")]
    pub updated_at: DateTime<Utc>,
    pub name: String,
    pub email: String,
}

impl From<DoctorRow> for Doctor {
    fn from(row: DoctorRow) -> Self {
        let available_slots = parse_available_slots(&row.id, &row.available_slots);

        Self {
            id: row.id,
            user_id: row.user_id,
            specialization: row.specialization,
            years_experience: row.years_experience,
            phone: row.phone.unwrap_or_default(),
            available_slots,
            created_at: row.created_at,
            updated_at: row.updated_at,
            user: UserSummary {
                id: Some(row.user_id),
                name: row.name,
                email: row.email,
            },
        }
    }
}

/// `available_slots` may come back as a JSON object (jsonb column) or as
/// serialized text. Anything that does not decode into the expected shape
/// yields an empty map instead of failing the request.
pub fn parse_available_slots(doctor_id: &Uuid, raw: &Value) -> AvailableSlots {
    let decoded = match raw {
        Value::Null => return AvailableSlots::new(),
        Value::String(text) => serde_json::from_str::<AvailableSlots>(text),
        other => serde_json::from_value::<AvailableSlots>(other.clone()),
    };

    decoded.unwrap_or_else(|e| {
        warn!("Unreadable available_slots for doctor {}: {}", doctor_id, e);
        AvailableSlots::new()
    })
}

#[derive(Error, Debug)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Search query or specialization is required")]
    MissingSearchCriteria,

    #[error("{0}")]
    DatabaseError(String),
}

impl From<DoctorError> for AppError {
    fn from(error: DoctorError) -> Self {
        match error {
            DoctorError::NotFound => AppError::NotFound(error.to_string()),
            DoctorError::MissingSearchCriteria => AppError::BadRequest(error.to_string()),
            DoctorError::DatabaseError(msg) => AppError::Internal(msg),
        }
    }
}
