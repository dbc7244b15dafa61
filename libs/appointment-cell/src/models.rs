use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::datetime::strict_utc;
use shared_models::error::AppError;
use shared_models::user::UserSummary;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Cancelled,
    Completed,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::Completed => write!(f, "completed"),
        }
    }
}

impl FromStr for AppointmentStatus {
    type Err = AppointmentError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "scheduled" => Ok(AppointmentStatus::Scheduled),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            "completed" => Ok(AppointmentStatus::Completed),
            other => Err(AppointmentError::ValidationError(format!(
                "Invalid status '{}'. Use scheduled, cancelled or completed",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: String,
    #[serde(with = "strict_utc")]
    pub appointment_date: DateTime<Utc>,
    pub slot: String,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    #[serde(with = "strict_utc")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "strict_utc")]
    pub updated_at: DateTime<Utc>,
    pub doctor: AppointmentDoctor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentDoctor {
    pub id: Uuid,
    pub specialization: String,
    pub user: UserSummary,
}

/// Row of the `appointment_details` view.
#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentRow {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: String,
    #[serde(with = "strict_utc")]
    pub appointment_date: DateTime<Utc>,
    pub slot: String,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(with = "strict_utc")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "strict_utc")]
    pub updated_at: DateTime<Utc>,
    pub specialization: String,
    pub doctor_name: String,
    pub doctor_email: String,
}

impl From<AppointmentRow> for Appointment {
    fn from(row: AppointmentRow) -> Self {
        Self {
            id: row.id,
            doctor_id: row.doctor_id,
            patient_id: row.patient_id,
            appointment_date: row.appointment_date,
            slot: row.slot,
            status: row.status,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
            doctor: AppointmentDoctor {
                id: row.doctor_id,
                specialization: row.specialization,
                user: UserSummary {
                    id: None,
                    name: row.doctor_name,
                    email: row.doctor_email,
                },
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: Uuid,
    pub appointment_date: String,
    pub slot: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial update: absent or empty fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAppointmentRequest {
    #[serde(default)]
    pub appointment_date: Option<String>,
    #[serde(default)]
    pub slot: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookedAppointment {
    pub id: Uuid,
    pub appointment_date: DateTime<Utc>,
    pub slot: String,
}

#[derive(Error, Debug)]
pub enum AppointmentError {
    #[error("Invalid date format. Use ISO 8601 format (YYYY-MM-DDTHH:MM:SSZ)")]
    InvalidDate,

    #[error("{0}")]
    ValidationError(String),

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Appointment not found")]
    NotFound,

    #[error("Appointment slot is already booked")]
    SlotNotAvailable,

    #[error("{0}")]
    DatabaseError(String),
}

impl From<AppointmentError> for AppError {
    fn from(error: AppointmentError) -> Self {
        match error {
            AppointmentError::InvalidDate => AppError::BadRequest(error.to_string()),
            AppointmentError::ValidationError(msg) => AppError::BadRequest(msg),
            AppointmentError::DoctorNotFound | AppointmentError::NotFound => {
                AppError::NotFound(error.to_string())
            }
            AppointmentError::SlotNotAvailable => AppError::Conflict(error.to_string()),
            AppointmentError::DatabaseError(msg) => AppError::Internal(msg),
        }
    }
}
