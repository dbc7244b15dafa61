// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tracing::{debug, error, info};
use uuid::Uuid;

use doctor_cell::models::DoctorError;
use doctor_cell::services::DoctorService;
use shared_database::{Changeset, Order, RestQuery, SupabaseClient};
use shared_models::datetime::{format_strict_utc, parse_strict_utc};
use shared_models::pagination::{Listing, PageRequest};

use crate::models::{
    Appointment, AppointmentError, AppointmentRow, AppointmentStatus,
    BookAppointmentRequest, BookedAppointment, UpdateAppointmentRequest,
};
use crate::services::conflict::ConflictDetectionService;

const APPOINTMENTS: &str = "appointments";
const APPOINTMENT_DETAILS: &str = "appointment_details";

pub struct AppointmentBookingService {
    supabase: Arc<SupabaseClient>,
    conflict_service: ConflictDetectionService,
    doctor_service: DoctorService,
}

impl AppointmentBookingService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self {
            conflict_service: ConflictDetectionService::new(Arc::clone(&supabase)),
            doctor_service: DoctorService::new(Arc::clone(&supabase)),
            supabase,
        }
    }

    /// Books `slot` on `appointment_date` with a doctor for `patient_id`.
    ///
    /// Fails with `InvalidDate`/`ValidationError` before touching the store,
    /// `DoctorNotFound` when the doctor does not exist and `SlotNotAvailable`
    /// when a non-cancelled appointment already holds the same doctor, date
    /// and slot.
    pub async fn book_appointment(
        &self,
        patient_id: &str,
        request: BookAppointmentRequest,
    ) -> Result<BookedAppointment, AppointmentError> {
        let appointment_date = parse_date(&request.appointment_date)?;
        let slot = required_slot(&request.slot)?;

        info!("Booking slot {} on {} with doctor {} for patient {}",
              slot, request.appointment_date, request.doctor_id, patient_id);

        let doctor_exists = self.doctor_service.doctor_exists(request.doctor_id).await
            .map_err(|e| match e {
                DoctorError::DatabaseError(msg) => AppointmentError::DatabaseError(msg),
                _ => AppointmentError::DoctorNotFound,
            })?;
        if !doctor_exists {
            return Err(AppointmentError::DoctorNotFound);
        }

        // Check and insert are separate calls with no transaction around them:
        // two concurrent bookings of the same slot can both pass the check.
        if self.conflict_service
            .find_slot_conflict(request.doctor_id, appointment_date, &slot)
            .await?
            .is_some()
        {
            return Err(AppointmentError::SlotNotAvailable);
        }

        let appointment_id = Uuid::new_v4();
        let now = format_strict_utc(&Utc::now());
        let notes = request.notes.filter(|notes| !notes.trim().is_empty());

        let appointment_data = json!({
            "id": appointment_id,
            "doctor_id": request.doctor_id,
            "patient_id": patient_id,
            "appointment_date": format_strict_utc(&appointment_date),
            "slot": slot,
            "status": AppointmentStatus::Scheduled.to_string(),
            "notes": notes,
            "created_at": now,
            "updated_at": now
        });

        self.supabase.insert(APPOINTMENTS, appointment_data).await.map_err(|e| {
            error!("Failed to create appointment: {}", e);
            AppointmentError::DatabaseError("Failed to create appointment".to_string())
        })?;

        info!("Appointment {} created", appointment_id);

        Ok(BookedAppointment {
            id: appointment_id,
            appointment_date,
            slot,
        })
    }

    /// The patient's appointments, most recent first, with doctor details.
    pub async fn list_appointments(
        &self,
        patient_id: &str,
        page: PageRequest,
    ) -> Result<Listing<Appointment>, AppointmentError> {
        debug!("Listing appointments for patient {} ({:?})", patient_id, page);

        let pagination = if page.wants_total() {
            let count_query = RestQuery::table(APPOINTMENTS).eq("patient_id", patient_id);
            let total = self.supabase.count(&count_query).await.map_err(|e| {
                error!("Failed to count appointments: {}", e);
                AppointmentError::DatabaseError("Failed to count appointments".to_string())
            })?;
            page.pagination(total)
        } else {
            None
        };

        let query = RestQuery::table(APPOINTMENT_DETAILS)
            .eq("patient_id", patient_id)
            .order("appointment_date", Order::Desc)
            .limit(page.limit() as u64)
            .offset(page.offset());

        let rows: Vec<AppointmentRow> = self.supabase.select(&query).await.map_err(|e| {
            error!("Failed to fetch appointments: {}", e);
            AppointmentError::DatabaseError("Failed to fetch appointments".to_string())
        })?;

        Ok(Listing {
            items: rows.into_iter().map(Appointment::from).collect(),
            pagination,
        })
    }

    /// Applies the supplied fields of `request` to one of the patient's
    /// appointments. Slot availability is not re-checked.
    pub async fn update_appointment(
        &self,
        appointment_id: Uuid,
        patient_id: &str,
        request: UpdateAppointmentRequest,
    ) -> Result<(), AppointmentError> {
        let changes = build_changeset(request, Utc::now())?;

        if !self.is_owned_by(appointment_id, patient_id).await? {
            return Err(AppointmentError::NotFound);
        }

        let affected = self.supabase
            .update(&Self::owned(appointment_id, patient_id), changes)
            .await
            .map_err(|e| {
                error!("Failed to update appointment {}: {}", appointment_id, e);
                AppointmentError::DatabaseError("Failed to update appointment".to_string())
            })?;

        if affected == 0 {
            return Err(AppointmentError::NotFound);
        }

        info!("Appointment {} updated", appointment_id);
        Ok(())
    }

    /// Soft-cancels one of the patient's appointments. Cancelling an already
    /// cancelled appointment succeeds.
    pub async fn cancel_appointment(
        &self,
        appointment_id: Uuid,
        patient_id: &str,
    ) -> Result<(), AppointmentError> {
        let changes = Changeset::new()
            .set("status", AppointmentStatus::Cancelled.to_string())
            .set("updated_at", format_strict_utc(&Utc::now()));

        let affected = self.supabase
            .update(&Self::owned(appointment_id, patient_id), changes)
            .await
            .map_err(|e| {
                error!("Failed to cancel appointment {}: {}", appointment_id, e);
                AppointmentError::DatabaseError("Failed to cancel appointment".to_string())
            })?;

        if affected == 0 {
            return Err(AppointmentError::NotFound);
        }

        info!("Appointment {} cancelled", appointment_id);
        Ok(())
    }

    async fn is_owned_by(&self, appointment_id: Uuid, patient_id: &str) -> Result<bool, AppointmentError> {
        let query = Self::owned(appointment_id, patient_id).select("id").limit(1);

        let rows: Vec<Value> = self.supabase.select(&query).await.map_err(|e| {
            error!("Failed to check appointment {}: {}", appointment_id, e);
            AppointmentError::DatabaseError("Failed to check appointment".to_string())
        })?;

        Ok(!rows.is_empty())
    }

    /// Appointment `appointment_id`, only if it belongs to `patient_id`.
    fn owned(appointment_id: Uuid, patient_id: &str) -> RestQuery {
        RestQuery::table(APPOINTMENTS)
            .eq("id", appointment_id)
            .eq("patient_id", patient_id)
    }
}

fn parse_date(raw: &str) -> Result<DateTime<Utc>, AppointmentError> {
    parse_strict_utc(raw).ok_or(AppointmentError::InvalidDate)
}

fn required_slot(raw: &str) -> Result<String, AppointmentError> {
    let slot = raw.trim();
    if slot.is_empty() {
        return Err(AppointmentError::ValidationError("Slot is required".to_string()));
    }
    Ok(slot.to_string())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Column changes for a partial update. `updated_at` is always set; every
/// other column only when the request carries a non-empty value for it.
fn build_changeset(
    request: UpdateAppointmentRequest,
    now: DateTime<Utc>,
) -> Result<Changeset, AppointmentError> {
    let appointment_date = non_empty(request.appointment_date)
        .map(|raw| parse_date(&raw).map(|date| format_strict_utc(&date)))
        .transpose()?;
    let status = non_empty(request.status)
        .map(|raw| raw.trim().parse::<AppointmentStatus>().map(|status| status.to_string()))
        .transpose()?;
    let slot = non_empty(request.slot).map(|slot| slot.trim().to_string());

    Ok(Changeset::new()
        .set("updated_at", format_strict_utc(&now))
        .set_some("appointment_date", appointment_date)
        .set_some("slot", slot)
        .set_some("status", status)
        .set_some("notes", non_empty(request.notes)))
}
