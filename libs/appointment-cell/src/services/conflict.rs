use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, error, warn};
use uuid::Uuid;

use shared_database::{RestQuery, SupabaseClient};
use shared_models::datetime::format_strict_utc;

use crate::models::{AppointmentError, AppointmentStatus};

#[derive(Debug, Deserialize)]
struct AppointmentId {
    id: Uuid,
}

pub struct ConflictDetectionService {
    supabase: Arc<SupabaseClient>,
}

impl ConflictDetectionService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    /// Id of a non-cancelled appointment already holding
    /// (`doctor_id`, `appointment_date`, `slot`), if any.
    pub async fn find_slot_conflict(
        &self,
        doctor_id: Uuid,
        appointment_date: DateTime<Utc>,
        slot: &str,
    ) -> Result<Option<Uuid>, AppointmentError> {
        debug!("Checking slot {} on {} for doctor {}", slot, appointment_date, doctor_id);

        let query = RestQuery::table("appointments")
            .select("id")
            .eq("doctor_id", doctor_id)
            .eq("appointment_date", format_strict_utc(&appointment_date))
            .eq("slot", slot)
            .neq("status", AppointmentStatus::Cancelled)
            .limit(1);

        let existing: Vec<AppointmentId> = self.supabase.select(&query).await.map_err(|e| {
            error!("Failed to check appointment slot: {}", e);
            AppointmentError::DatabaseError("Failed to check appointment availability".to_string())
        })?;

        let conflict = existing.into_iter().next().map(|row| row.id);
        if let Some(existing_id) = conflict {
            warn!("Slot {} on {} for doctor {} already held by appointment {}",
                  slot, appointment_date, doctor_id, existing_id);
        }

        Ok(conflict)
    }
}
