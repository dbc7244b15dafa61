use std::sync::Arc;

use tracing::{debug, error};
use uuid::Uuid;

use shared_database::{Order, RestQuery, SupabaseClient};
use shared_models::pagination::{Listing, PageRequest};

use crate::models::{Doctor, DoctorError, DoctorRow};

const DOCTOR_DIRECTORY: &str = "doctor_directory";
const DOCTOR_COLUMNS: &str =
    "id,user_id,specialization,years_experience,phone,available_slots,created_at,updated_at,name,email";
const SEARCH_RESULT_LIMIT: u64 = 20;

pub struct DoctorService {
    supabase: Arc<SupabaseClient>,
}

impl DoctorService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    fn directory() -> RestQuery {
        RestQuery::table(DOCTOR_DIRECTORY)
    }

    /// Doctors ordered by name, optionally restricted to one specialization.
    /// Without `page` every doctor is returned; with a page-style request the
    /// total is counted under the same filter.
    pub async fn list_doctors(
        &self,
        specialization: Option<&str>,
        page: Option<PageRequest>,
    ) -> Result<Listing<Doctor>, DoctorError> {
        debug!("Listing doctors (specialization: {:?}, page: {:?})", specialization, page);

        let mut filtered = Self::directory();
        if let Some(specialization) = specialization {
            filtered = filtered.eq("specialization", specialization);
        }

        let total = match page {
            Some(page) if page.wants_total() => Some(
                self.supabase.count(&filtered).await.map_err(|e| {
                    error!("Failed to count doctors: {}", e);
                    DoctorError::DatabaseError("Failed to count doctors".to_string())
                })?,
            ),
            _ => None,
        };

        let mut query = filtered
            .select(DOCTOR_COLUMNS)
            .order("name", Order::Asc);
        if let Some(page) = page {
            query = query.limit(page.limit() as u64).offset(page.offset());
        }

        let doctors = self.fetch(&query, "Failed to fetch doctors").await?;

        let pagination = match (page, total) {
            (Some(page), Some(total)) => page.pagination(total),
            _ => None,
        };

        Ok(Listing { items: doctors, pagination })
    }

    pub async fn get_doctor(&self, doctor_id: Uuid) -> Result<Doctor, DoctorError> {
        debug!("Fetching doctor {}", doctor_id);

        let query = Self::directory()
            .select(DOCTOR_COLUMNS)
            .eq("id", doctor_id)
            .limit(1);

        self.fetch(&query, "Failed to fetch doctor")
            .await?
            .into_iter()
            .next()
            .ok_or(DoctorError::NotFound)
    }

    pub async fn doctor_exists(&self, doctor_id: Uuid) -> Result<bool, DoctorError> {
        let query = RestQuery::table("doctors")
            .select("id")
            .eq("id", doctor_id)
            .limit(1);

        let rows: Vec<serde_json::Value> = self.supabase.select(&query).await.map_err(|e| {
            error!("Failed to check doctor {}: {}", doctor_id, e);
            DoctorError::DatabaseError("Failed to check doctor".to_string())
        })?;

        Ok(!rows.is_empty())
    }

    /// Up to 20 doctors, ordered by name. `query_text` is a case-insensitive
    /// substring match on name or specialization; `specialization` is exact.
    /// When both are given a doctor must satisfy both.
    pub async fn search_doctors(
        &self,
        query_text: Option<&str>,
        specialization: Option<&str>,
    ) -> Result<Vec<Doctor>, DoctorError> {
        if query_text.is_none() && specialization.is_none() {
            return Err(DoctorError::MissingSearchCriteria);
        }

        debug!("Searching doctors (q: {:?}, specialization: {:?})", query_text, specialization);

        let mut query = Self::directory().select(DOCTOR_COLUMNS);
        if let Some(text) = query_text {
            query = query.any_contains(&["name", "specialization"], text);
        }
        if let Some(specialization) = specialization {
            query = query.eq("specialization", specialization);
        }
        let query = query.order("name", Order::Asc).limit(SEARCH_RESULT_LIMIT);

        self.fetch(&query, "Failed to search doctors").await
    }

    async fn fetch(&self, query: &RestQuery, failure: &str) -> Result<Vec<Doctor>, DoctorError> {
        let rows: Vec<DoctorRow> = self.supabase.select(query).await.map_err(|e| {
            error!("{}: {}", failure, e);
            DoctorError::DatabaseError(failure.to_string())
        })?;

        Ok(rows.into_iter().map(Doctor::from).collect())
    }
}
