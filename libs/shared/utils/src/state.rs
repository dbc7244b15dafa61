use std::sync::Arc;

use shared_config::AppConfig;
use shared_database::SupabaseClient;

/// Router state: configuration plus the one persistence client every service
/// is built from.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub supabase: Arc<SupabaseClient>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let supabase = Arc::new(SupabaseClient::new(&config));
        Self {
            config: Arc::new(config),
            supabase,
        }
    }
}
