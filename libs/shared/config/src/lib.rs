use std::env;
use tracing::warn;

const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub supabase_jwt_secret: String,
    /// Skips token verification and authenticates every request as a fixed
    /// placeholder identity. Never enable outside local development or tests.
    pub auth_test_mode: bool,
    pub server_port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_service_key: env::var("SUPABASE_SERVICE_ROLE_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_SERVICE_ROLE_KEY not set, using empty value");
                    String::new()
                }),
            supabase_jwt_secret: env::var("SUPABASE_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            auth_test_mode: env::var("AUTH_TEST_MODE")
                .map(|value| parse_flag(&value))
                .unwrap_or(false),
            server_port: env::var("PORT")
                .ok()
                .and_then(|value| match value.parse() {
                    Ok(port) => Some(port),
                    Err(_) => {
                        warn!("PORT '{}' is not a valid port, using {}", value, DEFAULT_PORT);
                        None
                    }
                })
                .unwrap_or(DEFAULT_PORT),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        if config.auth_test_mode {
            warn!("AUTH_TEST_MODE is enabled: requests are authenticated as a placeholder user");
        } else if !config.is_auth_configured() {
            warn!("SUPABASE_JWT_SECRET is empty and AUTH_TEST_MODE is off: protected routes will reject every request");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_service_key.is_empty()
    }

    pub fn is_auth_configured(&self) -> bool {
        !self.supabase_jwt_secret.is_empty()
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
