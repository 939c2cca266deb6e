//! Application configuration loaded from environment variables.
//!
//! A `.env` file is read first when present (local development).

use std::env;
use std::time::Duration;

/// Which session store implementation backs visitor sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionBackend {
    /// Supabase project (GoTrue + PostgREST)
    Supabase { url: String, anon_key: String },
    /// In-process store, for local development without a project
    Memory,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub backend: SessionBackend,
    /// Path to the hotel catalog JSON
    pub hotels_path: String,
    /// Server port
    pub port: u16,
    /// Mark the session cookie `Secure` (HTTPS deployments)
    pub cookie_secure: bool,
    /// Sessions idle longer than this are dropped
    pub session_idle_timeout: Duration,
}

impl Config {
    /// Config for tests: memory backend, no catalog file.
    pub fn test_default() -> Self {
        Self {
            backend: SessionBackend::Memory,
            hotels_path: "data/hotels.json".to_string(),
            port: 8080,
            cookie_secure: false,
            session_idle_timeout: Duration::from_secs(60 * 60),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let backend = match env::var("SESSION_BACKEND")
            .unwrap_or_else(|_| "supabase".to_string())
            .as_str()
        {
            "supabase" => SessionBackend::Supabase {
                url: env::var("SUPABASE_URL").map_err(|_| ConfigError::Missing("SUPABASE_URL"))?,
                anon_key: env::var("SUPABASE_ANON_KEY")
                    .map(|v| v.trim().to_string())
                    .map_err(|_| ConfigError::Missing("SUPABASE_ANON_KEY"))?,
            },
            "memory" => SessionBackend::Memory,
            other => {
                return Err(ConfigError::Invalid {
                    var: "SESSION_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        let idle_minutes: u64 = env::var("SESSION_IDLE_MINUTES")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .unwrap_or(60);

        Ok(Self {
            backend,
            hotels_path: env::var("HOTELS_PATH")
                .unwrap_or_else(|_| "data/hotels.json".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            cookie_secure: env::var("COOKIE_SECURE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            session_idle_timeout: Duration::from_secs(idle_minutes.saturating_mul(60)),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}
