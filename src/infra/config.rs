use std::net::SocketAddr;
use std::path::PathBuf;

use axum::http::HeaderValue;
use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;

use crate::infra::error::InfraError;

pub const DEFAULT_EMAIL_FROM: &str = "Event Credits <onboarding@resend.dev>";
pub const DEFAULT_EVENT_NAME: &str = "Cafe Cursor";

pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub bind_addr: SocketAddr,
    pub cors_origin: HeaderValue,
    pub admin_username: String,
    pub admin_password: SecretString,
    pub session_secret: SecretString,
    /// Adds the `Secure` attribute to the admin session cookie. Enable behind HTTPS.
    pub secure_cookies: bool,
    /// When unset, emails are logged instead of sent.
    pub resend_api_key: Option<SecretString>,
    pub email_from: String,
    pub event_name: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, InfraError> {
        let database_url: String = get_env("DATABASE_URL");
        let database_max_connections: u32 = get_env_default("DATABASE_MAX_CONNECTIONS", 5);
        let bind_addr: SocketAddr =
            get_env_default("BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 3001)));
        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .map_err(|_| InfraError::ConfigInvalid { var: "CORS_ORIGIN" })?;

        let admin_username = required_trimmed("ADMIN_USERNAME")?;
        let admin_password = SecretString::new(required_trimmed("ADMIN_PASSWORD")?.into());
        let session_secret = SecretString::new(required_trimmed("SESSION_SECRET")?.into());
        let secure_cookies: bool = get_env_default("SECURE_COOKIES", false);

        let resend_api_key = optional_trimmed("RESEND_API_KEY").map(|k| SecretString::new(k.into()));
        let email_from: String = get_env_default("EMAIL_FROM", DEFAULT_EMAIL_FROM.to_string());
        let event_name: String = get_env_default("EVENT_NAME", DEFAULT_EVENT_NAME.to_string());

        Ok(Self {
            database_url,
            database_max_connections,
            bind_addr,
            cors_origin,
            admin_username,
            admin_password,
            session_secret,
            secure_cookies,
            resend_api_key,
            email_from,
            event_name,
        })
    }
}

/// Settings for the `seed` binary.
pub struct SeedConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub credits_csv: PathBuf,
    pub users_csv: PathBuf,
    /// Delete all users and credits before importing.
    pub reset: bool,
}

impl SeedConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: get_env("DATABASE_URL"),
            database_max_connections: get_env_default("DATABASE_MAX_CONNECTIONS", 5),
            credits_csv: PathBuf::from(get_env_default("CREDITS_CSV", "data/credits.csv".to_string())),
            users_csv: PathBuf::from(get_env_default("USERS_CSV", "data/users.csv".to_string())),
            reset: get_env_default("SEED_RESET", false),
        }
    }
}

fn optional_trimmed(var: &'static str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required_trimmed(var: &'static str) -> Result<String, InfraError> {
    optional_trimmed(var).ok_or(InfraError::ConfigMissing { var })
}
