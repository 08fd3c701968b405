//! Environment-driven configuration for the registration service.

use crate::error::{RegistrationError, Result};

/// Full application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Supabase project base URL (e.g. https://xyz.supabase.co)
    pub supabase_url: String,
    /// Supabase anon/service key used for apikey + Bearer headers
    pub supabase_key: String,
    /// Storage bucket holding payment screenshots
    pub screenshot_bucket: String,
    /// Optional HTTP email API endpoint; absent means log-only mail
    pub email_api_url: Option<String>,
    /// API key for the email endpoint
    pub email_api_key: Option<String>,
    /// From address used in outgoing mail
    pub mail_from: String,
    /// HTTP listen port
    pub http_port: u16,
}

impl AppConfig {
    /// Load configuration from the environment.
    ///
    /// The store URL and key are required: this service cannot do anything
    /// useful without its backend, so a missing value is a startup error.
    pub fn from_env() -> Result<Self> {
        let supabase_url = require("SUPABASE_URL")?;
        let supabase_key = require("SUPABASE_KEY")?;

        Ok(Self {
            supabase_url: supabase_url.trim_end_matches('/').to_string(),
            supabase_key,
            screenshot_bucket: std::env::var("SCREENSHOT_BUCKET")
                .unwrap_or_else(|_| "payment-screenshort".to_string()),
            email_api_url: std::env::var("EMAIL_API_URL").ok(),
            email_api_key: std::env::var("EMAIL_API_KEY").ok(),
            mail_from: std::env::var("MAIL_FROM")
                .unwrap_or_else(|_| "vgnt@hackvibe.in".to_string()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8080),
        })
    }
}

fn require(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(RegistrationError::ConfigMissing {
            name: name.to_string(),
        }),
    }
}
