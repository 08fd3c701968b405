//! Email dispatch collaborator.
//!
//! Delivery is best-effort everywhere except the OTP send, where a failed
//! dispatch must block the verification step (the user cannot receive a
//! code that was never sent).

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use crate::error::{RegistrationError, Result};
use crate::models::Registration;

use super::templates;

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send a one-time verification code to the candidate leader address.
    async fn send_otp(&self, to: &str, team_name: &str, code: &str) -> Result<()>;

    /// Send the post-registration confirmation summary.
    async fn send_confirmation(&self, registration: &Registration) -> Result<()>;
}

pub type SharedMailer = Arc<dyn Mailer>;

/// Pick a mailer from configuration: the HTTP mailer when an email API is
/// configured, otherwise the log-only fallback.
pub fn create_mailer(
    api_url: Option<String>,
    api_key: Option<String>,
    from: String,
) -> SharedMailer {
    match (api_url, api_key) {
        (Some(url), Some(key)) => Arc::new(HttpMailer::new(&url, &key, &from)),
        _ => {
            warn!("EMAIL_API_URL/EMAIL_API_KEY not set; OTP codes will be logged, not emailed");
            Arc::new(LogMailer)
        }
    }
}

/// Mailer that posts JSON to a hosted transactional-email API.
pub struct HttpMailer {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    from: String,
}

impl HttpMailer {
    pub fn new(api_url: &str, api_key: &str, from: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.to_string(),
            api_key: api_key.to_string(),
            from: from.to_string(),
        }
    }

    async fn dispatch(&self, to: &str, subject: &str, html: &str) -> Result<()> {
        let payload = json!({
            "personalizations": [{ "to": [{ "email": to }], "subject": subject }],
            "from": { "email": self.from, "name": "HackVibe 2025" },
            "content": [{ "type": "text/html", "value": html }],
        });

        let response = self
            .http
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| RegistrationError::EmailDispatch {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(RegistrationError::EmailDispatch {
                message: format!("HTTP {}: {}", status, detail),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send_otp(&self, to: &str, team_name: &str, code: &str) -> Result<()> {
        let subject = templates::otp_subject(team_name);
        let body = templates::otp_body(team_name, code);
        self.dispatch(to, &subject, &body).await?;
        info!("OTP email sent to {}", to);
        Ok(())
    }

    async fn send_confirmation(&self, registration: &Registration) -> Result<()> {
        let subject = templates::confirmation_subject();
        let body = templates::confirmation_body(registration);
        self.dispatch(&registration.leader_email, &subject, &body)
            .await?;
        info!(
            "Confirmation email sent to {} for team '{}'",
            registration.leader_email, registration.team_name
        );
        Ok(())
    }
}

/// Fallback mailer for environments without email configuration. Codes are
/// written to the log so manual verification stays possible.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_otp(&self, to: &str, team_name: &str, code: &str) -> Result<()> {
        info!(
            "OTP for {} (team '{}'): {} (email dispatch disabled)",
            to, team_name, code
        );
        Ok(())
    }

    async fn send_confirmation(&self, registration: &Registration) -> Result<()> {
        info!(
            "Would send confirmation to {} for team '{}' (email dispatch disabled)",
            registration.leader_email, registration.team_name
        );
        Ok(())
    }
}
