//! PostgREST client for the hosted `registrations` collection.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{RegistrationError, Result};
use crate::models::{NewRegistration, Registration};

use super::RegistrationStore;

/// Supabase-backed registration store.
///
/// Uniqueness lookups are id-only selects with a `limit=1`, the cheapest
/// existence probe PostgREST offers. Filters are assembled by hand (the way
/// the hosted API expects them) with values percent-encoded.
#[derive(Clone)]
pub struct SupabaseRegistrations {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SupabaseRegistrations {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn rest_url(&self, query: &str) -> String {
        format!("{}/rest/v1/registrations?{}", self.base_url, query)
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    /// Run an id-only existence probe with a pre-encoded filter expression.
    async fn exists(&self, filter: &str) -> Result<bool> {
        let url = self.rest_url(&format!("select=id&{}&limit=1", filter));
        debug!("Existence probe: {}", url);

        let response = self.authed(self.http.get(&url)).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(RegistrationError::StoreRejected {
                status: status.as_u16(),
                detail: "permission denied; the store must allow SELECT".to_string(),
            });
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(RegistrationError::StoreRejected {
                status: status.as_u16(),
                detail,
            });
        }

        let rows: Vec<Value> = response.json().await?;
        Ok(!rows.is_empty())
    }
}

/// Build the three-column OR filter used for email and phone probes.
pub fn member_columns_filter(prefixes: [&str; 3], suffix: &str, value: &str) -> String {
    let encoded = urlencoding::encode(value);
    format!(
        "or=({}_{s}.eq.{v},{}_{s}.eq.{v},{}_{s}.eq.{v})",
        prefixes[0],
        prefixes[1],
        prefixes[2],
        s = suffix,
        v = encoded
    )
}

#[async_trait]
impl RegistrationStore for SupabaseRegistrations {
    async fn email_taken(&self, email: &str) -> Result<bool> {
        let filter = member_columns_filter(["leader", "member2", "member3"], "email", email);
        self.exists(&filter).await
    }

    async fn phone_taken(&self, phone: &str) -> Result<bool> {
        let filter = member_columns_filter(["leader", "member2", "member3"], "phone", phone);
        self.exists(&filter).await
    }

    async fn team_name_taken(&self, team_name: &str) -> Result<bool> {
        // ilike without wildcards is an exact case-insensitive match
        let filter = format!("team_name=ilike.{}", urlencoding::encode(team_name));
        self.exists(&filter).await
    }

    async fn utr_taken(&self, utr: &str) -> Result<bool> {
        self.column_taken("utr_number", utr).await
    }

    async fn column_taken(&self, column: &str, value: &str) -> Result<bool> {
        let filter = format!("{}=eq.{}", column, urlencoding::encode(value));
        self.exists(&filter).await
    }

    async fn insert(&self, registration: &NewRegistration) -> Result<Registration> {
        let url = self.rest_url("select=*");

        let response = self
            .authed(self.http.post(&url))
            .header("Prefer", "return=representation")
            .json(registration)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!("Insert rejected with HTTP {}: {}", status, detail);
            return Err(RegistrationError::StoreRejected {
                status: status.as_u16(),
                detail,
            });
        }

        let mut rows: Vec<Registration> = response.json().await?;
        match rows.pop() {
            Some(record) => Ok(record),
            None => Err(RegistrationError::InsertNotConfirmed {
                detail: "insert response is empty".to_string(),
            }),
        }
    }

    async fn count(&self) -> Result<usize> {
        let url = self.rest_url("select=id");

        let response = self.authed(self.http.get(&url)).send().await?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(RegistrationError::StoreRejected {
                status: status.as_u16(),
                detail,
            });
        }

        let rows: Vec<Value> = response.json().await?;
        Ok(rows.len())
    }
}
