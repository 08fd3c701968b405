//! Blob storage for payment screenshots.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{RegistrationError, Result};
use crate::models::ScreenshotAttachment;

use super::ScreenshotStorage;

/// Where an uploaded screenshot ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredScreenshot {
    /// Object path inside the bucket
    pub path: String,
    /// Publicly resolvable URL
    pub public_url: String,
}

/// Derive the stored object name from the team name and upload instant.
///
/// The timestamp keeps two uploads for the same team from colliding; the
/// team name is reduced to filename-safe characters.
pub fn object_name(team_name: &str, file_name: &str, timestamp_millis: i64) -> String {
    let safe_team: String = team_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let extension = file_name.rsplit('.').next().unwrap_or("png");
    format!("payment_{}_{}.{}", safe_team, timestamp_millis, extension)
}

/// Supabase storage bucket client.
#[derive(Clone)]
pub struct SupabaseBucket {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    bucket: String,
}

impl SupabaseBucket {
    pub fn new(base_url: &str, api_key: &str, bucket: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            bucket: bucket.to_string(),
        }
    }

    fn object_url(&self, name: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, name)
    }

    fn public_url(&self, name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, name
        )
    }
}

#[async_trait]
impl ScreenshotStorage for SupabaseBucket {
    async fn upload(
        &self,
        attachment: &ScreenshotAttachment,
        object_name: &str,
    ) -> Result<StoredScreenshot> {
        let url = self.object_url(object_name);
        debug!("Uploading screenshot to {}", url);

        let response = self
            .http
            .post(&url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", attachment.content_type.clone())
            .body(attachment.bytes.clone())
            .send()
            .await
            .map_err(|e| RegistrationError::UploadFailed {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!("Screenshot upload rejected with HTTP {}: {}", status, detail);
            return Err(RegistrationError::UploadFailed {
                message: format!("HTTP {}: {}", status, detail),
            });
        }

        Ok(StoredScreenshot {
            path: object_name.to_string(),
            public_url: self.public_url(object_name),
        })
    }
}
