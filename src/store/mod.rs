//! Remote collaborators backing the registration pipeline.
//!
//! The wizard and orchestrator only see these contracts; the Supabase
//! implementations live alongside them.

pub mod registrations;
pub mod screenshots;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{NewRegistration, Registration, ScreenshotAttachment};

pub use registrations::SupabaseRegistrations;
pub use screenshots::{object_name, StoredScreenshot, SupabaseBucket};

/// Relational store holding one row per registered team.
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    /// Is this email already used in any member slot of any registration?
    async fn email_taken(&self, email: &str) -> Result<bool>;

    /// Is this phone already used in any member slot of any registration?
    async fn phone_taken(&self, phone: &str) -> Result<bool>;

    /// Is this team name already taken, ignoring case?
    async fn team_name_taken(&self, team_name: &str) -> Result<bool>;

    /// Is this transaction reference already recorded?
    async fn utr_taken(&self, utr: &str) -> Result<bool>;

    /// Exact-match existence check on a single column.
    async fn column_taken(&self, column: &str, value: &str) -> Result<bool>;

    /// Insert one registration and return the store's echo of the record.
    async fn insert(&self, registration: &NewRegistration) -> Result<Registration>;

    /// Number of registrations currently stored.
    async fn count(&self) -> Result<usize>;
}

/// Blob storage for payment screenshots.
#[async_trait]
pub trait ScreenshotStorage: Send + Sync {
    /// Upload the file under the given object name, returning its stored
    /// path and a publicly resolvable URL.
    async fn upload(
        &self,
        attachment: &ScreenshotAttachment,
        object_name: &str,
    ) -> Result<StoredScreenshot>;
}
