//! Final submission: authoritative re-checks, upload, insert, confirmation.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::error::{RegistrationError, Result};
use crate::email::SharedMailer;
use crate::messages;
use crate::models::{NewRegistration, Registration};
use crate::store::{object_name, RegistrationStore, ScreenshotStorage};

use super::draft::{RegistrationDraft, REQUIRED_FIELDS};

pub struct SubmissionOrchestrator {
    store: Arc<dyn RegistrationStore>,
    screenshots: Arc<dyn ScreenshotStorage>,
    mailer: SharedMailer,
}

impl SubmissionOrchestrator {
    pub fn new(
        store: Arc<dyn RegistrationStore>,
        screenshots: Arc<dyn ScreenshotStorage>,
        mailer: SharedMailer,
    ) -> Self {
        Self {
            store,
            screenshots,
            mailer,
        }
    }

    /// Everything that must hold before a single network call is made.
    pub fn preflight(draft: &RegistrationDraft, otp_verified: bool) -> Result<()> {
        if !otp_verified {
            return Err(RegistrationError::VerificationFailed {
                message: messages::verify_email_first(),
            });
        }
        draft.require_complete(&REQUIRED_FIELDS)?;
        if draft.screenshot.is_none() {
            return Err(RegistrationError::InvalidField {
                field: "payment_screenshot".to_string(),
                message: "Payment screenshot is required".to_string(),
            });
        }
        if draft.has_duplicate_emails() {
            return Err(RegistrationError::InvalidField {
                field: "member_emails".to_string(),
                message: messages::members_share_email(),
            });
        }
        if draft.has_duplicate_phones() {
            return Err(RegistrationError::InvalidField {
                field: "member_phones".to_string(),
                message: messages::members_share_phone(),
            });
        }
        Ok(())
    }

    /// Run the whole submission. On any failure the draft is untouched and
    /// the caller can retry after correcting the reported problem.
    pub async fn submit(
        &self,
        draft: &RegistrationDraft,
        otp_verified: bool,
        client_ip: &str,
    ) -> Result<Registration> {
        Self::preflight(draft, otp_verified)?;

        // Authoritative re-checks; any stale client-side state loses to these
        if self.store.team_name_taken(&draft.team_name).await? {
            return Err(RegistrationError::FieldConflict {
                field: "team_name".to_string(),
                message: messages::duplicate_team_name(),
            });
        }
        if self
            .store
            .column_taken("leader_email", &draft.leader_email)
            .await?
        {
            return Err(RegistrationError::FieldConflict {
                field: "leader_email".to_string(),
                message: messages::duplicate_leader_email(),
            });
        }
        if self.store.utr_taken(&draft.utr_number).await? {
            return Err(RegistrationError::FieldConflict {
                field: "utr_number".to_string(),
                message: messages::duplicate_utr(),
            });
        }

        let screenshot_path = match &draft.screenshot {
            Some(attachment) => {
                let name = object_name(
                    &draft.team_name,
                    &attachment.file_name,
                    Utc::now().timestamp_millis(),
                );
                let stored = self.screenshots.upload(attachment, &name).await?;
                info!("Payment screenshot stored at {}", stored.public_url);
                Some(stored.path)
            }
            None => None,
        };

        let payload = draft.to_payload(client_ip, screenshot_path);
        let record = self.store.insert(&payload).await?;
        confirm_echo(&payload, &record)?;

        let id = record.id.unwrap_or_default();
        info!("{}", messages::registration_success(id));

        // Confirmation mail is best-effort and never rolls the insert back
        if let Err(e) = self.mailer.send_confirmation(&record).await {
            warn!(
                "Confirmation email to {} failed: {}",
                record.leader_email, e
            );
        }

        Ok(record)
    }
}

/// Accept the insert only when the echoed record proves it landed: an id
/// must be present and the echoed unique fields must match what was sent.
pub fn confirm_echo(sent: &NewRegistration, echoed: &Registration) -> Result<()> {
    if echoed.id.is_none() {
        error!("Insert echo carries no id; treating as failed");
        return Err(RegistrationError::InsertNotConfirmed {
            detail: "response carries no record id".to_string(),
        });
    }
    if echoed.leader_email != sent.leader_email || echoed.team_name != sent.team_name {
        error!(
            "Insert echo mismatch: got team '{}' / leader '{}'",
            echoed.team_name, echoed.leader_email
        );
        return Err(RegistrationError::InsertNotConfirmed {
            detail: "echoed record does not match the submitted data".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScreenshotAttachment;
    use crate::store::StoredScreenshot;
    use crate::wizard::field_state::FieldId;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// In-memory store double tracking inserted rows.
    #[derive(Default)]
    struct MemoryStore {
        rows: Mutex<Vec<NewRegistration>>,
        /// When set, the echo drops the team name (phantom-success probe)
        corrupt_echo: bool,
    }

    impl MemoryStore {
        fn echo(&self, row: &NewRegistration, id: i64) -> Registration {
            Registration {
                id: Some(id),
                leader_email: row.leader_email.clone(),
                team_name: if self.corrupt_echo {
                    String::new()
                } else {
                    row.team_name.clone()
                },
                leader_name: row.leader_name.clone(),
                member2_name: row.member2_name.clone(),
                member2_email: row.member2_email.clone(),
                member3_name: row.member3_name.clone(),
                member3_email: row.member3_email.clone(),
                utr_number: row.utr_number.clone(),
                account_holder_name: row.account_holder_name.clone(),
                payment_screenshot_path: row.payment_screenshot_path.clone(),
                ip_address: Some(row.ip_address.clone()),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl RegistrationStore for MemoryStore {
        async fn email_taken(&self, email: &str) -> Result<bool> {
            Ok(self.rows.lock().iter().any(|r| {
                r.leader_email == email || r.member2_email == email || r.member3_email == email
            }))
        }

        async fn phone_taken(&self, phone: &str) -> Result<bool> {
            Ok(self.rows.lock().iter().any(|r| {
                r.leader_phone == phone || r.member2_phone == phone || r.member3_phone == phone
            }))
        }

        async fn team_name_taken(&self, team_name: &str) -> Result<bool> {
            let wanted = team_name.to_lowercase();
            Ok(self
                .rows
                .lock()
                .iter()
                .any(|r| r.team_name.to_lowercase() == wanted))
        }

        async fn utr_taken(&self, utr: &str) -> Result<bool> {
            Ok(self.rows.lock().iter().any(|r| r.utr_number == utr))
        }

        async fn column_taken(&self, column: &str, value: &str) -> Result<bool> {
            match column {
                "leader_email" => Ok(self.rows.lock().iter().any(|r| r.leader_email == value)),
                _ => Ok(false),
            }
        }

        async fn insert(&self, registration: &NewRegistration) -> Result<Registration> {
            let mut rows = self.rows.lock();
            rows.push(registration.clone());
            let id = rows.len() as i64;
            Ok(self.echo(registration, id))
        }

        async fn count(&self) -> Result<usize> {
            Ok(self.rows.lock().len())
        }
    }

    struct MemoryBucket {
        uploads: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ScreenshotStorage for MemoryBucket {
        async fn upload(
            &self,
            _attachment: &ScreenshotAttachment,
            object_name: &str,
        ) -> Result<StoredScreenshot> {
            self.uploads.lock().push(object_name.to_string());
            Ok(StoredScreenshot {
                path: object_name.to_string(),
                public_url: format!("https://cdn.example/{}", object_name),
            })
        }
    }

    struct SilentMailer;

    #[async_trait]
    impl crate::email::Mailer for SilentMailer {
        async fn send_otp(&self, _to: &str, _team: &str, _code: &str) -> Result<()> {
            Ok(())
        }

        async fn send_confirmation(&self, _registration: &Registration) -> Result<()> {
            Ok(())
        }
    }

    fn orchestrator(store: Arc<MemoryStore>) -> (SubmissionOrchestrator, Arc<MemoryBucket>) {
        let bucket = Arc::new(MemoryBucket {
            uploads: Mutex::new(Vec::new()),
        });
        let orchestrator = SubmissionOrchestrator::new(
            store,
            bucket.clone(),
            Arc::new(SilentMailer),
        );
        (orchestrator, bucket)
    }

    fn full_draft() -> RegistrationDraft {
        let mut draft = RegistrationDraft::new();
        for (field, value) in [
            (FieldId::LeaderName, "Asha Rao"),
            (FieldId::LeaderEmail, "asha@college.edu"),
            (FieldId::LeaderPhone, "9876543210"),
            (FieldId::LeaderTshirtSize, "M"),
            (FieldId::CollegeName, "Vignan Institute"),
            (FieldId::TeamName, "Byte Ninjas"),
            (FieldId::Member2Name, "Ravi"),
            (FieldId::Member2Email, "ravi@college.edu"),
            (FieldId::Member2Phone, "9876543211"),
            (FieldId::Member2TshirtSize, "L"),
            (FieldId::Member3Name, "Divya"),
            (FieldId::Member3Email, "divya@college.edu"),
            (FieldId::Member3Phone, "9876543212"),
            (FieldId::Member3TshirtSize, "S"),
            (FieldId::UtrNumber, "123456789012"),
            (FieldId::AccountHolderName, "Asha Rao"),
        ] {
            draft.set(field, value);
        }
        draft.screenshot = Some(ScreenshotAttachment {
            file_name: "proof.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![9, 9, 9],
        });
        draft
    }

    #[tokio::test]
    async fn test_full_submission_persists_everything() {
        let store = Arc::new(MemoryStore::default());
        let (orchestrator, bucket) = orchestrator(store.clone());

        let record = orchestrator
            .submit(&full_draft(), true, "203.0.113.9")
            .await
            .unwrap();

        assert_eq!(record.id, Some(1));
        assert_eq!(record.team_name, "Byte Ninjas");

        let rows = store.rows.lock();
        let row = &rows[0];
        assert_eq!(row.leader_name, "Asha Rao");
        assert_eq!(row.leader_email, "asha@college.edu");
        assert_eq!(row.leader_phone, "9876543210");
        assert_eq!(row.member2_name, "Ravi");
        assert_eq!(row.member2_email, "ravi@college.edu");
        assert_eq!(row.member2_phone, "9876543211");
        assert_eq!(row.member3_name, "Divya");
        assert_eq!(row.member3_email, "divya@college.edu");
        assert_eq!(row.member3_phone, "9876543212");
        assert_eq!(row.ip_address, "203.0.113.9");
        let path = row.payment_screenshot_path.as_deref().unwrap();
        assert!(path.starts_with("payment_Byte_Ninjas_"));
        assert_eq!(bucket.uploads.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_unverified_otp_refuses_before_any_network_call() {
        let store = Arc::new(MemoryStore::default());
        let (orchestrator, bucket) = orchestrator(store.clone());

        let err = orchestrator
            .submit(&full_draft(), false, "203.0.113.9")
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrationError::VerificationFailed { .. }));
        assert_eq!(store.rows.lock().len(), 0);
        assert_eq!(bucket.uploads.lock().len(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_utr_rejected_on_recheck() {
        let store = Arc::new(MemoryStore::default());
        let (orchestrator, _) = orchestrator(store.clone());

        orchestrator
            .submit(&full_draft(), true, "203.0.113.9")
            .await
            .unwrap();

        // Second team, different identity, same UTR
        let mut second = full_draft();
        second.set(FieldId::TeamName, "Null Pointers");
        second.set(FieldId::LeaderEmail, "other@college.edu");
        second.set(FieldId::Member2Email, "m2@college.edu");
        second.set(FieldId::Member3Email, "m3@college.edu");
        second.set(FieldId::LeaderPhone, "9000000001");
        second.set(FieldId::Member2Phone, "9000000002");
        second.set(FieldId::Member3Phone, "9000000003");

        let err = orchestrator
            .submit(&second, true, "203.0.113.9")
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("utr_number"));
        // The first record is untouched
        assert_eq!(store.rows.lock().len(), 1);
        assert_eq!(store.rows.lock()[0].team_name, "Byte Ninjas");
    }

    #[tokio::test]
    async fn test_team_name_recheck_is_case_insensitive() {
        let store = Arc::new(MemoryStore::default());
        let (orchestrator, _) = orchestrator(store.clone());

        orchestrator
            .submit(&full_draft(), true, "203.0.113.9")
            .await
            .unwrap();

        let mut second = full_draft();
        second.set(FieldId::TeamName, "byte ninjas");
        second.set(FieldId::LeaderEmail, "other@college.edu");
        second.set(FieldId::Member2Email, "m2@college.edu");
        second.set(FieldId::Member3Email, "m3@college.edu");
        second.set(FieldId::LeaderPhone, "9000000001");
        second.set(FieldId::Member2Phone, "9000000002");
        second.set(FieldId::Member3Phone, "9000000003");
        second.set(FieldId::UtrNumber, "999999999999");

        let err = orchestrator
            .submit(&second, true, "203.0.113.9")
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("team_name"));
    }

    #[tokio::test]
    async fn test_intra_form_duplicate_email_blocks_submission() {
        let store = Arc::new(MemoryStore::default());
        let (orchestrator, _) = orchestrator(store.clone());

        let mut draft = full_draft();
        draft.set(FieldId::Member3Email, "ravi@college.edu");

        let err = orchestrator
            .submit(&draft, true, "203.0.113.9")
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("member_emails"));
        assert_eq!(store.rows.lock().len(), 0);
    }

    #[tokio::test]
    async fn test_corrupted_echo_is_reported_as_failure() {
        let store = Arc::new(MemoryStore {
            corrupt_echo: true,
            ..Default::default()
        });
        let (orchestrator, _) = orchestrator(store.clone());

        let err = orchestrator
            .submit(&full_draft(), true, "203.0.113.9")
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrationError::InsertNotConfirmed { .. }));
    }

    #[test]
    fn test_confirm_echo_requires_id() {
        let draft = full_draft();
        let payload = draft.to_payload("1.2.3.4", None);
        let mut echoed = Registration {
            id: None,
            leader_email: payload.leader_email.clone(),
            team_name: payload.team_name.clone(),
            ..Default::default()
        };
        assert!(confirm_echo(&payload, &echoed).is_err());
        echoed.id = Some(5);
        assert!(confirm_echo(&payload, &echoed).is_ok());
    }
}
