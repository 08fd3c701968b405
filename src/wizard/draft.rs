//! In-memory draft of one team's registration form.

use std::collections::HashSet;

use crate::error::{RegistrationError, Result};
use crate::models::{NewRegistration, ScreenshotAttachment};
use crate::validation::{
    normalize_utr, validate_email, validate_phone, validate_required, validate_team_name,
    validate_tshirt_size, validate_utr, FieldCheck,
};

use super::field_state::FieldId;

/// All fields that must be filled before submission. `project_idea` is the
/// only optional one.
pub const REQUIRED_FIELDS: [FieldId; 16] = [
    FieldId::LeaderName,
    FieldId::LeaderEmail,
    FieldId::LeaderPhone,
    FieldId::LeaderTshirtSize,
    FieldId::CollegeName,
    FieldId::TeamName,
    FieldId::Member2Name,
    FieldId::Member2Email,
    FieldId::Member2Phone,
    FieldId::Member2TshirtSize,
    FieldId::Member3Name,
    FieldId::Member3Email,
    FieldId::Member3Phone,
    FieldId::Member3TshirtSize,
    FieldId::UtrNumber,
    FieldId::AccountHolderName,
];

/// Fields gating the leader-info step.
pub const LEADER_FIELDS: [FieldId; 6] = [
    FieldId::LeaderName,
    FieldId::LeaderEmail,
    FieldId::LeaderPhone,
    FieldId::LeaderTshirtSize,
    FieldId::CollegeName,
    FieldId::TeamName,
];

/// Fields gating the member-info step.
pub const MEMBER_FIELDS: [FieldId; 8] = [
    FieldId::Member2Name,
    FieldId::Member2Email,
    FieldId::Member2Phone,
    FieldId::Member2TshirtSize,
    FieldId::Member3Name,
    FieldId::Member3Email,
    FieldId::Member3Phone,
    FieldId::Member3TshirtSize,
];

/// Fields gating the payment step (the screenshot is checked separately).
pub const PAYMENT_FIELDS: [FieldId; 2] = [FieldId::UtrNumber, FieldId::AccountHolderName];

#[derive(Debug, Clone, Default)]
pub struct RegistrationDraft {
    pub leader_name: String,
    pub leader_email: String,
    pub leader_phone: String,
    pub leader_tshirt_size: String,
    pub college_name: String,
    pub team_name: String,
    pub member2_name: String,
    pub member2_email: String,
    pub member2_phone: String,
    pub member2_tshirt_size: String,
    pub member3_name: String,
    pub member3_email: String,
    pub member3_phone: String,
    pub member3_tshirt_size: String,
    pub utr_number: String,
    pub account_holder_name: String,
    pub project_idea: String,
    pub screenshot: Option<ScreenshotAttachment>,
}

impl RegistrationDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: FieldId) -> &str {
        match field {
            FieldId::LeaderName => &self.leader_name,
            FieldId::LeaderEmail => &self.leader_email,
            FieldId::LeaderPhone => &self.leader_phone,
            FieldId::LeaderTshirtSize => &self.leader_tshirt_size,
            FieldId::CollegeName => &self.college_name,
            FieldId::TeamName => &self.team_name,
            FieldId::Member2Name => &self.member2_name,
            FieldId::Member2Email => &self.member2_email,
            FieldId::Member2Phone => &self.member2_phone,
            FieldId::Member2TshirtSize => &self.member2_tshirt_size,
            FieldId::Member3Name => &self.member3_name,
            FieldId::Member3Email => &self.member3_email,
            FieldId::Member3Phone => &self.member3_phone,
            FieldId::Member3TshirtSize => &self.member3_tshirt_size,
            FieldId::UtrNumber => &self.utr_number,
            FieldId::AccountHolderName => &self.account_holder_name,
            FieldId::ProjectIdea => &self.project_idea,
        }
    }

    /// Store a new value for the field. UTR input is reduced to its digits
    /// before storing. Returns false when the stored value did not change,
    /// so no-op edits never re-trigger validation.
    pub fn set(&mut self, field: FieldId, value: &str) -> bool {
        let value = match field {
            FieldId::UtrNumber => normalize_utr(value),
            _ => value.to_string(),
        };
        if self.get(field) == value {
            return false;
        }
        let slot = match field {
            FieldId::LeaderName => &mut self.leader_name,
            FieldId::LeaderEmail => &mut self.leader_email,
            FieldId::LeaderPhone => &mut self.leader_phone,
            FieldId::LeaderTshirtSize => &mut self.leader_tshirt_size,
            FieldId::CollegeName => &mut self.college_name,
            FieldId::TeamName => &mut self.team_name,
            FieldId::Member2Name => &mut self.member2_name,
            FieldId::Member2Email => &mut self.member2_email,
            FieldId::Member2Phone => &mut self.member2_phone,
            FieldId::Member2TshirtSize => &mut self.member2_tshirt_size,
            FieldId::Member3Name => &mut self.member3_name,
            FieldId::Member3Email => &mut self.member3_email,
            FieldId::Member3Phone => &mut self.member3_phone,
            FieldId::Member3TshirtSize => &mut self.member3_tshirt_size,
            FieldId::UtrNumber => &mut self.utr_number,
            FieldId::AccountHolderName => &mut self.account_holder_name,
            FieldId::ProjectIdea => &mut self.project_idea,
        };
        *slot = value;
        true
    }

    /// Structural validation for one field's current value.
    pub fn check_field(&self, field: FieldId) -> FieldCheck {
        let value = self.get(field);
        match field {
            FieldId::LeaderEmail | FieldId::Member2Email | FieldId::Member3Email => {
                validate_email(value)
            }
            FieldId::LeaderPhone | FieldId::Member2Phone | FieldId::Member3Phone => {
                validate_phone(value)
            }
            FieldId::UtrNumber => validate_utr(value),
            FieldId::TeamName => validate_team_name(value),
            FieldId::LeaderTshirtSize
            | FieldId::Member2TshirtSize
            | FieldId::Member3TshirtSize => validate_tshirt_size(value),
            FieldId::ProjectIdea => FieldCheck::ok(),
            _ => validate_required(field.label(), value),
        }
    }

    /// Require every listed field to be present and structurally valid.
    pub fn require_complete(&self, fields: &[FieldId]) -> Result<()> {
        for field in fields {
            let check = self.check_field(*field);
            if !check.valid {
                return Err(RegistrationError::InvalidField {
                    field: field.as_str().to_string(),
                    message: check.message,
                });
            }
        }
        Ok(())
    }

    fn non_empty(values: [&str; 3]) -> Vec<&str> {
        values
            .into_iter()
            .filter(|v| !v.trim().is_empty())
            .collect()
    }

    /// Two members typed the same email within this draft.
    pub fn has_duplicate_emails(&self) -> bool {
        let emails = Self::non_empty([
            &self.leader_email,
            &self.member2_email,
            &self.member3_email,
        ]);
        emails.len() > 1 && emails.iter().collect::<HashSet<_>>().len() != emails.len()
    }

    /// Two members typed the same phone within this draft.
    pub fn has_duplicate_phones(&self) -> bool {
        let phones = Self::non_empty([
            &self.leader_phone,
            &self.member2_phone,
            &self.member3_phone,
        ]);
        phones.len() > 1 && phones.iter().collect::<HashSet<_>>().len() != phones.len()
    }

    /// Assemble the store payload from the draft.
    pub fn to_payload(
        &self,
        ip_address: &str,
        payment_screenshot_path: Option<String>,
    ) -> NewRegistration {
        let project_idea = self.project_idea.trim();
        NewRegistration {
            leader_name: self.leader_name.clone(),
            leader_email: self.leader_email.clone(),
            leader_phone: self.leader_phone.clone(),
            leader_tshirt_size: self.leader_tshirt_size.clone(),
            college_name: self.college_name.clone(),
            team_name: self.team_name.clone(),
            member2_name: self.member2_name.clone(),
            member2_email: self.member2_email.clone(),
            member2_phone: self.member2_phone.clone(),
            member2_tshirt_size: self.member2_tshirt_size.clone(),
            member3_name: self.member3_name.clone(),
            member3_email: self.member3_email.clone(),
            member3_phone: self.member3_phone.clone(),
            member3_tshirt_size: self.member3_tshirt_size.clone(),
            utr_number: self.utr_number.clone(),
            account_holder_name: self.account_holder_name.clone(),
            project_idea: if project_idea.is_empty() {
                None
            } else {
                Some(project_idea.to_string())
            },
            payment_screenshot_path,
            ip_address: ip_address.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Draft that passes every structural check.
    pub fn complete_draft() -> RegistrationDraft {
        let mut draft = RegistrationDraft::new();
        draft.set(FieldId::LeaderName, "Asha Rao");
        draft.set(FieldId::LeaderEmail, "asha@college.edu");
        draft.set(FieldId::LeaderPhone, "9876543210");
        draft.set(FieldId::LeaderTshirtSize, "M");
        draft.set(FieldId::CollegeName, "Vignan Institute");
        draft.set(FieldId::TeamName, "Byte Ninjas");
        draft.set(FieldId::Member2Name, "Ravi Kumar");
        draft.set(FieldId::Member2Email, "ravi@college.edu");
        draft.set(FieldId::Member2Phone, "9876543211");
        draft.set(FieldId::Member2TshirtSize, "L");
        draft.set(FieldId::Member3Name, "Divya Singh");
        draft.set(FieldId::Member3Email, "divya@college.edu");
        draft.set(FieldId::Member3Phone, "9876543212");
        draft.set(FieldId::Member3TshirtSize, "S");
        draft.set(FieldId::UtrNumber, "123456789012");
        draft.set(FieldId::AccountHolderName, "Asha Rao");
        draft.screenshot = Some(ScreenshotAttachment {
            file_name: "proof.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![1, 2, 3],
        });
        draft
    }

    #[test]
    fn test_set_is_idempotent() {
        let mut draft = RegistrationDraft::new();
        assert!(draft.set(FieldId::TeamName, "Byte Ninjas"));
        assert!(!draft.set(FieldId::TeamName, "Byte Ninjas"));
        assert!(draft.set(FieldId::TeamName, "Byte Ninjas!"));
    }

    #[test]
    fn test_utr_is_normalized_on_set() {
        let mut draft = RegistrationDraft::new();
        draft.set(FieldId::UtrNumber, "1234-5678-9012");
        assert_eq!(draft.utr_number, "123456789012");
        // Re-entering the same digits through different separators is a no-op
        assert!(!draft.set(FieldId::UtrNumber, "1234 5678 9012"));
    }

    #[test]
    fn test_intra_form_duplicates() {
        let mut draft = complete_draft();
        assert!(!draft.has_duplicate_emails());
        assert!(!draft.has_duplicate_phones());

        draft.set(FieldId::Member3Email, "ravi@college.edu");
        assert!(draft.has_duplicate_emails());

        draft.set(FieldId::Member2Phone, "9876543212");
        assert!(draft.has_duplicate_phones());
    }

    #[test]
    fn test_empty_fields_do_not_count_as_duplicates() {
        let mut draft = RegistrationDraft::new();
        draft.set(FieldId::LeaderEmail, "asha@college.edu");
        assert!(!draft.has_duplicate_emails());
    }

    #[test]
    fn test_require_complete_names_the_field() {
        let mut draft = complete_draft();
        draft.set(FieldId::Member2Email, "broken");
        let err = draft.require_complete(&REQUIRED_FIELDS).unwrap_err();
        assert_eq!(err.field(), Some("member2_email"));
    }

    #[test]
    fn test_payload_carries_all_person_fields() {
        let draft = complete_draft();
        let payload = draft.to_payload("203.0.113.9", Some("payment_x.png".to_string()));
        assert_eq!(payload.leader_name, "Asha Rao");
        assert_eq!(payload.member2_email, "ravi@college.edu");
        assert_eq!(payload.member3_phone, "9876543212");
        assert_eq!(payload.utr_number, "123456789012");
        assert_eq!(payload.ip_address, "203.0.113.9");
        assert_eq!(
            payload.payment_screenshot_path.as_deref(),
            Some("payment_x.png")
        );
        assert_eq!(payload.project_idea, None);
    }
}
