//! The five-step registration flow and its gating rules.

use crate::error::{RegistrationError, Result};
use crate::messages;

use super::draft::{RegistrationDraft, LEADER_FIELDS, MEMBER_FIELDS, PAYMENT_FIELDS};
use super::otp::OtpSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Verification,
    Leader,
    Members,
    Payment,
    Review,
}

impl Step {
    pub const ALL: [Step; 5] = [
        Step::Verification,
        Step::Leader,
        Step::Members,
        Step::Payment,
        Step::Review,
    ];

    /// 1-based position shown in the progress bar.
    pub fn number(&self) -> u8 {
        match self {
            Step::Verification => 1,
            Step::Leader => 2,
            Step::Members => 3,
            Step::Payment => 4,
            Step::Review => 5,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Step::Verification => "Email Verification",
            Step::Leader => "Team Leader Information",
            Step::Members => "Team Members Information",
            Step::Payment => "Payment Details",
            Step::Review => "Review & Submit",
        }
    }

    pub fn next(&self) -> Option<Step> {
        match self {
            Step::Verification => Some(Step::Leader),
            Step::Leader => Some(Step::Members),
            Step::Members => Some(Step::Payment),
            Step::Payment => Some(Step::Review),
            Step::Review => None,
        }
    }

    pub fn previous(&self) -> Option<Step> {
        match self {
            Step::Verification => None,
            Step::Leader => Some(Step::Verification),
            Step::Members => Some(Step::Leader),
            Step::Payment => Some(Step::Members),
            Step::Review => Some(Step::Payment),
        }
    }
}

/// Check whether forward navigation is allowed off the given step.
pub fn gate(step: Step, draft: &RegistrationDraft, otp: &OtpSession) -> Result<()> {
    match step {
        Step::Verification => {
            if otp.is_verified() {
                Ok(())
            } else {
                Err(RegistrationError::VerificationFailed {
                    message: messages::verify_email_first(),
                })
            }
        }
        Step::Leader => draft.require_complete(&LEADER_FIELDS),
        Step::Members => draft.require_complete(&MEMBER_FIELDS),
        Step::Payment => {
            draft.require_complete(&PAYMENT_FIELDS)?;
            if draft.screenshot.is_none() {
                return Err(RegistrationError::InvalidField {
                    field: "payment_screenshot".to_string(),
                    message: "Payment screenshot is required".to_string(),
                });
            }
            Ok(())
        }
        // Terminal step; the submit operation has its own gate
        Step::Review => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::field_state::FieldId;
    use crate::models::ScreenshotAttachment;
    use chrono::Utc;

    fn verified_otp() -> OtpSession {
        let mut otp = OtpSession::new();
        otp.issue("leader@college.edu", "482913".to_string(), Utc::now());
        otp.verify("482913").unwrap();
        otp
    }

    fn filled_draft() -> RegistrationDraft {
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
            bytes: vec![0],
        });
        draft
    }

    #[test]
    fn test_step_ordering() {
        assert_eq!(Step::Verification.next(), Some(Step::Leader));
        assert_eq!(Step::Review.next(), None);
        assert_eq!(Step::Verification.previous(), None);
        assert_eq!(Step::Review.previous(), Some(Step::Payment));
        assert_eq!(Step::Review.number(), 5);
    }

    #[test]
    fn test_verification_step_requires_verified_otp() {
        let draft = filled_draft();
        let unverified = OtpSession::new();
        assert!(gate(Step::Verification, &draft, &unverified).is_err());
        assert!(gate(Step::Verification, &draft, &verified_otp()).is_ok());
    }

    #[test]
    fn test_leader_step_requires_valid_fields() {
        let otp = verified_otp();
        let mut draft = filled_draft();
        assert!(gate(Step::Leader, &draft, &otp).is_ok());

        draft.set(FieldId::LeaderEmail, "not-an-email");
        let err = gate(Step::Leader, &draft, &otp).unwrap_err();
        assert_eq!(err.field(), Some("leader_email"));
    }

    #[test]
    fn test_payment_step_requires_screenshot() {
        let otp = verified_otp();
        let mut draft = filled_draft();
        draft.screenshot = None;
        let err = gate(Step::Payment, &draft, &otp).unwrap_err();
        assert_eq!(err.field(), Some("payment_screenshot"));
    }

    #[test]
    fn test_members_step_checks_both_members() {
        let otp = verified_otp();
        let mut draft = filled_draft();
        draft.set(FieldId::Member3Phone, "123");
        let err = gate(Step::Members, &draft, &otp).unwrap_err();
        assert_eq!(err.field(), Some("member3_phone"));
    }
}
