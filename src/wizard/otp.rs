//! One-time code verification for the team leader email.

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::error::{RegistrationError, Result};
use crate::messages;

/// Seconds the resend button stays locked after a send.
pub const RESEND_COOLDOWN_SECS: u32 = 60;

/// How long a code is documented to stay valid. The gate does not auto-clear
/// on expiry; the window is stated in the email.
pub const CODE_VALIDITY_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpStatus {
    NotSent,
    Pending,
    Verified,
    Failed,
}

impl Default for OtpStatus {
    fn default() -> Self {
        OtpStatus::NotSent
    }
}

impl OtpStatus {
    pub fn tag(&self) -> &'static str {
        match self {
            OtpStatus::NotSent => "not_sent",
            OtpStatus::Pending => "pending",
            OtpStatus::Verified => "verified",
            OtpStatus::Failed => "failed",
        }
    }
}

/// Generate a uniformly random, zero-padded 6-digit code.
pub fn generate_code() -> String {
    let n: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{:06}", n)
}

/// Ephemeral verification session for the candidate leader email.
///
/// The expected code lives only here, in memory, and is never part of the
/// persisted registration.
#[derive(Debug, Clone, Default)]
pub struct OtpSession {
    pub email: String,
    code: Option<String>,
    status: OtpStatus,
    pub issued_at: Option<DateTime<Utc>>,
    pub cooldown_remaining: u32,
    pub attempts: u32,
}

impl OtpSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> OtpStatus {
        self.status
    }

    pub fn is_verified(&self) -> bool {
        self.status == OtpStatus::Verified
    }

    /// A (re)send is allowed only while no cooldown is running.
    pub fn can_send(&self) -> bool {
        self.cooldown_remaining == 0 && self.status != OtpStatus::Verified
    }

    /// Record a freshly issued code. Any previous code is invalidated and
    /// the resend cooldown restarts.
    pub fn issue(&mut self, email: &str, code: String, now: DateTime<Utc>) {
        self.email = email.to_string();
        self.code = Some(code);
        self.status = OtpStatus::Pending;
        self.issued_at = Some(now);
        self.cooldown_remaining = RESEND_COOLDOWN_SECS;
    }

    /// Roll back a send whose email dispatch failed.
    pub fn abort_send(&mut self) {
        self.code = None;
        self.status = OtpStatus::NotSent;
        self.issued_at = None;
        self.cooldown_remaining = 0;
    }

    /// Compare the entered code against the issued one.
    pub fn verify(&mut self, entered: &str) -> Result<()> {
        match self.status {
            OtpStatus::NotSent => Err(RegistrationError::VerificationFailed {
                message: messages::otp_not_sent(),
            }),
            OtpStatus::Verified => Ok(()),
            OtpStatus::Pending | OtpStatus::Failed => {
                self.attempts += 1;
                if self.code.as_deref() == Some(entered) {
                    self.status = OtpStatus::Verified;
                    self.code = None;
                    Ok(())
                } else {
                    // The session stays usable: the next attempt re-enters
                    // Pending without a resend
                    self.status = OtpStatus::Failed;
                    Err(RegistrationError::VerificationFailed {
                        message: messages::invalid_otp(),
                    })
                }
            }
        }
    }

    /// A fresh keystroke in the code input moves Failed back to Pending.
    pub fn reenter(&mut self) {
        if self.status == OtpStatus::Failed {
            self.status = OtpStatus::Pending;
        }
    }

    /// One-second cooldown tick; returns the remaining seconds.
    pub fn tick(&mut self) -> u32 {
        self.cooldown_remaining = self.cooldown_remaining.saturating_sub(1);
        self.cooldown_remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_code_shape() {
        for _ in 0..200 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_round_trip_verification() {
        let mut session = OtpSession::new();
        session.issue("leader@college.edu", "482913".to_string(), Utc::now());
        assert_eq!(session.status(), OtpStatus::Pending);

        assert!(session.verify("482913").is_ok());
        assert!(session.is_verified());
    }

    #[test]
    fn test_wrong_code_allows_immediate_retry() {
        let mut session = OtpSession::new();
        session.issue("leader@college.edu", "482913".to_string(), Utc::now());

        assert!(session.verify("123456").is_err());
        assert_eq!(session.status(), OtpStatus::Failed);

        session.reenter();
        assert_eq!(session.status(), OtpStatus::Pending);

        // No resend needed; the original code still verifies
        assert!(session.verify("482913").is_ok());
        assert_eq!(session.attempts, 2);
    }

    #[test]
    fn test_verify_without_send_is_refused() {
        let mut session = OtpSession::new();
        assert!(session.verify("000000").is_err());
        assert_eq!(session.status(), OtpStatus::NotSent);
    }

    #[test]
    fn test_resend_gating_and_code_invalidation() {
        let mut session = OtpSession::new();
        session.issue("leader@college.edu", "111111".to_string(), Utc::now());
        assert!(!session.can_send());

        for _ in 0..RESEND_COOLDOWN_SECS {
            session.tick();
        }
        assert_eq!(session.cooldown_remaining, 0);
        assert!(session.can_send());

        session.issue("leader@college.edu", "222222".to_string(), Utc::now());
        // The first code no longer verifies
        assert!(session.verify("111111").is_err());
        session.reenter();
        assert!(session.verify("222222").is_ok());
    }

    #[test]
    fn test_abort_send_clears_everything() {
        let mut session = OtpSession::new();
        session.issue("leader@college.edu", "333333".to_string(), Utc::now());
        session.abort_send();

        assert_eq!(session.status(), OtpStatus::NotSent);
        assert_eq!(session.cooldown_remaining, 0);
        assert!(session.can_send());
    }

    #[test]
    fn test_tick_saturates_at_zero() {
        let mut session = OtpSession::new();
        assert_eq!(session.tick(), 0);
    }
}
