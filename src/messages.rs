// src/messages.rs

/// Generic per-field conflict shown next to the input.
pub fn already_exists() -> String {
    "This already exists".to_string()
}

/// Transport failure during a live uniqueness check.
pub fn check_failed(what: &str) -> String {
    format!("Failed to validate {}. Please try again.", what)
}

pub fn duplicate_team_name() -> String {
    "Team name already exists. Please choose a different name.".to_string()
}

pub fn duplicate_leader_email() -> String {
    "Leader email already registered. Please use a different email.".to_string()
}

pub fn duplicate_utr() -> String {
    "UTR number already exists. Please check your UTR number.".to_string()
}

pub fn members_share_email() -> String {
    "All team members must have unique email addresses.".to_string()
}

pub fn members_share_phone() -> String {
    "All team members must have unique phone numbers.".to_string()
}

pub fn invalid_otp() -> String {
    "Invalid OTP code. Please check and try again.".to_string()
}

pub fn otp_not_sent() -> String {
    "No verification code has been sent yet. Request one first.".to_string()
}

pub fn otp_cooldown(seconds: u32) -> String {
    format!("Please wait {}s before requesting another code.", seconds)
}

pub fn verify_email_first() -> String {
    "Verify the team leader email before continuing.".to_string()
}

pub fn registration_success(id: i64) -> String {
    format!(
        "Registration successful! Thank you for registering for HackVibe 2025. (ID: {})",
        id
    )
}

pub fn registration_store_failure(detail: &str) -> String {
    format!(
        "Failed to save registration to database. Please try again. ({})",
        detail
    )
}
