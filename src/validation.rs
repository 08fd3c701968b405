//! Structural field validation.
//!
//! Every check here is synchronous and side-effect-free: it looks at the
//! value alone and reports a result, never touching the network. Uniqueness
//! against prior registrations is a separate concern (wizard::uniqueness).

use std::str::FromStr;

use crate::models::TshirtSize;

/// Outcome of a structural check. `message` is empty when the value passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCheck {
    pub valid: bool,
    pub message: String,
}

impl FieldCheck {
    pub fn ok() -> Self {
        Self {
            valid: true,
            message: String::new(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
        }
    }
}

/// Validate an email address shape.
pub fn validate_email(email: &str) -> FieldCheck {
    if email.is_empty() {
        return FieldCheck::fail("Email is required");
    }
    if email.len() < 5 {
        return FieldCheck::fail("Email must be at least 5 characters long");
    }
    if email.len() > 254 {
        return FieldCheck::fail("Email must be less than 254 characters");
    }

    let mut parts = email.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) if !local.is_empty() => (local, domain),
        _ => return FieldCheck::fail("Please enter a valid email address"),
    };

    let local_ok = local
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '%' | '+' | '-'));
    if !local_ok {
        return FieldCheck::fail("Please enter a valid email address");
    }

    if email.contains("..") || email.contains("__") || email.contains("--") {
        return FieldCheck::fail("Email contains invalid consecutive characters");
    }

    if !domain.contains('.') || domain.len() < 3 {
        return FieldCheck::fail("Please enter a valid email domain");
    }
    if domain.starts_with('.') || domain.ends_with('.') {
        return FieldCheck::fail("Invalid domain format");
    }
    let domain_ok = domain
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-'));
    if !domain_ok {
        return FieldCheck::fail("Invalid domain format");
    }
    // Top-level label must be alphabetic and at least two characters
    let tld = domain.rsplit('.').next().unwrap_or("");
    if tld.len() < 2 || !tld.chars().all(|c| c.is_ascii_alphabetic()) {
        return FieldCheck::fail("Please enter a valid email domain");
    }

    FieldCheck::ok()
}

/// Validate an Indian mobile number: 10 digits starting 6-9, optionally
/// prefixed with the 91 country code. Separators and spaces are ignored.
pub fn validate_phone(phone: &str) -> FieldCheck {
    if phone.is_empty() {
        return FieldCheck::fail("Phone number is required");
    }

    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() == 10 && is_valid_mobile(&digits) {
        return FieldCheck::ok();
    }

    if digits.len() == 12 && digits.starts_with("91") && is_valid_mobile(&digits[2..]) {
        return FieldCheck::ok();
    }

    FieldCheck::fail("Please enter a valid 10-digit phone number")
}

fn is_valid_mobile(digits: &str) -> bool {
    digits.len() == 10
        && digits.starts_with(|c| matches!(c, '6'..='9'))
        && digits.chars().all(|c| c.is_ascii_digit())
}

/// Validate a UTR (bank transaction reference): exactly 12 digits.
pub fn validate_utr(utr: &str) -> FieldCheck {
    if utr.is_empty() {
        return FieldCheck::fail("UTR number is required");
    }
    if utr.len() != 12 || !utr.chars().all(|c| c.is_ascii_digit()) {
        return FieldCheck::fail("UTR number must be exactly 12 digits");
    }
    FieldCheck::ok()
}

/// Strip everything but digits from a UTR as entered.
pub fn normalize_utr(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Validate a team name: 3-50 characters after trimming.
pub fn validate_team_name(team_name: &str) -> FieldCheck {
    let trimmed = team_name.trim();
    if trimmed.is_empty() {
        return FieldCheck::fail("Team name is required");
    }
    if trimmed.len() < 3 {
        return FieldCheck::fail("Team name must be at least 3 characters long");
    }
    if trimmed.len() > 50 {
        return FieldCheck::fail("Team name must be less than 50 characters");
    }
    FieldCheck::ok()
}

/// Validate a plain required field (names, college, account holder).
pub fn validate_required(label: &str, value: &str) -> FieldCheck {
    if value.trim().is_empty() {
        return FieldCheck::fail(format!("{} is required", label));
    }
    FieldCheck::ok()
}

/// Validate a t-shirt size selection.
pub fn validate_tshirt_size(value: &str) -> FieldCheck {
    if value.trim().is_empty() {
        return FieldCheck::fail("T-shirt size is required");
    }
    match TshirtSize::from_str(value) {
        Ok(_) => FieldCheck::ok(),
        Err(_) => FieldCheck::fail("Please select a valid t-shirt size"),
    }
}
