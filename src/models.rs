// src/models.rs
use serde::{Deserialize, Serialize};

/// Fixed registration fee, not user-editable.
pub const REGISTRATION_FEE_INR: u32 = 600;

pub const EVENT_NAME: &str = "HackVibe 2025";
pub const EVENT_DATE: &str = "September 11th, 2025";
pub const EVENT_VENUE: &str = "Vignan Institute of Technology and Science";

/// T-shirt sizes offered at the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TshirtSize {
    S,
    M,
    L,
    XL,
    XXL,
}

impl std::str::FromStr for TshirtSize {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, ()> {
        match s.trim().to_ascii_uppercase().as_str() {
            "S" => Ok(TshirtSize::S),
            "M" => Ok(TshirtSize::M),
            "L" => Ok(TshirtSize::L),
            "XL" => Ok(TshirtSize::XL),
            "XXL" => Ok(TshirtSize::XXL),
            _ => Err(()),
        }
    }
}

/// Payload inserted into the `registrations` collection. Field names match
/// the remote schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewRegistration {
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
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_idea: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_screenshot_path: Option<String>,
    pub ip_address: String,
}

/// A registration record echoed back by the store.
///
/// Everything is defaulted so that a partial echo still deserializes; the
/// submission path decides whether the echo is good enough to count as a
/// confirmed insert.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Registration {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub leader_name: String,
    #[serde(default)]
    pub leader_email: String,
    #[serde(default)]
    pub leader_phone: String,
    #[serde(default)]
    pub leader_tshirt_size: String,
    #[serde(default)]
    pub college_name: String,
    #[serde(default)]
    pub team_name: String,
    #[serde(default)]
    pub member2_name: String,
    #[serde(default)]
    pub member2_email: String,
    #[serde(default)]
    pub member2_phone: String,
    #[serde(default)]
    pub member2_tshirt_size: String,
    #[serde(default)]
    pub member3_name: String,
    #[serde(default)]
    pub member3_email: String,
    #[serde(default)]
    pub member3_phone: String,
    #[serde(default)]
    pub member3_tshirt_size: String,
    #[serde(default)]
    pub utr_number: String,
    #[serde(default)]
    pub account_holder_name: String,
    #[serde(default)]
    pub project_idea: Option<String>,
    #[serde(default)]
    pub payment_screenshot_path: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub email_verified: Option<bool>,
}

/// A payment screenshot held in memory until submission uploads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenshotAttachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Team/participant counters shown on the landing page.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistrationCounts {
    pub teams: usize,
    pub participants: usize,
}

impl RegistrationCounts {
    pub fn from_teams(teams: usize) -> Self {
        Self {
            teams,
            participants: teams * 3,
        }
    }
}
