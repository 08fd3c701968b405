use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistrationError {
    // Configuration errors
    #[error("Missing required configuration: {name}")]
    ConfigMissing { name: String },

    // Field-level errors
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },

    #[error("{message}")]
    FieldConflict { field: String, message: String },

    // Verification errors
    #[error("Verification failed: {message}")]
    VerificationFailed { message: String },

    #[error("Failed to send verification email: {message}")]
    EmailDispatch { message: String },

    // Submission errors
    #[error("Screenshot upload failed: {message}")]
    UploadFailed { message: String },

    #[error("Registration store request failed: {source}")]
    StoreRequest {
        #[source]
        source: reqwest::Error,
    },

    #[error("Registration store rejected the request (HTTP {status}): {detail}")]
    StoreRejected { status: u16, detail: String },

    #[error("Registration was not confirmed by the store: {detail}")]
    InsertNotConfirmed { detail: String },

    #[error("A submission is already in progress for this session")]
    SubmissionInFlight,

    // Session errors
    #[error("Wizard session not found: {id}")]
    SessionNotFound { id: String },

    // Generic errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl RegistrationError {
    /// Name of the field this error points at, when it has one.
    pub fn field(&self) -> Option<&str> {
        match self {
            RegistrationError::InvalidField { field, .. }
            | RegistrationError::FieldConflict { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for RegistrationError {
    fn from(err: reqwest::Error) -> Self {
        RegistrationError::StoreRequest { source: err }
    }
}

impl From<serde_json::Error> for RegistrationError {
    fn from(err: serde_json::Error) -> Self {
        RegistrationError::Internal {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RegistrationError>;
