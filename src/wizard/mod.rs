pub mod debounce;
pub mod draft;
pub mod field_state;
pub mod otp;
pub mod session;
pub mod steps;
pub mod submit;
pub mod uniqueness;

pub use draft::RegistrationDraft;
pub use field_state::{FieldId, FieldState};
pub use otp::{OtpSession, OtpStatus};
pub use session::{
    create_shared_wizard_manager, SharedWizardManager, Wizard, WizardManager, WizardSnapshot,
};
pub use steps::Step;
pub use submit::SubmissionOrchestrator;
