pub mod mailer;
pub mod templates;

pub use mailer::{create_mailer, HttpMailer, LogMailer, Mailer, SharedMailer};
