//! Wizard sessions: one per registering team, held in memory.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{RegistrationError, Result};
use crate::email::SharedMailer;
use crate::messages;
use crate::models::{Registration, ScreenshotAttachment};
use crate::receipt;
use crate::store::{RegistrationStore, ScreenshotStorage};
use crate::validation::validate_email;

use super::debounce::{FieldTimers, DEBOUNCE_MILLIS};
use super::draft::RegistrationDraft;
use super::field_state::{FieldId, FieldState, ValidationBoard};
use super::otp::{self, OtpSession};
use super::steps::{self, Step};
use super::submit::SubmissionOrchestrator;
use super::uniqueness::UniquenessChecker;

/// Sessions untouched this long are swept.
const STALE_AFTER_SECS: u64 = 3600;

/// Everything mutable about one registration in progress.
pub struct WizardState {
    pub draft: RegistrationDraft,
    pub board: ValidationBoard,
    pub step: Step,
    pub otp: OtpSession,
    pub outcome: Option<Registration>,
}

impl WizardState {
    fn new() -> Self {
        Self {
            draft: RegistrationDraft::new(),
            board: ValidationBoard::new(),
            step: Step::Verification,
            otp: OtpSession::new(),
            outcome: None,
        }
    }
}

/// One team's trip through the registration wizard.
pub struct Wizard {
    id: Uuid,
    state: Arc<RwLock<WizardState>>,
    timers: FieldTimers,
    cooldown_task: parking_lot::Mutex<Option<JoinHandle<()>>>,
    checker: UniquenessChecker,
    store: Arc<dyn RegistrationStore>,
    screenshots: Arc<dyn ScreenshotStorage>,
    mailer: SharedMailer,
    submitting: AtomicBool,
    last_touched: AtomicU64,
    debounce: Duration,
}

impl Wizard {
    fn new(
        store: Arc<dyn RegistrationStore>,
        screenshots: Arc<dyn ScreenshotStorage>,
        mailer: SharedMailer,
        debounce: Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: Arc::new(RwLock::new(WizardState::new())),
            timers: FieldTimers::new(),
            cooldown_task: parking_lot::Mutex::new(None),
            checker: UniquenessChecker::new(store.clone()),
            store,
            screenshots,
            mailer,
            submitting: AtomicBool::new(false),
            last_touched: AtomicU64::new(now_secs()),
            debounce,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    fn touch(&self) {
        self.last_touched.store(now_secs(), Ordering::Relaxed);
    }

    pub fn idle_secs(&self) -> u64 {
        now_secs().saturating_sub(self.last_touched.load(Ordering::Relaxed))
    }

    /// Store a field edit and, for uniqueness-checked fields, restart the
    /// debounced remote lookup. Editing one field never blocks another.
    pub async fn set_field(&self, field: FieldId, value: &str) -> Result<()> {
        self.touch();

        let scheduled = {
            let mut st = self.state.write().await;
            if !st.draft.set(field, value) {
                // No-op edit: state unchanged, no timer restarted
                return Ok(());
            }

            let kind = match field.unique_kind() {
                Some(kind) => kind,
                None => return Ok(()),
            };

            let check = st.draft.check_field(field);
            if !check.valid {
                // Format errors never reach the network
                st.board.bump(field);
                st.board.set_state(
                    field,
                    FieldState::Invalid {
                        message: check.message,
                    },
                );
                self.timers.cancel(field);
                return Ok(());
            }

            let generation = st.board.bump(field);
            st.board.set_state(field, FieldState::Checking);
            (kind, generation, st.draft.get(field).to_string())
        };
        let (kind, generation, settled_value) = scheduled;

        let weak: Weak<RwLock<WizardState>> = Arc::downgrade(&self.state);
        let checker = self.checker.clone();
        let delay = self.debounce;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let probed = checker.probe(kind, &settled_value).await;
            if let Some(state) = weak.upgrade() {
                let mut st = state.write().await;
                if !st.board.apply_lookup(field, generation, probed) {
                    debug!("Discarding stale uniqueness result for {}", field.as_str());
                }
            }
        });
        self.timers.replace(field, handle);

        Ok(())
    }

    /// Generate and dispatch a verification code to the candidate leader
    /// email. A failed dispatch rolls the gate back so the user can retry.
    pub async fn send_otp(&self, email: &str) -> Result<()> {
        self.touch();

        let check = validate_email(email);
        if !check.valid {
            return Err(RegistrationError::InvalidField {
                field: FieldId::LeaderEmail.as_str().to_string(),
                message: check.message,
            });
        }

        let (code, team_name) = {
            let mut st = self.state.write().await;
            if !st.otp.can_send() {
                if st.otp.is_verified() {
                    return Ok(());
                }
                return Err(RegistrationError::VerificationFailed {
                    message: messages::otp_cooldown(st.otp.cooldown_remaining),
                });
            }
            let code = otp::generate_code();
            st.otp.issue(email, code.clone(), Utc::now());
            let team_name = if st.draft.team_name.trim().is_empty() {
                "Team Leader".to_string()
            } else {
                st.draft.team_name.clone()
            };
            (code, team_name)
        };

        match self.mailer.send_otp(email, &team_name, &code).await {
            Ok(()) => {
                self.start_cooldown_ticker();
                info!("Verification code sent to {}", email);
                Ok(())
            }
            Err(e) => {
                let mut st = self.state.write().await;
                st.otp.abort_send();
                Err(e)
            }
        }
    }

    /// Check the user's code against the issued one.
    pub async fn verify_otp(&self, entered: &str) -> Result<()> {
        self.touch();
        let mut st = self.state.write().await;
        st.otp.reenter();
        st.otp.verify(entered.trim())
    }

    /// Move forward one step, enforcing the current step's gate.
    pub async fn advance(&self) -> Result<Step> {
        self.touch();

        let (new_step, autofill_email) = {
            let mut st = self.state.write().await;
            steps::gate(st.step, &st.draft, &st.otp)?;

            let autofill = if st.step == Step::Verification
                && st.draft.leader_email.trim().is_empty()
            {
                Some(st.otp.email.clone())
            } else {
                None
            };

            if let Some(next) = st.step.next() {
                st.step = next;
            }
            (st.step, autofill)
        };

        // Carry the verified email into the leader form, with its own
        // uniqueness check
        if let Some(email) = autofill_email {
            self.set_field(FieldId::LeaderEmail, &email).await?;
        }

        Ok(new_step)
    }

    /// Move back one step; always allowed except on the first step.
    pub async fn retreat(&self) -> Result<Step> {
        self.touch();
        let mut st = self.state.write().await;
        if let Some(previous) = st.step.previous() {
            st.step = previous;
        }
        Ok(st.step)
    }

    /// Attach the payment screenshot to the draft.
    pub async fn attach_screenshot(&self, attachment: ScreenshotAttachment) -> Result<()> {
        self.touch();
        if attachment.bytes.is_empty() {
            return Err(RegistrationError::InvalidField {
                field: "payment_screenshot".to_string(),
                message: "Uploaded file is empty".to_string(),
            });
        }
        let mut st = self.state.write().await;
        st.draft.screenshot = Some(attachment);
        Ok(())
    }

    /// Run the submission orchestrator. At most one submission can be in
    /// flight per session; a second call while one runs is refused.
    pub async fn submit(&self, client_ip: &str) -> Result<Registration> {
        self.touch();
        if self.submitting.swap(true, Ordering::SeqCst) {
            return Err(RegistrationError::SubmissionInFlight);
        }
        let result = self.submit_inner(client_ip).await;
        self.submitting.store(false, Ordering::SeqCst);
        result
    }

    async fn submit_inner(&self, client_ip: &str) -> Result<Registration> {
        let (draft, otp_verified, already_done) = {
            let st = self.state.read().await;
            (st.draft.clone(), st.otp.is_verified(), st.outcome.is_some())
        };
        if already_done {
            return Err(RegistrationError::Internal {
                message: "This session has already submitted a registration".to_string(),
            });
        }

        let orchestrator = SubmissionOrchestrator::new(
            self.store.clone(),
            self.screenshots.clone(),
            self.mailer.clone(),
        );

        match orchestrator.submit(&draft, otp_verified, client_ip).await {
            Ok(record) => {
                let mut st = self.state.write().await;
                st.outcome = Some(record.clone());
                Ok(record)
            }
            Err(e) => {
                // The authoritative re-check wins: reflect a conflict back
                // onto the field board so the two can never disagree
                if let RegistrationError::FieldConflict { field, .. } = &e {
                    if let Some(field_id) = FieldId::parse(field) {
                        let mut st = self.state.write().await;
                        st.board.bump(field_id);
                        st.board.set_state(
                            field_id,
                            FieldState::Conflict {
                                message: messages::already_exists(),
                            },
                        );
                    }
                }
                Err(e)
            }
        }
    }

    /// Self-contained HTML receipt: a preview while the draft is open, the
    /// confirmation once the store has acknowledged the record.
    pub async fn receipt_html(&self) -> String {
        let st = self.state.read().await;
        match &st.outcome {
            Some(record) => receipt::confirmation(record),
            None => {
                let payload = st.draft.to_payload("", None);
                receipt::preview(&payload)
            }
        }
    }

    pub async fn snapshot(&self) -> WizardSnapshot {
        let st = self.state.read().await;

        let mut fields = BTreeMap::new();
        for field in FieldId::UNIQUE {
            let state = st.board.state(field);
            fields.insert(
                field.as_str(),
                FieldStateView {
                    state: state.tag(),
                    message: state.message().to_string(),
                },
            );
        }

        WizardSnapshot {
            session_id: self.id,
            step: st.step.number(),
            step_title: st.step.title(),
            otp_status: st.otp.status().tag(),
            otp_email: st.otp.email.clone(),
            resend_cooldown: st.otp.cooldown_remaining,
            can_resend: st.otp.can_send(),
            fields,
            duplicate_emails: st.draft.has_duplicate_emails(),
            duplicate_phones: st.draft.has_duplicate_phones(),
            screenshot_attached: st.draft.screenshot.is_some(),
            can_advance: steps::gate(st.step, &st.draft, &st.otp).is_ok(),
            can_submit: SubmissionOrchestrator::preflight(&st.draft, st.otp.is_verified())
                .is_ok()
                && st.outcome.is_none(),
            submitted: st.outcome.is_some(),
            registration_id: st.outcome.as_ref().and_then(|r| r.id),
        }
    }

    /// Restart the once-per-second resend countdown.
    fn start_cooldown_ticker(&self) {
        let weak: Weak<RwLock<WizardState>> = Arc::downgrade(&self.state);
        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(1)).await;
                let Some(state) = weak.upgrade() else { break };
                let remaining = {
                    let mut st = state.write().await;
                    st.otp.tick()
                };
                if remaining == 0 {
                    break;
                }
            }
        });
        let mut slot = self.cooldown_task.lock();
        if let Some(old) = slot.replace(handle) {
            old.abort();
        }
    }

    /// Abort all background tasks owned by this session.
    fn teardown(&self) {
        self.timers.cancel_all();
        if let Some(handle) = self.cooldown_task.lock().take() {
            handle.abort();
        }
    }
}

impl Drop for Wizard {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Serializable view of a wizard session for the HTTP surface.
#[derive(Debug, Serialize)]
pub struct WizardSnapshot {
    pub session_id: Uuid,
    pub step: u8,
    pub step_title: &'static str,
    pub otp_status: &'static str,
    pub otp_email: String,
    pub resend_cooldown: u32,
    pub can_resend: bool,
    pub fields: BTreeMap<&'static str, FieldStateView>,
    pub duplicate_emails: bool,
    pub duplicate_phones: bool,
    pub screenshot_attached: bool,
    pub can_advance: bool,
    pub can_submit: bool,
    pub submitted: bool,
    pub registration_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct FieldStateView {
    pub state: &'static str,
    pub message: String,
}

/// Registry of live wizard sessions.
pub struct WizardManager {
    sessions: DashMap<Uuid, Arc<Wizard>>,
    store: Arc<dyn RegistrationStore>,
    screenshots: Arc<dyn ScreenshotStorage>,
    mailer: SharedMailer,
}

impl WizardManager {
    pub fn new(
        store: Arc<dyn RegistrationStore>,
        screenshots: Arc<dyn ScreenshotStorage>,
        mailer: SharedMailer,
    ) -> Self {
        Self {
            sessions: DashMap::new(),
            store,
            screenshots,
            mailer,
        }
    }

    /// Open a fresh wizard session.
    pub fn open(&self) -> Arc<Wizard> {
        let wizard = Arc::new(Wizard::new(
            self.store.clone(),
            self.screenshots.clone(),
            self.mailer.clone(),
            Duration::from_millis(DEBOUNCE_MILLIS),
        ));
        self.sessions.insert(wizard.id(), wizard.clone());
        debug!("Opened wizard session {}", wizard.id());
        wizard
    }

    pub fn get(&self, id: Uuid) -> Option<Arc<Wizard>> {
        self.sessions.get(&id).map(|w| w.clone())
    }

    pub fn close(&self, id: Uuid) {
        if let Some((_, wizard)) = self.sessions.remove(&id) {
            wizard.teardown();
            debug!("Closed wizard session {}", id);
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Drop sessions that have been idle for over an hour.
    pub fn cleanup_stale(&self) {
        let before = self.sessions.len();
        self.sessions.retain(|_, wizard| {
            let keep = wizard.idle_secs() < STALE_AFTER_SECS;
            if !keep {
                wizard.teardown();
            }
            keep
        });
        let swept = before - self.sessions.len();
        if swept > 0 {
            info!("Swept {} stale wizard sessions", swept);
        }
    }
}

/// Shared wizard manager type
pub type SharedWizardManager = Arc<WizardManager>;

pub fn create_shared_wizard_manager(
    store: Arc<dyn RegistrationStore>,
    screenshots: Arc<dyn ScreenshotStorage>,
    mailer: SharedMailer,
) -> SharedWizardManager {
    Arc::new(WizardManager::new(store, screenshots, mailer))
}

fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
