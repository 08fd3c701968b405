//! Per-field validation state.
//!
//! Every field that needs a remote uniqueness check gets one tagged state
//! record in the board, keyed by field id, instead of parallel flag arrays
//! per member slot. A generation counter per field lets the board discard
//! lookup results that were superseded by a newer edit.

use std::collections::HashMap;

/// Identifier for every editable field in the registration form. The wire
/// name doubles as the column name in the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldId {
    LeaderName,
    LeaderEmail,
    LeaderPhone,
    LeaderTshirtSize,
    CollegeName,
    TeamName,
    Member2Name,
    Member2Email,
    Member2Phone,
    Member2TshirtSize,
    Member3Name,
    Member3Email,
    Member3Phone,
    Member3TshirtSize,
    UtrNumber,
    AccountHolderName,
    ProjectIdea,
}

/// Which remote uniqueness probe a field participates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueKind {
    Email,
    Phone,
    TeamName,
    Utr,
}

impl UniqueKind {
    /// Human word used in transport-failure messages.
    pub fn what(&self) -> &'static str {
        match self {
            UniqueKind::Email => "email",
            UniqueKind::Phone => "phone",
            UniqueKind::TeamName => "team name",
            UniqueKind::Utr => "UTR",
        }
    }
}

impl FieldId {
    pub const ALL: [FieldId; 17] = [
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
        FieldId::ProjectIdea,
    ];

    /// Fields whose values must be unique across prior registrations.
    pub const UNIQUE: [FieldId; 8] = [
        FieldId::LeaderEmail,
        FieldId::Member2Email,
        FieldId::Member3Email,
        FieldId::LeaderPhone,
        FieldId::Member2Phone,
        FieldId::Member3Phone,
        FieldId::TeamName,
        FieldId::UtrNumber,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldId::LeaderName => "leader_name",
            FieldId::LeaderEmail => "leader_email",
            FieldId::LeaderPhone => "leader_phone",
            FieldId::LeaderTshirtSize => "leader_tshirt_size",
            FieldId::CollegeName => "college_name",
            FieldId::TeamName => "team_name",
            FieldId::Member2Name => "member2_name",
            FieldId::Member2Email => "member2_email",
            FieldId::Member2Phone => "member2_phone",
            FieldId::Member2TshirtSize => "member2_tshirt_size",
            FieldId::Member3Name => "member3_name",
            FieldId::Member3Email => "member3_email",
            FieldId::Member3Phone => "member3_phone",
            FieldId::Member3TshirtSize => "member3_tshirt_size",
            FieldId::UtrNumber => "utr_number",
            FieldId::AccountHolderName => "account_holder_name",
            FieldId::ProjectIdea => "project_idea",
        }
    }

    pub fn parse(name: &str) -> Option<FieldId> {
        FieldId::ALL.iter().copied().find(|f| f.as_str() == name)
    }

    /// Display label used in refusal messages.
    pub fn label(&self) -> &'static str {
        match self {
            FieldId::LeaderName => "Leader name",
            FieldId::LeaderEmail => "Leader email",
            FieldId::LeaderPhone => "Leader phone",
            FieldId::LeaderTshirtSize => "Leader t-shirt size",
            FieldId::CollegeName => "College/organization",
            FieldId::TeamName => "Team name",
            FieldId::Member2Name => "Member 2 name",
            FieldId::Member2Email => "Member 2 email",
            FieldId::Member2Phone => "Member 2 phone",
            FieldId::Member2TshirtSize => "Member 2 t-shirt size",
            FieldId::Member3Name => "Member 3 name",
            FieldId::Member3Email => "Member 3 email",
            FieldId::Member3Phone => "Member 3 phone",
            FieldId::Member3TshirtSize => "Member 3 t-shirt size",
            FieldId::UtrNumber => "UTR number",
            FieldId::AccountHolderName => "Account holder name",
            FieldId::ProjectIdea => "Project idea",
        }
    }

    pub fn unique_kind(&self) -> Option<UniqueKind> {
        match self {
            FieldId::LeaderEmail | FieldId::Member2Email | FieldId::Member3Email => {
                Some(UniqueKind::Email)
            }
            FieldId::LeaderPhone | FieldId::Member2Phone | FieldId::Member3Phone => {
                Some(UniqueKind::Phone)
            }
            FieldId::TeamName => Some(UniqueKind::TeamName),
            FieldId::UtrNumber => Some(UniqueKind::Utr),
            _ => None,
        }
    }
}

/// Observable validation state of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldState {
    /// Nothing entered yet, or not validated yet
    Unchecked,
    /// Structural validation failed; never reached the network
    Invalid { message: String },
    /// A uniqueness lookup is pending or in flight
    Checking,
    /// Structurally valid and not used by any prior registration
    Unique,
    /// The value already exists in a prior registration
    Conflict { message: String },
    /// The store could not be reached; retyping retries
    Unreachable { message: String },
}

impl FieldState {
    pub fn tag(&self) -> &'static str {
        match self {
            FieldState::Unchecked => "unchecked",
            FieldState::Invalid { .. } => "invalid",
            FieldState::Checking => "checking",
            FieldState::Unique => "unique",
            FieldState::Conflict { .. } => "conflict",
            FieldState::Unreachable { .. } => "unreachable",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            FieldState::Invalid { message }
            | FieldState::Conflict { message }
            | FieldState::Unreachable { message } => message,
            _ => "",
        }
    }
}

/// Validation state for all uniqueness-checked fields.
#[derive(Debug, Default)]
pub struct ValidationBoard {
    states: HashMap<FieldId, FieldState>,
    generations: HashMap<FieldId, u64>,
}

impl ValidationBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, field: FieldId) -> FieldState {
        self.states
            .get(&field)
            .cloned()
            .unwrap_or(FieldState::Unchecked)
    }

    pub fn set_state(&mut self, field: FieldId, state: FieldState) {
        self.states.insert(field, state);
    }

    /// Invalidate any in-flight lookup for the field and return the new
    /// generation a fresh lookup must carry to be applied.
    pub fn bump(&mut self, field: FieldId) -> u64 {
        let counter = self.generations.entry(field).or_insert(0);
        *counter += 1;
        *counter
    }

    pub fn generation(&self, field: FieldId) -> u64 {
        self.generations.get(&field).copied().unwrap_or(0)
    }

    /// Apply a lookup result unless a newer edit superseded it. Returns
    /// whether the result was applied.
    pub fn apply_lookup(&mut self, field: FieldId, generation: u64, state: FieldState) -> bool {
        if generation != self.generation(field) {
            return false;
        }
        self.states.insert(field, state);
        true
    }
}
