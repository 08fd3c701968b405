//! Remote uniqueness probes for settled field values.

use std::sync::Arc;

use tracing::warn;

use crate::messages;
use crate::store::RegistrationStore;

use super::field_state::{FieldState, UniqueKind};

/// Runs store lookups and folds the outcome into a field state. The caller
/// owns debouncing and staleness; this type only answers "is it taken".
#[derive(Clone)]
pub struct UniquenessChecker {
    store: Arc<dyn RegistrationStore>,
}

impl UniquenessChecker {
    pub fn new(store: Arc<dyn RegistrationStore>) -> Self {
        Self { store }
    }

    /// Probe the store for the value and report the resulting field state.
    ///
    /// A store failure is reported as `Unreachable`, never as `Unique`: an
    /// unreachable store must not wave values through.
    pub async fn probe(&self, kind: UniqueKind, value: &str) -> FieldState {
        let result = match kind {
            UniqueKind::Email => self.store.email_taken(value).await,
            UniqueKind::Phone => self.store.phone_taken(value).await,
            UniqueKind::TeamName => self.store.team_name_taken(value).await,
            UniqueKind::Utr => self.store.utr_taken(value).await,
        };

        match result {
            Ok(false) => FieldState::Unique,
            Ok(true) => FieldState::Conflict {
                message: messages::already_exists(),
            },
            Err(e) => {
                warn!("Uniqueness check for {} failed: {}", kind.what(), e);
                FieldState::Unreachable {
                    message: messages::check_failed(kind.what()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RegistrationError, Result};
    use crate::models::{NewRegistration, Registration};
    use async_trait::async_trait;

    struct ScriptedStore {
        taken: bool,
        fail: bool,
    }

    #[async_trait]
    impl RegistrationStore for ScriptedStore {
        async fn email_taken(&self, _email: &str) -> Result<bool> {
            if self.fail {
                return Err(RegistrationError::StoreRejected {
                    status: 503,
                    detail: "down".to_string(),
                });
            }
            Ok(self.taken)
        }

        async fn phone_taken(&self, phone: &str) -> Result<bool> {
            self.email_taken(phone).await
        }

        async fn team_name_taken(&self, name: &str) -> Result<bool> {
            self.email_taken(name).await
        }

        async fn utr_taken(&self, utr: &str) -> Result<bool> {
            self.email_taken(utr).await
        }

        async fn column_taken(&self, _column: &str, value: &str) -> Result<bool> {
            self.email_taken(value).await
        }

        async fn insert(&self, _registration: &NewRegistration) -> Result<Registration> {
            unimplemented!("not used in these tests")
        }

        async fn count(&self) -> Result<usize> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn test_free_value_is_unique() {
        let checker = UniquenessChecker::new(Arc::new(ScriptedStore {
            taken: false,
            fail: false,
        }));
        let state = checker.probe(UniqueKind::Email, "a@b.co").await;
        assert_eq!(state, FieldState::Unique);
    }

    #[tokio::test]
    async fn test_taken_value_is_conflict() {
        let checker = UniquenessChecker::new(Arc::new(ScriptedStore {
            taken: true,
            fail: false,
        }));
        let state = checker.probe(UniqueKind::Utr, "123456789012").await;
        assert_eq!(state.tag(), "conflict");
    }

    #[tokio::test]
    async fn test_store_failure_is_unreachable_not_unique() {
        let checker = UniquenessChecker::new(Arc::new(ScriptedStore {
            taken: false,
            fail: true,
        }));
        let state = checker.probe(UniqueKind::Phone, "9876543210").await;
        assert_eq!(state.tag(), "unreachable");
        assert!(state.message().contains("try again"));
    }
}
