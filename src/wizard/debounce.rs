//! Cancellable per-field timers.
//!
//! Each uniqueness-checked field owns at most one pending timer task.
//! Scheduling a new one replaces the old one outright (the previous task is
//! aborted, not just forgotten), and everything is aborted when the owner
//! is torn down, so no timer outlives its wizard.

use std::collections::HashMap;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use super::field_state::FieldId;

/// Delay between the last keystroke and the remote lookup.
pub const DEBOUNCE_MILLIS: u64 = 800;

#[derive(Default)]
pub struct FieldTimers {
    slots: Mutex<HashMap<FieldId, JoinHandle<()>>>,
}

impl FieldTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a new timer for the field, aborting any previous one.
    pub fn replace(&self, field: FieldId, handle: JoinHandle<()>) {
        let mut slots = self.slots.lock();
        if let Some(old) = slots.insert(field, handle) {
            old.abort();
        }
    }

    /// Abort and drop the field's pending timer, if any.
    pub fn cancel(&self, field: FieldId) {
        if let Some(old) = self.slots.lock().remove(&field) {
            old.abort();
        }
    }

    pub fn cancel_all(&self) {
        let mut slots = self.slots.lock();
        for (_, handle) in slots.drain() {
            handle.abort();
        }
    }

    #[cfg(test)]
    pub fn pending_count(&self) -> usize {
        self.slots.lock().len()
    }
}

impl Drop for FieldTimers {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
