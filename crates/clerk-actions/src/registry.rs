//! Process-lifetime registry of outstanding offers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use clerk_core::PendingActionSet;
use tracing::{debug, info};

/// Offers awaiting a user decision, keyed by offer id.
///
/// Every operation takes the single map lock once, so `retire` doubles as an
/// atomic claim: of several concurrent callers exactly one observes `true`.
#[derive(Debug, Default)]
pub struct PendingActionRegistry {
    pending: Mutex<HashMap<String, Arc<PendingActionSet>>>,
}

impl PendingActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the set under its id, replacing any previous entry.
    pub fn enqueue(&self, set: PendingActionSet) {
        info!(
            offer_id = set.id(),
            actions = ?set.action_names(),
            "enqueuing {} pending actions",
            set.len()
        );
        self.pending()
            .insert(set.id().to_string(), Arc::new(set));
    }

    pub fn lookup(&self, offer_id: &str) -> Option<Arc<PendingActionSet>> {
        self.pending().get(offer_id).cloned()
    }

    pub fn contains(&self, offer_id: &str) -> bool {
        self.pending().contains_key(offer_id)
    }

    /// Removes the offer; returns whether it was still registered.
    pub fn retire(&self, offer_id: &str) -> bool {
        let removed = self.pending().remove(offer_id).is_some();
        if removed {
            debug!(offer_id, "retired pending action set");
        }
        removed
    }

    /// Re-registers a set unless an entry with its id already exists.
    pub fn restore(&self, set: Arc<PendingActionSet>) -> bool {
        let mut pending = self.pending();
        if pending.contains_key(set.id()) {
            return false;
        }
        debug!(offer_id = set.id(), "restored pending action set");
        pending.insert(set.id().to_string(), set);
        true
    }

    /// Ids of all outstanding offers, sorted.
    pub fn offer_ids(&self) -> Vec<String> {
        let mut ids = self.pending().keys().cloned().collect::<Vec<_>>();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.pending().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending().is_empty()
    }

    fn pending(&self) -> MutexGuard<'_, HashMap<String, Arc<PendingActionSet>>> {
        // Map operations cannot leave the map half-updated, so a poisoned lock is still usable.
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
