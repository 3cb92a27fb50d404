//! WaitRegistry - pending slots per event name

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::oneshot;
use tracing::debug;

use super::slot::{SlotId, WaitSlot};
use crate::event::Payload;

/// Sending half of a pending slot
struct PendingEntry {
    id: SlotId,
    tx: oneshot::Sender<Payload>,
}

/// Registry counters (thread-safe)
#[derive(Debug, Default)]
struct Counters {
    registered: AtomicU64,
    resolved: AtomicU64,
    removed: AtomicU64,
    dispatches: AtomicU64,
}

#[derive(Default)]
struct RegistryInner {
    pending: Mutex<HashMap<String, Vec<PendingEntry>>>,
    counters: Counters,
}

/// Registry snapshot for observability
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryMetrics {
    pub pending_slots: usize,
    pub events_tracked: usize,
    pub registered_total: u64,
    pub resolved_total: u64,
    pub removed_total: u64,
    pub dispatches_total: u64,
}

/// Mapping from event name to the slots waiting on it
///
/// Cheap to clone; clones share the same table. All three mutations take the
/// same lock, so they are linearizable per registry.
#[derive(Clone, Default)]
pub struct WaitRegistry {
    inner: Arc<RegistryInner>,
}

impl WaitRegistry {
    pub fn new() -> Self {
        debug!("WaitRegistry::new: called");
        Self::default()
    }

    fn table(&self) -> MutexGuard<'_, HashMap<String, Vec<PendingEntry>>> {
        // No code path panics while holding the lock, so a poisoned table is still consistent
        self.inner.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a new pending slot under `name`
    pub fn register(&self, name: &str) -> WaitSlot {
        let id = SlotId::new();
        let (tx, rx) = oneshot::channel();

        let depth = {
            let mut table = self.table();
            let entries = table.entry(name.to_string()).or_default();
            entries.push(PendingEntry { id, tx });
            entries.len()
        };
        self.inner.counters.registered.fetch_add(1, Ordering::Relaxed);

        debug!(event = %name, slot = %id, depth, "WaitRegistry::register: slot added");
        WaitSlot::new(id, name.to_string(), rx, self.clone())
    }

    /// Complete every slot registered under `name` with `args`
    ///
    /// The whole list is taken out of the table before any slot is completed.
    /// Slots registered after that point stay pending for the next dispatch.
    /// Returns how many slots were completed.
    pub fn resolve_all(&self, name: &str, args: Payload) -> usize {
        self.inner.counters.dispatches.fetch_add(1, Ordering::Relaxed);

        let Some(entries) = self.table().remove(name) else {
            return 0;
        };

        debug!(event = %name, count = entries.len(), "WaitRegistry::resolve_all: resolving slots");

        let mut resolved = 0;
        for entry in entries {
            if entry.tx.is_closed() {
                debug!(event = %name, slot = %entry.id, "WaitRegistry::resolve_all: slot already cancelled");
                continue;
            }
            match entry.tx.send(args.clone()) {
                Ok(()) => resolved += 1,
                Err(_) => {
                    debug!(event = %name, slot = %entry.id, "WaitRegistry::resolve_all: receiver gone, skipping");
                }
            }
        }

        self.inner.counters.resolved.fetch_add(resolved as u64, Ordering::Relaxed);
        resolved
    }

    /// Remove a slot from `name`'s list
    ///
    /// Returns false when the slot is no longer listed, which is expected when a
    /// dispatch drained it concurrently.
    pub fn remove(&self, name: &str, id: SlotId) -> bool {
        let removed = {
            let mut table = self.table();
            let Some(entries) = table.get_mut(name) else {
                return false;
            };
            let before = entries.len();
            entries.retain(|entry| entry.id != id);
            let removed = entries.len() != before;
            if entries.is_empty() {
                table.remove(name);
            }
            removed
        };

        if removed {
            self.inner.counters.removed.fetch_add(1, Ordering::Relaxed);
            debug!(event = %name, slot = %id, "WaitRegistry::remove: slot removed");
        } else {
            debug!(event = %name, slot = %id, "WaitRegistry::remove: slot already gone");
        }
        removed
    }

    /// Number of slots currently pending under `name`
    pub fn pending_count(&self, name: &str) -> usize {
        self.table().get(name).map_or(0, Vec::len)
    }

    /// Drop every pending slot; their waiters end with a closed error
    pub fn clear(&self) {
        let dropped: usize = {
            let mut table = self.table();
            let count = table.values().map(Vec::len).sum();
            table.clear();
            count
        };
        debug!(dropped, "WaitRegistry::clear: called");
    }

    /// Snapshot of current registry state and lifetime counters
    pub fn metrics(&self) -> RegistryMetrics {
        let (pending_slots, events_tracked) = {
            let table = self.table();
            (table.values().map(Vec::len).sum(), table.len())
        };
        let counters = &self.inner.counters;
        RegistryMetrics {
            pending_slots,
            events_tracked,
            registered_total: counters.registered.load(Ordering::Relaxed),
            resolved_total: counters.resolved.load(Ordering::Relaxed),
            removed_total: counters.removed.load(Ordering::Relaxed),
            dispatches_total: counters.dispatches.load(Ordering::Relaxed),
        }
    }

    #[cfg(test)]
    pub(crate) fn pending_ids(&self, name: &str) -> Vec<SlotId> {
        self.table()
            .get(name)
            .map(|entries| entries.iter().map(|entry| entry.id).collect())
            .unwrap_or_default()
    }

    /// Whether two handles share the same table
    pub fn same_registry(&self, other: &WaitRegistry) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for WaitRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaitRegistry").field("metrics", &self.metrics()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::SlotState;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_resolve_empty_is_noop() {
        let registry = WaitRegistry::new();
        assert_eq!(registry.resolve_all("on_ready", vec![]), 0);
        assert_eq!(registry.metrics().dispatches_total, 1);
        assert_eq!(registry.metrics().pending_slots, 0);
    }

    #[tokio::test]
    async fn test_resolve_only_matching_name() {
        let registry = WaitRegistry::new();
        let mut ready = registry.register("on_ready");
        let _other = registry.register("on_message_create");

        assert_eq!(registry.resolve_all("on_ready", vec![json!(1)]), 1);

        assert_eq!(ready.recv().await.unwrap(), vec![json!(1)]);
        assert_eq!(registry.pending_count("on_ready"), 0);
        assert_eq!(registry.pending_count("on_message_create"), 1);
    }

    #[tokio::test]
    async fn test_late_registration_waits_for_next_dispatch() {
        let registry = WaitRegistry::new();
        let mut early = registry.register("on_ready");

        registry.resolve_all("on_ready", vec![json!("first")]);
        let mut late = registry.register("on_ready");

        assert_eq!(early.recv().await.unwrap(), vec![json!("first")]);
        assert_eq!(late.state(), SlotState::Pending);
        assert_eq!(registry.pending_count("on_ready"), 1);

        registry.resolve_all("on_ready", vec![json!("second")]);
        assert_eq!(late.recv().await.unwrap(), vec![json!("second")]);
    }

    #[tokio::test]
    async fn test_cancelled_slot_is_skipped() {
        let registry = WaitRegistry::new();
        let mut kept = registry.register("on_ready");
        let mut cancelled = registry.register("on_ready");

        // Close the receiver without removing, as a racing deadline would
        cancelled.close_receiver();

        assert_eq!(registry.resolve_all("on_ready", vec![]), 1);
        assert_eq!(kept.recv().await.unwrap(), Vec::<serde_json::Value>::new());

        // Already drained, so cancelling finds nothing to remove
        assert!(cancelled.cancel());
        assert_eq!(registry.pending_count("on_ready"), 0);
        assert_eq!(registry.metrics().removed_total, 0);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let registry = WaitRegistry::new();
        let slot = registry.register("on_ready");
        let id = slot.id();

        assert!(registry.remove("on_ready", id));
        assert!(!registry.remove("on_ready", id));
        assert!(!registry.remove("never_registered", id));
        assert_eq!(registry.metrics().events_tracked, 0);
        drop(slot);
        assert_eq!(registry.metrics().removed_total, 1);
    }

    #[test]
    fn test_clones_share_table() {
        let registry = WaitRegistry::new();
        let clone = registry.clone();
        let _slot = clone.register("on_ready");

        assert_eq!(registry.pending_count("on_ready"), 1);
        assert!(registry.same_registry(&clone));
        assert!(!registry.same_registry(&WaitRegistry::new()));
    }

    #[tokio::test]
    async fn test_concurrent_registration() {
        let registry = WaitRegistry::new();
        let mut tasks = Vec::new();
        for _ in 0..32 {
            let registry = registry.clone();
            tasks.push(tokio::spawn(async move {
                let mut slot = registry.register("on_ready");
                slot.recv().await
            }));
        }

        while registry.pending_count("on_ready") < 32 {
            tokio::task::yield_now().await;
        }
        assert_eq!(registry.resolve_all("on_ready", vec![json!("go")]), 32);

        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap(), vec![json!("go")]);
        }
        assert_eq!(registry.metrics().pending_slots, 0);
    }

    proptest! {
        #[test]
        fn prop_each_slot_resolved_once_in_order(before in 0usize..16, after in 0usize..8) {
            let registry = WaitRegistry::new();
            let mut early: Vec<WaitSlot> = (0..before).map(|_| registry.register("x")).collect();
            let early_ids: Vec<SlotId> = early.iter().map(WaitSlot::id).collect();

            let order = registry.pending_ids("x");
            prop_assert_eq!(&order, &early_ids);

            let resolved = registry.resolve_all("x", vec![json!("payload")]);
            let late: Vec<WaitSlot> = (0..after).map(|_| registry.register("x")).collect();

            prop_assert_eq!(resolved, before);
            prop_assert_eq!(registry.pending_count("x"), after);

            for slot in early.iter_mut() {
                prop_assert_eq!(slot.try_take(), Some(vec![json!("payload")]));
                prop_assert_eq!(slot.try_take(), None);
            }

            // A second dispatch only reaches the late slots
            prop_assert_eq!(registry.resolve_all("x", vec![json!("again")]), after);
            drop(late);
        }
    }
}
