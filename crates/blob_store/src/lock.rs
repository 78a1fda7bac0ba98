use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::Mutex;

use crate::path::FileName;

/// Per-name mutual exclusion for one store.
///
/// Slots are created on demand and dropped again once no caller holds or waits on them,
/// so the table only ever contains names with operations in flight.
#[derive(Debug, Default)]
pub struct NameLocks {
    table: Mutex<HashMap<FileName, Arc<Mutex<()>>>>,
}

impl NameLocks {
    /// Runs `f` while holding the lock for `name`.
    pub fn with<R>(&self, name: &FileName, f: impl FnOnce() -> R) -> R {
        let slot = self.table.lock().entry(name.clone()).or_default().clone();

        let res = {
            let _guard = slot.lock();
            f()
        };

        drop(slot);

        let mut table = self.table.lock();
        if let Some(slot) = table.get(name) {
            // only the table itself still references it
            if Arc::strong_count(slot) == 1 {
                table.remove(name);
            }
        }

        res
    }

    pub fn len(&self) -> usize {
        self.table.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
