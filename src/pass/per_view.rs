use std::collections::HashMap;

use crate::scene::ViewId;

struct Entry<T> {
    data: T,
    last_rendered: u64,
}

/// Data kept per on-screen viewport, dropped when the view goes away.
///
/// Views are destroyed explicitly through [`PerViewData::remove`] or dropped
/// by [`PerViewData::prune`] once they haven't rendered for a while, which
/// covers hosts that never report destruction.
pub struct PerViewData<T> {
    entries: HashMap<ViewId, Entry<T>>,
    stale_after: u64,
}

impl<T> PerViewData<T> {
    /// `stale_after`: frames without a render before a view is pruned
    pub fn new(stale_after: u64) -> Self {
        Self {
            entries: HashMap::new(),
            stale_after,
        }
    }

    /// Data for `view`, created with `make` if missing. Marks the view as
    /// rendered on `frame`. The flag is true when the entry was just created.
    pub fn get_or_insert_with(&mut self, view: ViewId, frame: u64, make: impl FnOnce() -> T) -> (&mut T, bool) {
        let mut created = false;
        let entry = self.entries.entry(view).or_insert_with(|| {
            created = true;
            Entry {
                data: make(),
                last_rendered: frame,
            }
        });
        entry.last_rendered = frame;
        (&mut entry.data, created)
    }

    pub fn get(&self, view: ViewId) -> Option<&T> {
        self.entries.get(&view).map(|e| &e.data)
    }

    pub fn remove(&mut self, view: ViewId) -> Option<T> {
        self.entries.remove(&view).map(|e| e.data)
    }

    /// Drop views last rendered more than `stale_after` frames before `frame`.
    /// Returns the ids removed.
    pub fn prune(&mut self, frame: u64) -> Vec<ViewId> {
        let stale_after = self.stale_after;
        let mut removed = Vec::new();
        self.entries.retain(|id, entry| {
            let keep = frame.saturating_sub(entry.last_rendered) <= stale_after;
            if !keep {
                removed.push(*id);
            }
            keep
        });
        removed.sort();
        removed
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.values_mut().map(|e| &mut e.data)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
