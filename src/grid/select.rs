use std::collections::HashSet;

/// Selected record ids. Selection survives filtering, sorting and paging;
/// only explicit toggles and record removal change it.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    ids: HashSet<i64>,
}

impl Selection {
    pub fn toggle(&mut self, id: i64) {
        if !self.ids.insert(id) {
            self.ids.remove(&id);
        }
    }

    /// Tri-state select-all: select every given id unless all of them are
    /// selected already, in which case deselect them all. A partial
    /// selection therefore completes before it clears.
    pub fn toggle_all(&mut self, ids: &[i64]) {
        if !ids.is_empty() && ids.iter().all(|id| self.ids.contains(id)) {
            for id in ids {
                self.ids.remove(id);
            }
        } else {
            self.ids.extend(ids.iter().copied());
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Drop every id the predicate rejects. Used to prune ids whose
    /// record got removed.
    pub fn retain(&mut self, keep: impl Fn(i64) -> bool) {
        self.ids.retain(|&id| keep(id));
    }
}
