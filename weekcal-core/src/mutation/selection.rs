//! Selection mode for bulk delete.

use std::collections::BTreeSet;

use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct Selection {
    active: bool,
    ids: BTreeSet<String>,
}

impl Selection {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn ids(&self) -> &BTreeSet<String> {
        &self.ids
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub(crate) fn enter(&mut self) {
        self.active = true;
    }

    /// Leave selection mode. Leaving always drops the selected ids.
    pub(crate) fn exit(&mut self) {
        self.active = false;
        self.ids.clear();
    }

    /// Select `id` if it is not selected, unselect it otherwise. Returns
    /// whether it is selected afterwards.
    pub(crate) fn toggle(&mut self, id: &str) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        }
    }

    pub(crate) fn forget(&mut self, id: &str) {
        self.ids.remove(id);
    }
}
