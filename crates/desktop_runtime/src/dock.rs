//! Ordered dock entries.
//!
//! The dock starts with every catalog app flagged for it, in catalog order. Reordering moves one
//! entry and shifts the rest; entries are never added or dropped.

use desktop_app_contract::ApplicationId;

use crate::apps::AppDescriptor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dock {
    apps: Vec<ApplicationId>,
}

impl Dock {
    pub fn from_registry(registry: &[AppDescriptor]) -> Self {
        let apps = registry
            .iter()
            .filter(|entry| entry.show_in_dock)
            .map(|entry| ApplicationId::trusted(entry.app_id))
            .collect();
        Self { apps }
    }

    pub fn apps(&self) -> &[ApplicationId] {
        &self.apps
    }

    pub fn position(&self, app_id: &str) -> Option<usize> {
        self.apps.iter().position(|id| id.as_str() == app_id)
    }

    /// Moves `app_id` to `to_index`, clamped to the last slot.
    ///
    /// Returns `false` for apps not in the dock and for moves that leave the order unchanged.
    pub fn reorder(&mut self, app_id: &str, to_index: usize) -> bool {
        let Some(from) = self.position(app_id) else {
            return false;
        };
        let to = to_index.min(self.apps.len() - 1);
        if from == to {
            return false;
        }
        let entry = self.apps.remove(from);
        self.apps.insert(to, entry);
        true
    }
}
