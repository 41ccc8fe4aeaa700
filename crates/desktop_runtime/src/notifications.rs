//! Notification history and transient toasts.

use std::collections::VecDeque;

use platform_host::unix_time_ms_now;
use tracing::debug;

use crate::{
    apps::{find_descriptor, AppDescriptor},
    model::{Notification, NotificationDraft},
};

/// Clock used to derive notification ids.
pub type NotificationClock = fn() -> u64;

#[derive(Debug)]
pub struct NotificationService {
    registry: &'static [AppDescriptor],
    history: VecDeque<Notification>,
    toasts: Vec<Notification>,
    history_limit: usize,
    last_id: u64,
    clock: NotificationClock,
}

impl NotificationService {
    pub fn new(registry: &'static [AppDescriptor], history_limit: usize) -> Self {
        Self {
            registry,
            history: VecDeque::new(),
            toasts: Vec::new(),
            history_limit: history_limit.max(1),
            last_id: 0,
            clock: unix_time_ms_now,
        }
    }

    pub fn with_clock(mut self, clock: NotificationClock) -> Self {
        self.clock = clock;
        self
    }

    /// Records a notification and shows it as a toast.
    ///
    /// Ids follow the wall clock but never repeat, even when several notifications land in the same
    /// millisecond. Drafts from apps missing from the catalog are dropped. The caller schedules the
    /// toast's expiry.
    pub fn post(&mut self, draft: NotificationDraft) -> Option<Notification> {
        let Some(descriptor) = find_descriptor(self.registry, draft.app_id.as_str()) else {
            debug!(app_id = %draft.app_id, "notification dropped for unknown app");
            return None;
        };
        let id = (self.clock)().max(self.last_id + 1);
        self.last_id = id;

        let notification = Notification {
            id,
            app_id: draft.app_id,
            icon_id: descriptor.icon_id.to_string(),
            title: draft.title,
            message: draft.message,
        };
        self.history.push_front(notification.clone());
        self.history.truncate(self.history_limit);
        self.toasts.push(notification.clone());
        Some(notification)
    }

    /// Removes the toast with `id`. History is unaffected.
    pub fn expire_toast(&mut self, id: u64) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|toast| toast.id != id);
        self.toasts.len() != before
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// History, newest first.
    pub fn history(&self) -> impl Iterator<Item = &Notification> {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Visible toasts, oldest first.
    pub fn toasts(&self) -> &[Notification] {
        &self.toasts
    }
}
