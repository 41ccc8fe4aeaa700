use std::sync::Arc;

use platform_host::AccountStore;
use tokio::{
    runtime::Handle,
    sync::{broadcast, mpsc},
};
use tracing::{debug, warn};

use crate::{reducer::DesktopEvent, session::ProfileWrite};

/// Single writer task that applies profile write-throughs one at a time, in request order, so an
/// older snapshot can never land after a newer one.
#[derive(Debug)]
pub(crate) struct ProfileWriter {
    queue: mpsc::UnboundedSender<ProfileWrite>,
}

impl ProfileWriter {
    /// Starts the writer on `handle`. It stops once the writer is dropped and the queue drains.
    pub(crate) fn spawn(
        handle: &Handle,
        store: Arc<dyn AccountStore>,
        events: broadcast::Sender<DesktopEvent>,
    ) -> Self {
        let (queue, mut pending) = mpsc::unbounded_channel::<ProfileWrite>();
        handle.spawn(async move {
            while let Some(ProfileWrite { username, record }) = pending.recv().await {
                match store.save_account(&username, &record).await {
                    Ok(()) => debug!(%username, "profile written through"),
                    Err(error) => {
                        warn!(%username, "profile write-through failed: {error}");
                        let _ = events.send(DesktopEvent::ProfileSyncFailed { username, error });
                    }
                }
            }
        });
        Self { queue }
    }

    /// Queues `write` behind every earlier one. Never waits for the store.
    pub(crate) fn enqueue(&self, write: ProfileWrite) {
        if self.queue.send(write).is_err() {
            warn!("profile writer stopped; write-through dropped");
        }
    }
}
