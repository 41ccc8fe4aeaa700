//! Host-side service bundle and helpers for executing reducer effects.

mod app_bus;
mod persistence_effects;

use std::{fmt, sync::Arc};

use platform_host::{
    AccountStore, FixedViewport, MemoryAccountStore, Viewport, ViewportProvider,
};

pub(crate) use app_bus::{route_app_command, CommandRoute};
pub(crate) use persistence_effects::ProfileWriter;

#[derive(Clone)]
/// Host service bundle for desktop runtime side effects.
pub struct DesktopHostContext {
    accounts: Arc<dyn AccountStore>,
    viewport: Arc<dyn ViewportProvider>,
}

impl DesktopHostContext {
    pub fn new(accounts: Arc<dyn AccountStore>, viewport: Arc<dyn ViewportProvider>) -> Self {
        Self { accounts, viewport }
    }

    /// In-memory account store and a fixed viewport, for headless sessions and tests.
    pub fn in_memory(viewport: Viewport) -> Self {
        Self::new(
            Arc::new(MemoryAccountStore::default()),
            Arc::new(FixedViewport::new(viewport)),
        )
    }

    /// Returns the configured durable account store.
    pub fn account_store(&self) -> Arc<dyn AccountStore> {
        self.accounts.clone()
    }

    /// Returns the configured viewport collaborator.
    pub fn viewport_provider(&self) -> Arc<dyn ViewportProvider> {
        self.viewport.clone()
    }

    /// Current viewport bounds.
    pub fn viewport(&self) -> Viewport {
        self.viewport.viewport()
    }
}

impl fmt::Debug for DesktopHostContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DesktopHostContext")
            .field("viewport", &self.viewport())
            .finish_non_exhaustive()
    }
}
