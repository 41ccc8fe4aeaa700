//! Headless app instance mounted for every catalog entry. Real front-ends replace the mount
//! function; the runtime only depends on the [`MountedApp`] contract.

use desktop_app_contract::{AppLifecycleEvent, AppMountContext, ApplicationId, MountedApp};
use tracing::trace;

pub struct HeadlessApp {
    context: AppMountContext,
    lifecycle: Vec<AppLifecycleEvent>,
}

impl HeadlessApp {
    pub fn new(context: AppMountContext) -> Self {
        Self {
            context,
            lifecycle: Vec::new(),
        }
    }

    pub fn context(&self) -> &AppMountContext {
        &self.context
    }

    pub fn lifecycle(&self) -> &[AppLifecycleEvent] {
        &self.lifecycle
    }
}

impl MountedApp for HeadlessApp {
    fn app_id(&self) -> &ApplicationId {
        &self.context.app_id
    }

    fn on_lifecycle(&mut self, event: AppLifecycleEvent) {
        trace!(app_id = %self.context.app_id, event = event.token(), "app lifecycle");
        self.lifecycle.push(event);
    }
}

pub(super) fn mount_headless_app(context: AppMountContext) -> Box<dyn MountedApp> {
    Box::new(HeadlessApp::new(context))
}
