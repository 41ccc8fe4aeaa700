//! Window lifecycle and z-order management.
//!
//! At most one window exists per application id. z-order ranks come from a single monotonically
//! increasing counter, so the most recently raised window always carries the highest rank. The
//! active window is never minimized: focusing a minimized window restores it, and so does closing
//! the active window when the highest-ranked survivor is minimized.

use std::{collections::HashMap, fmt};

use desktop_app_contract::{
    AppLifecycleEvent, AppMountContext, AppServices, ApplicationId, MountedApp, Point,
};
use platform_host::Viewport;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde_json::Value;
use tracing::debug;

use crate::{
    apps::{find_descriptor, AppDescriptor, FALLBACK_APP_TITLE},
    config::OpenJitter,
    model::{WindowRecord, WindowRect, WindowSize, FIRST_Z_INDEX},
};

/// Minimum allowed managed window width.
pub const MIN_WINDOW_WIDTH: i32 = 200;
/// Minimum allowed managed window height.
pub const MIN_WINDOW_HEIGHT: i32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Result of a successful [`WindowManager::open`].
pub enum OpenOutcome {
    /// A new window was created and its app mounted.
    Mounted,
    /// The app already had a window; it was restored and raised.
    Raised,
}

/// Owns every open window and its mounted app instance.
pub struct WindowManager {
    registry: &'static [AppDescriptor],
    windows: Vec<WindowRecord>,
    instances: HashMap<ApplicationId, Box<dyn MountedApp>>,
    active: Option<ApplicationId>,
    next_z_index: u64,
    fallback_size: WindowSize,
    jitter: OpenJitter,
    rng: StdRng,
}

impl WindowManager {
    pub fn new(
        registry: &'static [AppDescriptor],
        fallback_size: WindowSize,
        jitter: OpenJitter,
    ) -> Self {
        Self {
            registry,
            windows: Vec::new(),
            instances: HashMap::new(),
            active: None,
            next_z_index: FIRST_Z_INDEX,
            fallback_size,
            jitter,
            rng: StdRng::from_entropy(),
        }
    }

    /// Replaces the placement RNG with a seeded one for reproducible layouts.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Opens `app_id`, or restores and raises its existing window.
    ///
    /// `resolve_services` is only called when a new instance is mounted. Returns `None` for ids
    /// missing from the catalog and for catalog entries that have no window.
    pub fn open(
        &mut self,
        app_id: &str,
        initial_props: Value,
        viewport: Viewport,
        resolve_services: impl FnOnce(&ApplicationId, &AppDescriptor) -> AppServices,
    ) -> Option<OpenOutcome> {
        if let Some(index) = self.index_of(app_id) {
            let id = self.windows[index].app_id.clone();
            self.restore(index);
            self.raise(&id);
            return Some(OpenOutcome::Raised);
        }

        let Some(descriptor) = find_descriptor(self.registry, app_id) else {
            debug!(app_id, "open ignored for unknown app");
            return None;
        };
        let Some(module) = descriptor.module else {
            debug!(app_id, "open ignored for app without a window");
            return None;
        };

        let id = ApplicationId::trusted(descriptor.app_id);
        let size = descriptor.default_size.unwrap_or(self.fallback_size);
        let rect = self.initial_rect(size, viewport);
        let services = resolve_services(&id, descriptor);
        let instance = module.mount(AppMountContext {
            app_id: id.clone(),
            initial_props: initial_props.clone(),
            services,
        });

        self.windows.push(WindowRecord {
            app_id: id.clone(),
            title: descriptor.title.to_string(),
            rect,
            restore_rect: None,
            z_index: 0,
            minimized: false,
            maximized: false,
            initial_props,
        });
        self.instances.insert(id.clone(), instance);
        self.notify(&id, AppLifecycleEvent::Mounted);
        self.raise(&id);
        Some(OpenOutcome::Mounted)
    }

    /// Closes the window for `app_id`, dropping its instance. When the active window closes, the
    /// survivor with the highest rank becomes active, restored first if it was minimized.
    pub fn close(&mut self, app_id: &str) -> bool {
        let Some(index) = self.index_of(app_id) else {
            return false;
        };
        let record = self.windows.remove(index);
        if let Some(mut instance) = self.instances.remove(&record.app_id) {
            instance.on_lifecycle(AppLifecycleEvent::Closed);
        }

        if self.active.as_ref() == Some(&record.app_id) {
            self.active = None;
            let next = self
                .windows
                .iter()
                .enumerate()
                .max_by_key(|(_, w)| w.z_index)
                .map(|(index, w)| (index, w.app_id.clone()));
            if let Some((index, next)) = next {
                self.restore(index);
                self.active = Some(next.clone());
                self.notify(&next, AppLifecycleEvent::Focused);
            }
        }
        true
    }

    /// Raises and activates `app_id`. No-op when it is already active.
    pub fn focus(&mut self, app_id: &str) -> bool {
        let Some(index) = self.index_of(app_id) else {
            return false;
        };
        if self.is_active(app_id) {
            return false;
        }
        let id = self.windows[index].app_id.clone();
        self.restore(index);
        self.raise(&id);
        true
    }

    /// Hides `app_id`. Minimizing the active window leaves no window active.
    pub fn minimize(&mut self, app_id: &str) -> bool {
        let Some(window) = self.windows.iter_mut().find(|w| w.app_id == app_id) else {
            return false;
        };
        if window.minimized {
            return false;
        }
        window.minimized = true;
        let id = window.app_id.clone();
        self.notify(&id, AppLifecycleEvent::Minimized);
        if self.active.as_ref() == Some(&id) {
            self.active = None;
        }
        true
    }

    /// Toggles between the stored geometry and the full usable viewport, then focuses the window.
    pub fn toggle_maximize(&mut self, app_id: &str, viewport: Viewport) -> bool {
        let Some(window) = self.windows.iter_mut().find(|w| w.app_id == app_id) else {
            return false;
        };
        if window.maximized {
            if let Some(restore) = window.restore_rect.take() {
                window.rect = restore;
            }
            window.maximized = false;
        } else {
            window.restore_rect = Some(window.rect);
            window.rect = WindowRect {
                x: 0,
                y: viewport.top_chrome,
                w: viewport.width,
                h: viewport.usable_height(),
            };
            window.maximized = true;
        }
        self.focus(app_id);
        true
    }

    /// Moves a window. Ignored while the window is maximized.
    pub fn move_window(&mut self, app_id: &str, position: Point) -> bool {
        let Some(window) = self.windows.iter_mut().find(|w| w.app_id == app_id) else {
            return false;
        };
        if window.maximized {
            return false;
        }
        window.rect.x = position.x;
        window.rect.y = position.y;
        true
    }

    /// Resizes a window, clamped to the minimum size. Ignored while the window is maximized.
    pub fn resize_window(&mut self, app_id: &str, size: WindowSize) -> bool {
        let Some(window) = self.windows.iter_mut().find(|w| w.app_id == app_id) else {
            return false;
        };
        if window.maximized {
            return false;
        }
        window.rect = WindowRect {
            w: size.width,
            h: size.height,
            ..window.rect
        }
        .clamped_min(MIN_WINDOW_WIDTH, MIN_WINDOW_HEIGHT);
        true
    }

    /// Closes every window, as on sign-out.
    pub fn clear(&mut self) {
        for (_, mut instance) in self.instances.drain() {
            instance.on_lifecycle(AppLifecycleEvent::Closed);
        }
        self.windows.clear();
        self.active = None;
    }

    /// Windows in the order they were opened.
    pub fn windows(&self) -> &[WindowRecord] {
        &self.windows
    }

    pub fn window(&self, app_id: &str) -> Option<&WindowRecord> {
        self.windows.iter().find(|w| w.app_id == app_id)
    }

    pub fn is_open(&self, app_id: &str) -> bool {
        self.index_of(app_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn active_app_id(&self) -> Option<&ApplicationId> {
        self.active.as_ref()
    }

    pub fn active_window(&self) -> Option<&WindowRecord> {
        let active = self.active.as_ref()?;
        self.windows.iter().find(|w| &w.app_id == active)
    }

    /// Title shown in the menu bar.
    pub fn active_app_title(&self) -> &str {
        self.active_window()
            .map(|w| w.title.as_str())
            .unwrap_or(FALLBACK_APP_TITLE)
    }

    /// Visible windows ordered back to front.
    pub fn mission_control_windows(&self) -> Vec<&WindowRecord> {
        let mut visible: Vec<_> = self.windows.iter().filter(|w| !w.minimized).collect();
        visible.sort_by_key(|w| w.z_index);
        visible
    }

    pub fn instance(&self, app_id: &str) -> Option<&dyn MountedApp> {
        self.instances
            .iter()
            .find(|(id, _)| id.as_str() == app_id)
            .map(|(_, instance)| instance.as_ref())
    }

    fn is_active(&self, app_id: &str) -> bool {
        self.active.as_ref().is_some_and(|id| id.as_str() == app_id)
    }

    fn index_of(&self, app_id: &str) -> Option<usize> {
        self.windows.iter().position(|w| w.app_id == app_id)
    }

    fn take_z_index(&mut self) -> u64 {
        let z = self.next_z_index;
        self.next_z_index += 1;
        z
    }

    fn restore(&mut self, index: usize) {
        let window = &mut self.windows[index];
        if window.minimized {
            window.minimized = false;
            let id = window.app_id.clone();
            self.notify(&id, AppLifecycleEvent::Restored);
        }
    }

    /// Gives `id` the next rank and makes it active. Focus events are only sent when the active
    /// window changes.
    fn raise(&mut self, id: &ApplicationId) {
        let z = self.take_z_index();
        let Some(window) = self.windows.iter_mut().find(|w| &w.app_id == id) else {
            return;
        };
        window.z_index = z;
        if self.active.as_ref() == Some(id) {
            return;
        }
        if let Some(previous) = self.active.replace(id.clone()) {
            self.notify(&previous, AppLifecycleEvent::Blurred);
        }
        self.notify(id, AppLifecycleEvent::Focused);
    }

    fn initial_rect(&mut self, size: WindowSize, viewport: Viewport) -> WindowRect {
        let x = self.rng.gen_range(self.jitter.x_min..self.jitter.x_max);
        let y = self.rng.gen_range(self.jitter.y_min..self.jitter.y_max);
        let max_x = (viewport.width - size.width).max(0);
        let min_y = viewport.top_chrome;
        let max_y = (viewport.height - size.height).max(min_y);
        WindowRect {
            x: x.clamp(0, max_x),
            y: y.clamp(min_y, max_y),
            w: size.width,
            h: size.height,
        }
    }

    fn notify(&mut self, id: &ApplicationId, event: AppLifecycleEvent) {
        if let Some(instance) = self.instances.get_mut(id) {
            instance.on_lifecycle(event);
        }
    }
}

impl fmt::Debug for WindowManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowManager")
            .field("windows", &self.windows)
            .field("active", &self.active)
            .field("next_z_index", &self.next_z_index)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, sync::Arc};

    use desktop_app_contract::{AppCommandSender, AppModule, CommandSender};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::apps::app_registry;

    thread_local! {
        static LIFECYCLE: RefCell<Vec<(String, AppLifecycleEvent)>> = RefCell::new(Vec::new());
    }

    struct RecordingApp {
        app_id: ApplicationId,
    }

    impl MountedApp for RecordingApp {
        fn app_id(&self) -> &ApplicationId {
            &self.app_id
        }

        fn on_lifecycle(&mut self, event: AppLifecycleEvent) {
            LIFECYCLE.with(|log| log.borrow_mut().push((self.app_id.to_string(), event)));
        }
    }

    fn mount_recording(context: AppMountContext) -> Box<dyn MountedApp> {
        Box::new(RecordingApp {
            app_id: context.app_id,
        })
    }

    static TEST_REGISTRY: [AppDescriptor; 2] = [
        AppDescriptor {
            app_id: "alpha",
            title: "Alpha",
            icon_id: "alpha",
            module: Some(AppModule::new(mount_recording)),
            default_size: None,
            show_in_dock: true,
            show_on_desktop: false,
            capabilities: &[],
        },
        AppDescriptor {
            app_id: "beta",
            title: "Beta",
            icon_id: "beta",
            module: Some(AppModule::new(mount_recording)),
            default_size: Some(WindowSize::new(300, 200)),
            show_in_dock: true,
            show_on_desktop: false,
            capabilities: &[],
        },
    ];

    fn no_services(id: &ApplicationId, _: &AppDescriptor) -> AppServices {
        let sender: AppCommandSender = Arc::new(|_| {});
        AppServices::new(CommandSender::new(id.clone(), sender))
    }

    fn manager() -> WindowManager {
        WindowManager::new(app_registry(), WindowSize::default(), OpenJitter::default())
            .with_seed(7)
    }

    fn open(wm: &mut WindowManager, app_id: &str) -> Option<OpenOutcome> {
        wm.open(app_id, Value::Null, Viewport::default(), no_services)
    }

    fn take_lifecycle() -> Vec<(String, AppLifecycleEvent)> {
        LIFECYCLE.with(|log| std::mem::take(&mut *log.borrow_mut()))
    }

    #[test]
    fn open_mounts_window_with_catalog_size_and_activates_it() {
        let mut wm = manager();
        assert_eq!(open(&mut wm, "calculator"), Some(OpenOutcome::Mounted));

        let window = wm.window("calculator").expect("window");
        assert_eq!(window.rect.size(), WindowSize::new(360, 580));
        assert_eq!(window.title, "Calculator");
        assert_eq!(window.z_index, FIRST_Z_INDEX);
        assert_eq!(wm.active_app_title(), "Calculator");
        assert!(wm.instance("calculator").is_some());
    }

    #[test]
    fn open_ignores_unknown_and_windowless_apps() {
        let mut wm = manager();
        assert_eq!(open(&mut wm, "does-not-exist"), None);
        assert_eq!(open(&mut wm, "launchpad"), None);
        assert!(wm.is_empty());
        assert_eq!(wm.active_app_title(), FALLBACK_APP_TITLE);
    }

    #[test]
    fn app_without_declared_size_uses_fallback() {
        let mut wm = WindowManager::new(
            &TEST_REGISTRY,
            WindowSize::default(),
            OpenJitter::default(),
        );
        open(&mut wm, "alpha");
        assert_eq!(
            wm.window("alpha").expect("alpha").rect.size(),
            WindowSize::new(640, 480)
        );
    }

    #[test]
    fn reopening_restores_and_raises_existing_window() {
        let mut wm = manager();
        open(&mut wm, "weather");
        open(&mut wm, "stocks");
        assert!(wm.minimize("weather"));

        assert_eq!(open(&mut wm, "weather"), Some(OpenOutcome::Raised));

        assert_eq!(wm.len(), 2);
        let weather = wm.window("weather").expect("weather");
        let stocks = wm.window("stocks").expect("stocks");
        assert!(!weather.minimized);
        assert!(weather.z_index > stocks.z_index);
        assert_eq!(wm.active_app_id().map(ApplicationId::as_str), Some("weather"));
    }

    #[test]
    fn z_order_is_strictly_increasing_across_focus_changes() {
        let mut wm = manager();
        for app in ["music", "pages", "terminal"] {
            open(&mut wm, app);
        }
        let mut last = wm.window("terminal").expect("terminal").z_index;
        for app in ["music", "pages", "terminal", "music"] {
            assert!(wm.focus(app));
            let z = wm.window(app).expect("window").z_index;
            assert!(z > last);
            last = z;
            let max = wm.windows().iter().map(|w| w.z_index).max();
            assert_eq!(max, Some(z));
        }
    }

    #[test]
    fn focusing_active_window_is_noop() {
        let mut wm = manager();
        open(&mut wm, "music");
        let z = wm.window("music").expect("music").z_index;
        assert!(!wm.focus("music"));
        assert_eq!(wm.window("music").expect("music").z_index, z);
    }

    #[test]
    fn closing_active_window_activates_highest_survivor() {
        let mut wm = manager();
        for app in ["music", "pages", "terminal"] {
            open(&mut wm, app);
        }
        wm.focus("music");
        assert!(wm.close("music"));
        assert_eq!(wm.active_app_id().map(ApplicationId::as_str), Some("terminal"));

        assert!(wm.close("pages"));
        assert_eq!(wm.active_app_id().map(ApplicationId::as_str), Some("terminal"));

        assert!(wm.close("terminal"));
        assert_eq!(wm.active_app_id(), None);
        assert!(!wm.close("terminal"));
    }

    #[test]
    fn closing_activates_and_restores_a_minimized_top_survivor() {
        let mut wm = manager();
        open(&mut wm, "music");
        open(&mut wm, "pages");
        open(&mut wm, "terminal");
        wm.focus("pages");
        wm.minimize("pages");
        wm.focus("terminal");

        wm.close("terminal");

        let top = wm.windows().iter().max_by_key(|w| w.z_index).map(|w| w.app_id.as_str());
        assert_eq!(top, Some("pages"));
        assert_eq!(wm.active_app_id().map(ApplicationId::as_str), Some("pages"));
        assert!(!wm.window("pages").expect("pages").minimized);
    }

    #[test]
    fn closing_active_window_never_leaves_survivors_inactive() {
        let mut wm = manager();
        open(&mut wm, "music");
        open(&mut wm, "pages");
        wm.minimize("music");

        wm.close("pages");

        assert_eq!(wm.len(), 1);
        assert_eq!(wm.active_app_id().map(ApplicationId::as_str), Some("music"));
    }

    #[test]
    fn reopening_the_active_window_still_takes_a_new_rank() {
        let mut wm = manager();
        open(&mut wm, "calculator");
        let before = wm.window("calculator").expect("calculator").z_index;

        assert_eq!(open(&mut wm, "calculator"), Some(OpenOutcome::Raised));

        let after = wm.window("calculator").expect("calculator").z_index;
        assert!(after > before);
        assert_eq!(wm.active_app_id().map(ApplicationId::as_str), Some("calculator"));
    }

    #[test]
    fn minimizing_active_window_leaves_nothing_active() {
        let mut wm = manager();
        open(&mut wm, "music");
        open(&mut wm, "pages");
        assert!(wm.minimize("pages"));
        assert_eq!(wm.active_app_id(), None);
        assert!(!wm.window("music").expect("music").minimized);
        assert_eq!(wm.mission_control_windows().len(), 1);
        assert!(!wm.minimize("pages"));
    }

    #[test]
    fn focusing_a_minimized_window_restores_it() {
        let mut wm = manager();
        open(&mut wm, "music");
        open(&mut wm, "pages");
        wm.minimize("music");

        assert!(wm.focus("music"));

        let music = wm.window("music").expect("music");
        assert!(!music.minimized);
        assert_eq!(wm.active_window().map(|w| w.app_id.as_str()), Some("music"));
        assert_eq!(wm.mission_control_windows().len(), 2);
    }

    #[test]
    fn maximize_round_trip_restores_geometry() {
        let mut wm = manager();
        open(&mut wm, "settings");
        let before = wm.window("settings").expect("settings").rect;

        assert!(wm.toggle_maximize("settings", Viewport::default()));
        let maximized = wm.window("settings").expect("settings");
        assert!(maximized.maximized);
        assert_eq!(
            maximized.rect,
            WindowRect {
                x: 0,
                y: 28,
                w: 1440,
                h: 872
            }
        );

        assert!(wm.toggle_maximize("settings", Viewport::default()));
        let restored = wm.window("settings").expect("settings");
        assert!(!restored.maximized);
        assert_eq!(restored.rect, before);
        assert_eq!(restored.restore_rect, None);
    }

    #[test]
    fn move_and_resize_are_ignored_while_maximized() {
        let mut wm = manager();
        open(&mut wm, "music");
        assert!(wm.resize_window("music", WindowSize::new(10, 10)));
        assert_eq!(
            wm.window("music").expect("music").rect.size(),
            WindowSize::new(MIN_WINDOW_WIDTH, MIN_WINDOW_HEIGHT)
        );
        assert!(wm.move_window("music", Point::new(5, 40)));

        wm.toggle_maximize("music", Viewport::default());
        assert!(!wm.move_window("music", Point::new(300, 300)));
        assert!(!wm.resize_window("music", WindowSize::new(900, 900)));

        wm.toggle_maximize("music", Viewport::default());
        let rect = wm.window("music").expect("music").rect;
        assert_eq!((rect.x, rect.y), (5, 40));
    }

    #[test]
    fn initial_position_stays_within_jitter_range() {
        let mut wm = manager();
        for entry in app_registry().iter().filter(|e| e.opens_window()) {
            open(&mut wm, entry.app_id);
        }
        for window in wm.windows() {
            assert!((100..300).contains(&window.rect.x), "{:?}", window.rect);
            assert!((50..150).contains(&window.rect.y), "{:?}", window.rect);
        }
    }

    #[test]
    fn initial_position_is_clamped_to_small_viewports() {
        let mut wm = manager();
        let tiny = Viewport {
            width: 400,
            height: 300,
            top_chrome: 28,
        };
        wm.open("network-info", Value::Null, tiny, no_services);
        let rect = wm.window("network-info").expect("window").rect;
        assert_eq!(rect.x, 0);
        assert_eq!(rect.y, 28);
    }

    #[test]
    fn lifecycle_events_follow_window_transitions() {
        let mut wm = WindowManager::new(
            &TEST_REGISTRY,
            WindowSize::default(),
            OpenJitter::default(),
        );
        take_lifecycle();

        wm.open("alpha", json!({ "doc": 1 }), Viewport::default(), no_services);
        wm.open("beta", Value::Null, Viewport::default(), no_services);
        wm.minimize("beta");
        wm.focus("beta");
        wm.close("beta");
        wm.clear();

        let alpha = |e| ("alpha".to_string(), e);
        let beta = |e| ("beta".to_string(), e);
        assert_eq!(
            take_lifecycle(),
            vec![
                alpha(AppLifecycleEvent::Mounted),
                alpha(AppLifecycleEvent::Focused),
                beta(AppLifecycleEvent::Mounted),
                alpha(AppLifecycleEvent::Blurred),
                beta(AppLifecycleEvent::Focused),
                beta(AppLifecycleEvent::Minimized),
                beta(AppLifecycleEvent::Restored),
                beta(AppLifecycleEvent::Focused),
                beta(AppLifecycleEvent::Closed),
                alpha(AppLifecycleEvent::Focused),
                alpha(AppLifecycleEvent::Closed),
            ]
        );
        assert!(wm.is_empty());
        assert_eq!(wm.active_app_id(), None);
    }
}
