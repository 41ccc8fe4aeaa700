//! Static application catalog and the capability table consulted when an app is opened.

pub mod placeholders;

use desktop_app_contract::{AppCapability, AppModule, ProfileSlice};

use crate::model::WindowSize;

/// Title reported when no window is active.
pub const FALLBACK_APP_TITLE: &str = "Finder";

#[derive(Debug, Clone, Copy)]
/// Catalog entry for one application.
pub struct AppDescriptor {
    pub app_id: &'static str,
    pub title: &'static str,
    pub icon_id: &'static str,
    /// `None` for launcher-only entries that never open a window.
    pub module: Option<AppModule>,
    pub default_size: Option<WindowSize>,
    pub show_in_dock: bool,
    pub show_on_desktop: bool,
    /// Services injected into the app at mount time.
    pub capabilities: &'static [AppCapability],
}

impl AppDescriptor {
    pub fn has_capability(&self, capability: AppCapability) -> bool {
        self.capabilities.contains(&capability)
    }

    pub fn opens_window(&self) -> bool {
        self.module.is_some()
    }
}

const HEADLESS: Option<AppModule> = Some(AppModule::new(placeholders::mount_headless_app));

const fn size(width: i32, height: i32) -> Option<WindowSize> {
    Some(WindowSize::new(width, height))
}

const APP_REGISTRY: [AppDescriptor; 19] = [
    AppDescriptor {
        app_id: "my-docs",
        title: "MyDocs",
        icon_id: "folder",
        module: HEADLESS,
        default_size: size(700, 500),
        show_in_dock: true,
        show_on_desktop: true,
        capabilities: &[AppCapability::Launcher],
    },
    AppDescriptor {
        app_id: "site-creator",
        title: "Site Creator",
        icon_id: "globe",
        module: HEADLESS,
        default_size: size(900, 650),
        show_in_dock: true,
        show_on_desktop: true,
        capabilities: &[],
    },
    AppDescriptor {
        app_id: "ozark",
        title: "OZARK",
        icon_id: "compass",
        module: HEADLESS,
        default_size: size(1024, 768),
        show_in_dock: true,
        show_on_desktop: false,
        capabilities: &[
            AppCapability::ApiCallCounter,
            AppCapability::ProfileSlice(ProfileSlice::BrowserUrl),
        ],
    },
    AppDescriptor {
        app_id: "houston",
        title: "Houston",
        icon_id: "bot",
        module: HEADLESS,
        default_size: size(500, 700),
        show_in_dock: true,
        show_on_desktop: true,
        capabilities: &[
            AppCapability::ApiCallCounter,
            AppCapability::Notifications,
            AppCapability::ProfileSlice(ProfileSlice::AssistantHistory),
        ],
    },
    AppDescriptor {
        app_id: "terminal",
        title: "Terminal",
        icon_id: "terminal",
        module: HEADLESS,
        default_size: size(680, 420),
        show_in_dock: true,
        show_on_desktop: false,
        capabilities: &[],
    },
    AppDescriptor {
        app_id: "calendar",
        title: "Calendar",
        icon_id: "calendar",
        module: HEADLESS,
        default_size: size(700, 550),
        show_in_dock: true,
        show_on_desktop: false,
        capabilities: &[AppCapability::ProfileSlice(ProfileSlice::CalendarEvents)],
    },
    AppDescriptor {
        app_id: "imaginarium",
        title: "Imaginarium",
        icon_id: "image",
        module: HEADLESS,
        default_size: size(800, 600),
        show_in_dock: true,
        show_on_desktop: false,
        capabilities: &[AppCapability::ApiCallCounter, AppCapability::Notifications],
    },
    AppDescriptor {
        app_id: "weather",
        title: "Weather",
        icon_id: "cloud-sun",
        module: HEADLESS,
        default_size: size(350, 500),
        show_in_dock: true,
        show_on_desktop: false,
        capabilities: &[AppCapability::ApiCallCounter, AppCapability::Notifications],
    },
    AppDescriptor {
        app_id: "calculator",
        title: "Calculator",
        icon_id: "calculator",
        module: HEADLESS,
        default_size: size(360, 580),
        show_in_dock: true,
        show_on_desktop: false,
        capabilities: &[],
    },
    AppDescriptor {
        app_id: "stocks",
        title: "Stocks",
        icon_id: "trending-up",
        module: HEADLESS,
        default_size: size(400, 600),
        show_in_dock: true,
        show_on_desktop: false,
        capabilities: &[],
    },
    AppDescriptor {
        app_id: "pages",
        title: "Pages",
        icon_id: "file-text",
        module: HEADLESS,
        default_size: size(700, 500),
        show_in_dock: true,
        show_on_desktop: false,
        capabilities: &[
            AppCapability::ApiCallCounter,
            AppCapability::Notifications,
            AppCapability::ProfileSlice(ProfileSlice::Documents),
        ],
    },
    AppDescriptor {
        app_id: "music",
        title: "Music",
        icon_id: "music",
        module: HEADLESS,
        default_size: size(600, 400),
        show_in_dock: true,
        show_on_desktop: false,
        capabilities: &[],
    },
    AppDescriptor {
        app_id: "photo-booth",
        title: "Photo Booth",
        icon_id: "camera",
        module: HEADLESS,
        default_size: size(720, 600),
        show_in_dock: true,
        show_on_desktop: false,
        capabilities: &[AppCapability::ProfileSlice(ProfileSlice::Photos)],
    },
    AppDescriptor {
        app_id: "defense-ios",
        title: "DefenseIOS",
        icon_id: "shield",
        module: HEADLESS,
        default_size: size(500, 750),
        show_in_dock: true,
        show_on_desktop: false,
        capabilities: &[AppCapability::ApiCallCounter, AppCapability::Notifications],
    },
    AppDescriptor {
        app_id: "arsis-id",
        title: "Arsis ID",
        icon_id: "user-plus",
        module: HEADLESS,
        default_size: size(400, 500),
        show_in_dock: true,
        show_on_desktop: false,
        capabilities: &[AppCapability::Accounts],
    },
    AppDescriptor {
        app_id: "settings",
        title: "Settings",
        icon_id: "settings",
        module: HEADLESS,
        default_size: size(500, 400),
        show_in_dock: true,
        show_on_desktop: false,
        capabilities: &[AppCapability::Appearance],
    },
    AppDescriptor {
        app_id: "network-info",
        title: "Network Info",
        icon_id: "wifi",
        module: HEADLESS,
        default_size: size(400, 350),
        show_in_dock: true,
        show_on_desktop: true,
        capabilities: &[],
    },
    AppDescriptor {
        app_id: "launchpad",
        title: "Launchpad",
        icon_id: "grid",
        module: None,
        default_size: None,
        show_in_dock: true,
        show_on_desktop: false,
        capabilities: &[],
    },
    AppDescriptor {
        app_id: "about",
        title: "About ArsisOS",
        icon_id: "info",
        module: HEADLESS,
        default_size: size(400, 250),
        show_in_dock: false,
        show_on_desktop: false,
        capabilities: &[],
    },
];

pub fn app_registry() -> &'static [AppDescriptor] {
    &APP_REGISTRY
}

pub fn app_descriptor(app_id: &str) -> Option<&'static AppDescriptor> {
    find_descriptor(app_registry(), app_id)
}

/// Looks `app_id` up in an arbitrary catalog slice.
pub fn find_descriptor<'a>(registry: &'a [AppDescriptor], app_id: &str) -> Option<&'a AppDescriptor> {
    registry.iter().find(|entry| entry.app_id == app_id)
}

pub fn dock_apps() -> Vec<&'static AppDescriptor> {
    app_registry()
        .iter()
        .filter(|entry| entry.show_in_dock)
        .collect()
}

pub fn desktop_icon_apps() -> Vec<&'static AppDescriptor> {
    app_registry()
        .iter()
        .filter(|entry| entry.show_on_desktop)
        .collect()
}

/// Apps listed in the launchpad grid: everything that opens a window.
pub fn launchpad_apps() -> Vec<&'static AppDescriptor> {
    app_registry()
        .iter()
        .filter(|entry| entry.opens_window())
        .collect()
}

/// Case-insensitive title or id search used by spotlight. An empty query matches nothing.
pub fn search_apps(query: &str) -> Vec<&'static AppDescriptor> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    app_registry()
        .iter()
        .filter(|entry| {
            entry.title.to_lowercase().contains(&needle) || entry.app_id.contains(&needle)
        })
        .collect()
}

pub fn app_title(app_id: &str) -> Option<&'static str> {
    app_descriptor(app_id).map(|entry| entry.title)
}
