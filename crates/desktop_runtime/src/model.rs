use desktop_app_contract::{
    ApplicationId, AssistantMessage, CalendarEvents, DesktopItem, Document, ProfileSlice,
    ProfileSliceValue, Theme,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_WINDOW_WIDTH: i32 = 640;
pub const DEFAULT_WINDOW_HEIGHT: i32 = 480;
/// First z-order rank handed out by the window manager.
pub const FIRST_Z_INDEX: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSize {
    pub width: i32,
    pub height: i32,
}

impl WindowSize {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

impl Default for WindowSize {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_WIDTH, DEFAULT_WINDOW_HEIGHT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl WindowRect {
    pub fn clamped_min(self, min_w: i32, min_h: i32) -> Self {
        Self {
            w: self.w.max(min_w),
            h: self.h.max(min_h),
            ..self
        }
    }

    pub fn size(self) -> WindowSize {
        WindowSize::new(self.w, self.h)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowRecord {
    pub app_id: ApplicationId,
    pub title: String,
    pub rect: WindowRect,
    pub restore_rect: Option<WindowRect>,
    pub z_index: u64,
    pub minimized: bool,
    pub maximized: bool,
    pub initial_props: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySettings {
    pub wallpaper: String,
    pub theme: Theme,
}

/// Per-user profile. Stored as an opaque JSON blob next to the account credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionProfile {
    pub desktop_items: Vec<DesktopItem>,
    pub documents: Vec<Document>,
    pub calendar_events: CalendarEvents,
    pub photos: Vec<String>,
    pub assistant_history: Vec<AssistantMessage>,
    pub browser_url: String,
    pub settings: DisplaySettings,
}

impl Default for SessionProfile {
    fn default() -> Self {
        Self {
            desktop_items: Vec::new(),
            documents: Vec::new(),
            calendar_events: CalendarEvents::new(),
            photos: Vec::new(),
            assistant_history: Vec::new(),
            browser_url: String::new(),
            settings: DisplaySettings {
                wallpaper: String::new(),
                theme: Theme::Light,
            },
        }
    }
}

impl SessionProfile {
    /// Returns the current value of one slice.
    pub fn slice(&self, slice: ProfileSlice) -> ProfileSliceValue {
        match slice {
            ProfileSlice::Documents => ProfileSliceValue::Documents(self.documents.clone()),
            ProfileSlice::CalendarEvents => {
                ProfileSliceValue::CalendarEvents(self.calendar_events.clone())
            }
            ProfileSlice::Photos => ProfileSliceValue::Photos(self.photos.clone()),
            ProfileSlice::AssistantHistory => {
                ProfileSliceValue::AssistantHistory(self.assistant_history.clone())
            }
            ProfileSlice::BrowserUrl => ProfileSliceValue::BrowserUrl(self.browser_url.clone()),
        }
    }

    /// Merges `update` into the profile. Fields left as `None` are untouched.
    pub fn apply(&mut self, update: ProfileUpdate) {
        let ProfileUpdate {
            desktop_items,
            documents,
            calendar_events,
            photos,
            assistant_history,
            browser_url,
            wallpaper,
            theme,
        } = update;
        if let Some(items) = desktop_items {
            self.desktop_items = items;
        }
        if let Some(documents) = documents {
            self.documents = documents;
        }
        if let Some(events) = calendar_events {
            self.calendar_events = events;
        }
        if let Some(photos) = photos {
            self.photos = photos;
        }
        if let Some(history) = assistant_history {
            self.assistant_history = history;
        }
        if let Some(url) = browser_url {
            self.browser_url = url;
        }
        if let Some(wallpaper) = wallpaper {
            self.settings.wallpaper = wallpaper;
        }
        if let Some(theme) = theme {
            self.settings.theme = theme;
        }
    }
}

/// Partial profile update. Display settings are split so that a wallpaper change never resets the
/// theme and vice versa.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub desktop_items: Option<Vec<DesktopItem>>,
    pub documents: Option<Vec<Document>>,
    pub calendar_events: Option<CalendarEvents>,
    pub photos: Option<Vec<String>>,
    pub assistant_history: Option<Vec<AssistantMessage>>,
    pub browser_url: Option<String>,
    pub wallpaper: Option<String>,
    pub theme: Option<Theme>,
}

impl ProfileUpdate {
    pub fn wallpaper(url: impl Into<String>) -> Self {
        Self {
            wallpaper: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn theme(theme: Theme) -> Self {
        Self {
            theme: Some(theme),
            ..Self::default()
        }
    }

    pub fn desktop_items(items: Vec<DesktopItem>) -> Self {
        Self {
            desktop_items: Some(items),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl From<ProfileSliceValue> for ProfileUpdate {
    fn from(value: ProfileSliceValue) -> Self {
        let mut update = Self::default();
        match value {
            ProfileSliceValue::Documents(v) => update.documents = Some(v),
            ProfileSliceValue::CalendarEvents(v) => update.calendar_events = Some(v),
            ProfileSliceValue::Photos(v) => update.photos = Some(v),
            ProfileSliceValue::AssistantHistory(v) => update.assistant_history = Some(v),
            ProfileSliceValue::BrowserUrl(v) => update.browser_url = Some(v),
        }
        update
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    pub app_id: ApplicationId,
    pub icon_id: String,
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationDraft {
    pub app_id: ApplicationId,
    pub title: String,
    pub message: String,
}

impl NotificationDraft {
    pub fn new(
        app_id: ApplicationId,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            app_id,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Global outbound API call counter with a display-only soft limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiUsage {
    pub count: u64,
    pub limit: u64,
}

impl ApiUsage {
    pub fn new(limit: u64) -> Self {
        Self { count: 0, limit }
    }

    pub fn record(&mut self) -> u64 {
        self.count = self.count.saturating_add(1);
        self.count
    }

    /// The limit is advisory; calls past it are still counted.
    pub fn is_over_limit(&self) -> bool {
        self.count > self.limit
    }
}
