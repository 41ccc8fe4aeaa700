//! Profile slice types shared by the session store and mounted applications.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ApplicationId;

/// Desktop-space coordinate in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal offset from the left edge.
    pub x: i32,
    /// Vertical offset from the top edge.
    pub y: i32,
}

impl Point {
    /// Creates a point.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Desktop icon placement for one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesktopItem {
    /// Application launched by the icon.
    pub app_id: ApplicationId,
    /// Icon position on the desktop.
    pub position: Point,
}

/// Document edited by the pages application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Document id, unique within a profile.
    pub id: u64,
    /// Document title.
    pub title: String,
    /// Rich-text body.
    pub content: String,
}

/// One calendar entry. Entries are grouped by a date/period key in the profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Event id, unique within its period.
    pub id: u64,
    /// Event text.
    pub text: String,
}

/// Author of an assistant chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Speaker {
    /// The signed-in user.
    User,
    /// The assistant application.
    Assistant,
}

/// One assistant chat history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantMessage {
    /// Message author.
    pub sender: Speaker,
    /// Message text.
    pub text: String,
}

/// Desktop colour scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Theme {
    /// Light scheme.
    #[default]
    Light,
    /// Dark scheme.
    Dark,
}

impl Theme {
    /// Returns the opposite scheme.
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// Calendar events keyed by date/period.
pub type CalendarEvents = BTreeMap<String, Vec<CalendarEvent>>;

/// Profile slices an application may be granted read/write access to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProfileSlice {
    /// Saved documents.
    Documents,
    /// Calendar events.
    CalendarEvents,
    /// Photo collection (data URLs).
    Photos,
    /// Assistant chat history.
    AssistantHistory,
    /// Last URL visited in the embedded browser.
    BrowserUrl,
}

/// Value of exactly one profile slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "slice", content = "value", rename_all = "kebab-case")]
pub enum ProfileSliceValue {
    /// Saved documents.
    Documents(Vec<Document>),
    /// Calendar events keyed by period.
    CalendarEvents(CalendarEvents),
    /// Photo collection.
    Photos(Vec<String>),
    /// Assistant chat history.
    AssistantHistory(Vec<AssistantMessage>),
    /// Embedded browser URL.
    BrowserUrl(String),
}

impl ProfileSliceValue {
    /// Returns which slice this value belongs to.
    pub const fn slice(&self) -> ProfileSlice {
        match self {
            Self::Documents(_) => ProfileSlice::Documents,
            Self::CalendarEvents(_) => ProfileSlice::CalendarEvents,
            Self::Photos(_) => ProfileSlice::Photos,
            Self::AssistantHistory(_) => ProfileSlice::AssistantHistory,
            Self::BrowserUrl(_) => ProfileSlice::BrowserUrl,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_value_reports_its_slice() {
        assert_eq!(
            ProfileSliceValue::Photos(Vec::new()).slice(),
            ProfileSlice::Photos
        );
        assert_eq!(
            ProfileSliceValue::BrowserUrl("https://example.org".to_string()).slice(),
            ProfileSlice::BrowserUrl
        );
    }

    #[test]
    fn theme_toggle_flips_scheme() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled().toggled(), Theme::Dark);
    }

    #[test]
    fn slice_value_serializes_with_slice_tag() {
        let json = serde_json::to_value(ProfileSliceValue::BrowserUrl("u".to_string()))
            .expect("serialize");
        assert_eq!(json["slice"], "browser-url");
        assert_eq!(json["value"], "u");
    }
}
