//! Session authentication state and the signed-in user's profile.
//!
//! The in-memory profile is the source of truth for the running session. Mutations on an
//! authenticated session also yield a [`ProfileWrite`] for best-effort write-through; guest
//! sessions never persist anything.

pub mod auth;
pub mod credentials;

use desktop_app_contract::{
    ApplicationId, AssistantMessage, DesktopItem, Document, Point, Speaker, Theme,
};
use platform_host::{AccountRecord, Viewport};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

pub use auth::{AuthenticatedSession, Authenticator};
pub use credentials::CredentialHasher;

use crate::{
    apps::desktop_icon_apps,
    config::DesktopConfig,
    model::{DisplaySettings, ProfileUpdate, SessionProfile},
};

/// Horizontal distance of the desktop icon column from the right edge.
pub const DESKTOP_ICON_RIGHT_INSET: i32 = 120;
pub const DESKTOP_ICON_TOP: i32 = 40;
pub const DESKTOP_ICON_SPACING: i32 = 110;
pub const DEFAULT_BROWSER_URL: &str = "https://www.wikipedia.org/";

const WELCOME_PAGE_TITLE: &str = "Welcome Page";
const WELCOME_PAGE_CONTENT: &str = "<h1>Welcome to ArsisOS!</h1><p>This is a temporary page for \
your guest session. Create an <b>Arsis ID</b> to save your work!</p><p>Try the new Houston AI \
assistant integrated into Pages to help you write.</p>";
const ASSISTANT_GREETING: &str = "Hello! I'm Houston, your AI assistant. How can I help you today?";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("username already exists")]
    UsernameTaken,
    #[error("a login attempt is already in progress")]
    LoginInProgress,
    #[error("account storage failed: {0}")]
    Storage(String),
    #[error("credential hashing failed: {0}")]
    Credential(String),
}

impl AuthError {
    /// Text shown to the user in the login or registration form.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "Invalid username or password.",
            Self::UsernameTaken => "Username already exists.",
            Self::LoginInProgress => "A login attempt is already in progress.",
            Self::Storage(_) | Self::Credential(_) => {
                "Could not save your account. Please try again."
            }
        }
    }
}

/// Opaque bearer token for an authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn generate() -> Self {
        Self(format!("session-{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    LoggedOut,
    Guest,
    Authenticated {
        username: String,
        token: SessionToken,
    },
}

/// Pending write-through of the full profile for an authenticated user.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileWrite {
    pub username: String,
    pub record: AccountRecord,
}

/// Builds the fixed default profile used by guests and as the seed for new accounts.
pub fn default_profile(config: &DesktopConfig, viewport: Viewport) -> SessionProfile {
    let desktop_items = desktop_icon_apps()
        .into_iter()
        .zip(0..)
        .map(|(app, index)| DesktopItem {
            app_id: ApplicationId::trusted(app.app_id),
            position: Point::new(
                viewport.width - DESKTOP_ICON_RIGHT_INSET,
                DESKTOP_ICON_TOP + index * DESKTOP_ICON_SPACING,
            ),
        })
        .collect();

    SessionProfile {
        desktop_items,
        documents: vec![Document {
            id: 1,
            title: WELCOME_PAGE_TITLE.to_string(),
            content: WELCOME_PAGE_CONTENT.to_string(),
        }],
        calendar_events: Default::default(),
        photos: Vec::new(),
        assistant_history: vec![AssistantMessage {
            sender: Speaker::Assistant,
            text: ASSISTANT_GREETING.to_string(),
        }],
        browser_url: DEFAULT_BROWSER_URL.to_string(),
        settings: DisplaySettings {
            wallpaper: config.default_wallpaper().to_string(),
            theme: Theme::Light,
        },
    }
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    state: AuthState,
    profile: SessionProfile,
    default_profile: SessionProfile,
    password_hash: Option<String>,
}

impl SessionStore {
    pub fn new(default_profile: SessionProfile) -> Self {
        Self {
            state: AuthState::LoggedOut,
            profile: default_profile.clone(),
            default_profile,
            password_hash: None,
        }
    }

    /// Starts an ephemeral session on a fresh copy of the default profile.
    pub fn login_guest(&mut self) {
        self.state = AuthState::Guest;
        self.profile = self.default_profile.clone();
        self.password_hash = None;
        info!("guest session started");
    }

    /// Applies a verified login.
    pub fn complete_login(&mut self, session: AuthenticatedSession) {
        let AuthenticatedSession {
            username,
            token,
            password_hash,
            profile,
        } = session;
        self.state = AuthState::Authenticated { username, token };
        self.profile = profile;
        self.password_hash = Some(password_hash);
    }

    /// Merges `update` into the profile. Returns the write-through request when the session is
    /// authenticated.
    pub fn update_profile(&mut self, update: ProfileUpdate) -> Option<ProfileWrite> {
        if update.is_empty() {
            return None;
        }
        self.profile.apply(update);
        self.pending_write()
    }

    /// Builds the update that moves `app_id`'s desktop icon. `None` when the icon is not on the
    /// desktop.
    pub fn desktop_icon_update(&self, app_id: &str, position: Point) -> Option<ProfileUpdate> {
        let mut items = self.profile.desktop_items.clone();
        let item = items.iter_mut().find(|item| item.app_id == app_id)?;
        item.position = position;
        Some(ProfileUpdate::desktop_items(items))
    }

    pub fn set_wallpaper(&mut self, url: impl Into<String>) -> Option<ProfileWrite> {
        self.update_profile(ProfileUpdate::wallpaper(url))
    }

    pub fn toggle_theme(&mut self) -> Option<ProfileWrite> {
        let next = self.profile.settings.theme.toggled();
        self.update_profile(ProfileUpdate::theme(next))
    }

    /// Ends the session. The profile reverts to the default so nothing of the previous user stays
    /// visible.
    pub fn sign_out(&mut self) {
        if self.state == AuthState::LoggedOut {
            return;
        }
        self.state = AuthState::LoggedOut;
        self.profile = self.default_profile.clone();
        self.password_hash = None;
        info!("signed out");
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn profile(&self) -> &SessionProfile {
        &self.profile
    }

    pub fn default_profile(&self) -> &SessionProfile {
        &self.default_profile
    }

    pub fn is_logged_in(&self) -> bool {
        self.state != AuthState::LoggedOut
    }

    pub fn current_user(&self) -> Option<&str> {
        match &self.state {
            AuthState::Authenticated { username, .. } => Some(username),
            _ => None,
        }
    }

    pub fn token(&self) -> Option<&SessionToken> {
        match &self.state {
            AuthState::Authenticated { token, .. } => Some(token),
            _ => None,
        }
    }

    fn pending_write(&self) -> Option<ProfileWrite> {
        let username = self.current_user()?;
        let password_hash = self.password_hash.as_deref()?;
        let profile = match serde_json::to_value(&self.profile) {
            Ok(profile) => profile,
            Err(err) => {
                warn!(username, "profile serialization failed, skipping write-through: {err}");
                return None;
            }
        };
        Some(ProfileWrite {
            username: username.to_string(),
            record: AccountRecord::new(username, password_hash, profile),
        })
    }
}

#[cfg(test)]
mod tests {
    use desktop_app_contract::{ProfileSliceValue, Speaker};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::BUILT_IN_WALLPAPERS;

    fn store() -> SessionStore {
        SessionStore::new(default_profile(
            &DesktopConfig::default(),
            Viewport::default(),
        ))
    }

    fn authenticated(store: &mut SessionStore) {
        store.complete_login(AuthenticatedSession {
            username: "ada".to_string(),
            token: SessionToken::generate(),
            password_hash: "$argon2id$stub".to_string(),
            profile: SessionProfile::default(),
        });
    }

    #[test]
    fn default_profile_seeds_desktop_icons_and_welcome_content() {
        let profile = default_profile(&DesktopConfig::default(), Viewport::default());

        let positions: Vec<_> = profile
            .desktop_items
            .iter()
            .map(|item| (item.app_id.as_str(), item.position))
            .collect();
        assert_eq!(
            positions,
            vec![
                ("my-docs", Point::new(1320, 40)),
                ("site-creator", Point::new(1320, 150)),
                ("houston", Point::new(1320, 260)),
                ("network-info", Point::new(1320, 370)),
            ]
        );
        assert_eq!(profile.documents[0].title, "Welcome Page");
        assert_eq!(profile.assistant_history[0].sender, Speaker::Assistant);
        assert_eq!(profile.browser_url, DEFAULT_BROWSER_URL);
        assert_eq!(profile.settings.wallpaper, BUILT_IN_WALLPAPERS[3]);
        assert_eq!(profile.settings.theme, Theme::Light);
    }

    #[test]
    fn guest_login_always_yields_the_default_profile() {
        let mut store = store();
        store.login_guest();
        store.update_profile(ProfileSliceValue::Photos(vec!["data:1".to_string()]).into());
        store.sign_out();
        store.login_guest();

        assert_eq!(store.state(), &AuthState::Guest);
        assert_eq!(store.profile(), store.default_profile());
    }

    #[test]
    fn guest_updates_are_never_written_through() {
        let mut store = store();
        store.login_guest();
        assert_eq!(store.set_wallpaper("https://walls.example/a.jpg"), None);
        assert_eq!(store.profile().settings.wallpaper, "https://walls.example/a.jpg");
    }

    #[test]
    fn authenticated_updates_produce_full_profile_write() {
        let mut store = store();
        authenticated(&mut store);

        let write = store
            .update_profile(ProfileSliceValue::BrowserUrl("https://rust-lang.org".to_string()).into())
            .expect("write-through");

        assert_eq!(write.username, "ada");
        assert_eq!(write.record.password_hash, "$argon2id$stub");
        assert_eq!(write.record.profile["browser_url"], "https://rust-lang.org");
    }

    #[test]
    fn wallpaper_update_changes_nothing_else() {
        let mut store = store();
        store.login_guest();
        let before = store.profile().clone();

        store.set_wallpaper("https://walls.example/b.jpg");

        let mut expected = before;
        expected.settings.wallpaper = "https://walls.example/b.jpg".to_string();
        assert_eq!(store.profile(), &expected);
    }

    #[test]
    fn toggle_theme_flips_and_moves_icon_merges_slice() {
        let mut store = store();
        store.login_guest();
        store.toggle_theme();
        assert_eq!(store.profile().settings.theme, Theme::Dark);

        let update = store
            .desktop_icon_update("houston", Point::new(10, 20))
            .expect("icon on desktop");
        store.update_profile(update);
        let houston = store
            .profile()
            .desktop_items
            .iter()
            .find(|item| item.app_id == "houston")
            .expect("houston");
        assert_eq!(houston.position, Point::new(10, 20));
        assert_eq!(store.desktop_icon_update("calculator", Point::new(0, 0)), None);
    }

    #[test]
    fn sign_out_clears_token_and_user_data() {
        let mut store = store();
        authenticated(&mut store);
        assert!(store.token().is_some());

        store.sign_out();

        assert_eq!(store.state(), &AuthState::LoggedOut);
        assert_eq!(store.token(), None);
        assert_eq!(store.current_user(), None);
        assert_eq!(store.profile(), store.default_profile());
        assert_eq!(store.update_profile(ProfileUpdate::theme(Theme::Dark)), None);
    }

    #[test]
    fn empty_update_is_ignored() {
        let mut store = store();
        authenticated(&mut store);
        assert_eq!(store.update_profile(ProfileUpdate::default()), None);
    }
}
