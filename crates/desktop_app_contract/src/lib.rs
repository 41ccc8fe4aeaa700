//! Shared contract types between the desktop window manager runtime and mounted apps.
//!
//! Apps never touch runtime state directly. At mount time the runtime resolves the app's declared
//! capabilities into an [`AppServices`] bundle; every service funnels its requests into one
//! [`AppCommandSender`] queue tagged with the source app id.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod profile;

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use profile::{
    AssistantMessage, CalendarEvent, CalendarEvents, DesktopItem, Document, Point, ProfileSlice,
    ProfileSliceValue, Speaker, Theme,
};

/// Stable identifier for an app in the runtime catalog (for example `photo-booth`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(String);

impl ApplicationId {
    /// Returns an app identifier when `raw` conforms to the kebab-case id policy.
    pub fn new(raw: impl Into<String>) -> Result<Self, ContractError> {
        let raw = raw.into();
        if is_valid_application_id(&raw) {
            Ok(Self(raw))
        } else {
            Err(ContractError::InvalidApplicationId(raw))
        }
    }

    /// Returns the string form of the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Creates an id without validation for compile-time/runtime trusted constants.
    pub fn trusted(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for ApplicationId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ApplicationId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

fn is_valid_application_id(raw: &str) -> bool {
    if raw.is_empty() || raw.len() > 64 {
        return false;
    }
    let bytes = raw.as_bytes();
    if !bytes[0].is_ascii_lowercase() || raw.ends_with('-') || raw.contains("--") {
        return false;
    }
    bytes
        .iter()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
}

/// Contract violations reported to the calling app.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    /// The raw id does not follow the app id policy.
    #[error("invalid application id `{0}`; expected lowercase kebab-case")]
    InvalidApplicationId(String),
    /// A profile slice service received a value for a different slice.
    #[error("profile service scoped to {granted:?} cannot write {attempted:?}")]
    SliceMismatch {
        /// Slice the service was granted.
        granted: ProfileSlice,
        /// Slice the rejected value belongs to.
        attempted: ProfileSlice,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind", content = "slice")]
/// Declared app capability scopes resolved by the runtime at open time.
pub enum AppCapability {
    /// Read/write access to exactly one profile slice.
    ProfileSlice(ProfileSlice),
    /// Access to the global API-call counter.
    ApiCallCounter,
    /// Access to the notification pipeline.
    Notifications,
    /// Wallpaper and theme controls.
    Appearance,
    /// Opening other apps with launch props.
    Launcher,
    /// Account registration and signed-in user lookup.
    Accounts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Lifecycle events delivered by the window manager to a mounted app.
pub enum AppLifecycleEvent {
    /// App has been mounted into a managed window.
    Mounted,
    /// Window became the active window.
    Focused,
    /// Window lost activation.
    Blurred,
    /// Window was minimized.
    Minimized,
    /// Window was restored from minimized state.
    Restored,
    /// Window was closed and the instance is about to be dropped.
    Closed,
}

impl AppLifecycleEvent {
    /// Returns a stable string token for logging.
    pub const fn token(self) -> &'static str {
        match self {
            Self::Mounted => "mounted",
            Self::Focused => "focused",
            Self::Blurred => "blurred",
            Self::Minimized => "minimized",
            Self::Restored => "restored",
            Self::Closed => "closed",
        }
    }
}

/// Username/password pair supplied to login or account creation.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account name, the durable storage key.
    pub username: String,
    /// Plain password. Never logged.
    pub password: String,
}

impl Credentials {
    /// Creates a credential pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Requests emitted by app services to the desktop runtime.
pub enum AppCommand {
    /// Replace one profile slice.
    SaveProfileSlice {
        /// New slice value.
        value: ProfileSliceValue,
    },
    /// Count one outbound API call.
    RecordApiCall,
    /// Post a notification from the source app.
    Notify {
        /// Notification title.
        title: String,
        /// Notification body.
        message: String,
    },
    /// Open (or raise) another app.
    OpenApp {
        /// Target app.
        app_id: ApplicationId,
        /// Launch props passed to a newly mounted instance.
        initial_props: Value,
    },
    /// Set the desktop wallpaper.
    SetWallpaper {
        /// Wallpaper URL.
        url: String,
    },
    /// Flip between light and dark theme.
    ToggleTheme,
    /// Register a new durable account.
    CreateAccount {
        /// Account credentials.
        credentials: Credentials,
    },
    /// Report that the host denied access to an external resource.
    PermissionDenied {
        /// Resource that was requested (for example `camera`).
        resource: String,
        /// User-facing explanation.
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
/// [`AppCommand`] tagged with the app that issued it.
pub struct AppCommandEnvelope {
    /// Issuing app.
    pub source: ApplicationId,
    /// Requested command.
    pub command: AppCommand,
}

/// Transport callback installed by the runtime. Must not block.
pub type AppCommandSender = Arc<dyn Fn(AppCommandEnvelope) + Send + Sync>;

#[derive(Clone)]
/// Source-tagged handle onto the runtime command queue.
pub struct CommandSender {
    source: ApplicationId,
    sender: AppCommandSender,
}

impl CommandSender {
    /// Creates a sender that tags every command with `source`.
    pub fn new(source: ApplicationId, sender: AppCommandSender) -> Self {
        Self { source, sender }
    }

    /// App id attached to every command.
    pub fn source(&self) -> &ApplicationId {
        &self.source
    }

    /// Sends a raw command.
    pub fn send(&self, command: AppCommand) {
        (self.sender)(AppCommandEnvelope {
            source: self.source.clone(),
            command,
        });
    }
}

impl fmt::Debug for CommandSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSender")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
/// Value/setter pair scoped to exactly one profile slice.
pub struct ProfileSliceService {
    current: ProfileSliceValue,
    sender: CommandSender,
}

impl ProfileSliceService {
    /// Creates a service granting access to `current`'s slice.
    pub fn new(current: ProfileSliceValue, sender: CommandSender) -> Self {
        Self { current, sender }
    }

    /// Slice this service is scoped to.
    pub fn slice(&self) -> ProfileSlice {
        self.current.slice()
    }

    /// Slice value captured when the app was mounted.
    pub fn current(&self) -> &ProfileSliceValue {
        &self.current
    }

    /// Replaces the slice.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::SliceMismatch`] when `value` belongs to another slice.
    pub fn save(&self, value: ProfileSliceValue) -> Result<(), ContractError> {
        let granted = self.slice();
        let attempted = value.slice();
        if granted != attempted {
            return Err(ContractError::SliceMismatch { granted, attempted });
        }
        self.sender.send(AppCommand::SaveProfileSlice { value });
        Ok(())
    }
}

#[derive(Debug, Clone)]
/// Global API-call counter callback.
pub struct ApiCallService {
    sender: CommandSender,
}

impl ApiCallService {
    /// Creates the service.
    pub fn new(sender: CommandSender) -> Self {
        Self { sender }
    }

    /// Counts one API call.
    pub fn record_call(&self) {
        self.sender.send(AppCommand::RecordApiCall);
    }
}

#[derive(Debug, Clone)]
/// Notification sink routed into the shell notification pipeline.
pub struct NotificationSink {
    sender: CommandSender,
}

impl NotificationSink {
    /// Creates the sink.
    pub fn new(sender: CommandSender) -> Self {
        Self { sender }
    }

    /// Posts a notification attributed to the source app.
    pub fn notify(&self, title: impl Into<String>, message: impl Into<String>) {
        self.sender.send(AppCommand::Notify {
            title: title.into(),
            message: message.into(),
        });
    }
}

#[derive(Debug, Clone)]
/// Wallpaper and theme controls.
pub struct AppearanceService {
    /// Wallpapers offered for selection.
    pub wallpapers: Vec<String>,
    /// Theme at mount time.
    pub theme: Theme,
    sender: CommandSender,
}

impl AppearanceService {
    /// Creates the service.
    pub fn new(wallpapers: Vec<String>, theme: Theme, sender: CommandSender) -> Self {
        Self {
            wallpapers,
            theme,
            sender,
        }
    }

    /// Requests a wallpaper change.
    pub fn set_wallpaper(&self, url: impl Into<String>) {
        self.sender
            .send(AppCommand::SetWallpaper { url: url.into() });
    }

    /// Requests a theme flip.
    pub fn toggle_theme(&self) {
        self.sender.send(AppCommand::ToggleTheme);
    }
}

#[derive(Debug, Clone)]
/// Opens other apps.
pub struct LauncherService {
    sender: CommandSender,
}

impl LauncherService {
    /// Creates the service.
    pub fn new(sender: CommandSender) -> Self {
        Self { sender }
    }

    /// Opens `app_id` with `initial_props`, or raises it if already open.
    pub fn open(&self, app_id: ApplicationId, initial_props: Value) {
        self.sender.send(AppCommand::OpenApp {
            app_id,
            initial_props,
        });
    }
}

#[derive(Debug, Clone)]
/// Account registration service.
pub struct AccountService {
    /// Signed-in username at mount time, `None` for guest sessions.
    pub current_user: Option<String>,
    sender: CommandSender,
}

impl AccountService {
    /// Creates the service.
    pub fn new(current_user: Option<String>, sender: CommandSender) -> Self {
        Self {
            current_user,
            sender,
        }
    }

    /// Requests creation of a durable account. The outcome is published on the runtime event
    /// stream.
    pub fn create_account(&self, credentials: Credentials) {
        self.sender.send(AppCommand::CreateAccount { credentials });
    }
}

#[derive(Debug, Clone)]
/// Injected app services bundle. Only services for declared capabilities are present.
pub struct AppServices {
    /// Profile slice value/setter pair.
    pub profile: Option<ProfileSliceService>,
    /// API-call counter.
    pub api_calls: Option<ApiCallService>,
    /// Notification sink.
    pub notifications: Option<NotificationSink>,
    /// Wallpaper/theme controls.
    pub appearance: Option<AppearanceService>,
    /// App launcher.
    pub launcher: Option<LauncherService>,
    /// Account registration.
    pub accounts: Option<AccountService>,
    sender: CommandSender,
}

impl AppServices {
    /// Creates an empty bundle around the runtime command sender.
    pub fn new(sender: CommandSender) -> Self {
        Self {
            profile: None,
            api_calls: None,
            notifications: None,
            appearance: None,
            launcher: None,
            accounts: None,
            sender,
        }
    }

    /// Command sender shared by every service in the bundle.
    pub fn sender(&self) -> &CommandSender {
        &self.sender
    }

    /// Reports a denied external resource. Always available, independent of capabilities.
    pub fn report_permission_denied(&self, resource: impl Into<String>, message: impl Into<String>) {
        self.sender.send(AppCommand::PermissionDenied {
            resource: resource.into(),
            message: message.into(),
        });
    }
}

#[derive(Debug, Clone)]
/// App mount context injected by the desktop runtime per window instance.
pub struct AppMountContext {
    /// App id from the runtime catalog.
    pub app_id: ApplicationId,
    /// Launch props supplied at open time.
    pub initial_props: Value,
    /// Capability-scoped services.
    pub services: AppServices,
}

/// A mounted application instance owned by its window.
pub trait MountedApp: Send {
    /// App id of the instance.
    fn app_id(&self) -> &ApplicationId;

    /// Receives window lifecycle transitions.
    fn on_lifecycle(&mut self, _event: AppLifecycleEvent) {}
}

/// Static mount function used by the runtime registry.
pub type AppMountFn = fn(AppMountContext) -> Box<dyn MountedApp>;

#[derive(Clone, Copy)]
/// Mountable app module referenced by a catalog descriptor.
pub struct AppModule {
    mount_fn: AppMountFn,
}

impl AppModule {
    /// Creates a module from a mount function.
    pub const fn new(mount_fn: AppMountFn) -> Self {
        Self { mount_fn }
    }

    /// Mounts an app instance with a runtime-provided context.
    pub fn mount(self, context: AppMountContext) -> Box<dyn MountedApp> {
        (self.mount_fn)(context)
    }
}

impl fmt::Debug for AppModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppModule").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;

    use super::*;

    fn recording_sender(source: &str) -> (CommandSender, Arc<Mutex<Vec<AppCommandEnvelope>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        let sender: AppCommandSender = Arc::new(move |envelope| {
            sink.lock().unwrap().push(envelope);
        });
        (
            CommandSender::new(ApplicationId::trusted(source), sender),
            log,
        )
    }

    #[test]
    fn application_id_requires_kebab_case() {
        assert!(ApplicationId::new("calculator").is_ok());
        assert!(ApplicationId::new("photo-booth").is_ok());
        assert!(ApplicationId::new("Calculator").is_err());
        assert!(ApplicationId::new("photo--booth").is_err());
        assert!(ApplicationId::new("booth-").is_err());
        assert!(ApplicationId::new("").is_err());
    }

    #[test]
    fn profile_service_rejects_foreign_slice() {
        let (sender, log) = recording_sender("ozark");
        let service = ProfileSliceService::new(
            ProfileSliceValue::BrowserUrl("https://a.example".to_string()),
            sender,
        );

        let err = service
            .save(ProfileSliceValue::Photos(vec!["data:".to_string()]))
            .unwrap_err();
        assert_eq!(
            err,
            ContractError::SliceMismatch {
                granted: ProfileSlice::BrowserUrl,
                attempted: ProfileSlice::Photos,
            }
        );
        assert!(log.lock().unwrap().is_empty());

        service
            .save(ProfileSliceValue::BrowserUrl("https://b.example".to_string()))
            .expect("own slice");
        let sent = log.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].source, ApplicationId::trusted("ozark"));
    }

    #[test]
    fn notification_sink_tags_source_app() {
        let (sender, log) = recording_sender("weather");
        NotificationSink::new(sender).notify("Rain", "Bring an umbrella");
        let sent = log.lock().unwrap();
        assert_eq!(
            sent[0],
            AppCommandEnvelope {
                source: ApplicationId::trusted("weather"),
                command: AppCommand::Notify {
                    title: "Rain".to_string(),
                    message: "Bring an umbrella".to_string(),
                },
            }
        );
    }

    #[test]
    fn credentials_debug_redacts_password() {
        let rendered = format!("{:?}", Credentials::new("ada", "hunter2"));
        assert!(rendered.contains("ada"));
        assert!(!rendered.contains("hunter2"));
    }
}
