//! Reducer actions, side-effect intents, and transition logic for the desktop runtime.
//!
//! [`DesktopState`] composes the independently owned stores. Every mutation goes through
//! [`reduce_desktop`], which applies one action atomically and returns the effects the host must
//! run afterwards.

mod profile;

use desktop_app_contract::{AppCommandSender, ApplicationId, Point};
use platform_host::Viewport;
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    apps::{app_registry, AppDescriptor},
    boot::BootSequence,
    capabilities::{resolve_app_services, CapabilityContext},
    config::DesktopConfig,
    control_center::ControlCenterState,
    dock::Dock,
    model::{ApiUsage, Notification, NotificationDraft, ProfileUpdate, WindowSize},
    notifications::NotificationService,
    overlays::{BlockingAlert, Overlay, OverlayCoordinator, SystemAction},
    session::{default_profile, AuthState, AuthenticatedSession, ProfileWrite, SessionStore},
    window_manager::{OpenOutcome, WindowManager},
};

/// All desktop state, one store per concern.
#[derive(Debug)]
pub struct DesktopState {
    pub windows: WindowManager,
    pub overlays: OverlayCoordinator,
    pub notifications: NotificationService,
    pub session: SessionStore,
    pub api_usage: ApiUsage,
    pub boot: BootSequence,
    pub control_center: ControlCenterState,
    pub dock: Dock,
}

impl DesktopState {
    pub fn new(config: &DesktopConfig, viewport: Viewport) -> Self {
        Self::with_registry(app_registry(), config, viewport)
    }

    pub fn with_registry(
        registry: &'static [AppDescriptor],
        config: &DesktopConfig,
        viewport: Viewport,
    ) -> Self {
        Self {
            windows: WindowManager::new(registry, config.fallback_window_size, config.open_jitter),
            overlays: OverlayCoordinator::default(),
            notifications: NotificationService::new(registry, config.notification_history_limit),
            session: SessionStore::new(default_profile(config, viewport)),
            api_usage: ApiUsage::new(config.api_call_limit),
            boot: BootSequence::default(),
            control_center: ControlCenterState::default(),
            dock: Dock::from_registry(registry),
        }
    }
}

/// Inputs to [`reduce_desktop`] that live outside the state.
pub struct ReducerContext<'a> {
    /// Current viewport bounds.
    pub viewport: Viewport,
    /// Wallpapers offered to apps with the appearance capability.
    pub wallpapers: &'a [String],
    /// Queue handed to newly mounted apps.
    pub command_sender: &'a AppCommandSender,
}

#[derive(Debug, Clone, PartialEq)]
/// Actions accepted by [`reduce_desktop`] to mutate [`DesktopState`].
pub enum DesktopAction {
    /// Open an app, or restore and raise its window.
    OpenApp {
        /// Catalog id; unknown ids are ignored.
        app_id: String,
        /// Launch props for a newly mounted instance.
        initial_props: Value,
    },
    /// Close an app's window.
    CloseWindow {
        /// Window owner.
        app_id: String,
    },
    /// Focus and raise a window.
    FocusWindow {
        /// Window owner.
        app_id: String,
    },
    /// Minimize a window.
    MinimizeWindow {
        /// Window owner.
        app_id: String,
    },
    /// Toggle a window between its own geometry and the full viewport.
    ToggleMaximize {
        /// Window owner.
        app_id: String,
    },
    /// Move a window after a drag.
    MoveWindow {
        /// Window owner.
        app_id: String,
        /// New top-left corner.
        position: Point,
    },
    /// Resize a window after a drag.
    ResizeWindow {
        /// Window owner.
        app_id: String,
        /// Requested size.
        size: WindowSize,
    },
    /// Set display brightness; out-of-range values are clamped to `0..=100`.
    SetBrightness {
        percent: i32,
    },
    ToggleWifi,
    ToggleBluetooth,
    /// Drag a dock entry to a new slot.
    ReorderDock {
        app_id: String,
        to_index: usize,
    },
    /// Flip one overlay.
    ToggleOverlay(Overlay),
    /// Open one overlay.
    OpenOverlay(Overlay),
    /// Close one overlay.
    CloseOverlay(Overlay),
    /// Right-click on the desktop root.
    OpenContextMenu {
        /// Pointer location.
        at: Point,
    },
    /// Activate the context menu's item.
    SelectContextMenuItem,
    /// Click on the desktop root.
    DismissLightweightOverlays,
    /// Pick a window in mission control.
    SelectMissionControlWindow {
        /// Window owner.
        app_id: String,
    },
    /// Pick an app in spotlight or launchpad.
    SelectLauncherApp {
        /// Overlay the selection came from.
        overlay: Overlay,
        /// App to open.
        app_id: String,
    },
    /// Post a notification on behalf of an app.
    PostNotification(NotificationDraft),
    /// Remove one toast when its timer fires.
    ExpireToast {
        /// Notification id.
        id: u64,
    },
    /// Empty the notification history.
    ClearNotificationHistory,
    /// Start a guest session.
    LoginGuest,
    /// Apply a verified login.
    CompleteLogin(AuthenticatedSession),
    /// End the session and discard all windows.
    SignOut,
    /// Merge a partial profile update.
    UpdateProfile(ProfileUpdate),
    /// Move a desktop icon.
    MoveDesktopIcon {
        /// Icon owner.
        app_id: String,
        /// New position.
        position: Point,
    },
    /// Change the wallpaper.
    SetWallpaper {
        /// Wallpaper URL.
        url: String,
    },
    /// Flip light/dark theme.
    ToggleTheme,
    /// Count one outbound API call.
    RecordApiCall,
    /// Show the restart/shutdown/sleep screen. Sleep also signs out.
    BeginSystemAction(SystemAction),
    /// Leave the system action screen.
    Wake,
    /// Show a blocking permission alert.
    ShowPermissionAlert(BlockingAlert),
    /// Dismiss the blocking alert.
    DismissAlert,
    /// Advance startup progress.
    BootTick,
    /// Finish the startup settle delay.
    BootSettled,
}

/// Session status published on the event stream. Tokens never leave the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    LoggedOut,
    Guest,
    Authenticated { username: String },
}

impl From<&AuthState> for SessionStatus {
    fn from(state: &AuthState) -> Self {
        match state {
            AuthState::LoggedOut => Self::LoggedOut,
            AuthState::Guest => Self::Guest,
            AuthState::Authenticated { username, .. } => Self::Authenticated {
                username: username.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Change notifications broadcast to runtime subscribers.
pub enum DesktopEvent {
    WindowOpened { app_id: ApplicationId },
    WindowClosed { app_id: ApplicationId },
    WindowFocused { app_id: ApplicationId },
    WindowMinimized { app_id: ApplicationId },
    NotificationPosted(Notification),
    ToastExpired { id: u64 },
    SessionChanged(SessionStatus),
    LoginFailed { username: String, message: String },
    ProfileUpdated,
    /// A best-effort write-through failed. In-memory state is unaffected.
    ProfileSyncFailed { username: String, error: String },
    AccountCreated { username: String },
    AccountCreationFailed { username: String, message: String },
    PermissionDenied(BlockingAlert),
    ControlCenterChanged(ControlCenterState),
    DockReordered { apps: Vec<ApplicationId> },
    ApiCallRecorded { count: u64 },
    SystemActionStarted(SystemAction),
    BootProgress { percent: u8 },
    BootReady,
}

#[derive(Debug, Clone, PartialEq)]
/// Side effects requested by the reducer and executed by the runtime.
pub enum RuntimeEffect {
    /// Remove the toast with this id once its lifetime elapses.
    ScheduleToastExpiry { id: u64 },
    /// Fire-and-forget profile write-through.
    PersistProfile(ProfileWrite),
    /// Broadcast a change notification.
    Publish(DesktopEvent),
}

/// Applies a [`DesktopAction`] and collects resulting side effects.
///
/// Actions that reference unknown apps or missing windows are no-ops, as are desktop actions while
/// nobody is logged in.
pub fn reduce_desktop(
    state: &mut DesktopState,
    context: &ReducerContext<'_>,
    action: DesktopAction,
) -> Vec<RuntimeEffect> {
    let mut effects = Vec::new();
    if requires_session(&action) && !state.session.is_logged_in() {
        debug!(?action, "ignored while logged out");
        return effects;
    }
    if profile::reduce_profile_action(state, &action, &mut effects) {
        return effects;
    }

    match action {
        DesktopAction::OpenApp {
            app_id,
            initial_props,
        } => open_app(state, context, &app_id, initial_props, &mut effects),
        DesktopAction::CloseWindow { app_id } => {
            if state.windows.close(&app_id) {
                info!(app_id = %app_id, "window closed");
                publish_window(&mut effects, &app_id, |app_id| DesktopEvent::WindowClosed {
                    app_id,
                });
            }
        }
        DesktopAction::FocusWindow { app_id } => focus_window(state, &app_id, &mut effects),
        DesktopAction::MinimizeWindow { app_id } => {
            if state.windows.minimize(&app_id) {
                publish_window(&mut effects, &app_id, |app_id| {
                    DesktopEvent::WindowMinimized { app_id }
                });
            }
        }
        DesktopAction::ToggleMaximize { app_id } => {
            state.windows.toggle_maximize(&app_id, context.viewport);
        }
        DesktopAction::MoveWindow { app_id, position } => {
            state.windows.move_window(&app_id, position);
        }
        DesktopAction::ResizeWindow { app_id, size } => {
            state.windows.resize_window(&app_id, size);
        }
        DesktopAction::SetBrightness { percent } => {
            if state.control_center.set_brightness(percent) {
                publish_control_center(state, &mut effects);
            }
        }
        DesktopAction::ToggleWifi => {
            let on = state.control_center.toggle_wifi();
            debug!(on, "wifi toggled");
            publish_control_center(state, &mut effects);
        }
        DesktopAction::ToggleBluetooth => {
            let on = state.control_center.toggle_bluetooth();
            debug!(on, "bluetooth toggled");
            publish_control_center(state, &mut effects);
        }
        DesktopAction::ReorderDock { app_id, to_index } => {
            if state.dock.reorder(&app_id, to_index) {
                effects.push(RuntimeEffect::Publish(DesktopEvent::DockReordered {
                    apps: state.dock.apps().to_vec(),
                }));
            }
        }
        DesktopAction::ToggleOverlay(overlay) => {
            state.overlays.toggle(overlay);
        }
        DesktopAction::OpenOverlay(overlay) => state.overlays.open(overlay),
        DesktopAction::CloseOverlay(overlay) => state.overlays.close(overlay),
        DesktopAction::OpenContextMenu { at } => state.overlays.open_context_menu(at),
        DesktopAction::SelectContextMenuItem => {
            if let Some(target) = state.overlays.select_context_menu_item() {
                open_app(state, context, target, Value::Null, &mut effects);
            }
        }
        DesktopAction::DismissLightweightOverlays => state.overlays.dismiss_lightweight(),
        DesktopAction::SelectMissionControlWindow { app_id } => {
            focus_window(state, &app_id, &mut effects);
            state.overlays.close(Overlay::MissionControl);
        }
        DesktopAction::SelectLauncherApp { overlay, app_id } => {
            open_app(state, context, &app_id, Value::Null, &mut effects);
            state.overlays.close(overlay);
        }
        DesktopAction::PostNotification(draft) => {
            if let Some(notification) = state.notifications.post(draft) {
                effects.push(RuntimeEffect::ScheduleToastExpiry {
                    id: notification.id,
                });
                effects.push(RuntimeEffect::Publish(DesktopEvent::NotificationPosted(
                    notification,
                )));
            }
        }
        DesktopAction::ExpireToast { id } => {
            if state.notifications.expire_toast(id) {
                debug!(id, "toast expired");
                effects.push(RuntimeEffect::Publish(DesktopEvent::ToastExpired { id }));
            }
        }
        DesktopAction::ClearNotificationHistory => state.notifications.clear_history(),
        DesktopAction::LoginGuest => {
            state.session.login_guest();
            start_session(state, &mut effects);
        }
        DesktopAction::CompleteLogin(session) => {
            state.session.complete_login(session);
            start_session(state, &mut effects);
        }
        DesktopAction::SignOut => sign_out(state, &mut effects),
        DesktopAction::RecordApiCall => {
            let count = state.api_usage.record();
            effects.push(RuntimeEffect::Publish(DesktopEvent::ApiCallRecorded { count }));
        }
        DesktopAction::BeginSystemAction(action) => {
            state.overlays.begin_system_action(action);
            effects.push(RuntimeEffect::Publish(DesktopEvent::SystemActionStarted(
                action,
            )));
            if action.ends_session() {
                sign_out(state, &mut effects);
            }
        }
        DesktopAction::Wake => {
            state.overlays.wake();
        }
        DesktopAction::ShowPermissionAlert(alert) => {
            state.overlays.show_alert(alert.clone());
            effects.push(RuntimeEffect::Publish(DesktopEvent::PermissionDenied(alert)));
        }
        DesktopAction::DismissAlert => {
            state.overlays.dismiss_alert();
        }
        DesktopAction::BootTick => {
            if state.boot.tick() {
                effects.push(RuntimeEffect::Publish(DesktopEvent::BootProgress {
                    percent: state.boot.progress(),
                }));
            }
        }
        DesktopAction::BootSettled => {
            if state.boot.settle() {
                info!("desktop ready");
                effects.push(RuntimeEffect::Publish(DesktopEvent::BootReady));
            }
        }
        DesktopAction::UpdateProfile(_)
        | DesktopAction::MoveDesktopIcon { .. }
        | DesktopAction::SetWallpaper { .. }
        | DesktopAction::ToggleTheme => {}
    }
    effects
}

fn requires_session(action: &DesktopAction) -> bool {
    matches!(
        action,
        DesktopAction::OpenApp { .. }
            | DesktopAction::SetBrightness { .. }
            | DesktopAction::ToggleWifi
            | DesktopAction::ToggleBluetooth
            | DesktopAction::ReorderDock { .. }
            | DesktopAction::ToggleOverlay(_)
            | DesktopAction::OpenOverlay(_)
            | DesktopAction::OpenContextMenu { .. }
            | DesktopAction::SelectLauncherApp { .. }
            | DesktopAction::UpdateProfile(_)
            | DesktopAction::MoveDesktopIcon { .. }
            | DesktopAction::SetWallpaper { .. }
            | DesktopAction::ToggleTheme
    )
}

fn open_app(
    state: &mut DesktopState,
    context: &ReducerContext<'_>,
    app_id: &str,
    initial_props: Value,
    effects: &mut Vec<RuntimeEffect>,
) {
    let session = &state.session;
    let capabilities = CapabilityContext {
        profile: session.profile(),
        wallpapers: context.wallpapers,
        current_user: session.current_user(),
        sender: context.command_sender,
    };
    let outcome = state
        .windows
        .open(app_id, initial_props, context.viewport, |id, descriptor| {
            resolve_app_services(id, descriptor, &capabilities)
        });
    let Some(outcome) = outcome else {
        return;
    };
    state.overlays.dismiss_for_app_open();
    match outcome {
        OpenOutcome::Mounted => {
            info!(app_id, "window opened");
            publish_window(effects, app_id, |app_id| DesktopEvent::WindowOpened { app_id });
        }
        OpenOutcome::Raised => {
            publish_window(effects, app_id, |app_id| DesktopEvent::WindowFocused { app_id });
        }
    }
}

fn focus_window(state: &mut DesktopState, app_id: &str, effects: &mut Vec<RuntimeEffect>) {
    if state.windows.focus(app_id) {
        publish_window(effects, app_id, |app_id| DesktopEvent::WindowFocused { app_id });
    }
}

fn sign_out(state: &mut DesktopState, effects: &mut Vec<RuntimeEffect>) {
    state.session.sign_out();
    state.windows.clear();
    state.overlays.reset();
    publish_session(state, effects);
}

fn start_session(state: &mut DesktopState, effects: &mut Vec<RuntimeEffect>) {
    state.windows.clear();
    state.overlays.reset();
    publish_session(state, effects);
}

fn publish_session(state: &DesktopState, effects: &mut Vec<RuntimeEffect>) {
    effects.push(RuntimeEffect::Publish(DesktopEvent::SessionChanged(
        state.session.state().into(),
    )));
}

fn publish_control_center(state: &DesktopState, effects: &mut Vec<RuntimeEffect>) {
    effects.push(RuntimeEffect::Publish(DesktopEvent::ControlCenterChanged(
        state.control_center,
    )));
}

fn publish_window(
    effects: &mut Vec<RuntimeEffect>,
    app_id: &str,
    event: impl FnOnce(ApplicationId) -> DesktopEvent,
) {
    effects.push(RuntimeEffect::Publish(event(ApplicationId::trusted(app_id))));
}
