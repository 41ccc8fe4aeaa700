//! Session and window-management core of the desktop shell.
//!
//! State lives in independently owned stores composed by [`reducer::DesktopState`]. The
//! [`DesktopRuntime`] host serializes every transition and runs the reducer's effects: toast
//! timers, detached profile write-through, and the event stream.

pub mod apps;
pub mod boot;
pub mod capabilities;
pub mod config;
pub mod control_center;
pub mod dock;
pub mod host;
pub mod model;
pub mod notifications;
pub mod overlays;
pub mod reducer;
pub mod runtime;
pub mod session;
pub mod window_manager;

pub use apps::{app_descriptor, app_registry, AppDescriptor};
pub use config::{ConfigError, DesktopConfig};
pub use control_center::ControlCenterState;
pub use dock::Dock;
pub use host::DesktopHostContext;
pub use model::*;
pub use overlays::{Overlay, SystemAction};
pub use reducer::{reduce_desktop, DesktopAction, DesktopEvent, RuntimeEffect, SessionStatus};
pub use runtime::{DesktopRuntime, RuntimeError};
pub use session::{AuthError, AuthState};
