//! Transient overlay panels layered above the windows.
//!
//! Lightweight overlays share one dismiss group. Modal overlays are opened and closed one by one;
//! opening a modal overlay never closes another.

use desktop_app_contract::{ApplicationId, Point};
use serde::{Deserialize, Serialize};

/// App opened by the desktop context menu.
pub const CONTEXT_MENU_TARGET: &str = "settings";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Overlay {
    ContextMenu,
    ControlCenter,
    NotificationCenter,
    MissionControl,
    Spotlight,
    Launchpad,
}

impl Overlay {
    pub const LIGHTWEIGHT: [Self; 3] = [
        Self::ContextMenu,
        Self::ControlCenter,
        Self::NotificationCenter,
    ];
    pub const MODAL: [Self; 3] = [Self::MissionControl, Self::Spotlight, Self::Launchpad];

    pub const fn is_lightweight(self) -> bool {
        matches!(
            self,
            Self::ContextMenu | Self::ControlCenter | Self::NotificationCenter
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SystemAction {
    Restart,
    Shutdown,
    Sleep,
}

impl SystemAction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Restart => "Restarting...",
            Self::Shutdown => "Shutting down...",
            Self::Sleep => "Sleeping...",
        }
    }

    /// Sleep ends the session.
    pub const fn ends_session(self) -> bool {
        matches!(self, Self::Sleep)
    }
}

/// Blocking message raised when the host denies an app access to an external resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockingAlert {
    pub app_id: ApplicationId,
    pub resource: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayCoordinator {
    context_menu: Option<Point>,
    control_center: bool,
    notification_center: bool,
    mission_control: bool,
    spotlight: bool,
    launchpad: bool,
    system_action: Option<SystemAction>,
    alert: Option<BlockingAlert>,
}

impl OverlayCoordinator {
    pub fn is_open(&self, overlay: Overlay) -> bool {
        match overlay {
            Overlay::ContextMenu => self.context_menu.is_some(),
            Overlay::ControlCenter => self.control_center,
            Overlay::NotificationCenter => self.notification_center,
            Overlay::MissionControl => self.mission_control,
            Overlay::Spotlight => self.spotlight,
            Overlay::Launchpad => self.launchpad,
        }
    }

    /// Opens `overlay`. The context menu opens at the origin; use [`Self::open_context_menu`] to
    /// place it at the pointer.
    pub fn open(&mut self, overlay: Overlay) {
        self.set(overlay, true);
    }

    pub fn close(&mut self, overlay: Overlay) {
        self.set(overlay, false);
    }

    /// Flips `overlay`. Returns the new open state.
    pub fn toggle(&mut self, overlay: Overlay) -> bool {
        let open = !self.is_open(overlay);
        self.set(overlay, open);
        open
    }

    pub fn open_context_menu(&mut self, at: Point) {
        self.context_menu = Some(at);
    }

    pub fn context_menu_position(&self) -> Option<Point> {
        self.context_menu
    }

    /// Closes the context menu and returns the app its only item opens.
    pub fn select_context_menu_item(&mut self) -> Option<&'static str> {
        self.context_menu.take().map(|_| CONTEXT_MENU_TARGET)
    }

    /// Force-closes the lightweight group. Modal overlays are untouched.
    pub fn dismiss_lightweight(&mut self) {
        for overlay in Overlay::LIGHTWEIGHT {
            self.close(overlay);
        }
    }

    /// Applies the dismissal that accompanies opening any application.
    pub fn dismiss_for_app_open(&mut self) {
        self.dismiss_lightweight();
        self.close(Overlay::Launchpad);
        self.close(Overlay::Spotlight);
    }

    pub fn open_overlays(&self) -> Vec<Overlay> {
        Overlay::LIGHTWEIGHT
            .into_iter()
            .chain(Overlay::MODAL)
            .filter(|overlay| self.is_open(*overlay))
            .collect()
    }

    pub fn begin_system_action(&mut self, action: SystemAction) {
        self.system_action = Some(action);
    }

    /// Clears the system action screen. Returns the action that was showing.
    pub fn wake(&mut self) -> Option<SystemAction> {
        self.system_action.take()
    }

    pub fn system_action(&self) -> Option<SystemAction> {
        self.system_action
    }

    pub fn show_alert(&mut self, alert: BlockingAlert) {
        self.alert = Some(alert);
    }

    pub fn dismiss_alert(&mut self) -> Option<BlockingAlert> {
        self.alert.take()
    }

    pub fn alert(&self) -> Option<&BlockingAlert> {
        self.alert.as_ref()
    }

    /// Closes every panel, as on sign-out. The system action screen is kept.
    pub fn reset(&mut self) {
        *self = Self {
            system_action: self.system_action,
            ..Self::default()
        };
    }

    fn set(&mut self, overlay: Overlay, open: bool) {
        match overlay {
            Overlay::ContextMenu => {
                let at = self.context_menu.unwrap_or_default();
                self.context_menu = open.then_some(at);
            }
            Overlay::ControlCenter => self.control_center = open,
            Overlay::NotificationCenter => self.notification_center = open,
            Overlay::MissionControl => self.mission_control = open,
            Overlay::Spotlight => self.spotlight = open,
            Overlay::Launchpad => self.launchpad = open,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn lightweight_overlays_toggle_independently() {
        let mut overlays = OverlayCoordinator::default();
        assert!(overlays.toggle(Overlay::ControlCenter));
        assert!(overlays.toggle(Overlay::NotificationCenter));
        assert!(!overlays.toggle(Overlay::ControlCenter));
        assert_eq!(overlays.open_overlays(), vec![Overlay::NotificationCenter]);
    }

    #[test]
    fn dismiss_closes_lightweight_group_only() {
        let mut overlays = OverlayCoordinator::default();
        overlays.open_context_menu(Point::new(40, 60));
        overlays.open(Overlay::ControlCenter);
        overlays.open(Overlay::NotificationCenter);
        overlays.open(Overlay::MissionControl);
        overlays.open(Overlay::Spotlight);

        overlays.dismiss_lightweight();

        assert_eq!(
            overlays.open_overlays(),
            vec![Overlay::MissionControl, Overlay::Spotlight]
        );
    }

    #[test]
    fn modal_overlays_do_not_close_each_other() {
        let mut overlays = OverlayCoordinator::default();
        overlays.open(Overlay::MissionControl);
        overlays.open(Overlay::Launchpad);
        overlays.open(Overlay::Spotlight);
        assert_eq!(overlays.open_overlays(), Overlay::MODAL.to_vec());
    }

    #[test]
    fn app_open_closes_launchers_but_keeps_mission_control() {
        let mut overlays = OverlayCoordinator::default();
        overlays.open(Overlay::MissionControl);
        overlays.open(Overlay::Launchpad);
        overlays.open(Overlay::Spotlight);
        overlays.open(Overlay::ControlCenter);

        overlays.dismiss_for_app_open();

        assert_eq!(overlays.open_overlays(), vec![Overlay::MissionControl]);
    }

    #[test]
    fn context_menu_opens_at_pointer_and_targets_settings() {
        let mut overlays = OverlayCoordinator::default();
        assert_eq!(overlays.select_context_menu_item(), None);

        overlays.open_context_menu(Point::new(12, 34));
        assert_eq!(overlays.context_menu_position(), Some(Point::new(12, 34)));
        assert_eq!(overlays.select_context_menu_item(), Some("settings"));
        assert!(!overlays.is_open(Overlay::ContextMenu));
    }

    #[test]
    fn system_action_survives_reset_until_wake() {
        let mut overlays = OverlayCoordinator::default();
        overlays.open(Overlay::Launchpad);
        overlays.begin_system_action(SystemAction::Sleep);
        overlays.reset();

        assert!(overlays.open_overlays().is_empty());
        assert_eq!(overlays.system_action(), Some(SystemAction::Sleep));
        assert_eq!(overlays.wake(), Some(SystemAction::Sleep));
        assert_eq!(overlays.system_action(), None);
    }

    #[test]
    fn alert_is_held_until_dismissed() {
        let mut overlays = OverlayCoordinator::default();
        let alert = BlockingAlert {
            app_id: ApplicationId::trusted("photo-booth"),
            resource: "camera".to_string(),
            message: "Camera access was denied.".to_string(),
        };
        overlays.show_alert(alert.clone());
        overlays.dismiss_lightweight();
        assert_eq!(overlays.alert(), Some(&alert));
        assert_eq!(overlays.dismiss_alert(), Some(alert));
        assert_eq!(overlays.alert(), None);
    }
}
