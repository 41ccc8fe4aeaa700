//! Quick settings shown in the control center panel.

use serde::{Deserialize, Serialize};

pub const MAX_BRIGHTNESS: u8 = 100;

/// Display and radio toggles. Brightness is a percentage in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlCenterState {
    pub brightness: u8,
    pub wifi_on: bool,
    pub bluetooth_on: bool,
}

impl Default for ControlCenterState {
    fn default() -> Self {
        Self {
            brightness: MAX_BRIGHTNESS,
            wifi_on: true,
            bluetooth_on: true,
        }
    }
}

impl ControlCenterState {
    /// Clamps `percent` into range. Returns whether the stored value changed.
    pub fn set_brightness(&mut self, percent: i32) -> bool {
        let clamped = percent.clamp(0, i32::from(MAX_BRIGHTNESS)) as u8;
        let changed = clamped != self.brightness;
        self.brightness = clamped;
        changed
    }

    pub fn toggle_wifi(&mut self) -> bool {
        self.wifi_on = !self.wifi_on;
        self.wifi_on
    }

    pub fn toggle_bluetooth(&mut self) -> bool {
        self.bluetooth_on = !self.bluetooth_on;
        self.bluetooth_on
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn starts_fully_bright_with_radios_on() {
        assert_eq!(
            ControlCenterState::default(),
            ControlCenterState {
                brightness: 100,
                wifi_on: true,
                bluetooth_on: true,
            }
        );
    }

    #[test]
    fn brightness_is_clamped() {
        let mut state = ControlCenterState::default();

        assert!(state.set_brightness(-20));
        assert_eq!(state.brightness, 0);
        assert!(state.set_brightness(140));
        assert_eq!(state.brightness, 100);
        assert!(!state.set_brightness(250));
        assert!(state.set_brightness(42));
        assert_eq!(state.brightness, 42);
    }

    #[test]
    fn toggles_flip_independently() {
        let mut state = ControlCenterState::default();

        assert!(!state.toggle_wifi());
        assert!(state.bluetooth_on);
        assert!(!state.toggle_bluetooth());
        assert!(state.toggle_wifi());
        assert_eq!(
            state,
            ControlCenterState {
                brightness: 100,
                wifi_on: true,
                bluetooth_on: false,
            }
        );
    }
}
