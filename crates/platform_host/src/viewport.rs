//! Viewport/layout collaborator contracts.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Screen bounds available to the shell.
pub struct Viewport {
    /// Full screen width in logical pixels.
    pub width: i32,
    /// Full screen height in logical pixels.
    pub height: i32,
    /// Height of the top menu bar that windows must not cover.
    pub top_chrome: i32,
}

impl Viewport {
    /// Height available below the top chrome.
    pub fn usable_height(&self) -> i32 {
        (self.height - self.top_chrome).max(0)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1440,
            height: 900,
            top_chrome: 28,
        }
    }
}

/// Host service reporting the current viewport.
pub trait ViewportProvider: Send + Sync {
    /// Returns the current viewport bounds.
    fn viewport(&self) -> Viewport;
}

#[derive(Debug, Default)]
/// Viewport provider backed by a settable value, for headless hosts and tests.
pub struct FixedViewport {
    current: RwLock<Viewport>,
}

impl FixedViewport {
    /// Creates a provider reporting `viewport`.
    pub fn new(viewport: Viewport) -> Self {
        Self {
            current: RwLock::new(viewport),
        }
    }

    /// Replaces the reported viewport, as a display resize would.
    pub fn set(&self, viewport: Viewport) {
        *self.current.write() = viewport;
    }
}

impl ViewportProvider for FixedViewport {
    fn viewport(&self) -> Viewport {
        *self.current.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usable_height_excludes_top_chrome() {
        let viewport = Viewport {
            width: 1000,
            height: 700,
            top_chrome: 28,
        };
        assert_eq!(viewport.usable_height(), 672);
    }

    #[test]
    fn fixed_viewport_reports_latest_value() {
        let provider = FixedViewport::default();
        assert_eq!(provider.viewport(), Viewport::default());
        let resized = Viewport {
            width: 800,
            height: 600,
            top_chrome: 28,
        };
        provider.set(resized);
        assert_eq!(provider.viewport(), resized);
    }
}
