//! Startup progress sequence shown before the login screen.

use serde::{Deserialize, Serialize};

pub const BOOT_COMPLETE_PERCENT: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BootPhase {
    Loading,
    /// Progress reached 100; waiting out the settle delay.
    Settling,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootSequence {
    progress: u8,
    phase: BootPhase,
}

impl Default for BootSequence {
    fn default() -> Self {
        Self {
            progress: 0,
            phase: BootPhase::Loading,
        }
    }
}

impl BootSequence {
    /// Advances progress by one step. Returns `false` once loading is over.
    pub fn tick(&mut self) -> bool {
        if self.phase != BootPhase::Loading {
            return false;
        }
        self.progress = (self.progress + 1).min(BOOT_COMPLETE_PERCENT);
        if self.progress == BOOT_COMPLETE_PERCENT {
            self.phase = BootPhase::Settling;
        }
        true
    }

    /// Finishes the settle delay. Only valid after progress is complete.
    pub fn settle(&mut self) -> bool {
        if self.phase != BootPhase::Settling {
            return false;
        }
        self.phase = BootPhase::Ready;
        true
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn phase(&self) -> BootPhase {
        self.phase
    }

    pub fn is_ready(&self) -> bool {
        self.phase == BootPhase::Ready
    }
}
