//! Runtime configuration loaded from TOML.

use std::{path::Path, time::Duration};

use platform_host::Viewport;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::WindowSize;

/// Built-in wallpapers offered by the settings app.
pub const BUILT_IN_WALLPAPERS: [&str; 6] = [
    "https://images.unsplash.com/photo-1502082553048-f009c37129b9?auto=format&fit=crop&w=1920&q=80",
    "https://images.unsplash.com/photo-1447752875215-b2761acb3c5d?auto=format&fit=crop&w=1920&q=80",
    "https://images.unsplash.com/photo-1419242902214-272b3f66ee7a?auto=format&fit=crop&w=1920&q=80",
    "https://images.unsplash.com/photo-1470770841072-f978cf4d019e?auto=format&fit=crop&w=1920&q=80",
    "https://images.unsplash.com/photo-1511497584788-876760111969?auto=format&fit=crop&w=1920&q=80",
    "https://images.unsplash.com/photo-1483728642387-6c351b40b7de?auto=format&fit=crop&w=1920&q=80",
];

/// Index into [`BUILT_IN_WALLPAPERS`] used by the default profile.
pub const DEFAULT_WALLPAPER_INDEX: usize = 3;

#[derive(Debug, Error)]
/// Configuration loading failures.
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        /// Path that failed.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The config text is not valid TOML for [`DesktopConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value is outside its allowed range.
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid {
        /// Offending field.
        field: &'static str,
        /// Explanation.
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Half-open ranges for the randomized initial window position.
pub struct OpenJitter {
    /// Minimum x offset.
    pub x_min: i32,
    /// Exclusive maximum x offset.
    pub x_max: i32,
    /// Minimum y offset.
    pub y_min: i32,
    /// Exclusive maximum y offset.
    pub y_max: i32,
}

impl Default for OpenJitter {
    fn default() -> Self {
        Self {
            x_min: 100,
            x_max: 300,
            y_min: 50,
            y_max: 150,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Argon2id cost parameters for account passwords.
pub struct CredentialPolicy {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Iteration count.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl CredentialPolicy {
    /// Minimal parameters that keep debug-build tests fast.
    pub const fn for_tests() -> Self {
        Self {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        }
    }
}

impl Default for CredentialPolicy {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
/// Desktop runtime configuration.
pub struct DesktopConfig {
    /// Simulated network latency applied to login and account creation.
    pub login_latency_ms: u64,
    /// Lifetime of each toast.
    pub toast_ttl_ms: u64,
    /// Maximum notifications kept in history.
    pub notification_history_limit: usize,
    /// Interval of the startup progress tick.
    pub boot_tick_ms: u64,
    /// Delay between reaching 100% and the shell becoming ready.
    pub boot_settle_ms: u64,
    /// Window size for apps without a declared default.
    pub fallback_window_size: WindowSize,
    /// Initial placement jitter.
    pub open_jitter: OpenJitter,
    /// Soft limit displayed by the API usage monitor.
    pub api_call_limit: u64,
    /// Wallpapers offered for selection.
    pub wallpapers: Vec<String>,
    /// Password hashing parameters.
    pub credentials: CredentialPolicy,
    /// Viewport reported by headless hosts.
    pub default_viewport: Viewport,
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self {
            login_latency_ms: 500,
            toast_ttl_ms: 5000,
            notification_history_limit: 50,
            boot_tick_ms: 30,
            boot_settle_ms: 500,
            fallback_window_size: WindowSize::default(),
            open_jitter: OpenJitter::default(),
            api_call_limit: 1000,
            wallpapers: BUILT_IN_WALLPAPERS.iter().map(|url| url.to_string()).collect(),
            credentials: CredentialPolicy::default(),
            default_viewport: Viewport::default(),
        }
    }
}

impl DesktopConfig {
    /// Parses and validates a TOML document. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the document is malformed or a value is out of range.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or is invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Default configuration with cheap password hashing for tests.
    pub fn for_tests() -> Self {
        Self {
            credentials: CredentialPolicy::for_tests(),
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.notification_history_limit == 0 {
            return Err(ConfigError::Invalid {
                field: "notification_history_limit",
                reason: "must be at least 1".to_string(),
            });
        }
        let jitter = self.open_jitter;
        if jitter.x_min >= jitter.x_max || jitter.y_min >= jitter.y_max {
            return Err(ConfigError::Invalid {
                field: "open_jitter",
                reason: "minimums must be below maximums".to_string(),
            });
        }
        if self.wallpapers.is_empty() {
            return Err(ConfigError::Invalid {
                field: "wallpapers",
                reason: "at least one wallpaper is required".to_string(),
            });
        }
        if self.boot_tick_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "boot_tick_ms",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Wallpaper used by the default profile.
    pub fn default_wallpaper(&self) -> &str {
        self.wallpapers
            .get(DEFAULT_WALLPAPER_INDEX)
            .or_else(|| self.wallpapers.first())
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Login latency as a [`Duration`].
    pub fn login_latency(&self) -> Duration {
        Duration::from_millis(self.login_latency_ms)
    }

    /// Toast lifetime as a [`Duration`].
    pub fn toast_ttl(&self) -> Duration {
        Duration::from_millis(self.toast_ttl_ms)
    }
}
