//! Settings types.
//!
//! All structs use `camelCase` on disk and `#[serde(default)]`, so a file
//! only needs the keys it wants to change.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncSettings {
    /// Page polling cadence.
    pub polling: PollingSettings,
    /// Push-message dispatch.
    pub dispatch: DispatchSettings,
    /// Lifecycle event bus.
    pub events: EventSettings,
    /// Log output.
    pub logging: LoggingSettings,
}

impl SyncSettings {
    /// Reject values that would make the pollers spin or the bus unusable.
    pub fn validate(&self) -> Result<()> {
        let intervals = [
            ("polling.primaryIntervalMs", self.polling.primary_interval_ms),
            ("polling.intenseIntervalMs", self.polling.intense_interval_ms),
            ("polling.idleIntervalMs", self.polling.idle_interval_ms),
            ("polling.slowIntervalMs", self.polling.slow_interval_ms),
        ];
        for (key, value) in intervals {
            if value == 0 {
                return Err(SettingsError::InvalidValue(format!("{key} must be > 0")));
            }
        }
        if self.events.capacity == 0 {
            return Err(SettingsError::InvalidValue(
                "events.capacity must be > 0".into(),
            ));
        }
        Ok(())
    }
}

/// Poll intervals.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PollingSettings {
    /// Active interval for ordinary facts (turn, round, hint, game progress).
    pub primary_interval_ms: u64,
    /// Active interval for fast-changing facts (history, errors, typing).
    pub intense_interval_ms: u64,
    /// Interval while the fact's predicate does not hold.
    pub idle_interval_ms: u64,
    /// Interval for rarely changing facts (game mode).
    pub slow_interval_ms: u64,
    /// A typing word still shown after this long is presented again.
    pub typing_word_repeat_ms: u64,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            primary_interval_ms: 100,
            intense_interval_ms: 10,
            idle_interval_ms: 3000,
            slow_interval_ms: 3000,
            typing_word_repeat_ms: 1000,
        }
    }
}

impl PollingSettings {
    /// Primary interval as a [`Duration`].
    pub fn primary(&self) -> Duration {
        Duration::from_millis(self.primary_interval_ms)
    }

    /// Intense interval as a [`Duration`].
    pub fn intense(&self) -> Duration {
        Duration::from_millis(self.intense_interval_ms)
    }

    /// Idle interval as a [`Duration`].
    pub fn idle(&self) -> Duration {
        Duration::from_millis(self.idle_interval_ms)
    }

    /// Slow interval as a [`Duration`].
    pub fn slow(&self) -> Duration {
        Duration::from_millis(self.slow_interval_ms)
    }

    /// Typing-word repeat window as a [`Duration`].
    pub fn typing_word_repeat(&self) -> Duration {
        Duration::from_millis(self.typing_word_repeat_ms)
    }
}

/// Push dispatch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DispatchSettings {
    /// Listen to push messages at all.
    pub enabled: bool,
    /// How long `stop` waits for tasks to wind down.
    pub shutdown_timeout_ms: u64,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            shutdown_timeout_ms: 5000,
        }
    }
}

impl DispatchSettings {
    /// Shutdown timeout as a [`Duration`].
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

/// Event bus.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventSettings {
    /// Broadcast buffer size for async subscribers.
    pub capacity: usize,
}

impl Default for EventSettings {
    fn default() -> Self {
        Self { capacity: 1024 }
    }
}

/// Logging.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}
