//! Explicit context shared by every sync component.
//!
//! Built once at startup and passed by reference; nothing in this crate
//! reads configuration from global state.

use std::sync::Arc;

use kkutu_settings::SyncSettings;

use crate::bus::LifecycleEventBus;

/// Settings plus the event bus.
#[derive(Clone)]
pub struct SyncContext {
    /// Loaded settings.
    pub settings: Arc<SyncSettings>,
    /// Where lifecycle events are published.
    pub bus: Arc<LifecycleEventBus>,
}

impl SyncContext {
    /// Build a context, sizing the bus from `settings.events.capacity`.
    pub fn new(settings: SyncSettings) -> Self {
        let bus = Arc::new(LifecycleEventBus::with_capacity(settings.events.capacity));
        Self {
            settings: Arc::new(settings),
            bus,
        }
    }
}

impl Default for SyncContext {
    fn default() -> Self {
        Self::new(SyncSettings::default())
    }
}

impl std::fmt::Debug for SyncContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncContext")
            .field("settings", &self.settings)
            .field("handlers", &self.bus.handler_count())
            .finish()
    }
}
