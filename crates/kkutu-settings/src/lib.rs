//! # kkutu-settings
//!
//! Configuration for the sync core, loaded from three layers (in priority
//! order):
//! 1. **Compiled defaults** ([`SyncSettings::default()`])
//! 2. **User file** `~/.kkutu/settings.json`, deep-merged over defaults
//! 3. **Environment variables** `KKUTU_*` (highest priority)
//!
//! There is no process-wide instance. Load once at startup and hand the
//! value to whatever needs it.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn re_exports_work() {
        let settings = SyncSettings::default();
        assert!(settings.validate().is_ok());
        assert!(settings_path().ends_with("settings.json"));
    }
}
