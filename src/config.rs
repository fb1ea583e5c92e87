//! Per-hotkey enabled flags, persisted as JSON.
//!
//! The settings file lives at ~/.shell-hotkeys/settings.json. Missing file or
//! unparseable content falls back to defaults (every hotkey enabled) with a
//! warning, never an error: losing settings must not take the hotkeys down.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::hotkey_defs::HotkeyId;

/// Read/write access to the per-hotkey enabled flags.
///
/// Trait seam so the registration engine can be tested without touching the
/// filesystem.
pub trait SettingsStore: Send + Sync {
    /// Whether the hotkey should be registered. Defaults to true when no
    /// explicit value has been stored.
    fn hotkey_enabled(&self, id: HotkeyId) -> bool;
    fn set_hotkey_enabled(&self, id: HotkeyId, enabled: bool);
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsData {
    #[serde(default)]
    hotkeys: HashMap<String, bool>,
}

/// File-backed settings store.
pub struct Settings {
    path: PathBuf,
    data: Mutex<SettingsData>,
}

impl Settings {
    /// Load from the default location, falling back to defaults on any error.
    pub fn load() -> Self {
        Self::load_from(default_settings_path())
    }

    pub fn load_from(path: PathBuf) -> Self {
        let data = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<SettingsData>(&contents) {
                Ok(data) => data,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Settings file unparseable, using defaults");
                    SettingsData::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => SettingsData::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read settings, using defaults");
                SettingsData::default()
            }
        };
        Self {
            path,
            data: Mutex::new(data),
        }
    }

    fn save(&self, data: &SettingsData) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl SettingsStore for Settings {
    fn hotkey_enabled(&self, id: HotkeyId) -> bool {
        self.data
            .lock()
            .hotkeys
            .get(id.settings_key())
            .copied()
            .unwrap_or(true)
    }

    fn set_hotkey_enabled(&self, id: HotkeyId, enabled: bool) {
        let mut data = self.data.lock();
        data.hotkeys.insert(id.settings_key().to_string(), enabled);
        if let Err(e) = self.save(&data) {
            warn!(error = %e, "Failed to persist settings");
        }
    }
}

fn default_settings_path() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".shell-hotkeys").join("settings.json"))
        .unwrap_or_else(|| std::env::temp_dir().join("shell-hotkeys-settings.json"))
}

/// In-memory store for tests and headless use.
#[derive(Default)]
pub struct MemorySettings {
    hotkeys: Mutex<HashMap<HotkeyId, bool>>,
}

impl SettingsStore for MemorySettings {
    fn hotkey_enabled(&self, id: HotkeyId) -> bool {
        self.hotkeys.lock().get(&id).copied().unwrap_or(true)
    }

    fn set_hotkey_enabled(&self, id: HotkeyId, enabled: bool) {
        self.hotkeys.lock().insert(id, enabled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_enabled() {
        let settings = MemorySettings::default();
        for id in HotkeyId::all() {
            assert!(settings.hotkey_enabled(id));
        }
    }

    #[test]
    fn file_store_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let settings = Settings::load_from(path.clone());
        assert!(settings.hotkey_enabled(HotkeyId::BossKey));
        settings.set_hotkey_enabled(HotkeyId::BossKey, false);
        assert!(!settings.hotkey_enabled(HotkeyId::BossKey));

        // Reload from disk
        let reloaded = Settings::load_from(path);
        assert!(!reloaded.hotkey_enabled(HotkeyId::BossKey));
        assert!(reloaded.hotkey_enabled(HotkeyId::QuickChat));
    }

    #[test]
    fn garbage_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{not json").unwrap();

        let settings = Settings::load_from(path);
        assert!(settings.hotkey_enabled(HotkeyId::QuickChat));
    }
}
