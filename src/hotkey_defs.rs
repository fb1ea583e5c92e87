//! The shell's fixed hotkey catalog.
//!
//! Four hotkeys, each with a stable id used across settings keys, portal
//! shortcut ids, and the status payloads the UI consumes. Accelerators are
//! per-platform strings in the [`crate::shortcuts`] parse format.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::shortcuts::Platform;

/// Stable identifier for each of the shell's global hotkeys.
///
/// The camelCase serde form matches the settings/status wire shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HotkeyId {
    QuickChat,
    PeekAndHide,
    AlwaysOnTop,
    BossKey,
}

impl HotkeyId {
    pub const fn as_str(&self) -> &'static str {
        match self {
            HotkeyId::QuickChat => "quickChat",
            HotkeyId::PeekAndHide => "peekAndHide",
            HotkeyId::AlwaysOnTop => "alwaysOnTop",
            HotkeyId::BossKey => "bossKey",
        }
    }

    pub const fn all() -> [HotkeyId; 4] {
        [
            HotkeyId::QuickChat,
            HotkeyId::PeekAndHide,
            HotkeyId::AlwaysOnTop,
            HotkeyId::BossKey,
        ]
    }

    /// Settings key controlling whether this hotkey is enabled.
    pub const fn settings_key(&self) -> &'static str {
        match self {
            HotkeyId::QuickChat => "quickChatHotkeyEnabled",
            HotkeyId::PeekAndHide => "peekAndHideHotkeyEnabled",
            HotkeyId::AlwaysOnTop => "alwaysOnTopHotkeyEnabled",
            HotkeyId::BossKey => "bossKeyHotkeyEnabled",
        }
    }

    /// Shortcut id sent to the GlobalShortcuts portal. snake_case because
    /// portal ids show up in compositor settings UIs.
    pub const fn portal_id(&self) -> &'static str {
        match self {
            HotkeyId::QuickChat => "quick_chat",
            HotkeyId::PeekAndHide => "peek_and_hide",
            HotkeyId::AlwaysOnTop => "always_on_top",
            HotkeyId::BossKey => "boss_key",
        }
    }

    /// Human-readable description, shown by the compositor's shortcut dialog.
    pub const fn description(&self) -> &'static str {
        match self {
            HotkeyId::QuickChat => "Open the quick chat panel",
            HotkeyId::PeekAndHide => "Show or hide the main window",
            HotkeyId::AlwaysOnTop => "Toggle always-on-top for the main window",
            HotkeyId::BossKey => "Hide all windows immediately",
        }
    }

    pub fn from_portal_id(id: &str) -> Option<Self> {
        HotkeyId::all().into_iter().find(|h| h.portal_id() == id)
    }
}

impl std::fmt::Display for HotkeyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What pressing a hotkey does. Decoupled from [`HotkeyId`] so the dispatcher
/// never needs to know which hotkey fired, only what to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionTag {
    OpenQuickPanel,
    ToggleMainWindow,
    ToggleAlwaysOnTop,
    HideAllWindows,
}

/// A hotkey with its action and per-platform accelerators.
#[derive(Debug, Clone)]
pub struct HotkeyDefinition {
    pub id: HotkeyId,
    pub action: ActionTag,
    accelerators: HashMap<Platform, String>,
}

impl HotkeyDefinition {
    pub fn new(id: HotkeyId, action: ActionTag, accelerators: HashMap<Platform, String>) -> Self {
        Self {
            id,
            action,
            accelerators,
        }
    }

    pub fn accelerator_for(&self, platform: Platform) -> Option<&str> {
        self.accelerators.get(&platform).map(String::as_str)
    }
}

/// The shell's default hotkey table.
pub fn default_definitions() -> Vec<HotkeyDefinition> {
    fn accels(mac: &str, other: &str) -> HashMap<Platform, String> {
        HashMap::from([
            (Platform::MacOS, mac.to_string()),
            (Platform::Windows, other.to_string()),
            (Platform::Linux, other.to_string()),
        ])
    }

    vec![
        HotkeyDefinition {
            id: HotkeyId::QuickChat,
            action: ActionTag::OpenQuickPanel,
            accelerators: accels("cmd+alt+space", "ctrl+alt+space"),
        },
        HotkeyDefinition {
            id: HotkeyId::PeekAndHide,
            action: ActionTag::ToggleMainWindow,
            accelerators: accels("cmd+alt+h", "ctrl+alt+h"),
        },
        HotkeyDefinition {
            id: HotkeyId::AlwaysOnTop,
            action: ActionTag::ToggleAlwaysOnTop,
            accelerators: accels("cmd+alt+t", "ctrl+alt+t"),
        },
        HotkeyDefinition {
            id: HotkeyId::BossKey,
            action: ActionTag::HideAllWindows,
            accelerators: accels("cmd+alt+b", "ctrl+alt+b"),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shortcuts::Shortcut;

    #[test]
    fn ids_serialize_camel_case() {
        assert_eq!(
            serde_json::to_string(&HotkeyId::QuickChat).unwrap(),
            "\"quickChat\""
        );
        assert_eq!(
            serde_json::to_string(&HotkeyId::PeekAndHide).unwrap(),
            "\"peekAndHide\""
        );
    }

    #[test]
    fn portal_ids_round_trip() {
        for id in HotkeyId::all() {
            assert_eq!(HotkeyId::from_portal_id(id.portal_id()), Some(id));
        }
        assert_eq!(HotkeyId::from_portal_id("unknown"), None);
    }

    #[test]
    fn default_accelerators_all_parse() {
        for def in default_definitions() {
            for platform in [Platform::MacOS, Platform::Windows, Platform::Linux] {
                let accel = def.accelerator_for(platform).unwrap();
                Shortcut::parse(accel).unwrap_or_else(|e| {
                    panic!("{} accelerator '{}' failed: {}", def.id, accel, e)
                });
            }
        }
    }

    #[test]
    fn every_hotkey_has_a_definition() {
        let defs = default_definitions();
        for id in HotkeyId::all() {
            assert!(defs.iter().any(|d| d.id == id), "missing {}", id);
        }
    }
}
