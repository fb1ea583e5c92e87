//! Aggregated hotkey status, the shape the settings UI consumes.

use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;
use crate::hotkey_defs::HotkeyId;
use crate::platform::WaylandStatus;

/// Outcome of one hotkey's registration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResult {
    pub hotkey_id: HotkeyId,
    pub success: bool,
    /// Absent on success. Also absent for failures with no classified cause
    /// (e.g. an accelerator string that would not parse).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<ErrorKind>,
}

impl RegistrationResult {
    pub fn ok(hotkey_id: HotkeyId) -> Self {
        Self {
            hotkey_id,
            success: true,
            error_reason: None,
        }
    }

    pub fn failed(hotkey_id: HotkeyId, reason: ErrorKind) -> Self {
        Self {
            hotkey_id,
            success: false,
            error_reason: Some(reason),
        }
    }

    pub fn failed_unclassified(hotkey_id: HotkeyId) -> Self {
        Self {
            hotkey_id,
            success: false,
            error_reason: None,
        }
    }
}

/// The full status answer: platform context plus per-hotkey outcomes.
///
/// `global_hotkeys_enabled` is strict: true only when every attempted
/// registration succeeded. Partial success still reports false, but the
/// per-hotkey results let the UI show exactly which ones work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformHotkeyStatus {
    pub global_hotkeys_enabled: bool,
    pub wayland_status: WaylandStatus,
    pub registration_results: Vec<RegistrationResult>,
}

impl PlatformHotkeyStatus {
    pub fn from_results(
        wayland_status: WaylandStatus,
        registration_results: Vec<RegistrationResult>,
    ) -> Self {
        // Vacuously enabled when nothing was attempted (all hotkeys disabled
        // in settings).
        let global_hotkeys_enabled = registration_results.iter().all(|r| r.success);
        Self {
            global_hotkeys_enabled,
            wayland_status,
            registration_results,
        }
    }

    /// Some succeeded, some failed.
    pub fn is_partial(&self) -> bool {
        let any_ok = self.registration_results.iter().any(|r| r.success);
        let any_failed = self.registration_results.iter().any(|r| !r.success);
        any_ok && any_failed
    }

    pub fn result_for(&self, id: HotkeyId) -> Option<&RegistrationResult> {
        self.registration_results.iter().find(|r| r.hotkey_id == id)
    }
}

/// Status query answer. `Unavailable` means the first registration pass has
/// not completed yet; callers should treat it as "unknown", not "broken".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusQuery {
    Ready(PlatformHotkeyStatus),
    Unavailable,
}

/// Quick boolean check for the two hotkeys the onboarding flow cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationCheck {
    pub quick_chat: bool,
    pub peek_and_hide: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RegistrationCheck {
    pub fn from_status(status: &PlatformHotkeyStatus) -> Self {
        let ok = |id| status.result_for(id).map(|r| r.success).unwrap_or(false);
        Self {
            quick_chat: ok(HotkeyId::QuickChat),
            peek_and_hide: ok(HotkeyId::PeekAndHide),
            status: None,
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            quick_chat: false,
            peek_and_hide: false,
            status: Some("error".to_string()),
            error: Some(message.into()),
        }
    }
}
