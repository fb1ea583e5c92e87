//! Accelerator model with proper error handling and platform-aware display.
//!
//! This module provides:
//! - `Shortcut` - a keyboard shortcut (modifiers + key)
//! - `Modifiers` - modifier key flags (cmd, ctrl, alt, shift)
//! - `ShortcutParseError` - detailed parse errors for user feedback
//! - Conversion to the native `global-hotkey` types and to the XDG portal
//!   preferred-trigger string format
//!
//! Note on `cmd` (platform accelerator):
//! - On macOS: Command (⌘)
//! - On Windows/Linux: the Super/Logo key

use global_hotkey::hotkey::{Code, Modifiers as NativeModifiers};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when parsing a shortcut string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShortcutParseError {
    #[error("shortcut string is empty")]
    Empty,
    #[error("shortcut has no key, only modifiers")]
    MissingKey,
    #[error("unknown token '{0}' in shortcut")]
    UnknownToken(String),
    #[error("unknown key '{0}'")]
    UnknownKey(String),
}

/// Modifier keys for a shortcut.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub cmd: bool,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub shift: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.cmd || self.ctrl || self.alt || self.shift
    }
}

/// OS family tag used to select per-platform accelerators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    MacOS,
    Windows,
    Linux,
}

impl Platform {
    pub fn current() -> Self {
        #[cfg(target_os = "macos")]
        {
            Platform::MacOS
        }
        #[cfg(target_os = "windows")]
        {
            Platform::Windows
        }
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        {
            Platform::Linux
        }
    }

    /// Parse the platform tags the dev-mock surface accepts (both our own
    /// tags and the node-style ones the original settings UI sends).
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "macos" | "darwin" | "mac" => Some(Platform::MacOS),
            "windows" | "win32" => Some(Platform::Windows),
            "linux" => Some(Platform::Linux),
            _ => None,
        }
    }
}

/// A keyboard shortcut consisting of modifier keys and a main key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shortcut {
    pub key: String,
    pub modifiers: Modifiers,
}

impl Shortcut {
    pub fn parse(s: &str) -> Result<Self, ShortcutParseError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ShortcutParseError::Empty);
        }

        let normalized = s.replace('+', " ");
        let parts: Vec<&str> = normalized.split_whitespace().collect();
        if parts.is_empty() {
            return Err(ShortcutParseError::Empty);
        }

        let mut modifiers = Modifiers::default();
        let mut key_part: Option<&str> = None;

        for part in &parts {
            let part_lower = part.to_lowercase();
            match part_lower.as_str() {
                "cmd" | "command" | "meta" | "super" | "win" => modifiers.cmd = true,
                "ctrl" | "control" => modifiers.ctrl = true,
                "alt" | "opt" | "option" => modifiers.alt = true,
                "shift" => modifiers.shift = true,
                _ => {
                    if key_part.is_some() {
                        return Err(ShortcutParseError::UnknownToken(part.to_string()));
                    }
                    key_part = Some(part);
                }
            }
        }

        let key = key_part.ok_or(ShortcutParseError::MissingKey)?;
        let canonical_key = canonicalize_key(key);
        if key_to_code(&canonical_key).is_none() {
            return Err(ShortcutParseError::UnknownKey(key.to_string()));
        }

        Ok(Self {
            key: canonical_key,
            modifiers,
        })
    }

    /// Human-readable form for toasts and logs (Ctrl+Alt+Space style; glyphs
    /// on macOS).
    pub fn display(&self) -> String {
        self.display_for_platform(Platform::current())
    }

    pub fn display_for_platform(&self, platform: Platform) -> String {
        match platform {
            Platform::MacOS => {
                let mut s = String::new();
                if self.modifiers.ctrl {
                    s.push('⌃');
                }
                if self.modifiers.alt {
                    s.push('⌥');
                }
                if self.modifiers.shift {
                    s.push('⇧');
                }
                if self.modifiers.cmd {
                    s.push('⌘');
                }
                s.push_str(&self.key_display_text());
                s
            }
            Platform::Windows | Platform::Linux => {
                let mut parts: Vec<String> = Vec::new();
                if self.modifiers.ctrl {
                    parts.push("Ctrl".to_string());
                }
                if self.modifiers.alt {
                    parts.push("Alt".to_string());
                }
                if self.modifiers.shift {
                    parts.push("Shift".to_string());
                }
                if self.modifiers.cmd {
                    parts.push("Super".to_string());
                }
                parts.push(self.key_display_text());
                parts.join("+")
            }
        }
    }

    fn key_display_text(&self) -> String {
        match self.key.as_str() {
            "space" => "Space".to_string(),
            "enter" => "Enter".to_string(),
            "escape" => "Esc".to_string(),
            "tab" => "Tab".to_string(),
            k => k.to_uppercase(),
        }
    }

    /// Convert to the `global-hotkey` crate's representation for the native
    /// registration path. Returns None for keys outside the native table.
    pub fn to_native(&self) -> Option<(NativeModifiers, Code)> {
        let code = key_to_code(&self.key)?;
        let mut mods = NativeModifiers::empty();
        if self.modifiers.cmd {
            mods |= NativeModifiers::META;
        }
        if self.modifiers.ctrl {
            mods |= NativeModifiers::CONTROL;
        }
        if self.modifiers.alt {
            mods |= NativeModifiers::ALT;
        }
        if self.modifiers.shift {
            mods |= NativeModifiers::SHIFT;
        }
        Some((mods, code))
    }

    /// Format as an XDG GlobalShortcuts preferred-trigger string
    /// (e.g. `CTRL+ALT+space`). The compositor is free to assign something
    /// else; this is only a hint.
    pub fn to_portal_trigger(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if self.modifiers.ctrl {
            parts.push("CTRL");
        }
        if self.modifiers.alt {
            parts.push("ALT");
        }
        if self.modifiers.shift {
            parts.push("SHIFT");
        }
        if self.modifiers.cmd {
            parts.push("LOGO");
        }
        parts.push(&self.key);
        parts.join("+")
    }
}

/// Normalize a key token to its canonical lowercase form.
pub fn canonicalize_key(key: &str) -> String {
    let k = key.trim().to_lowercase();
    match k.as_str() {
        "spacebar" => "space".to_string(),
        "return" => "enter".to_string(),
        "esc" => "escape".to_string(),
        _ => k,
    }
}

/// Map a canonical key name to a `global-hotkey` key code.
fn key_to_code(key: &str) -> Option<Code> {
    // Single letters and digits
    if key.len() == 1 {
        let c = key.chars().next()?;
        return match c {
            'a' => Some(Code::KeyA),
            'b' => Some(Code::KeyB),
            'c' => Some(Code::KeyC),
            'd' => Some(Code::KeyD),
            'e' => Some(Code::KeyE),
            'f' => Some(Code::KeyF),
            'g' => Some(Code::KeyG),
            'h' => Some(Code::KeyH),
            'i' => Some(Code::KeyI),
            'j' => Some(Code::KeyJ),
            'k' => Some(Code::KeyK),
            'l' => Some(Code::KeyL),
            'm' => Some(Code::KeyM),
            'n' => Some(Code::KeyN),
            'o' => Some(Code::KeyO),
            'p' => Some(Code::KeyP),
            'q' => Some(Code::KeyQ),
            'r' => Some(Code::KeyR),
            's' => Some(Code::KeyS),
            't' => Some(Code::KeyT),
            'u' => Some(Code::KeyU),
            'v' => Some(Code::KeyV),
            'w' => Some(Code::KeyW),
            'x' => Some(Code::KeyX),
            'y' => Some(Code::KeyY),
            'z' => Some(Code::KeyZ),
            '0' => Some(Code::Digit0),
            '1' => Some(Code::Digit1),
            '2' => Some(Code::Digit2),
            '3' => Some(Code::Digit3),
            '4' => Some(Code::Digit4),
            '5' => Some(Code::Digit5),
            '6' => Some(Code::Digit6),
            '7' => Some(Code::Digit7),
            '8' => Some(Code::Digit8),
            '9' => Some(Code::Digit9),
            ';' => Some(Code::Semicolon),
            ',' => Some(Code::Comma),
            '.' => Some(Code::Period),
            '/' => Some(Code::Slash),
            '-' => Some(Code::Minus),
            '=' => Some(Code::Equal),
            _ => None,
        };
    }

    match key {
        "space" => Some(Code::Space),
        "enter" => Some(Code::Enter),
        "escape" => Some(Code::Escape),
        "tab" => Some(Code::Tab),
        "backspace" => Some(Code::Backspace),
        "delete" => Some(Code::Delete),
        "up" => Some(Code::ArrowUp),
        "down" => Some(Code::ArrowDown),
        "left" => Some(Code::ArrowLeft),
        "right" => Some(Code::ArrowRight),
        "home" => Some(Code::Home),
        "end" => Some(Code::End),
        "pageup" => Some(Code::PageUp),
        "pagedown" => Some(Code::PageDown),
        "semicolon" => Some(Code::Semicolon),
        "f1" => Some(Code::F1),
        "f2" => Some(Code::F2),
        "f3" => Some(Code::F3),
        "f4" => Some(Code::F4),
        "f5" => Some(Code::F5),
        "f6" => Some(Code::F6),
        "f7" => Some(Code::F7),
        "f8" => Some(Code::F8),
        "f9" => Some(Code::F9),
        "f10" => Some(Code::F10),
        "f11" => Some(Code::F11),
        "f12" => Some(Code::F12),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_modifiers_and_key() {
        let s = Shortcut::parse("ctrl+alt+space").unwrap();
        assert!(s.modifiers.ctrl);
        assert!(s.modifiers.alt);
        assert!(!s.modifiers.cmd);
        assert!(!s.modifiers.shift);
        assert_eq!(s.key, "space");
    }

    #[test]
    fn parses_modifier_aliases() {
        let s = Shortcut::parse("cmd+shift+k").unwrap();
        assert!(s.modifiers.cmd && s.modifiers.shift);
        let s2 = Shortcut::parse("super shift k").unwrap();
        assert_eq!(s, s2);
        let s3 = Shortcut::parse("meta+shift+K").unwrap();
        assert_eq!(s, s3);
    }

    #[test]
    fn rejects_empty_and_modifier_only() {
        assert_eq!(Shortcut::parse(""), Err(ShortcutParseError::Empty));
        assert_eq!(Shortcut::parse("   "), Err(ShortcutParseError::Empty));
        assert_eq!(
            Shortcut::parse("ctrl+shift"),
            Err(ShortcutParseError::MissingKey)
        );
    }

    #[test]
    fn rejects_unknown_keys_and_double_keys() {
        assert!(matches!(
            Shortcut::parse("ctrl+floop"),
            Err(ShortcutParseError::UnknownKey(_))
        ));
        assert!(matches!(
            Shortcut::parse("ctrl+a+b"),
            Err(ShortcutParseError::UnknownToken(_))
        ));
    }

    #[test]
    fn canonicalizes_key_aliases() {
        assert_eq!(Shortcut::parse("ctrl+return").unwrap().key, "enter");
        assert_eq!(Shortcut::parse("ctrl+esc").unwrap().key, "escape");
        assert_eq!(Shortcut::parse("ctrl+Spacebar").unwrap().key, "space");
    }

    #[test]
    fn converts_to_native_types() {
        let s = Shortcut::parse("ctrl+alt+space").unwrap();
        let (mods, code) = s.to_native().unwrap();
        assert_eq!(code, Code::Space);
        assert!(mods.contains(NativeModifiers::CONTROL));
        assert!(mods.contains(NativeModifiers::ALT));
        assert!(!mods.contains(NativeModifiers::META));
    }

    #[test]
    fn portal_trigger_format() {
        let s = Shortcut::parse("ctrl+alt+space").unwrap();
        assert_eq!(s.to_portal_trigger(), "CTRL+ALT+space");
        let s = Shortcut::parse("cmd+b").unwrap();
        assert_eq!(s.to_portal_trigger(), "LOGO+b");
    }

    #[test]
    fn display_for_linux_is_plus_separated() {
        let s = Shortcut::parse("ctrl+shift+h").unwrap();
        assert_eq!(s.display_for_platform(Platform::Linux), "Ctrl+Shift+H");
    }

    #[test]
    fn display_for_macos_uses_glyphs() {
        let s = Shortcut::parse("cmd+alt+space").unwrap();
        assert_eq!(s.display_for_platform(Platform::MacOS), "⌥⌘Space");
    }

    #[test]
    fn platform_from_tag_accepts_node_names() {
        assert_eq!(Platform::from_tag("darwin"), Some(Platform::MacOS));
        assert_eq!(Platform::from_tag("win32"), Some(Platform::Windows));
        assert_eq!(Platform::from_tag("linux"), Some(Platform::Linux));
        assert_eq!(Platform::from_tag("beos"), None);
    }
}
