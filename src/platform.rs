//! Platform detection: OS family, session type, desktop environment, and
//! GlobalShortcuts portal availability.
//!
//! Detection runs once per registration pass against a snapshot of the
//! environment, so one status answer never mixes two different sessions.
//! Debug builds can override the snapshot via [`dev_mock_platform`] to
//! exercise Wayland paths on any machine.

use std::collections::HashMap;
#[cfg(target_os = "linux")]
use std::process::Command;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::shortcuts::Platform;

/// Desktop environment classification, from XDG_CURRENT_DESKTOP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DesktopEnvironment {
    Kde,
    Gnome,
    Other,
}

impl DesktopEnvironment {
    /// Classify from the XDG_CURRENT_DESKTOP value. The variable is a
    /// colon-separated list (e.g. "ubuntu:GNOME") and is matched
    /// case-insensitively by substring, so "KDE", "plasma:KDE" and
    /// "X-Cinnamon" all land where you'd expect.
    pub fn classify(xdg_current_desktop: Option<&str>) -> Self {
        let Some(raw) = xdg_current_desktop else {
            return DesktopEnvironment::Other;
        };
        let lower = raw.to_ascii_lowercase();
        for entry in lower.split(':') {
            if entry.contains("kde") || entry.contains("plasma") {
                return DesktopEnvironment::Kde;
            }
            if entry.contains("gnome") {
                return DesktopEnvironment::Gnome;
            }
        }
        DesktopEnvironment::Other
    }
}

/// How global hotkeys can be registered in this session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PortalMethod {
    /// Native OS registration (macOS, Windows) - no portal involved.
    None,
    /// Wayland with a live GlobalShortcuts portal.
    Portal,
    /// X11 session: portal not used, native grabs are the only option.
    X11Fallback,
}

/// Session-level summary the UI renders on the hotkeys settings page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaylandStatus {
    pub is_wayland: bool,
    pub desktop_environment: DesktopEnvironment,
    pub portal_available: bool,
    pub portal_method: PortalMethod,
}

/// Answers "does this session have a usable GlobalShortcuts portal?".
///
/// Trait seam so detection tests never shell out.
pub trait PortalProbe {
    /// Interface version of org.freedesktop.portal.GlobalShortcuts, or 0
    /// when the portal is absent or unreachable.
    fn global_shortcuts_version(&self) -> u32;
}

/// Probes the portal over the session bus via busctl.
pub struct BusctlProbe;

impl PortalProbe for BusctlProbe {
    #[cfg(target_os = "linux")]
    fn global_shortcuts_version(&self) -> u32 {
        let output = Command::new("busctl")
            .args([
                "--user",
                "--timeout=2",
                "get-property",
                "org.freedesktop.portal.Desktop",
                "/org/freedesktop/portal/desktop",
                "org.freedesktop.portal.GlobalShortcuts",
                "version",
            ])
            .output();
        match output {
            Ok(out) if out.status.success() => {
                // busctl prints "u 2"
                let stdout = String::from_utf8_lossy(&out.stdout);
                stdout
                    .trim()
                    .rsplit(' ')
                    .next()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0)
            }
            Ok(out) => {
                debug!(
                    stderr = %String::from_utf8_lossy(&out.stderr).trim(),
                    "GlobalShortcuts portal probe returned non-zero"
                );
                0
            }
            Err(e) => {
                debug!(error = %e, "busctl not available for portal probe");
                0
            }
        }
    }

    #[cfg(not(target_os = "linux"))]
    fn global_shortcuts_version(&self) -> u32 {
        0
    }
}

/// A snapshot of the inputs detection depends on.
#[derive(Debug, Clone)]
pub struct PlatformInputs {
    pub platform: Platform,
    pub env: HashMap<String, String>,
}

impl PlatformInputs {
    const ENV_KEYS: [&'static str; 3] =
        ["XDG_SESSION_TYPE", "WAYLAND_DISPLAY", "XDG_CURRENT_DESKTOP"];

    /// Capture the real environment, unless a debug mock is active.
    pub fn capture() -> Self {
        #[cfg(debug_assertions)]
        if let Some(mocked) = mock::current() {
            return mocked;
        }

        let mut env = HashMap::new();
        for key in Self::ENV_KEYS {
            if let Ok(value) = std::env::var(key) {
                env.insert(key.to_string(), value);
            }
        }
        Self {
            platform: Platform::current(),
            env,
        }
    }

    fn var(&self, key: &str) -> Option<&str> {
        self.env.get(key).map(String::as_str)
    }

    fn is_wayland(&self) -> bool {
        self.var("XDG_SESSION_TYPE") == Some("wayland")
            || self.var("WAYLAND_DISPLAY").is_some_and(|v| !v.is_empty())
    }
}

/// The detector's full answer, consumed by the registration engine.
#[derive(Debug, Clone)]
pub struct PlatformContext {
    pub platform: Platform,
    pub status: WaylandStatus,
}

impl PlatformContext {
    /// Run detection against the current environment snapshot.
    pub fn detect(probe: &dyn PortalProbe) -> Self {
        Self::detect_from(PlatformInputs::capture(), probe)
    }

    pub fn detect_from(inputs: PlatformInputs, probe: &dyn PortalProbe) -> Self {
        let desktop_environment =
            DesktopEnvironment::classify(inputs.var("XDG_CURRENT_DESKTOP"));

        let status = if inputs.platform != Platform::Linux {
            // Native registration handles everything off-Linux; no session
            // inspection needed.
            WaylandStatus {
                is_wayland: false,
                desktop_environment,
                portal_available: false,
                portal_method: PortalMethod::None,
            }
        } else if inputs.is_wayland() {
            let version = probe.global_shortcuts_version();
            let portal_available = version > 0;
            WaylandStatus {
                is_wayland: true,
                desktop_environment,
                portal_available,
                portal_method: if portal_available {
                    PortalMethod::Portal
                } else {
                    PortalMethod::None
                },
            }
        } else {
            WaylandStatus {
                is_wayland: false,
                desktop_environment,
                portal_available: false,
                portal_method: PortalMethod::X11Fallback,
            }
        };

        info!(
            platform = ?inputs.platform,
            is_wayland = status.is_wayland,
            desktop = ?status.desktop_environment,
            portal_available = status.portal_available,
            method = ?status.portal_method,
            "Platform detection complete"
        );

        Self {
            platform: inputs.platform,
            status,
        }
    }
}

#[cfg(debug_assertions)]
mod mock {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    static MOCK: OnceLock<Mutex<Option<PlatformInputs>>> = OnceLock::new();

    fn slot() -> &'static Mutex<Option<PlatformInputs>> {
        MOCK.get_or_init(|| Mutex::new(None))
    }

    pub(super) fn current() -> Option<PlatformInputs> {
        slot().lock().ok().and_then(|g| g.clone())
    }

    pub(super) fn set(inputs: Option<PlatformInputs>) {
        if let Ok(mut guard) = slot().lock() {
            *guard = inputs;
        }
    }
}

/// Override the platform snapshot for development. Pass `None` for both
/// arguments to clear the mock. Release builds compile this to a no-op.
#[cfg(debug_assertions)]
pub fn dev_mock_platform(platform: Option<&str>, env: Option<HashMap<String, String>>) {
    match platform.and_then(Platform::from_tag) {
        Some(p) => {
            info!(platform = ?p, "Dev platform mock enabled");
            mock::set(Some(PlatformInputs {
                platform: p,
                env: env.unwrap_or_default(),
            }));
        }
        None => {
            info!("Dev platform mock cleared");
            mock::set(None);
        }
    }
}

#[cfg(not(debug_assertions))]
pub fn dev_mock_platform(_platform: Option<&str>, _env: Option<HashMap<String, String>>) {}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedProbe(u32);
    impl PortalProbe for FixedProbe {
        fn global_shortcuts_version(&self) -> u32 {
            self.0
        }
    }

    fn inputs(platform: Platform, pairs: &[(&str, &str)]) -> PlatformInputs {
        PlatformInputs {
            platform,
            env: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn classifies_desktop_environments() {
        assert_eq!(DesktopEnvironment::classify(Some("KDE")), DesktopEnvironment::Kde);
        assert_eq!(
            DesktopEnvironment::classify(Some("plasma")),
            DesktopEnvironment::Kde
        );
        assert_eq!(
            DesktopEnvironment::classify(Some("ubuntu:GNOME")),
            DesktopEnvironment::Gnome
        );
        assert_eq!(
            DesktopEnvironment::classify(Some("GNOME-Flashback:GNOME")),
            DesktopEnvironment::Gnome
        );
        assert_eq!(
            DesktopEnvironment::classify(Some("X-Cinnamon")),
            DesktopEnvironment::Other
        );
        assert_eq!(DesktopEnvironment::classify(None), DesktopEnvironment::Other);
    }

    #[test]
    fn non_linux_short_circuits() {
        let ctx = PlatformContext::detect_from(
            inputs(Platform::MacOS, &[("XDG_SESSION_TYPE", "wayland")]),
            &FixedProbe(2),
        );
        assert!(!ctx.status.is_wayland);
        assert!(!ctx.status.portal_available);
        assert_eq!(ctx.status.portal_method, PortalMethod::None);
    }

    #[test]
    fn wayland_with_portal() {
        let ctx = PlatformContext::detect_from(
            inputs(
                Platform::Linux,
                &[("XDG_SESSION_TYPE", "wayland"), ("XDG_CURRENT_DESKTOP", "KDE")],
            ),
            &FixedProbe(2),
        );
        assert!(ctx.status.is_wayland);
        assert!(ctx.status.portal_available);
        assert_eq!(ctx.status.portal_method, PortalMethod::Portal);
        assert_eq!(ctx.status.desktop_environment, DesktopEnvironment::Kde);
    }

    #[test]
    fn wayland_without_portal() {
        let ctx = PlatformContext::detect_from(
            inputs(Platform::Linux, &[("WAYLAND_DISPLAY", "wayland-0")]),
            &FixedProbe(0),
        );
        assert!(ctx.status.is_wayland);
        assert!(!ctx.status.portal_available);
        assert_eq!(ctx.status.portal_method, PortalMethod::None);
    }

    #[test]
    fn wayland_display_alone_counts_as_wayland() {
        let ctx = PlatformContext::detect_from(
            inputs(
                Platform::Linux,
                &[("XDG_SESSION_TYPE", "tty"), ("WAYLAND_DISPLAY", "wayland-1")],
            ),
            &FixedProbe(1),
        );
        assert!(ctx.status.is_wayland);
    }

    #[test]
    fn x11_session_uses_fallback_method() {
        let ctx = PlatformContext::detect_from(
            inputs(
                Platform::Linux,
                &[("XDG_SESSION_TYPE", "x11"), ("XDG_CURRENT_DESKTOP", "GNOME")],
            ),
            &FixedProbe(2),
        );
        assert!(!ctx.status.is_wayland);
        assert!(!ctx.status.portal_available);
        assert_eq!(ctx.status.portal_method, PortalMethod::X11Fallback);
        assert_eq!(ctx.status.desktop_environment, DesktopEnvironment::Gnome);
    }

    #[test]
    fn wayland_status_serializes_camel_case() {
        let status = WaylandStatus {
            is_wayland: true,
            desktop_environment: DesktopEnvironment::Kde,
            portal_available: true,
            portal_method: PortalMethod::Portal,
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["isWayland"], true);
        assert_eq!(json["desktopEnvironment"], "kde");
        assert_eq!(json["portalAvailable"], true);
        assert_eq!(json["portalMethod"], "portal");
    }

    #[test]
    fn x11_fallback_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&PortalMethod::X11Fallback).unwrap(),
            "\"x11-fallback\""
        );
    }
}
