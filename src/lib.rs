//! shell-hotkeys - global hotkey engine for the desktop shell
//!
//! This library owns the platform-aware global hotkey lifecycle:
//! detecting whether the session can support global shortcuts at all
//! (native OS API vs. the XDG GlobalShortcuts portal on Wayland),
//! registering the shell's hotkeys with partial-failure semantics, and
//! tracking the out-of-band activation signals portal-bound shortcuts
//! deliver. Downstream UI (toasts, settings) consumes the aggregated
//! [`status::PlatformHotkeyStatus`] instead of re-deriving platform logic.

pub mod actions;
pub mod config;
pub mod error;
pub mod hotkey_defs;
pub mod logging;
pub mod native;
pub mod notice;
pub mod platform;
pub mod portal;
pub mod registration;
pub mod service;
pub mod shortcuts;
pub mod status;
pub mod tracker;

pub use error::ErrorKind;
pub use hotkey_defs::{ActionTag, HotkeyDefinition, HotkeyId};
pub use platform::{DesktopEnvironment, PlatformContext, PortalMethod, WaylandStatus};
pub use service::HotkeyService;
pub use status::{PlatformHotkeyStatus, RegistrationCheck, RegistrationResult, StatusQuery};
pub use tracker::{ActivationSignal, ActivationTracker, SignalStats};
