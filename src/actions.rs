//! Action dispatch boundary.
//!
//! The hotkey engine never manipulates windows itself; it hands an
//! [`ActionTag`] to whatever dispatcher the host shell installed.

use tracing::info;

use crate::hotkey_defs::ActionTag;

/// Receives hotkey activations, from either the native listener thread or
/// the portal drain task.
pub trait ActionDispatcher: Send + Sync {
    fn dispatch(&self, action: ActionTag);
}

/// Dispatcher that only logs. Used by the standalone binary, where there is
/// no window manager to drive.
pub struct LoggingDispatcher;

impl ActionDispatcher for LoggingDispatcher {
    fn dispatch(&self, action: ActionTag) {
        info!(action = ?action, "Hotkey activated");
        crate::logging::log("HOTKEY", &format!("Activated: {:?}", action));
    }
}
