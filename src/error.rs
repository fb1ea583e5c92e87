//! Error taxonomy for hotkey registration and status queries.
//!
//! Registration failures are data, not exceptions: they end up as
//! [`ErrorKind`] values inside `RegistrationResult` and are queried, never
//! thrown across the status boundary. The [`HotkeyError`] enum exists for the
//! places that do propagate (portal connection setup, settings I/O).

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

/// Closed set of reasons a hotkey registration (or status query) can fail.
///
/// The kebab-case serde form is the wire shape the settings UI consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// The GlobalShortcuts portal is missing, not answering, or the session
    /// type rules it out entirely.
    PortalUnavailable,
    /// The user or compositor declined the shortcut grant.
    PermissionDenied,
    /// No portal response within the bind timeout.
    Timeout,
    /// Another process already holds the accelerator (native path).
    AlreadyClaimed,
    /// The IPC channel used to query status itself failed; surfaced as an
    /// absent status, not as a registration failure.
    TransportUnavailable,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::PortalUnavailable => "portal-unavailable",
            ErrorKind::PermissionDenied => "permission-denied",
            ErrorKind::Timeout => "timeout",
            ErrorKind::AlreadyClaimed => "already-claimed",
            ErrorKind::TransportUnavailable => "transport-unavailable",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain errors that propagate with `?` (setup paths only).
#[derive(Error, Debug)]
pub enum HotkeyError {
    #[error("portal connection failed: {0}")]
    PortalConnection(String),

    #[error("failed to parse settings: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("settings file I/O: {0}")]
    SettingsIo(#[from] std::io::Error),

    #[error("native hotkey backend unavailable: {0}")]
    NativeBackend(String),
}

#[allow(dead_code)]
pub type Result<T> = std::result::Result<T, HotkeyError>;

/// Extension trait for silent error logging with caller location tracking.
/// Use when the operation is recoverable and the user doesn't need to know.
pub trait ResultExt<T> {
    /// Log error with caller location and return None. Use for recoverable failures.
    fn log_err(self) -> Option<T>;
    /// Log as warning with caller location and return None. Use for expected failures.
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Debug> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                error!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation failed"
                );
                None
            }
        }
    }

    #[track_caller]
    fn warn_on_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                warn!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation had warning"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_serializes_kebab_case() {
        let json = serde_json::to_string(&ErrorKind::PortalUnavailable).unwrap();
        assert_eq!(json, "\"portal-unavailable\"");
        let json = serde_json::to_string(&ErrorKind::AlreadyClaimed).unwrap();
        assert_eq!(json, "\"already-claimed\"");
    }

    #[test]
    fn error_kind_round_trips() {
        for kind in [
            ErrorKind::PortalUnavailable,
            ErrorKind::PermissionDenied,
            ErrorKind::Timeout,
            ErrorKind::AlreadyClaimed,
            ErrorKind::TransportUnavailable,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            let back: ErrorKind = serde_json::from_str(&json).unwrap();
            assert_eq!(back, kind);
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn log_err_returns_none_on_error() {
        let result: std::result::Result<(), &str> = Err("nope");
        assert!(result.log_err().is_none());
        let result: std::result::Result<u32, &str> = Ok(7);
        assert_eq!(result.log_err(), Some(7));
    }
}
