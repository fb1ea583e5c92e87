//! Hotkey registration engine.
//!
//! Picks the registration path from the detected platform context, registers
//! every enabled hotkey, and aggregates per-hotkey outcomes into a
//! [`PlatformHotkeyStatus`]. Portal binds fan out concurrently and are
//! individually bounded by a timeout, so one unresponsive compositor dialog
//! cannot wedge the whole pass.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use global_hotkey::hotkey::HotKey;
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::config::SettingsStore;
use crate::error::ErrorKind;
use crate::hotkey_defs::{default_definitions, HotkeyDefinition, HotkeyId};
use crate::logging;
use crate::native::NativeHotkeys;
use crate::platform::{PlatformContext, PortalMethod};
use crate::portal::{PortalBindRequest, PortalBinder};
use crate::shortcuts::{Platform, Shortcut};
use crate::status::{PlatformHotkeyStatus, RegistrationResult};

const DEFAULT_BIND_TIMEOUT: Duration = Duration::from_secs(5);

pub struct HotkeyRegistrationEngine<N, P> {
    context: PlatformContext,
    native: N,
    portal: P,
    settings: Arc<dyn SettingsStore>,
    definitions: Vec<HotkeyDefinition>,
    results: Mutex<Vec<RegistrationResult>>,
    // Serializes registration passes; a re-register of one hotkey must not
    // interleave with a full pass.
    pass_lock: tokio::sync::Mutex<()>,
    bind_timeout: Duration,
}

impl<N: NativeHotkeys, P: PortalBinder> HotkeyRegistrationEngine<N, P> {
    pub fn new(
        context: PlatformContext,
        native: N,
        portal: P,
        settings: Arc<dyn SettingsStore>,
    ) -> Self {
        Self {
            context,
            native,
            portal,
            settings,
            definitions: default_definitions(),
            results: Mutex::new(Vec::new()),
            pass_lock: tokio::sync::Mutex::new(()),
            bind_timeout: DEFAULT_BIND_TIMEOUT,
        }
    }

    /// Replace the built-in definition set.
    pub fn with_definitions(mut self, definitions: Vec<HotkeyDefinition>) -> Self {
        self.definitions = definitions;
        self
    }

    #[cfg(test)]
    pub fn with_bind_timeout(mut self, timeout: Duration) -> Self {
        self.bind_timeout = timeout;
        self
    }

    pub fn context(&self) -> &PlatformContext {
        &self.context
    }

    /// Mapping from portal shortcut id to action, for the activation drain.
    pub fn portal_actions(&self) -> std::collections::HashMap<String, crate::hotkey_defs::ActionTag> {
        self.definitions
            .iter()
            .map(|def| (def.id.portal_id().to_string(), def.action))
            .collect()
    }

    /// Register every enabled hotkey and return the aggregate status.
    pub async fn register_all(&self) -> PlatformHotkeyStatus {
        let _pass = self.pass_lock.lock().await;

        let enabled: Vec<&HotkeyDefinition> = self
            .definitions
            .iter()
            .filter(|def| self.settings.hotkey_enabled(def.id))
            .collect();

        info!(
            count = enabled.len(),
            method = ?self.context.status.portal_method,
            "Starting hotkey registration pass"
        );

        let results = join_all(enabled.iter().map(|def| self.register_def(def))).await;

        *self.results.lock() = results.clone();
        let status = PlatformHotkeyStatus::from_results(self.context.status, results);
        self.log_outcome(&status);
        status
    }

    /// Re-register a single hotkey (after a settings change), splicing its
    /// new result into the stored pass.
    pub async fn register_one(&self, id: HotkeyId) -> PlatformHotkeyStatus {
        let _pass = self.pass_lock.lock().await;

        let new_result = match self
            .definitions
            .iter()
            .find(|def| def.id == id)
            .filter(|def| self.settings.hotkey_enabled(def.id))
        {
            Some(def) => Some(self.register_def(def).await),
            None => {
                // Disabled now: drop any native binding and its old result.
                let _ = self.native.unregister(id);
                None
            }
        };

        let mut results = self.results.lock();
        results.retain(|r| r.hotkey_id != id);
        if let Some(result) = new_result {
            results.push(result);
        }
        PlatformHotkeyStatus::from_results(self.context.status, results.clone())
    }

    /// Status recomputed from the stored per-hotkey results.
    pub fn status(&self) -> PlatformHotkeyStatus {
        PlatformHotkeyStatus::from_results(self.context.status, self.results.lock().clone())
    }

    async fn register_def(&self, def: &HotkeyDefinition) -> RegistrationResult {
        match self.context.status.portal_method {
            PortalMethod::Portal => self.register_via_portal(def).await,
            PortalMethod::None | PortalMethod::X11Fallback => {
                if self.context.platform == Platform::Linux {
                    // No portal on Linux means no supported registration
                    // path; X11 grabs are deliberately not attempted.
                    warn!(hotkey = %def.id, "No GlobalShortcuts portal in this session");
                    RegistrationResult::failed(def.id, ErrorKind::PortalUnavailable)
                } else {
                    self.register_native(def)
                }
            }
        }
    }

    async fn register_via_portal(&self, def: &HotkeyDefinition) -> RegistrationResult {
        let preferred_trigger = def
            .accelerator_for(self.context.platform)
            .and_then(|accel| Shortcut::parse(accel).ok())
            .map(|s| s.to_portal_trigger());

        let request = PortalBindRequest {
            id: def.id.portal_id().to_string(),
            description: def.id.description().to_string(),
            preferred_trigger,
        };

        match tokio::time::timeout(self.bind_timeout, self.portal.bind(request)).await {
            Ok(Ok(bound)) => {
                info!(
                    hotkey = %def.id,
                    trigger = bound.trigger_description.as_deref().unwrap_or("<unset>"),
                    "Portal bind succeeded"
                );
                RegistrationResult::ok(def.id)
            }
            Ok(Err(kind)) => RegistrationResult::failed(def.id, kind),
            Err(_) => {
                warn!(hotkey = %def.id, timeout = ?self.bind_timeout, "Portal bind timed out");
                RegistrationResult::failed(def.id, ErrorKind::Timeout)
            }
        }
    }

    fn register_native(&self, def: &HotkeyDefinition) -> RegistrationResult {
        let Some(accel) = def.accelerator_for(self.context.platform) else {
            warn!(hotkey = %def.id, "No accelerator for this platform");
            return RegistrationResult::failed_unclassified(def.id);
        };
        let shortcut = match Shortcut::parse(accel) {
            Ok(s) => s,
            Err(e) => {
                warn!(hotkey = %def.id, accelerator = accel, error = %e, "Unparseable accelerator");
                return RegistrationResult::failed_unclassified(def.id);
            }
        };
        let Some((modifiers, code)) = shortcut.to_native() else {
            warn!(hotkey = %def.id, key = %shortcut.key, "Key has no native mapping");
            return RegistrationResult::failed_unclassified(def.id);
        };
        let hotkey = HotKey::new(Some(modifiers), code);
        match self.native.register(def.id, hotkey, def.action) {
            Ok(()) => RegistrationResult::ok(def.id),
            Err(kind) => RegistrationResult::failed(def.id, kind),
        }
    }

    fn log_outcome(&self, status: &PlatformHotkeyStatus) {
        let failed: Vec<String> = status
            .registration_results
            .iter()
            .filter(|r| !r.success)
            .map(|r| {
                format!(
                    "{} ({})",
                    r.hotkey_id,
                    r.error_reason.map(|k| k.as_str()).unwrap_or("unparseable")
                )
            })
            .collect();
        if failed.is_empty() {
            logging::log("HOTKEY", "All hotkeys registered");
        } else {
            logging::log(
                "HOTKEY",
                &format!("Registration incomplete: {}", failed.join(", ")),
            );
        }
    }
}

#[cfg(test)]
#[path = "registration_tests.rs"]
mod registration_tests;
