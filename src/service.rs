//! Service facade over the registration engine and activation tracker.
//!
//! This is the surface the shell's IPC layer calls into. Status queries are
//! answered from the last completed pass; before the first pass finishes
//! they answer `Unavailable` rather than guessing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::SettingsStore;
use crate::hotkey_defs::HotkeyId;
use crate::native::NativeHotkeys;
use crate::portal::PortalBinder;
use crate::registration::HotkeyRegistrationEngine;
use crate::status::{PlatformHotkeyStatus, RegistrationCheck, StatusQuery};
use crate::tracker::{ActivationTracker, SignalStats};

// Part of the same dev/test surface as the status queries.
pub use crate::platform::dev_mock_platform;

type StatusListener = Box<dyn Fn(&PlatformHotkeyStatus) + Send + Sync>;

pub struct HotkeyService<N, P> {
    engine: HotkeyRegistrationEngine<N, P>,
    tracker: Arc<ActivationTracker>,
    settings: Arc<dyn SettingsStore>,
    started: AtomicBool,
    on_status: Option<StatusListener>,
}

impl<N: NativeHotkeys, P: PortalBinder> HotkeyService<N, P> {
    pub fn new(
        engine: HotkeyRegistrationEngine<N, P>,
        tracker: Arc<ActivationTracker>,
        settings: Arc<dyn SettingsStore>,
    ) -> Self {
        Self {
            engine,
            tracker,
            settings,
            started: AtomicBool::new(false),
            on_status: None,
        }
    }

    /// Install a listener invoked after every registration pass (initial and
    /// re-registers). The notification bridge hangs off this.
    pub fn with_status_listener(
        mut self,
        listener: impl Fn(&PlatformHotkeyStatus) + Send + Sync + 'static,
    ) -> Self {
        self.on_status = Some(Box::new(listener));
        self
    }

    pub fn engine(&self) -> &HotkeyRegistrationEngine<N, P> {
        &self.engine
    }

    /// Run the initial registration pass.
    pub async fn start(&self) -> PlatformHotkeyStatus {
        let status = self.engine.register_all().await;
        self.started.store(true, Ordering::SeqCst);
        self.notify(&status);
        status
    }

    /// Full status for the settings UI.
    pub fn platform_hotkey_status(&self) -> StatusQuery {
        if !self.started.load(Ordering::SeqCst) {
            return StatusQuery::Unavailable;
        }
        StatusQuery::Ready(self.engine.status())
    }

    /// Quick boolean check for the onboarding flow. `None` before the first
    /// registration pass has completed.
    pub fn registration_check(&self) -> Option<RegistrationCheck> {
        match self.platform_hotkey_status() {
            StatusQuery::Ready(status) => Some(RegistrationCheck::from_status(&status)),
            StatusQuery::Unavailable => None,
        }
    }

    /// `None` before the first registration pass has completed; the tracker
    /// itself always exists, but stats answered before startup would claim a
    /// liveness the engine has not established.
    pub fn activation_signal_stats(&self) -> Option<SignalStats> {
        if !self.started.load(Ordering::SeqCst) {
            return None;
        }
        Some(self.tracker.get_stats())
    }

    pub fn clear_activation_signal_history(&self) {
        self.tracker.clear_history();
    }

    /// Persist an enabled flag and re-register just that hotkey.
    pub async fn set_hotkey_enabled(&self, id: HotkeyId, enabled: bool) -> PlatformHotkeyStatus {
        self.settings.set_hotkey_enabled(id, enabled);
        let status = self.engine.register_one(id).await;
        self.notify(&status);
        status
    }

    fn notify(&self, status: &PlatformHotkeyStatus) {
        if let Some(listener) = &self.on_status {
            listener(status);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemorySettings;
    use crate::error::ErrorKind;
    use crate::hotkey_defs::ActionTag;
    use crate::platform::{DesktopEnvironment, PlatformContext, PortalMethod, WaylandStatus};
    use crate::portal::{BoundShortcut, PortalBindRequest};
    use crate::shortcuts::Platform;
    use parking_lot::Mutex;
    use std::time::Instant;

    struct OkNative;
    impl NativeHotkeys for OkNative {
        fn register(
            &self,
            _id: HotkeyId,
            _hotkey: global_hotkey::hotkey::HotKey,
            _action: ActionTag,
        ) -> Result<(), ErrorKind> {
            Ok(())
        }
        fn unregister(&self, _id: HotkeyId) -> Result<(), ErrorKind> {
            Ok(())
        }
    }

    struct OkPortal;
    impl PortalBinder for OkPortal {
        async fn bind(&self, request: PortalBindRequest) -> Result<BoundShortcut, ErrorKind> {
            Ok(BoundShortcut {
                id: request.id,
                trigger_description: None,
            })
        }
    }

    fn macos_context() -> PlatformContext {
        PlatformContext {
            platform: Platform::MacOS,
            status: WaylandStatus {
                is_wayland: false,
                desktop_environment: DesktopEnvironment::Other,
                portal_available: false,
                portal_method: PortalMethod::None,
            },
        }
    }

    fn service() -> HotkeyService<OkNative, OkPortal> {
        let settings: Arc<dyn SettingsStore> = Arc::new(MemorySettings::default());
        let engine = HotkeyRegistrationEngine::new(
            macos_context(),
            OkNative,
            OkPortal,
            Arc::clone(&settings),
        );
        HotkeyService::new(engine, Arc::new(ActivationTracker::new()), settings)
    }

    #[tokio::test]
    async fn status_unavailable_before_start_ready_after() {
        let service = service();
        assert_eq!(service.platform_hotkey_status(), StatusQuery::Unavailable);

        let status = service.start().await;
        assert!(status.global_hotkeys_enabled);

        match service.platform_hotkey_status() {
            StatusQuery::Ready(s) => assert!(s.global_hotkeys_enabled),
            StatusQuery::Unavailable => panic!("expected ready status"),
        }
    }

    #[tokio::test]
    async fn registration_check_absent_before_start() {
        let service = service();
        assert!(service.registration_check().is_none());

        service.start().await;
        let check = service.registration_check().unwrap();
        assert!(check.quick_chat);
        assert!(check.peek_and_hide);
        assert!(check.status.is_none());
    }

    #[tokio::test]
    async fn stats_queries_answer_quickly() {
        let service = service();
        assert!(service.activation_signal_stats().is_none());

        service.start().await;
        service.tracker.on_activation_signal("quick_chat");

        let started = Instant::now();
        let stats = service.activation_signal_stats().unwrap();
        assert!(started.elapsed().as_secs() < 5);
        assert_eq!(stats.total_signals, 1);

        service.clear_activation_signal_history();
        assert_eq!(service.activation_signal_stats().unwrap().total_signals, 0);
    }

    #[tokio::test]
    async fn set_hotkey_enabled_notifies_listener() {
        let seen: Arc<Mutex<Vec<bool>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let service = service().with_status_listener(move |status| {
            seen_clone.lock().push(status.global_hotkeys_enabled);
        });

        service.start().await;
        service.set_hotkey_enabled(HotkeyId::BossKey, false).await;
        service.set_hotkey_enabled(HotkeyId::BossKey, true).await;

        assert_eq!(seen.lock().len(), 3);
        assert!(seen.lock().iter().all(|enabled| *enabled));
    }
}
