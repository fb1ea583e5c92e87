//! User-facing notice for degraded hotkey support.
//!
//! The toast is delayed so it lands after the shell's first paint instead of
//! during startup churn, cancelable when a later registration pass recovers,
//! and deduped so repeated passes with the same outcome stay quiet.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use crate::status::PlatformHotkeyStatus;

/// Stable toast id so a newer notice replaces the older one in the UI.
pub const LINUX_HOTKEY_NOTICE: &str = "linux-hotkey-notice";

const DEFAULT_NOTICE_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeSeverity {
    Warning,
    Info,
}

/// Where notices go. The shell installs its toast UI here; the standalone
/// binary logs them.
pub trait ToastSink: Send + Sync {
    fn show(&self, id: &str, severity: NoticeSeverity, text: &str);
    fn dismiss(&self, id: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Notice {
    severity: NoticeSeverity,
    text: String,
}

fn notice_for(status: &PlatformHotkeyStatus) -> Option<Notice> {
    if status.global_hotkeys_enabled {
        return None;
    }
    if status.is_partial() {
        Some(Notice {
            severity: NoticeSeverity::Info,
            text: "Some global hotkeys could not be registered. \
                   Check the hotkeys page in Settings for details."
                .to_string(),
        })
    } else {
        Some(Notice {
            severity: NoticeSeverity::Warning,
            text: "Global hotkeys are unavailable in this session. On Wayland \
                   they require the GlobalShortcuts portal, which your desktop \
                   does not provide."
                .to_string(),
        })
    }
}

/// Debounces degraded-status notices into the toast sink.
pub struct NotificationBridge {
    sink: Arc<dyn ToastSink>,
    delay: Duration,
    // Bumped on every apply; a pending show aborts if it lost the race.
    generation: AtomicU64,
    last_shown: Mutex<Option<Notice>>,
}

impl NotificationBridge {
    pub fn new(sink: Arc<dyn ToastSink>) -> Self {
        Self {
            sink,
            delay: DEFAULT_NOTICE_DELAY,
            generation: AtomicU64::new(0),
            last_shown: Mutex::new(None),
        }
    }

    #[cfg(test)]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// React to a registration outcome. Healthy status cancels any pending
    /// notice and dismisses a shown one; degraded status schedules a toast
    /// after the delay unless an identical one is already up.
    pub fn apply(self: &Arc<Self>, status: &PlatformHotkeyStatus) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let Some(notice) = notice_for(status) else {
            let mut last = self.last_shown.lock();
            if last.take().is_some() {
                self.sink.dismiss(LINUX_HOTKEY_NOTICE);
            }
            return;
        };

        if self.last_shown.lock().as_ref() == Some(&notice) {
            debug!("Identical hotkey notice already shown, skipping");
            return;
        }

        let bridge = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(bridge.delay).await;
            // The generation check must happen under the same lock apply()
            // takes on its cancel path, or a concurrent recovery can slip
            // between the check and the show and leave a stale toast up.
            let mut last = bridge.last_shown.lock();
            if bridge.generation.load(Ordering::SeqCst) != generation {
                return;
            }
            if last.as_ref() == Some(&notice) {
                return;
            }
            bridge
                .sink
                .show(LINUX_HOTKEY_NOTICE, notice.severity, &notice.text);
            *last = Some(notice);
        });
    }
}

/// Sink that writes notices to the log, for headless runs.
pub struct LoggingToastSink;

impl ToastSink for LoggingToastSink {
    fn show(&self, id: &str, severity: NoticeSeverity, text: &str) {
        match severity {
            NoticeSeverity::Warning => tracing::warn!(toast = id, "{}", text),
            NoticeSeverity::Info => tracing::info!(toast = id, "{}", text),
        }
    }

    fn dismiss(&self, id: &str) {
        tracing::info!(toast = id, "Hotkey notice dismissed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::hotkey_defs::HotkeyId;
    use crate::platform::{DesktopEnvironment, PortalMethod, WaylandStatus};
    use crate::status::RegistrationResult;

    #[derive(Default)]
    struct RecordingSink {
        shown: Mutex<Vec<(String, NoticeSeverity, String)>>,
        dismissed: Mutex<Vec<String>>,
    }

    impl ToastSink for RecordingSink {
        fn show(&self, id: &str, severity: NoticeSeverity, text: &str) {
            self.shown
                .lock()
                .push((id.to_string(), severity, text.to_string()));
        }

        fn dismiss(&self, id: &str) {
            self.dismissed.lock().push(id.to_string());
        }
    }

    fn wayland_status() -> WaylandStatus {
        WaylandStatus {
            is_wayland: true,
            desktop_environment: DesktopEnvironment::Gnome,
            portal_available: false,
            portal_method: PortalMethod::None,
        }
    }

    fn degraded() -> PlatformHotkeyStatus {
        PlatformHotkeyStatus::from_results(
            wayland_status(),
            vec![
                RegistrationResult::failed(HotkeyId::QuickChat, ErrorKind::PortalUnavailable),
                RegistrationResult::failed(HotkeyId::BossKey, ErrorKind::PortalUnavailable),
            ],
        )
    }

    fn partial() -> PlatformHotkeyStatus {
        PlatformHotkeyStatus::from_results(
            wayland_status(),
            vec![
                RegistrationResult::ok(HotkeyId::QuickChat),
                RegistrationResult::failed(HotkeyId::BossKey, ErrorKind::PermissionDenied),
            ],
        )
    }

    fn healthy() -> PlatformHotkeyStatus {
        PlatformHotkeyStatus::from_results(
            wayland_status(),
            vec![RegistrationResult::ok(HotkeyId::QuickChat)],
        )
    }

    fn bridge(sink: Arc<RecordingSink>) -> Arc<NotificationBridge> {
        Arc::new(NotificationBridge::new(sink).with_delay(Duration::from_millis(20)))
    }

    #[tokio::test]
    async fn degraded_status_shows_warning_after_delay() {
        let sink = Arc::new(RecordingSink::default());
        let bridge = bridge(Arc::clone(&sink));

        bridge.apply(&degraded());
        assert!(sink.shown.lock().is_empty());

        tokio::time::sleep(Duration::from_millis(60)).await;
        let shown = sink.shown.lock();
        assert_eq!(shown.len(), 1);
        let (id, severity, text) = &shown[0];
        assert_eq!(id, LINUX_HOTKEY_NOTICE);
        assert_eq!(*severity, NoticeSeverity::Warning);
        let re = regex::Regex::new(r"(?i)wayland|hotkey|shortcut|linux").unwrap();
        assert!(re.is_match(text), "notice text not recognizable: {text}");
    }

    #[tokio::test]
    async fn healthy_status_never_shows_a_toast() {
        let sink = Arc::new(RecordingSink::default());
        let bridge = bridge(Arc::clone(&sink));

        bridge.apply(&healthy());
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(sink.shown.lock().is_empty());
    }

    #[tokio::test]
    async fn recovery_before_delay_cancels_notice() {
        let sink = Arc::new(RecordingSink::default());
        let bridge = bridge(Arc::clone(&sink));

        bridge.apply(&degraded());
        bridge.apply(&healthy());

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(sink.shown.lock().is_empty());
        // Nothing was ever shown, so nothing to dismiss either.
        assert!(sink.dismissed.lock().is_empty());
    }

    #[tokio::test]
    async fn recovery_after_show_dismisses() {
        let sink = Arc::new(RecordingSink::default());
        let bridge = bridge(Arc::clone(&sink));

        bridge.apply(&degraded());
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(sink.shown.lock().len(), 1);

        bridge.apply(&healthy());
        assert_eq!(sink.dismissed.lock().as_slice(), &[LINUX_HOTKEY_NOTICE.to_string()]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_recovery_never_leaves_a_stuck_toast() {
        let sink = Arc::new(RecordingSink::default());
        let bridge = Arc::new(
            NotificationBridge::new(Arc::clone(&sink) as Arc<dyn ToastSink>)
                .with_delay(Duration::from_millis(1)),
        );

        // Race the delayed show against the healthy cancel path. Whichever
        // side wins, a shown toast must always end up dismissed.
        for _ in 0..100 {
            bridge.apply(&degraded());
            tokio::task::yield_now().await;
            bridge.apply(&healthy());
            tokio::time::sleep(Duration::from_millis(10)).await;
            assert_eq!(sink.shown.lock().len(), sink.dismissed.lock().len());
        }
    }

    #[tokio::test]
    async fn identical_notice_is_deduped() {
        let sink = Arc::new(RecordingSink::default());
        let bridge = bridge(Arc::clone(&sink));

        bridge.apply(&degraded());
        tokio::time::sleep(Duration::from_millis(60)).await;
        bridge.apply(&degraded());
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert_eq!(sink.shown.lock().len(), 1);
    }

    #[tokio::test]
    async fn partial_failure_shows_info() {
        let sink = Arc::new(RecordingSink::default());
        let bridge = bridge(Arc::clone(&sink));

        bridge.apply(&partial());
        tokio::time::sleep(Duration::from_millis(60)).await;

        let shown = sink.shown.lock();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].1, NoticeSeverity::Info);
    }
}
