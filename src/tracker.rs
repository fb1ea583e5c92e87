//! Activation signal tracking for portal-bound shortcuts.
//!
//! Portal activations arrive as D-Bus signals, out of band from any request
//! we make, so the settings UI gets a diagnostics view: per-shortcut counts,
//! last activation time, and a bounded raw history. One mutex guards all of
//! it so a snapshot never mixes a cleared history with pre-clear counters.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::actions::ActionDispatcher;
use crate::config::SettingsStore;
use crate::hotkey_defs::{ActionTag, HotkeyId};

/// Raw history is capped; counters keep counting past the cap.
const MAX_SIGNAL_HISTORY: usize = 1000;

/// One received activation signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationSignal {
    pub shortcut_id: String,
    /// Unix epoch milliseconds.
    pub timestamp: i64,
}

/// Snapshot of the tracker state for the diagnostics view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalStats {
    pub tracking_enabled: bool,
    pub total_signals: u64,
    pub signals_by_shortcut: HashMap<String, u64>,
    /// Epoch milliseconds of the most recent signal, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_signal_time: Option<i64>,
    pub signals: Vec<ActivationSignal>,
}

#[derive(Default)]
struct TrackerState {
    tracking_enabled: bool,
    total_signals: u64,
    signals_by_shortcut: HashMap<String, u64>,
    last_signal_time: Option<i64>,
    signals: VecDeque<ActivationSignal>,
}

/// Records portal activation signals. Shared between the drain task and the
/// status query surface.
#[derive(Default)]
pub struct ActivationTracker {
    inner: Mutex<TrackerState>,
}

impl ActivationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once the portal session is live and the drain task is running.
    pub fn set_tracking_enabled(&self, enabled: bool) {
        self.inner.lock().tracking_enabled = enabled;
    }

    pub fn on_activation_signal(&self, shortcut_id: &str) {
        let timestamp = chrono::Utc::now().timestamp_millis();
        let mut state = self.inner.lock();
        state.total_signals += 1;
        *state
            .signals_by_shortcut
            .entry(shortcut_id.to_string())
            .or_insert(0) += 1;
        state.last_signal_time = Some(timestamp);
        if state.signals.len() >= MAX_SIGNAL_HISTORY {
            state.signals.pop_front();
        }
        state.signals.push_back(ActivationSignal {
            shortcut_id: shortcut_id.to_string(),
            timestamp,
        });
        debug!(shortcut = shortcut_id, total = state.total_signals, "Activation recorded");
    }

    pub fn get_stats(&self) -> SignalStats {
        let state = self.inner.lock();
        SignalStats {
            tracking_enabled: state.tracking_enabled,
            total_signals: state.total_signals,
            signals_by_shortcut: state.signals_by_shortcut.clone(),
            last_signal_time: state.last_signal_time,
            signals: state.signals.iter().cloned().collect(),
        }
    }

    /// Clear history and counters in one step. Idempotent; tracking stays in
    /// whatever state it was.
    pub fn clear_history(&self) {
        let mut state = self.inner.lock();
        state.total_signals = 0;
        state.signals_by_shortcut.clear();
        state.last_signal_time = None;
        state.signals.clear();
        info!("Activation signal history cleared");
    }
}

/// Drain portal activations into the tracker and dispatch their actions.
/// Runs until the portal side closes the channel, then flips tracking off so
/// the stats stop claiming liveness.
///
/// The portal offers no per-shortcut unbind, so a compositor keeps delivering
/// signals for shortcuts the user has since disabled. The enabled flag is
/// re-read from settings on every signal; disabled hotkeys are recorded in
/// the stats but never dispatched.
pub fn spawn_drain(
    tracker: Arc<ActivationTracker>,
    activations: async_channel::Receiver<String>,
    dispatcher: Arc<dyn ActionDispatcher>,
    actions: HashMap<String, ActionTag>,
    settings: Arc<dyn SettingsStore>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tracker.set_tracking_enabled(true);
        while let Ok(shortcut_id) = activations.recv().await {
            tracker.on_activation_signal(&shortcut_id);
            let enabled = HotkeyId::from_portal_id(&shortcut_id)
                .map(|id| settings.hotkey_enabled(id))
                .unwrap_or(false);
            if !enabled {
                debug!(shortcut = %shortcut_id, "Activation for disabled shortcut, not dispatching");
                continue;
            }
            match actions.get(&shortcut_id) {
                Some(action) => dispatcher.dispatch(*action),
                None => debug!(shortcut = %shortcut_id, "Activation for unknown shortcut id"),
            }
        }
        info!("Activation channel closed, tracking disabled");
        tracker.set_tracking_enabled(false);
    })
}
