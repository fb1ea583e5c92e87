//! Standalone hotkey engine binary.
//!
//! Detects the platform, registers the shell's hotkeys over the appropriate
//! path, prints the resulting status as JSON, then keeps running so portal
//! activations can be observed. Ctrl-C exits.

use std::sync::Arc;

use anyhow::Result;

use shell_hotkeys::actions::{ActionDispatcher, LoggingDispatcher};
use shell_hotkeys::config::{Settings, SettingsStore};
use shell_hotkeys::logging;
use shell_hotkeys::native::NativeClient;
use shell_hotkeys::notice::{LoggingToastSink, NotificationBridge};
use shell_hotkeys::platform::{BusctlProbe, PlatformContext};
use shell_hotkeys::portal::PortalClient;
use shell_hotkeys::registration::HotkeyRegistrationEngine;
use shell_hotkeys::tracker::{spawn_drain, ActivationTracker};
use shell_hotkeys::HotkeyService;

#[cfg(not(target_os = "linux"))]
use shell_hotkeys::native::SystemHotkeys;
#[cfg(target_os = "linux")]
use shell_hotkeys::platform::PortalMethod;
#[cfg(target_os = "linux")]
use shell_hotkeys::portal::AshpdPortal;

#[tokio::main]
async fn main() -> Result<()> {
    let _logging_guard = logging::init();

    let context = PlatformContext::detect(&BusctlProbe);
    let settings = Arc::new(Settings::load());
    let tracker = Arc::new(ActivationTracker::new());
    let dispatcher: Arc<dyn ActionDispatcher> = Arc::new(LoggingDispatcher);

    #[cfg(target_os = "linux")]
    let native = NativeClient::Disabled;
    #[cfg(not(target_os = "linux"))]
    let native = NativeClient::System(SystemHotkeys::spawn(Arc::clone(&dispatcher))?);

    #[cfg(target_os = "linux")]
    let (portal, activations) = if context.status.portal_method == PortalMethod::Portal {
        let (tx, rx) = async_channel::unbounded();
        match AshpdPortal::connect(tx).await {
            Ok(p) => (PortalClient::Portal(p), Some(rx)),
            Err(e) => {
                tracing::warn!(error = %e, "Portal connection failed, hotkeys will be unavailable");
                (PortalClient::Disabled, None)
            }
        }
    } else {
        (PortalClient::Disabled, None)
    };
    #[cfg(not(target_os = "linux"))]
    let (portal, activations) = (
        PortalClient::Disabled,
        None::<async_channel::Receiver<String>>,
    );

    let settings: Arc<dyn SettingsStore> = settings;
    let engine = HotkeyRegistrationEngine::new(context, native, portal, Arc::clone(&settings));
    let portal_actions = engine.portal_actions();

    let bridge = Arc::new(NotificationBridge::new(Arc::new(LoggingToastSink)));
    let service = HotkeyService::new(engine, Arc::clone(&tracker), Arc::clone(&settings))
        .with_status_listener({
            let bridge = Arc::clone(&bridge);
            move |status| bridge.apply(status)
        });

    let status = service.start().await;
    println!("{}", serde_json::to_string_pretty(&status)?);

    if let Some(rx) = activations {
        spawn_drain(tracker, rx, dispatcher, portal_actions, settings);
    }

    tokio::signal::ctrl_c().await?;
    Ok(())
}
