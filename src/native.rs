//! Native hotkey registration (macOS, Windows) via the global-hotkey crate.
//!
//! `GlobalHotKeyManager` is not Send, so a dedicated thread owns it along
//! with the id-to-action map. The thread interleaves command handling with
//! draining the crate's global event receiver, dispatching `Pressed` events
//! and ignoring releases.

use std::collections::HashMap;
use std::sync::mpsc;
use std::time::Duration;

use global_hotkey::hotkey::HotKey;
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState};
use tracing::{info, warn};

use crate::actions::ActionDispatcher;
use crate::error::{ErrorKind, HotkeyError};
use crate::hotkey_defs::{ActionTag, HotkeyId};
use crate::logging;

/// Registration surface for the native (non-portal) path. Accelerator
/// parsing and key-code conversion happen in the registration engine; this
/// boundary only talks to the OS.
pub trait NativeHotkeys: Send + Sync {
    fn register(&self, id: HotkeyId, hotkey: HotKey, action: ActionTag)
        -> Result<(), ErrorKind>;
    fn unregister(&self, id: HotkeyId) -> Result<(), ErrorKind>;
}

enum Command {
    Register {
        id: HotkeyId,
        hotkey: HotKey,
        action: ActionTag,
        reply: mpsc::Sender<Result<(), ErrorKind>>,
    },
    Unregister {
        id: HotkeyId,
        reply: mpsc::Sender<Result<(), ErrorKind>>,
    },
}

/// Handle to the hotkey thread. Cloneable; all clones talk to the same
/// manager.
#[derive(Clone)]
pub struct SystemHotkeys {
    commands: mpsc::Sender<Command>,
}

impl SystemHotkeys {
    /// Spawn the manager thread. Fails if the OS refuses a hotkey manager
    /// (e.g. no accessibility permission on macOS).
    pub fn spawn(dispatcher: std::sync::Arc<dyn ActionDispatcher>) -> Result<Self, HotkeyError> {
        let (tx, rx) = mpsc::channel::<Command>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), String>>();

        std::thread::Builder::new()
            .name("hotkey-manager".to_string())
            .spawn(move || {
                let manager = match GlobalHotKeyManager::new() {
                    Ok(m) => {
                        let _ = ready_tx.send(Ok(()));
                        m
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e.to_string()));
                        return;
                    }
                };
                run_manager_loop(manager, rx, dispatcher);
            })
            .map_err(|e| HotkeyError::NativeBackend(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self { commands: tx }),
            Ok(Err(msg)) => Err(HotkeyError::NativeBackend(msg)),
            Err(_) => Err(HotkeyError::NativeBackend(
                "hotkey manager thread exited during startup".to_string(),
            )),
        }
    }

    fn send(&self, build: impl FnOnce(mpsc::Sender<Result<(), ErrorKind>>) -> Command)
        -> Result<(), ErrorKind> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.commands
            .send(build(reply_tx))
            .map_err(|_| ErrorKind::TransportUnavailable)?;
        reply_rx
            .recv()
            .map_err(|_| ErrorKind::TransportUnavailable)?
    }
}

impl NativeHotkeys for SystemHotkeys {
    fn register(&self, id: HotkeyId, hotkey: HotKey, action: ActionTag) -> Result<(), ErrorKind> {
        self.send(|reply| Command::Register {
            id,
            hotkey,
            action,
            reply,
        })
    }

    fn unregister(&self, id: HotkeyId) -> Result<(), ErrorKind> {
        self.send(|reply| Command::Unregister { id, reply })
    }
}

/// Runtime selection of the native backend. Linux sessions route through the
/// portal (or nothing), so they get the disabled stub and never spin up a
/// manager thread.
pub enum NativeClient {
    System(SystemHotkeys),
    Disabled,
}

impl NativeHotkeys for NativeClient {
    fn register(&self, id: HotkeyId, hotkey: HotKey, action: ActionTag) -> Result<(), ErrorKind> {
        match self {
            NativeClient::System(system) => system.register(id, hotkey, action),
            NativeClient::Disabled => Err(ErrorKind::TransportUnavailable),
        }
    }

    fn unregister(&self, id: HotkeyId) -> Result<(), ErrorKind> {
        match self {
            NativeClient::System(system) => system.unregister(id),
            NativeClient::Disabled => Ok(()),
        }
    }
}

fn run_manager_loop(
    manager: GlobalHotKeyManager,
    commands: mpsc::Receiver<Command>,
    dispatcher: std::sync::Arc<dyn ActionDispatcher>,
) {
    let mut actions_by_event_id: HashMap<u32, ActionTag> = HashMap::new();
    let mut registered: HashMap<HotkeyId, HotKey> = HashMap::new();
    let events = GlobalHotKeyEvent::receiver();

    info!("Native hotkey manager thread started");

    loop {
        match commands.recv_timeout(Duration::from_millis(50)) {
            Ok(Command::Register {
                id,
                hotkey,
                action,
                reply,
            }) => {
                // Replace any previous binding for this id first.
                if let Some(old) = registered.remove(&id) {
                    let _ = manager.unregister(old);
                    actions_by_event_id.remove(&old.id());
                }
                let result = match manager.register(hotkey) {
                    Ok(()) => {
                        registered.insert(id, hotkey);
                        actions_by_event_id.insert(hotkey.id(), action);
                        logging::log("HOTKEY", &format!("Registered {} natively", id));
                        Ok(())
                    }
                    Err(e) => {
                        warn!(hotkey = %id, error = %e, "Native registration failed");
                        Err(classify_native_error(&e))
                    }
                };
                let _ = reply.send(result);
            }
            Ok(Command::Unregister { id, reply }) => {
                let result = match registered.remove(&id) {
                    Some(hotkey) => {
                        actions_by_event_id.remove(&hotkey.id());
                        manager
                            .unregister(hotkey)
                            .map_err(|e| {
                                warn!(hotkey = %id, error = %e, "Unregister failed");
                                ErrorKind::TransportUnavailable
                            })
                    }
                    None => Ok(()),
                };
                let _ = reply.send(result);
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                info!("Native hotkey manager thread shutting down");
                break;
            }
        }

        while let Ok(event) = events.try_recv() {
            if event.state != HotKeyState::Pressed {
                continue;
            }
            if let Some(action) = actions_by_event_id.get(&event.id) {
                dispatcher.dispatch(*action);
            }
        }
    }
}

/// Map the crate's error to our taxonomy. Everything that is not an explicit
/// conflict gets reported as a claim failure; the detail goes to the log.
fn classify_native_error(error: &global_hotkey::Error) -> ErrorKind {
    match error {
        global_hotkey::Error::AlreadyRegistered(_) => ErrorKind::AlreadyClaimed,
        other => {
            warn!(error = %other, "Unclassified native hotkey error");
            ErrorKind::AlreadyClaimed
        }
    }
}
