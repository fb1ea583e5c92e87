//! XDG GlobalShortcuts portal client.
//!
//! One tokio task owns the portal proxy and session for the whole process
//! lifetime; binds go through a command channel and activation events are
//! forwarded out on another. Keeping the proxy inside the task sidesteps
//! borrow gymnastics with the session handle and guarantees bind calls and
//! the activation stream share one portal session, as the protocol requires.

use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;
#[cfg(target_os = "linux")]
use crate::error::HotkeyError;

/// One shortcut to bind, in portal terms.
#[derive(Debug, Clone)]
pub struct PortalBindRequest {
    pub id: String,
    pub description: String,
    /// Trigger hint in the portal's accelerator format (e.g. "CTRL+ALT+space").
    /// The compositor may honor it, rebind it, or ask the user.
    pub preferred_trigger: Option<String>,
}

/// What the compositor actually bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundShortcut {
    pub id: String,
    /// Compositor-formatted description of the assigned trigger, when the
    /// portal reports one. May differ from the preferred trigger.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_description: Option<String>,
}

/// Portal registration surface. The registration engine is generic over this
/// so its partial-failure logic is testable without a compositor.
pub trait PortalBinder: Send + Sync {
    fn bind(
        &self,
        request: PortalBindRequest,
    ) -> impl std::future::Future<Output = Result<BoundShortcut, ErrorKind>> + Send;
}

#[cfg(target_os = "linux")]
enum PortalCommand {
    Bind {
        request: PortalBindRequest,
        reply: tokio::sync::oneshot::Sender<Result<BoundShortcut, ErrorKind>>,
    },
}

/// Handle to the portal actor task.
#[cfg(target_os = "linux")]
#[derive(Clone)]
pub struct AshpdPortal {
    commands: async_channel::Sender<PortalCommand>,
}

#[cfg(target_os = "linux")]
impl AshpdPortal {
    /// Connect to the portal and start the actor. `activations` receives the
    /// shortcut id of every Activated signal for the life of the session.
    pub async fn connect(
        activations: async_channel::Sender<String>,
    ) -> Result<Self, HotkeyError> {
        let (tx, rx) = async_channel::bounded(16);
        let (ready_tx, ready_rx) = tokio::sync::oneshot::channel();
        tokio::spawn(run_portal_actor(rx, activations, ready_tx));

        match ready_rx.await {
            Ok(Ok(())) => Ok(Self { commands: tx }),
            Ok(Err(msg)) => Err(HotkeyError::PortalConnection(msg)),
            Err(_) => Err(HotkeyError::PortalConnection(
                "portal task exited during startup".to_string(),
            )),
        }
    }
}

#[cfg(target_os = "linux")]
impl PortalBinder for AshpdPortal {
    async fn bind(&self, request: PortalBindRequest) -> Result<BoundShortcut, ErrorKind> {
        let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();
        self.commands
            .send(PortalCommand::Bind {
                request,
                reply: reply_tx,
            })
            .await
            .map_err(|_| ErrorKind::PortalUnavailable)?;
        reply_rx.await.map_err(|_| ErrorKind::PortalUnavailable)?
    }
}

#[cfg(target_os = "linux")]
async fn run_portal_actor(
    commands: async_channel::Receiver<PortalCommand>,
    activations: async_channel::Sender<String>,
    ready: tokio::sync::oneshot::Sender<Result<(), String>>,
) {
    use ashpd::desktop::global_shortcuts::{GlobalShortcuts, NewShortcut};
    use futures_util::StreamExt;
    use tracing::{info, warn};

    use crate::logging;

    let shortcuts = match GlobalShortcuts::new().await {
        Ok(s) => s,
        Err(e) => {
            let _ = ready.send(Err(format!("portal proxy: {e}")));
            return;
        }
    };
    let session = match shortcuts.create_session().await {
        Ok(s) => s,
        Err(e) => {
            let _ = ready.send(Err(format!("portal session: {e}")));
            return;
        }
    };
    let activated = match shortcuts.receive_activated().await {
        Ok(stream) => stream,
        Err(e) => {
            let _ = ready.send(Err(format!("activation stream: {e}")));
            return;
        }
    };
    let _ = ready.send(Ok(()));
    info!("GlobalShortcuts portal session established");

    let mut activated = std::pin::pin!(activated);

    loop {
        tokio::select! {
            cmd = commands.recv() => match cmd {
                Ok(PortalCommand::Bind { request, reply }) => {
                    let id = request.id.clone();
                    let new_shortcut = NewShortcut::new(request.id.clone(), request.description)
                        .preferred_trigger(request.preferred_trigger.as_deref());

                    let result = match shortcuts
                        .bind_shortcuts(&session, &[new_shortcut], None)
                        .await
                    {
                        Ok(bind_request) => match bind_request.response() {
                            Ok(response) => {
                                match response.shortcuts().iter().find(|s| s.id() == id) {
                                    Some(bound) => {
                                        let trigger = bound.trigger_description().to_string();
                                        logging::log(
                                            "PORTAL",
                                            &format!("Bound {} as '{}'", id, trigger),
                                        );
                                        Ok(BoundShortcut {
                                            id: id.clone(),
                                            trigger_description: (!trigger.is_empty())
                                                .then_some(trigger),
                                        })
                                    }
                                    // Compositor accepted the request but left
                                    // our id out: treat as a denial.
                                    None => {
                                        warn!(shortcut = %id, "Bind response missing shortcut");
                                        Err(ErrorKind::PermissionDenied)
                                    }
                                }
                            }
                            Err(e) => {
                                warn!(shortcut = %id, error = %e, "Portal bind response failed");
                                Err(ErrorKind::PermissionDenied)
                            }
                        },
                        Err(e) => {
                            warn!(shortcut = %id, error = %e, "Portal bind_shortcuts failed");
                            Err(ErrorKind::PortalUnavailable)
                        }
                    };
                    let _ = reply.send(result);
                }
                Err(_) => {
                    info!("Portal command channel closed, ending session");
                    break;
                }
            },
            event = activated.next() => match event {
                Some(event) => {
                    let id = event.shortcut_id().to_string();
                    logging::log("PORTAL", &format!("Activated signal: {}", id));
                    if activations.send(id).await.is_err() {
                        warn!("Activation receiver dropped, ending portal session");
                        break;
                    }
                }
                None => {
                    warn!("Portal activation stream ended");
                    break;
                }
            },
        }
    }
}

/// Runtime portal selection: a live portal connection on Wayland sessions
/// that have one, or a stub that fails every bind elsewhere.
pub enum PortalClient {
    #[cfg(target_os = "linux")]
    Portal(AshpdPortal),
    Disabled,
}

impl PortalBinder for PortalClient {
    async fn bind(&self, request: PortalBindRequest) -> Result<BoundShortcut, ErrorKind> {
        match self {
            #[cfg(target_os = "linux")]
            PortalClient::Portal(portal) => portal.bind(request).await,
            PortalClient::Disabled => {
                let _ = request;
                Err(ErrorKind::PortalUnavailable)
            }
        }
    }
}
