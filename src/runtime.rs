//! Runtime for serving sessions
//!
//! Every session gets its own task that owns its state and handles events
//! one at a time. Different sessions run in parallel and share only the
//! read-only resource catalog and the completion client.

mod executor;
mod router;
pub mod traits;

#[cfg(test)]
mod proptests;
#[cfg(test)]
pub mod testing;

pub use router::ConversationRouter;
pub use traits::{CompletionClient, LlmCompletionClient};

use executor::SessionRuntime;
use traits::BroadcastRenderer;

use crate::state_machine::{transition, Event, Mode, RenderInstruction, Route, Session, SessionId};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, RwLock};

/// Work accepted by a session runtime
#[derive(Debug)]
pub enum SessionCommand {
    Dispatch {
        event: Event,
        reply: oneshot::Sender<RenderInstruction>,
    },
    Snapshot {
        reply: oneshot::Sender<Option<Session>>,
    },
}

/// Updates published to stream subscribers of a session
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionUpdate {
    Acknowledged { event: String },
    Notice { render: RenderInstruction },
    Reply { render: RenderInstruction },
    StateChange { state: Option<Mode> },
}

impl SessionUpdate {
    /// SSE event name
    pub fn name(&self) -> &'static str {
        match self {
            SessionUpdate::Acknowledged { .. } => "acknowledged",
            SessionUpdate::Notice { .. } => "notice",
            SessionUpdate::Reply { .. } => "reply",
            SessionUpdate::StateChange { .. } => "state_change",
        }
    }
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Session runtime for {0} has stopped")]
    Stopped(SessionId),
}

/// Live sessions by id, shared with the runtimes so they can retire
type Registry = Arc<RwLock<HashMap<SessionId, SessionHandle>>>;

/// Handle to interact with a running session
#[derive(Clone)]
pub struct SessionHandle {
    pub command_tx: mpsc::UnboundedSender<SessionCommand>,
    pub broadcast_tx: broadcast::Sender<SessionUpdate>,
}

/// Manager for all session runtimes.
///
/// A runtime exists only between the entry command and the end of the
/// session. Commands are sent while holding the registry lock, which is what
/// lets a runtime check for an empty queue and unregister atomically.
pub struct SessionManager {
    router: Arc<ConversationRouter>,
    runtimes: Registry,
}

impl SessionManager {
    pub fn new(router: ConversationRouter) -> Self {
        Self {
            router: Arc::new(router),
            runtimes: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn spawn(&self, session_id: &SessionId) -> SessionHandle {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (broadcast_tx, _) = broadcast::channel(128);

        let runtime = SessionRuntime::new(
            session_id.clone(),
            self.router.clone(),
            self.runtimes.clone(),
            command_rx,
            broadcast_tx.clone(),
        );
        tokio::spawn(runtime.run());

        SessionHandle {
            command_tx,
            broadcast_tx,
        }
    }

    /// Route one event and wait for its final render.
    ///
    /// Only the entry command starts a runtime. Anything else aimed at a
    /// session that is not live is answered without registering one.
    pub async fn dispatch(
        &self,
        session_id: &SessionId,
        event: Event,
    ) -> Result<RenderInstruction, RuntimeError> {
        let starts_session = matches!(transition(None, event.clone()), Ok(Route::Start));
        let detached = (!starts_session).then(|| event.clone());

        let (reply, rx) = oneshot::channel();
        let command = SessionCommand::Dispatch { event, reply };

        let undelivered = {
            let runtimes = self.runtimes.read().await;
            match runtimes.get(session_id) {
                Some(handle) => handle.command_tx.send(command).err().map(|e| e.0),
                None => Some(command),
            }
        };

        if let Some(command) = undelivered {
            if let Some(event) = detached {
                return Ok(self.dispatch_detached(session_id, event).await);
            }
            self.start(session_id, command).await?;
        }

        rx.await
            .map_err(|_| RuntimeError::Stopped(session_id.clone()))
    }

    /// Register a runtime for the session and hand it the entry command
    async fn start(
        &self,
        session_id: &SessionId,
        command: SessionCommand,
    ) -> Result<(), RuntimeError> {
        let mut runtimes = self.runtimes.write().await;
        let handle = runtimes
            .entry(session_id.clone())
            .or_insert_with(|| self.spawn(session_id));

        if let Err(e) = handle.command_tx.send(command) {
            // The registered runtime died without retiring
            tracing::warn!(session_id = %session_id, "Replacing stopped session runtime");
            let handle = self.spawn(session_id);
            handle
                .command_tx
                .send(e.0)
                .map_err(|_| RuntimeError::Stopped(session_id.clone()))?;
            runtimes.insert(session_id.clone(), handle);
        }

        tracing::debug!(session_id = %session_id, live = runtimes.len(), "Session runtime registered");
        Ok(())
    }

    /// Answer an event for a session that is not live. Nothing is stored and
    /// nobody can be subscribed, so updates go nowhere.
    async fn dispatch_detached(&self, session_id: &SessionId, event: Event) -> RenderInstruction {
        let (tx, _) = broadcast::channel(1);
        let renderer = Arc::new(BroadcastRenderer::new(session_id.clone(), tx));
        self.router
            .dispatch(&mut None, session_id, event, renderer)
            .await
    }

    /// Subscribe to updates of a live session
    pub async fn subscribe(
        &self,
        session_id: &SessionId,
    ) -> Option<broadcast::Receiver<SessionUpdate>> {
        self.runtimes
            .read()
            .await
            .get(session_id)
            .map(|handle| handle.broadcast_tx.subscribe())
    }

    /// Current session state; `None` if the user never started or cancelled.
    /// Queued behind any in-flight event for the session.
    pub async fn snapshot(&self, session_id: &SessionId) -> Result<Option<Session>, RuntimeError> {
        let rx = {
            let runtimes = self.runtimes.read().await;
            let Some(handle) = runtimes.get(session_id) else {
                return Ok(None);
            };
            let (reply, rx) = oneshot::channel();
            if handle
                .command_tx
                .send(SessionCommand::Snapshot { reply })
                .is_err()
            {
                return Ok(None);
            }
            rx
        };
        rx.await
            .map_err(|_| RuntimeError::Stopped(session_id.clone()))
    }

    #[cfg(test)]
    pub async fn session_count(&self) -> usize {
        self.runtimes.read().await.len()
    }
}
