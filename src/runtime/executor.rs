//! Per-session runtime task

use super::router::ConversationRouter;
use super::traits::BroadcastRenderer;
use super::{Registry, SessionCommand, SessionUpdate};
use crate::state_machine::{Mode, Session, SessionId};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};

/// Owns one user's session and processes its commands strictly in order.
///
/// The session lives in this task only; no lock guards it because nothing
/// else can reach it. Once the session ends the task unregisters itself and
/// stops.
pub struct SessionRuntime {
    id: SessionId,
    session: Option<Session>,
    router: Arc<ConversationRouter>,
    registry: Registry,
    command_rx: mpsc::UnboundedReceiver<SessionCommand>,
    broadcast_tx: broadcast::Sender<SessionUpdate>,
}

impl SessionRuntime {
    pub fn new(
        id: SessionId,
        router: Arc<ConversationRouter>,
        registry: Registry,
        command_rx: mpsc::UnboundedReceiver<SessionCommand>,
        broadcast_tx: broadcast::Sender<SessionUpdate>,
    ) -> Self {
        Self {
            id,
            session: None,
            router,
            registry,
            command_rx,
            broadcast_tx,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(session_id = %self.id, "Starting session runtime");

        // One command at a time: a second event for this session waits here
        // until the previous one, including its completion call, is done
        while let Some(command) = self.command_rx.recv().await {
            if self.process_command(command).await {
                break;
            }
        }

        tracing::info!(session_id = %self.id, "Session runtime stopped");
    }

    fn state(&self) -> Option<Mode> {
        self.session.as_ref().map(|s| s.state)
    }

    /// Drop out of the registry if the session is gone and nothing else is
    /// queued. Senders hold the registry lock, so the queue cannot grow while
    /// the write lock is held here.
    async fn retire(&self) -> bool {
        if self.session.is_some() {
            return false;
        }
        let mut runtimes = self.registry.write().await;
        if !self.command_rx.is_empty() {
            return false;
        }
        runtimes.remove(&self.id);
        tracing::debug!(session_id = %self.id, live = runtimes.len(), "Session runtime retired");
        true
    }

    /// Returns true once the runtime has retired
    async fn process_command(&mut self, command: SessionCommand) -> bool {
        match command {
            SessionCommand::Dispatch { event, reply } => {
                let renderer = Arc::new(BroadcastRenderer::new(
                    self.id.clone(),
                    self.broadcast_tx.clone(),
                ));
                let before = self.state();

                let render = self
                    .router
                    .dispatch(&mut self.session, &self.id, event, renderer)
                    .await;

                let after = self.state();
                if before != after {
                    let _ = self
                        .broadcast_tx
                        .send(SessionUpdate::StateChange { state: after });
                }
                let _ = self.broadcast_tx.send(SessionUpdate::Reply {
                    render: render.clone(),
                });

                // Retire before replying so the caller never sees a stale registry
                let retired = self.retire().await;
                if reply.send(render).is_err() {
                    tracing::debug!(session_id = %self.id, "Dispatch caller went away before reply");
                }
                retired
            }
            SessionCommand::Snapshot { reply } => {
                let retired = self.retire().await;
                let _ = reply.send(self.session.clone());
                retired
            }
        }
    }
}
