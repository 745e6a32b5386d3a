//! Mock implementations for testing
//!
//! These mocks drive the router and session runtime without a real model.

use super::traits::{CompletionClient, UpstreamError};
use crate::llm::LlmError;
use crate::state_machine::state::Turn;
use crate::state_machine::{Event, RenderInstruction, Renderer};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

/// One recorded completion call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionCall {
    pub system_prompt: String,
    pub user_message: String,
    pub prior_turns: Vec<Turn>,
}

// ============================================================================
// Mock Completion Client
// ============================================================================

/// Mock completion client that returns queued replies
#[derive(Default)]
pub struct MockCompletionClient {
    replies: Mutex<VecDeque<Result<String, UpstreamError>>>,
    /// Record of all calls made
    pub calls: Mutex<Vec<CompletionCall>>,
}

impl MockCompletionClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply
    pub fn queue_reply(&self, text: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Ok(text.into()));
    }

    /// Queue a failure
    pub fn queue_error(&self, error: UpstreamError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    /// Drop replies that were queued but never consumed
    pub fn clear_queue(&self) {
        self.replies.lock().unwrap().clear();
    }

    /// Get recorded calls
    pub fn recorded_calls(&self) -> Vec<CompletionCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_call(&self) -> Option<CompletionCall> {
        self.calls.lock().unwrap().last().cloned()
    }

    fn record(&self, system_prompt: &str, user_message: &str, prior_turns: &[Turn]) {
        self.calls.lock().unwrap().push(CompletionCall {
            system_prompt: system_prompt.to_string(),
            user_message: user_message.to_string(),
            prior_turns: prior_turns.to_vec(),
        });
    }

    fn next_reply(&self) -> Result<String, UpstreamError> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock reply queued").into()))
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_message: &str,
        prior_turns: &[Turn],
    ) -> Result<String, UpstreamError> {
        self.record(system_prompt, user_message, prior_turns);
        self.next_reply()
    }
}

// ============================================================================
// Delayed Mock Completion Client (for concurrency testing)
// ============================================================================

/// Mock completion client with a fixed delay that tracks how many calls
/// are in flight at once
pub struct DelayedMockCompletionClient {
    inner: MockCompletionClient,
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    /// Notified when a call starts (for test synchronization)
    pub request_started: Arc<Notify>,
}

impl DelayedMockCompletionClient {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MockCompletionClient::new(),
            delay,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            request_started: Arc::new(Notify::new()),
        }
    }

    pub fn queue_reply(&self, text: impl Into<String>) {
        self.inner.queue_reply(text);
    }

    /// Highest number of overlapping calls observed
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn recorded_calls(&self) -> Vec<CompletionCall> {
        self.inner.recorded_calls()
    }
}

#[async_trait]
impl CompletionClient for DelayedMockCompletionClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_message: &str,
        prior_turns: &[Turn],
    ) -> Result<String, UpstreamError> {
        self.inner.record(system_prompt, user_message, prior_turns);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.request_started.notify_waiters();

        tokio::time::sleep(self.delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.inner.next_reply()
    }
}

// ============================================================================
// Recording Renderer
// ============================================================================

/// Renderer that keeps everything it was given
#[derive(Default)]
pub struct RecordingRenderer {
    pub acknowledged: Mutex<Vec<String>>,
    pub notices: Mutex<Vec<RenderInstruction>>,
}

impl RecordingRenderer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn acknowledged(&self) -> Vec<String> {
        self.acknowledged.lock().unwrap().clone()
    }

    pub fn notice_texts(&self) -> Vec<String> {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .map(|n| n.text.clone())
            .collect()
    }
}

impl Renderer for RecordingRenderer {
    fn acknowledge(&self, event: &Event) {
        self.acknowledged.lock().unwrap().push(event.kind());
    }

    fn notice(&self, instruction: RenderInstruction) {
        self.notices.lock().unwrap().push(instruction);
    }
}
