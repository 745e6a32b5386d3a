//! Chat-completion backend
//!
//! One OpenAI-compatible provider sits behind [`LlmService`]; the mode
//! handlers never see it directly, only through the runtime's completion
//! client.

mod error;
mod openai;
mod types;

#[cfg(test)]
mod proptests;

pub use error::{LlmError, LlmErrorKind};
pub use openai::OpenAIService;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// A backend that turns a system prompt plus turns into one reply
#[async_trait]
pub trait LlmService: Send + Sync {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Configured model name, for logs
    fn model_id(&self) -> &str;
}

/// Wraps a backend and records every call: timing and token usage on
/// success, kind and retryability on failure. Rate limits and network
/// blips are warnings; anything else the user cannot fix by retrying is an
/// error.
pub struct LoggingService {
    inner: Arc<dyn LlmService>,
    model_id: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn LlmService>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl LlmService for LoggingService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let start = Instant::now();
        let result = self.inner.complete(request).await;
        let duration_ms = start.elapsed().as_millis();

        match &result {
            Ok(response) => tracing::info!(
                model = %self.model_id,
                duration_ms = %duration_ms,
                turns = request.messages.len(),
                temperature = ?request.temperature,
                input_tokens = response.usage.input_tokens,
                output_tokens = response.usage.output_tokens,
                "Completion finished"
            ),
            Err(e) if e.kind.is_transient() => tracing::warn!(
                model = %self.model_id,
                duration_ms = %duration_ms,
                kind = %e.kind,
                error = %e.message,
                "Completion failed, user may retry"
            ),
            Err(e) => tracing::error!(
                model = %self.model_id,
                duration_ms = %duration_ms,
                kind = %e.kind,
                error = %e.message,
                "Completion failed"
            ),
        }

        result
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
