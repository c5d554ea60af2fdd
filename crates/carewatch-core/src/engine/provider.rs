//! Reasoning provider adapter over an `autoagents-llm` chat model.

use crate::error::{ProviderError, truncate_message};
use autoagents_llm::LLMProvider;
use autoagents_llm::chat::ChatMessage;
use autoagents_llm::error::LLMError;
use log::debug;
use std::sync::Arc;
use std::time::Duration;

/// Chat model call bounded by a timeout.
#[derive(Clone)]
pub struct ReasoningProvider {
    llm: Arc<dyn LLMProvider>,
    timeout: Duration,
}

impl ReasoningProvider {
    pub fn new(llm: Arc<dyn LLMProvider>, timeout: Duration) -> Self {
        Self { llm, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send `messages` and return the raw text of the reply.
    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ProviderError> {
        let response = tokio::time::timeout(
            self.timeout,
            self.llm.chat_with_tools(messages, None, None),
        )
        .await
        .map_err(|_| ProviderError::Timeout(self.timeout))?
        .map_err(unavailable)?;

        let text = response.text().unwrap_or_default();
        let text = text.trim();
        if text.is_empty() {
            return Err(ProviderError::Empty);
        }
        debug!(
            "received provider response (chars={}, preview={})",
            text.chars().count(),
            truncate_message(text)
        );
        Ok(text.to_string())
    }
}

/// Every backend error is treated as a transport failure worth one retry.
fn unavailable(err: LLMError) -> ProviderError {
    let message = err.to_string();
    let message = if message.to_ascii_lowercase().contains("api_key") {
        "API authentication error".to_string()
    } else {
        truncate_message(&message)
    };
    ProviderError::Unavailable(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use carewatch_test_utils::{FailingLLM, FixedLLM, SlowLLM};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn returns_trimmed_text() {
        let llm = Arc::new(FixedLLM::new("  {\"a\":1}\n"));
        let provider = ReasoningProvider::new(llm, Duration::from_secs(1));
        assert_eq!(provider.complete(&[]).await, Ok("{\"a\":1}".to_string()));
    }

    #[tokio::test]
    async fn blank_reply_is_empty_error() {
        let llm = Arc::new(FixedLLM::new("   "));
        let provider = ReasoningProvider::new(llm, Duration::from_secs(1));
        assert_eq!(provider.complete(&[]).await, Err(ProviderError::Empty));
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        let timeout = Duration::from_millis(20);
        let provider = ReasoningProvider::new(
            Arc::new(SlowLLM::new("{}", Duration::from_secs(5))),
            timeout,
        );
        assert_eq!(provider.complete(&[]).await, Err(ProviderError::Timeout(timeout)));
    }

    #[tokio::test]
    async fn backend_errors_hide_key_material() {
        let provider = ReasoningProvider::new(
            Arc::new(FailingLLM::new("invalid api_key sk-123")),
            Duration::from_secs(1),
        );
        assert_eq!(
            provider.complete(&[]).await,
            Err(ProviderError::Unavailable("API authentication error".to_string()))
        );
    }
}
