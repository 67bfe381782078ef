// ABOUTME: The `LlmClient` trait — the contract every chat model backend implements.
// ABOUTME: Streams are finite, not restartable, and may fail at any fragment.

use std::pin::Pin;

use async_trait::async_trait;
use futures::{Stream, StreamExt};

use crate::llm::{Fragment, LlmError, Prompt, RunConfig};

/// Boxed stream of model output fragments.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<Fragment, LlmError>> + Send + 'static>>;

/// A selected chat model that can be invoked with a resolved prompt.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Provider name, e.g. "openai".
    fn provider(&self) -> &str;

    /// Model identifier sent to the provider.
    fn model(&self) -> &str;

    /// Start a streaming completion.
    fn stream(&self, prompt: Prompt, config: &RunConfig) -> FragmentStream;

    /// Non-streaming completion. The default drains `stream`.
    async fn complete(&self, prompt: Prompt, config: &RunConfig) -> Result<String, LlmError> {
        let mut fragments = self.stream(prompt, config);
        let mut reply = String::new();
        while let Some(fragment) = fragments.next().await {
            reply.push_str(fragment?.to_text());
        }
        Ok(reply)
    }
}
