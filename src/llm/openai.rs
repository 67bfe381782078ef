// ABOUTME: OpenAI-compatible chat completions client — serves OpenAI, Groq, and Ollama.
// ABOUTME: Built on async-openai; maps its chunk stream to fragments and flags truncated streams.

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest, FinishReason,
};
use async_trait::async_trait;
use futures::StreamExt;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::llm::{
    Fragment, FragmentStream, LlmClient, LlmError, Message, Prompt, Role, RunConfig, Usage,
};

/// Client for any endpoint that speaks the OpenAI chat completions protocol.
///
/// No Debug impl; the key inside the async-openai client stays out of logs.
pub struct OpenAiCompatClient {
    client: Client<OpenAIConfig>,
    provider: String,
    base_url: String,
    model: String,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

impl OpenAiCompatClient {
    /// `base_url` is the API root including the version segment, e.g.
    /// `https://api.openai.com/v1`. Keyless providers get an empty key.
    pub fn new(
        provider: impl Into<String>,
        base_url: impl Into<String>,
        api_key: Option<SecretString>,
        model: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let api_key = api_key
            .as_ref()
            .map(|key| key.expose_secret().to_string())
            .unwrap_or_default();
        let config = OpenAIConfig::new()
            .with_api_base(&base_url)
            .with_api_key(api_key);

        Self {
            client: Client::with_config(config),
            provider: provider.into(),
            base_url,
            model: model.into(),
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_request(&self, prompt: &Prompt, stream: bool) -> CreateChatCompletionRequest {
        CreateChatCompletionRequest {
            model: self.model.clone(),
            messages: prompt.messages.iter().map(wire_message).collect(),
            max_completion_tokens: self.max_tokens,
            temperature: self.temperature,
            stream: stream.then_some(true),
            ..Default::default()
        }
    }
}

fn wire_message(message: &Message) -> ChatCompletionRequestMessage {
    let content = message.content.clone();
    match message.role {
        Role::System => {
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                content: ChatCompletionRequestSystemMessageContent::Text(content),
                name: None,
            })
        }
        Role::Human => ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
            content: ChatCompletionRequestUserMessageContent::Text(content),
            name: None,
        }),
        Role::Assistant => {
            #[allow(deprecated)]
            ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                content: Some(ChatCompletionRequestAssistantMessageContent::Text(content)),
                refusal: None,
                name: None,
                audio: None,
                tool_calls: None,
                function_call: None,
            })
        }
    }
}

fn finish_reason_name(reason: &FinishReason) -> &'static str {
    match reason {
        FinishReason::Stop => "stop",
        FinishReason::Length => "length",
        FinishReason::ToolCalls => "tool_calls",
        FinishReason::ContentFilter => "content_filter",
        FinishReason::FunctionCall => "function_call",
    }
}

#[async_trait]
impl LlmClient for OpenAiCompatClient {
    fn provider(&self) -> &str {
        &self.provider
    }

    fn model(&self) -> &str {
        &self.model
    }

    /// A stream that ends without any choice carrying a finish reason is
    /// truncated and ends with `LlmError::Incomplete`.
    fn stream(&self, prompt: Prompt, config: &RunConfig) -> FragmentStream {
        let request = self.build_request(&prompt, true);
        let client = self.client.clone();
        debug!(
            provider = %self.provider,
            model = %self.model,
            messages = prompt.len(),
            session_id = ?config.configurable.session_id,
            "starting chat completion stream"
        );

        Box::pin(async_stream::try_stream! {
            let mut chunks = client
                .chat()
                .create_stream(request)
                .await
                .map_err(LlmError::from)?;

            let mut finished = false;
            while let Some(chunk) = chunks.next().await {
                let chunk = chunk.map_err(|e| LlmError::Stream(e.to_string()))?;

                for choice in chunk.choices {
                    if let Some(text) = choice.delta.content.filter(|t| !t.is_empty()) {
                        yield Fragment::Text(text);
                    }
                    if let Some(reason) = &choice.finish_reason {
                        finished = true;
                        yield Fragment::Finish(finish_reason_name(reason).to_string());
                    }
                }

                if let Some(usage) = chunk.usage {
                    yield Fragment::Usage(Usage {
                        prompt_tokens: usage.prompt_tokens,
                        completion_tokens: usage.completion_tokens,
                    });
                }
            }

            if !finished {
                Err::<(), LlmError>(LlmError::Incomplete)?;
            }
        })
    }

    async fn complete(&self, prompt: Prompt, config: &RunConfig) -> Result<String, LlmError> {
        let request = self.build_request(&prompt, false);
        debug!(
            provider = %self.provider,
            model = %self.model,
            session_id = ?config.configurable.session_id,
            "starting chat completion"
        );

        let response = self.client.chat().create(request).await?;
        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }
}
