// ABOUTME: History-aware runner — injects prior turns into each prompt and records new ones.
// ABOUTME: Commits the human/assistant pair only after the model stream finishes cleanly.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures::{Stream, StreamExt};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::llm::{Fragment, FragmentStream, LlmClient, LlmError, Message, RunConfig};
use crate::prompt::ChatPromptTemplate;
use crate::session::{HistoryHandle, SessionLogger, SessionStore};

/// Boxed stream of display text, one item per model fragment.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send + 'static>>;

/// Shared transcript logger, if transcripts are enabled.
pub type SharedLogger = Arc<Mutex<SessionLogger>>;

/// Composes the prompt template, the model client, and the session store.
pub struct HistoryAwareRunner {
    client: Arc<dyn LlmClient>,
    template: ChatPromptTemplate,
    store: SessionStore,
    logger: Option<SharedLogger>,
    fragment_timeout: Option<Duration>,
}

impl HistoryAwareRunner {
    pub fn new(client: Arc<dyn LlmClient>, template: ChatPromptTemplate) -> Self {
        Self::with_store(client, template, SessionStore::new())
    }

    /// Use an existing store, e.g. one shared with a previous runner.
    pub fn with_store(
        client: Arc<dyn LlmClient>,
        template: ChatPromptTemplate,
        store: SessionStore,
    ) -> Self {
        Self {
            client,
            template,
            store,
            logger: None,
            fragment_timeout: None,
        }
    }

    /// Fail an exchange when the next fragment takes longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.fragment_timeout = timeout;
        self
    }

    /// Append committed turns to a transcript.
    pub fn with_logger(mut self, logger: Option<SharedLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn client(&self) -> &Arc<dyn LlmClient> {
        &self.client
    }

    /// Stream the assistant's reply to `input` within `session_id`.
    ///
    /// The session is resolved (and created if new) immediately. The prompt is
    /// built from the history as it stands before this exchange, so the new
    /// human turn appears exactly once. History is updated only if the model
    /// stream is drained to its end without error; dropping the returned
    /// stream early, a model error, or a timeout all leave it untouched.
    pub fn stream(&mut self, session_id: &str, input: &str, config: &RunConfig) -> TextStream {
        let history = self.store.get_or_create(session_id);
        let client = Arc::clone(&self.client);
        let template = self.template.clone();
        let logger = self.logger.clone();
        let timeout = self.fragment_timeout;
        let input = input.to_string();
        let config = config.clone();

        Box::pin(async_stream::try_stream! {
            let prior = history.snapshot().await;
            let prompt = template.compose(&prior, &input);
            debug!(prior_turns = prior.len(), prompt_messages = prompt.len(), "prompt composed");

            let mut fragments = client.stream(prompt, &config);
            let mut reply = String::new();
            while let Some(fragment) = next_fragment(&mut fragments, timeout).await? {
                let text = fragment.to_text();
                if text.is_empty() {
                    continue;
                }
                reply.push_str(text);
                yield text.to_string();
            }

            commit(&history, logger.as_ref(), input, reply).await;
        })
    }

    /// Non-streaming variant: wait for the whole reply, then commit it.
    pub async fn invoke(
        &mut self,
        session_id: &str,
        input: &str,
        config: &RunConfig,
    ) -> Result<String, LlmError> {
        let history = self.store.get_or_create(session_id);
        let prior = history.snapshot().await;
        let prompt = self.template.compose(&prior, input);
        debug!(prior_turns = prior.len(), "prompt composed");

        let pending = self.client.complete(prompt, config);
        let reply = match self.fragment_timeout {
            Some(limit) => tokio::time::timeout(limit, pending)
                .await
                .map_err(|_| LlmError::Timeout(limit))??,
            None => pending.await?,
        };

        commit(&history, self.logger.as_ref(), input.to_string(), reply.clone()).await;
        Ok(reply)
    }
}

/// Wait for the next fragment, bounded by `timeout` when set.
async fn next_fragment(
    fragments: &mut FragmentStream,
    timeout: Option<Duration>,
) -> Result<Option<Fragment>, LlmError> {
    let next = match timeout {
        Some(limit) => tokio::time::timeout(limit, fragments.next())
            .await
            .map_err(|_| LlmError::Timeout(limit))?,
        None => fragments.next().await,
    };
    next.transpose()
}

async fn commit(
    history: &HistoryHandle,
    logger: Option<&SharedLogger>,
    input: String,
    reply: String,
) {
    let human = Message::human(input);
    let assistant = Message::assistant(reply);

    if let Some(logger) = logger {
        let mut guard = logger.lock().await;
        for message in [&human, &assistant] {
            if let Err(e) = guard.log_message(message) {
                warn!(error = %e, "failed to write transcript entry");
            }
        }
    }

    history.commit(human, assistant).await;
}
