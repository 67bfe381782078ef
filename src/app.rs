// ABOUTME: App orchestrator — wires config, model client, prompt, session store, and chat loop.
// ABOUTME: Also hosts the `prompts` command, which lists or renders compiled-in templates.

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::agent::{self, ChatLoop, HistoryAwareRunner, ModelSelection, TerminalReader};
use crate::config::Config;
use crate::prompt::{self, ChatPromptTemplate};
use crate::session::{SessionLogger, new_session_id};
use crate::templates;

/// Top-level chat application.
pub struct App {
    config: Config,
    model: Option<String>,
    streaming: bool,
}

impl App {
    /// Create a new app. `model` overrides `llm.default_model` when set.
    pub fn new(config: Config, model: Option<String>) -> Self {
        Self {
            config,
            model,
            streaming: true,
        }
    }

    /// Print whole replies instead of streaming fragments.
    pub fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    /// Set up the model client and session, then run the chat loop to completion.
    pub async fn run(self) -> anyhow::Result<()> {
        let selection = ModelSelection::resolve(self.model.as_deref(), &self.config.llm)?;
        let client = agent::connect(&selection, &self.config.llm)?;

        let system_prompt = prompt::system_instruction(&self.config.chat);

        let session_id = new_session_id();
        info!(%session_id, model = client.model(), "session created");

        let logger = if self.config.chat.transcript {
            match SessionLogger::new(&session_id) {
                Ok(logger) => {
                    info!(path = %logger.path.display(), "writing transcript");
                    Some(Arc::new(Mutex::new(logger)))
                }
                Err(e) => {
                    warn!(error = %e, "failed to create transcript");
                    None
                }
            }
        } else {
            None
        };

        let runner = HistoryAwareRunner::new(client, ChatPromptTemplate::new(system_prompt))
            .with_timeout(self.config.chat.timeout_seconds.map(Duration::from_secs))
            .with_logger(logger);

        let reader = TerminalReader::new()?;
        let mut chat = ChatLoop::new(
            runner,
            reader,
            std::io::stdout(),
            std::io::stderr(),
            session_id,
        )
        .with_streaming(self.streaming);

        chat.run().await
    }
}

/// Parse a `key=value` pair given to `--var`.
pub fn parse_var(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got '{raw}'")),
    }
}

/// List templates, print one raw, or render it with the given variables.
pub fn run_prompts(
    name: Option<&str>,
    vars: &[(String, String)],
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let Some(name) = name else {
        for template in templates::all() {
            writeln!(out, "{} — {}", template.name, template.description)?;
        }
        return Ok(());
    };

    let template = templates::get(name)?;
    if vars.is_empty() {
        write!(out, "{}", template.template)?;
        return Ok(());
    }

    let values: HashMap<String, String> = vars.iter().cloned().collect();
    write!(out, "{}", template.render(&values)?)?;
    Ok(())
}
