// ABOUTME: Graph runner — invokes external graph pipelines (YouTube transcript, graph generator).
// ABOUTME: Talks to a LangGraph-style HTTP service; `test-graph` prints the results.

use std::io::Write;

use async_trait::async_trait;
use clap::ValueEnum;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::config::GraphConfig;
use crate::llm::RunConfig;
use crate::session::new_session_id;

/// Instruction sent by `test-graph graph`.
pub const DEFAULT_GRAPH_INSTRUCTION: &str = "generate a graph for a chatbot";

/// Environment variable holding the graph service key.
pub const GRAPH_API_KEY_VAR: &str = "LANGGRAPH_API_KEY";

/// Which pipeline `test-graph` runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum GraphKind {
    #[default]
    Youtube,
    Graph,
}

/// Final state returned by a graph run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GraphOutput(pub Value);

/// Result of the YouTube transcript pipeline.
pub type ParsedResult = GraphOutput;

/// Result of the generic graph executor.
pub type GraphResult = GraphOutput;

/// Failures talking to the graph service.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("graph request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("graph service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode graph output: {0}")]
    Decode(String),
}

/// The two pipelines exposed by the external graph package.
#[async_trait]
pub trait GraphRunner: Send + Sync {
    async fn process_video_transcript(&self) -> Result<ParsedResult, GraphError>;

    async fn run_graph(
        &self,
        instruction: &str,
        config: &RunConfig,
    ) -> Result<GraphResult, GraphError>;
}

#[derive(Debug, Serialize)]
struct RunRequest<'a> {
    assistant_id: &'a str,
    input: Value,
    config: &'a RunConfig,
}

/// Graph runner backed by a `POST /runs/wait` endpoint.
pub struct HttpGraphRunner {
    http: reqwest::Client,
    config: GraphConfig,
    api_key: Option<SecretString>,
}

impl HttpGraphRunner {
    pub fn new(config: GraphConfig, api_key: Option<SecretString>) -> Result<Self, GraphError> {
        Ok(Self {
            http: reqwest::Client::builder().build()?,
            config,
            api_key,
        })
    }

    /// Build a runner using `LANGGRAPH_API_KEY` from the environment when set.
    pub fn from_env(config: GraphConfig) -> Result<Self, GraphError> {
        let api_key = std::env::var(GRAPH_API_KEY_VAR)
            .ok()
            .filter(|k| !k.is_empty())
            .map(SecretString::from);
        Self::new(config, api_key)
    }

    fn url(&self) -> String {
        format!("{}/runs/wait", self.config.base_url.trim_end_matches('/'))
    }

    fn video_input(&self) -> Value {
        match &self.config.video_url {
            Some(url) => json!({ "video_url": url }),
            None => json!({}),
        }
    }

    async fn run(
        &self,
        assistant_id: &str,
        input: Value,
        config: &RunConfig,
    ) -> Result<GraphOutput, GraphError> {
        let body = RunRequest {
            assistant_id,
            input,
            config,
        };
        debug!(assistant_id, url = %self.url(), "starting graph run");

        let mut request = self.http.post(self.url()).json(&body);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GraphError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| GraphError::Decode(e.to_string()))?;
        Ok(GraphOutput(value))
    }
}

#[async_trait]
impl GraphRunner for HttpGraphRunner {
    async fn process_video_transcript(&self) -> Result<ParsedResult, GraphError> {
        let config = RunConfig::default();
        self.run(&self.config.youtube_assistant, self.video_input(), &config)
            .await
    }

    async fn run_graph(
        &self,
        instruction: &str,
        config: &RunConfig,
    ) -> Result<GraphResult, GraphError> {
        self.run(
            &self.config.graph_assistant,
            json!({ "instruction": instruction }),
            config,
        )
        .await
    }
}

/// Run the selected pipeline and print its result as pretty JSON.
pub async fn run_test_graph(
    runner: &dyn GraphRunner,
    kind: GraphKind,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let output = match kind {
        GraphKind::Youtube => runner.process_video_transcript().await?,
        GraphKind::Graph => {
            let thread_id = new_session_id();
            info!(%thread_id, "running graph generator");
            runner
                .run_graph(DEFAULT_GRAPH_INSTRUCTION, &RunConfig::for_thread(thread_id))
                .await?
        }
    };

    writeln!(out, "{}", serde_json::to_string_pretty(&output)?)?;
    Ok(())
}
