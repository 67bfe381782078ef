// ABOUTME: Shared test doubles — a scripted model client and a scripted line reader.
// ABOUTME: The client records every prompt it is given so tests can inspect them.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::StreamExt;

use ava::agent::{HistoryAwareRunner, LineReader};
use ava::llm::{Fragment, FragmentStream, LlmClient, LlmError, Prompt, RunConfig};
use ava::prompt::ChatPromptTemplate;

pub const SYSTEM: &str = "You are a helpful assistant";

/// How one model call behaves.
#[derive(Debug, Clone)]
pub enum Script {
    /// Yield these fragments, then finish cleanly.
    Reply(Vec<&'static str>),
    /// Yield these fragments, then fail.
    FailAfter(Vec<&'static str>),
    /// Yield these fragments, then never produce another item.
    Hang(Vec<&'static str>),
}

/// Model client that plays back scripts in order and records prompts.
///
/// When the scripts run out every call replies with "ok".
#[derive(Clone, Default)]
pub struct ScriptedClient {
    scripts: Arc<Mutex<VecDeque<Script>>>,
    prompts: Arc<Mutex<Vec<Prompt>>>,
    configs: Arc<Mutex<Vec<RunConfig>>>,
}

impl ScriptedClient {
    pub fn new(scripts: Vec<Script>) -> Self {
        Self {
            scripts: Arc::new(Mutex::new(scripts.into())),
            ..Default::default()
        }
    }

    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn configs(&self) -> Vec<RunConfig> {
        self.configs.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

fn texts(parts: &[&'static str]) -> Vec<Result<Fragment, LlmError>> {
    parts
        .iter()
        .map(|s| Ok(Fragment::Text(s.to_string())))
        .collect()
}

#[async_trait]
impl LlmClient for ScriptedClient {
    fn provider(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    fn stream(&self, prompt: Prompt, config: &RunConfig) -> FragmentStream {
        self.prompts.lock().unwrap().push(prompt);
        self.configs.lock().unwrap().push(config.clone());

        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Script::Reply(vec!["ok"]));

        match script {
            Script::Reply(parts) => {
                let mut items = texts(&parts);
                items.push(Ok(Fragment::Finish("stop".into())));
                Box::pin(futures::stream::iter(items))
            }
            Script::FailAfter(parts) => {
                let mut items = texts(&parts);
                items.push(Err(LlmError::Stream("connection reset".into())));
                Box::pin(futures::stream::iter(items))
            }
            Script::Hang(parts) => {
                Box::pin(futures::stream::iter(texts(&parts)).chain(futures::stream::pending()))
            }
        }
    }
}

/// Line reader fed from a fixed list; returns end-of-input once exhausted.
pub struct ScriptedReader {
    lines: VecDeque<String>,
    pub prompts_seen: Vec<String>,
}

impl ScriptedReader {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|s| s.to_string()).collect(),
            prompts_seen: Vec::new(),
        }
    }
}

impl LineReader for ScriptedReader {
    fn read_line(&mut self, prompt: &str) -> anyhow::Result<Option<String>> {
        self.prompts_seen.push(prompt.to_string());
        Ok(self.lines.pop_front())
    }
}

pub fn runner_for(client: &ScriptedClient) -> HistoryAwareRunner {
    HistoryAwareRunner::new(Arc::new(client.clone()), ChatPromptTemplate::new(SYSTEM))
}
