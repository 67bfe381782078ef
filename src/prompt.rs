// ABOUTME: Prompt composition — system instruction, prior history, then the new human turn.
// ABOUTME: Also assembles the system instruction from config, a user override, and a local file.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{ChatConfig, Config};
use crate::llm::{Message, Prompt};

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant";

/// Name of the per-directory instruction file appended to the system prompt.
pub const LOCAL_PROMPT_FILE: &str = ".ava.md";

/// Build the prompt for one exchange.
///
/// `history` is placed verbatim between the system message and the new human
/// turn. It is read, never mutated.
pub fn compose(system_text: &str, history: &[Message], user_text: &str) -> Prompt {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(Message::system(system_text));
    messages.extend(history.iter().cloned());
    messages.push(Message::human(user_text));
    Prompt::new(messages)
}

/// Chat template: a fixed system instruction, a history slot, and a human slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPromptTemplate {
    system: String,
}

impl ChatPromptTemplate {
    pub fn new(system: impl Into<String>) -> Self {
        Self {
            system: system.into(),
        }
    }

    pub fn system(&self) -> &str {
        &self.system
    }

    pub fn compose(&self, history: &[Message], user_text: &str) -> Prompt {
        compose(&self.system, history, user_text)
    }
}

impl Default for ChatPromptTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_PROMPT)
    }
}

/// Reads a file if it exists, returning None otherwise.
pub fn read_if_exists(path: PathBuf) -> Option<String> {
    if path.exists() {
        fs::read_to_string(&path).ok()
    } else {
        None
    }
}

/// Assembles the system instruction from layered sources: the configured base
/// (replaceable by `~/.ava/system.md`) and an optional `.ava.md` in the
/// working directory.
#[derive(Debug, Clone)]
pub struct SystemPromptBuilder {
    pub base: String,
    pub local: Option<String>,
}

impl SystemPromptBuilder {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            local: None,
        }
    }

    /// Replaces the base layer with `~/.ava/system.md` if present.
    pub fn load_overrides(&mut self) -> &mut Self {
        if let Some(content) = read_if_exists(Config::system_prompt_path()) {
            self.base = content;
        }
        self
    }

    /// Checks for `.ava.md` in the current working directory.
    pub fn load_local(&mut self) -> &mut Self {
        self.load_local_in(Path::new("."))
    }

    /// Checks for `.ava.md` in `dir`.
    pub fn load_local_in(&mut self, dir: &Path) -> &mut Self {
        self.local = read_if_exists(dir.join(LOCAL_PROMPT_FILE));
        self
    }

    /// Joins all non-empty layers with a blank line.
    pub fn build(&self) -> String {
        [Some(self.base.as_str()), self.local.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// System instruction for a chat session.
///
/// `chat.system_prompt` is used verbatim unless `chat.prompt_files` is set,
/// in which case the file layers are applied.
pub fn system_instruction(chat: &ChatConfig) -> String {
    if !chat.prompt_files {
        return chat.system_prompt.clone();
    }
    SystemPromptBuilder::new(chat.system_prompt.clone())
        .load_overrides()
        .load_local()
        .build()
}

impl Default for SystemPromptBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_PROMPT)
    }
}
