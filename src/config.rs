// ABOUTME: Configuration loading for ava.
// ABOUTME: Reads ~/.ava/config.toml (or an explicit path) and locates the environment file.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub chat: ChatConfig,
    pub graph: GraphConfig,
}

/// Model selection and provider endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub default_model: String,
    /// Used only when the primary model's client cannot be constructed.
    pub fallback_model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub openai: ProviderConfig,
    pub groq: ProviderConfig,
    pub ollama: ProviderConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            default_model: "gpt-3.5-turbo".to_string(),
            fallback_model: None,
            max_tokens: None,
            temperature: None,
            openai: ProviderConfig::default(),
            groq: ProviderConfig::default(),
            ollama: ProviderConfig::default(),
        }
    }
}

/// Per-provider endpoint override: the API root including `/v1`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: Option<String>,
}

/// Interactive chat settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub system_prompt: String,
    /// Per-fragment timeout. Unset means wait indefinitely.
    pub timeout_seconds: Option<u64>,
    /// Append committed turns to a JSONL transcript.
    pub transcript: bool,
    /// Layer `~/.ava/system.md` and `./.ava.md` over `system_prompt`.
    pub prompt_files: bool,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            system_prompt: crate::prompt::DEFAULT_SYSTEM_PROMPT.to_string(),
            timeout_seconds: None,
            transcript: false,
            prompt_files: false,
        }
    }
}

/// External graph service used by `test-graph`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub base_url: String,
    pub youtube_assistant: String,
    pub graph_assistant: String,
    pub video_url: Option<String>,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8123".to_string(),
            youtube_assistant: "youtube".to_string(),
            graph_assistant: "graph".to_string(),
            video_url: None,
        }
    }
}

impl Config {
    /// Load config from ~/.ava/config.toml, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load config from an explicit path, falling back to defaults when it is missing.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("invalid config {}: {}", path.display(), e))?;
        Ok(config)
    }

    /// Directory holding config, prompt overrides, and transcripts.
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".ava")
    }

    /// Path to the config file.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Path to the optional system prompt override.
    pub fn system_prompt_path() -> PathBuf {
        Self::config_dir().join("system.md")
    }

    /// Directory for JSONL transcripts.
    pub fn transcripts_dir() -> PathBuf {
        Self::config_dir().join("transcripts")
    }

    /// Environment file loaded before any command runs.
    pub fn env_file_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ava.env")
    }
}
