// ABOUTME: Model selection and client factory — a closed set of models mapped to providers.
// ABOUTME: Resolves an explicit default plus an opt-in fallback, then builds the client.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use secrecy::SecretString;
use tracing::{info, warn};

use crate::config::LlmConfig;
use crate::llm::{LlmClient, LlmError, OpenAiCompatClient};

/// Backends reachable through the OpenAI-compatible client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Groq,
    Ollama,
}

impl Provider {
    pub fn name(self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Groq => "groq",
            Provider::Ollama => "ollama",
        }
    }

    /// Environment variable holding the API key; Ollama needs none.
    pub fn api_key_var(self) -> Option<&'static str> {
        match self {
            Provider::OpenAi => Some("OPENAI_API_KEY"),
            Provider::Groq => Some("GROQ_API_KEY"),
            Provider::Ollama => None,
        }
    }

    /// API root used when config does not override it.
    pub fn default_base_url(self) -> &'static str {
        match self {
            Provider::OpenAi => "https://api.openai.com/v1",
            Provider::Groq => "https://api.groq.com/openai/v1",
            Provider::Ollama => "http://localhost:11434/v1",
        }
    }

    /// API root including the version segment, honouring config overrides.
    pub fn base_url(self, config: &LlmConfig) -> String {
        let endpoint = match self {
            Provider::OpenAi => &config.openai,
            Provider::Groq => &config.groq,
            Provider::Ollama => &config.ollama,
        };
        endpoint
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(self.default_base_url())
            .trim_end_matches('/')
            .to_string()
    }
}

/// The closed set of supported model identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Model {
    Gpt35Turbo,
    Gpt4o,
    Gpt4oMini,
    Gpt4Turbo,
    Gemma2_9bIt,
    Llama31_8bInstant,
    Llama31_70bVersatile,
    Mixtral8x7b,
    OllamaLlama31,
    OllamaMistral,
}

impl Model {
    pub const ALL: [Model; 10] = [
        Model::Gpt35Turbo,
        Model::Gpt4o,
        Model::Gpt4oMini,
        Model::Gpt4Turbo,
        Model::Gemma2_9bIt,
        Model::Llama31_8bInstant,
        Model::Llama31_70bVersatile,
        Model::Mixtral8x7b,
        Model::OllamaLlama31,
        Model::OllamaMistral,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Model::Gpt35Turbo => "gpt-3.5-turbo",
            Model::Gpt4o => "gpt-4o",
            Model::Gpt4oMini => "gpt-4o-mini",
            Model::Gpt4Turbo => "gpt-4-turbo",
            Model::Gemma2_9bIt => "gemma2-9b-it",
            Model::Llama31_8bInstant => "llama-3.1-8b-instant",
            Model::Llama31_70bVersatile => "llama-3.1-70b-versatile",
            Model::Mixtral8x7b => "mixtral-8x7b-32768",
            Model::OllamaLlama31 => "llama3.1",
            Model::OllamaMistral => "mistral",
        }
    }

    pub fn provider(self) -> Provider {
        match self {
            Model::Gpt35Turbo | Model::Gpt4o | Model::Gpt4oMini | Model::Gpt4Turbo => {
                Provider::OpenAi
            }
            Model::Gemma2_9bIt
            | Model::Llama31_8bInstant
            | Model::Llama31_70bVersatile
            | Model::Mixtral8x7b => Provider::Groq,
            Model::OllamaLlama31 | Model::OllamaMistral => Provider::Ollama,
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Model {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Model::ALL
            .into_iter()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Model::ALL.iter().map(|m| m.as_str()).collect();
                anyhow::anyhow!(
                    "Unknown model: '{}'. Expected one of: {}",
                    wanted,
                    known.join(", ")
                )
            })
    }
}

/// Look up a model identifier in the closed set.
pub fn select_model(name: &str) -> anyhow::Result<Model> {
    name.parse()
}

/// The model to use plus the one to fall back to if it cannot be set up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelSelection {
    pub primary: Model,
    pub fallback: Option<Model>,
}

impl ModelSelection {
    /// Primary is the `--model` flag when given, else `llm.default_model`.
    pub fn resolve(flag: Option<&str>, config: &LlmConfig) -> anyhow::Result<Self> {
        let primary = select_model(flag.unwrap_or(&config.default_model))?;
        let fallback = config
            .fallback_model
            .as_deref()
            .map(select_model)
            .transpose()?
            .filter(|m| *m != primary);
        Ok(Self { primary, fallback })
    }
}

/// Create a client for `model`, reading API keys through `key_lookup`.
pub fn create_client_with(
    model: Model,
    config: &LlmConfig,
    key_lookup: impl Fn(&str) -> Option<String>,
) -> Result<Arc<dyn LlmClient>, LlmError> {
    let provider = model.provider();
    let api_key = match provider.api_key_var() {
        Some(var) => {
            let key = key_lookup(var)
                .filter(|k| !k.trim().is_empty())
                .ok_or_else(|| LlmError::MissingApiKey(var.to_string()))?;
            Some(SecretString::from(key))
        }
        None => None,
    };

    let client = OpenAiCompatClient::new(
        provider.name(),
        provider.base_url(config),
        api_key,
        model.as_str(),
    )
    .with_max_tokens(config.max_tokens)
    .with_temperature(config.temperature);

    Ok(Arc::new(client))
}

/// Create a client for `model` using keys from the process environment.
pub fn create_client(model: Model, config: &LlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    create_client_with(model, config, |var| std::env::var(var).ok())
}

/// Build the client for a selection, trying the fallback only if the primary fails.
pub fn connect_with(
    selection: &ModelSelection,
    config: &LlmConfig,
    key_lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Arc<dyn LlmClient>> {
    match create_client_with(selection.primary, config, &key_lookup) {
        Ok(client) => {
            info!(model = %selection.primary, provider = client.provider(), "model selected");
            Ok(client)
        }
        Err(primary_err) => {
            let Some(fallback) = selection.fallback else {
                return Err(primary_err.into());
            };
            warn!(
                model = %selection.primary,
                fallback = %fallback,
                error = %primary_err,
                "primary model unavailable, using fallback"
            );
            create_client_with(fallback, config, &key_lookup).map_err(|fallback_err| {
                anyhow::anyhow!(
                    "no usable model: {} ({}); fallback {} ({})",
                    selection.primary,
                    primary_err,
                    fallback,
                    fallback_err
                )
            })
        }
    }
}

/// Build the client for a selection using keys from the process environment.
pub fn connect(
    selection: &ModelSelection,
    config: &LlmConfig,
) -> anyhow::Result<Arc<dyn LlmClient>> {
    connect_with(selection, config, |var| std::env::var(var).ok())
}
