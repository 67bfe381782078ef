// ABOUTME: Model invoker layer — message types, the streaming client trait, and the OpenAI-compatible client.
// ABOUTME: Everything above this module talks to models only through `LlmClient`.

pub mod client;
pub mod error;
pub mod openai;
pub mod types;

pub use client::{FragmentStream, LlmClient};
pub use error::LlmError;
pub use openai::OpenAiCompatClient;
pub use types::{Configurable, Fragment, Message, Prompt, Role, RunConfig, Usage};
