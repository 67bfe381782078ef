// ABOUTME: Core conversation types — roles, messages, prompts, streamed fragments, run config.
// ABOUTME: Shared by the prompt composer, session store, runner, and model clients.

use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    Human,
    Assistant,
}

impl Role {
    /// Role name as used on OpenAI-compatible chat APIs.
    pub fn wire_name(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::Human => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One turn of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn human(content: impl Into<String>) -> Self {
        Self {
            role: Role::Human,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A fully resolved prompt, ready to send to a model. Built fresh per exchange.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Prompt {
    pub messages: Vec<Message>,
}

impl Prompt {
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Token accounting reported by a provider at the end of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// One incremental piece of a model's streamed output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Text(String),
    Usage(Usage),
    Finish(String),
}

impl Fragment {
    /// Display text carried by this fragment; empty for bookkeeping fragments.
    pub fn to_text(&self) -> &str {
        match self {
            Fragment::Text(text) => text,
            Fragment::Usage(_) | Fragment::Finish(_) => "",
        }
    }
}

/// Correlation values forwarded untouched to model and graph backends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Configurable {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
}

/// Per-call options passed through the runner to the invoker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunConfig {
    pub configurable: Configurable,
}

impl RunConfig {
    pub fn for_session(session_id: impl Into<String>) -> Self {
        Self {
            configurable: Configurable {
                session_id: Some(session_id.into()),
                thread_id: None,
            },
        }
    }

    pub fn for_thread(thread_id: impl Into<String>) -> Self {
        Self {
            configurable: Configurable {
                session_id: None,
                thread_id: Some(thread_id.into()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_role_maps_to_user_on_the_wire() {
        assert_eq!(Role::Human.wire_name(), "user");
        assert_eq!(Role::System.wire_name(), "system");
        assert_eq!(Role::Assistant.wire_name(), "assistant");
    }

    #[test]
    fn only_text_fragments_carry_display_text() {
        assert_eq!(Fragment::Text("hi".into()).to_text(), "hi");
        assert_eq!(Fragment::Finish("stop".into()).to_text(), "");
        assert_eq!(Fragment::Usage(Usage::default()).to_text(), "");
    }

    #[test]
    fn run_config_serializes_only_present_ids() {
        let json = serde_json::to_value(RunConfig::for_thread("t-1")).unwrap();
        assert_eq!(json, serde_json::json!({"configurable": {"thread_id": "t-1"}}));
    }

    #[test]
    fn message_serializes_with_lowercase_role() {
        let json = serde_json::to_value(Message::human("hello")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "human", "content": "hello"}));
    }
}
