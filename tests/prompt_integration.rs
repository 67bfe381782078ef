// ABOUTME: Integration tests for prompt composition and the layered system prompt builder.
// ABOUTME: Verifies message ordering, history immutability, and layer joining.

use ava::llm::{Message, Role};
use ava::prompt::{ChatPromptTemplate, DEFAULT_SYSTEM_PROMPT, SystemPromptBuilder, compose};

#[test]
fn default_builder_yields_default_instruction() {
    let builder = SystemPromptBuilder::default();
    assert_eq!(builder.build(), DEFAULT_SYSTEM_PROMPT);
}

#[test]
fn layers_separated_by_blank_line() {
    let mut builder = SystemPromptBuilder::new("You are a pirate assistant. Arrr.");
    builder.local = Some("This repo is written in Rust.\n".to_string());
    let prompt = builder.build();

    let base_end = prompt.find("Arrr.").expect("base missing");
    let local_start = prompt.find("This repo").expect("local missing");
    assert!(local_start > base_end);
    assert!(prompt.contains("Arrr.\n\nThis repo"));
    assert!(!prompt.ends_with('\n'));
}

#[test]
fn empty_base_leaves_only_local() {
    let mut builder = SystemPromptBuilder::new("");
    builder.local = Some("local only".to_string());
    assert_eq!(builder.build(), "local only");
}

#[test]
fn composed_prompt_from_built_instruction() {
    let mut builder = SystemPromptBuilder::new("base");
    builder.local = Some("notes".to_string());
    let template = ChatPromptTemplate::new(builder.build());

    let prompt = template.compose(&[], "hi");
    assert_eq!(prompt.messages[0], Message::system("base\n\nnotes"));
    assert_eq!(prompt.messages[1], Message::human("hi"));
}

#[test]
fn compose_copies_history_verbatim() {
    let history: Vec<Message> = (0..3)
        .flat_map(|i| {
            [
                Message::human(format!("q{i}")),
                Message::assistant(format!("a{i}")),
            ]
        })
        .collect();
    let snapshot = history.clone();

    let prompt = compose("sys", &history, "next");

    assert_eq!(history, snapshot);
    assert_eq!(prompt.len(), history.len() + 2);
    assert_eq!(prompt.messages[1..=history.len()], history[..]);
    assert_eq!(prompt.messages.last().unwrap().role, Role::Human);
}
