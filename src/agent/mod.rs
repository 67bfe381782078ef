// ABOUTME: Agent module — model selection, the history-aware runner, and the chat loop.
// ABOUTME: Wires prompt composition, model streaming, and session history together.

pub mod r#loop;
pub mod provider;
pub mod runner;

pub use r#loop::{ChatLoop, LineReader, TerminalReader};
pub use provider::*;
pub use runner::HistoryAwareRunner;
