// ABOUTME: Interactive chat loop — reads a line, streams the reply, repeats until "exit".
// ABOUTME: One exchange at a time; a failed exchange is reported and the loop carries on.

use std::io::Write;

use futures::StreamExt;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{error, info};

use crate::agent::runner::HistoryAwareRunner;
use crate::llm::RunConfig;

pub const USER_PROMPT: &str = "User:";
pub const ASSISTANT_LABEL: &str = "Assistant: ";
pub const EXIT_KEYWORD: &str = "exit";
pub const GOODBYE: &str = "\nChat ended. Goodbye!\n";

/// True when the input asks to end the chat.
pub fn is_exit(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case(EXIT_KEYWORD)
}

/// Source of user input lines.
pub trait LineReader {
    /// Read one line. `Ok(None)` means the input is closed.
    fn read_line(&mut self, prompt: &str) -> anyhow::Result<Option<String>>;
}

impl<R: LineReader + ?Sized> LineReader for &mut R {
    fn read_line(&mut self, prompt: &str) -> anyhow::Result<Option<String>> {
        (**self).read_line(prompt)
    }
}

/// Line editor on the controlling terminal.
pub struct TerminalReader {
    editor: DefaultEditor,
}

impl TerminalReader {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineReader for TerminalReader {
    fn read_line(&mut self, prompt: &str) -> anyhow::Result<Option<String>> {
        match self.editor.readline(&format!("{prompt} ")) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(Some(line))
            }
            // Ctrl-C and Ctrl-D end the chat like "exit".
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Drives exchanges between a line reader and the history-aware runner.
pub struct ChatLoop<R, O, E> {
    runner: HistoryAwareRunner,
    reader: R,
    out: O,
    err: E,
    session_id: String,
    streaming: bool,
}

impl<R: LineReader, O: Write, E: Write> ChatLoop<R, O, E> {
    pub fn new(runner: HistoryAwareRunner, reader: R, out: O, err: E, session_id: String) -> Self {
        Self {
            runner,
            reader,
            out,
            err,
            session_id,
            streaming: true,
        }
    }

    /// Write the whole reply at once instead of fragment by fragment.
    pub fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    pub fn runner(&self) -> &HistoryAwareRunner {
        &self.runner
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Run until the user exits or input closes.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        info!(session_id = %self.session_id, "chat started");

        loop {
            let line = match self.reader.read_line(USER_PROMPT)? {
                Some(line) if !is_exit(&line) => line,
                _ => {
                    write!(self.out, "{GOODBYE}")?;
                    self.out.flush()?;
                    return Ok(());
                }
            };

            write!(self.out, "{ASSISTANT_LABEL}")?;
            self.out.flush()?;

            match self.exchange(&line).await {
                Ok(()) => {
                    writeln!(self.out)?;
                    self.out.flush()?;
                }
                Err(e) => {
                    writeln!(self.out)?;
                    self.out.flush()?;
                    error!(session_id = %self.session_id, error = %e, "exchange failed");
                    writeln!(self.err, "Error: {e}")?;
                    self.err.flush()?;
                }
            }
        }
    }

    async fn exchange(&mut self, line: &str) -> anyhow::Result<()> {
        let config = RunConfig::for_session(self.session_id.clone());

        if !self.streaming {
            let reply = self.runner.invoke(&self.session_id, line, &config).await?;
            write!(self.out, "{reply}")?;
            self.out.flush()?;
            return Ok(());
        }

        let mut fragments = self.runner.stream(&self.session_id, line, &config);
        while let Some(fragment) = fragments.next().await {
            write!(self.out, "{}", fragment?)?;
            self.out.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_keyword_is_trimmed_and_case_insensitive() {
        for input in ["exit", "Exit", "EXIT", "  exit  ", "exit\n"] {
            assert!(is_exit(input), "{input:?} should exit");
        }
    }

    #[test]
    fn other_inputs_do_not_exit() {
        for input in ["", "exit now", "quit", "e xit", "exits"] {
            assert!(!is_exit(input), "{input:?} should not exit");
        }
    }

    #[test]
    fn terminal_labels() {
        assert_eq!(USER_PROMPT, "User:");
        assert!(ASSISTANT_LABEL.ends_with(' '));
    }
}
