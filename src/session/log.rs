// ABOUTME: JSONL transcript logger — appends each committed turn to a per-session log file.
// ABOUTME: Stores logs in ~/.ava/transcripts/; files are written only, never read back.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::llm::Message;

/// A single JSONL log entry.
#[derive(Debug, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub session_id: String,
    pub message: Message,
}

/// Appends committed conversation turns as JSONL lines.
pub struct SessionLogger {
    writer: BufWriter<File>,
    session_id: String,
    pub path: PathBuf,
}

impl SessionLogger {
    /// Create a transcript logger for `session_id` in the default transcripts directory.
    pub fn new(session_id: &str) -> anyhow::Result<Self> {
        Self::new_in_dir(&Config::transcripts_dir(), session_id)
    }

    /// Create a transcript logger that writes into a specific directory.
    pub fn new_in_dir(dir: &Path, session_id: &str) -> anyhow::Result<Self> {
        fs::create_dir_all(dir)?;
        let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%S");
        let path = dir.join(format!("{timestamp}-{session_id}.jsonl"));
        let file = File::create(&path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            session_id: session_id.to_string(),
            path,
        })
    }

    /// Append a message to the log file.
    pub fn log_message(&mut self, message: &Message) -> anyhow::Result<()> {
        let entry = LogEntry {
            timestamp: Utc::now().to_rfc3339(),
            session_id: self.session_id.clone(),
            message: message.clone(),
        };
        let line = serde_json::to_string(&entry)?;
        writeln!(self.writer, "{line}")?;
        self.writer.flush()?;
        Ok(())
    }
}
