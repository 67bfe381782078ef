// ABOUTME: Session module — in-memory conversation histories and optional transcript logging.
// ABOUTME: The store is the only place histories live; transcripts are append-only copies.

pub mod log;
pub mod store;

pub use log::SessionLogger;
pub use store::{HistoryHandle, SessionStore, new_session_id};
