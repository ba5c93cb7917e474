//! Conversation session management.
//!
//! One session per thread. The manager owns the thread map, builds each
//! session's pipeline backend from the settings current at creation time,
//! and serializes turns per thread through a FIFO gate so replies land in
//! history in the order their messages arrived.

mod chat;
mod manager;
mod state;
mod types;


pub use manager::SessionManager;
pub use state::Session;
pub use types::{
    AssistantSettings, ClientFactory, ConversationExport, PageContext, Reply, SessionError,
    SessionStatus, Turn, TurnRole,
};
