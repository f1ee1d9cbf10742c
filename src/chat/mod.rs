//! Documentation chat on top of retrieval.

pub mod prompt;
pub mod service;

pub use prompt::CandidateKind;
pub use service::{ChatReply, ChatRequest, ChatService};
