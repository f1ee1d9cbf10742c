//! Retrieval-augmented Q&A over product/version-scoped documentation, plus a
//! cross-version semantic diff of answers.

pub mod chat;
pub mod core;
pub mod diff;
pub mod llm;
pub mod rag;
pub mod server;
pub mod state;
pub mod vector_math;
