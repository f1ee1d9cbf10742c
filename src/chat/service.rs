//! Retrieval-grounded chat, prompt suggestions and answer judging.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::prompt::{
    build_chat_prompt, build_judge_prompt, build_suggestion_prompt, default_system_instructions,
    parse_suggestions, CandidateKind,
};
use crate::core::config::LlmConfig;
use crate::core::errors::CoreError;
use crate::llm::{ChatMessage, CompletionGateway};
use crate::rag::{PassageRetriever, RetrievalResult};

const SUGGESTION_PASSAGES: usize = 3;
const SUGGESTION_CONTEXT_LINES: usize = 3;
const MAX_SUGGESTIONS: usize = 5;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChatRequest {
    pub prompt: String,
    pub history: Vec<ChatMessage>,
    pub model: Option<String>,
    pub product: Option<String>,
    pub version: Option<String>,
    pub system_instructions: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub response: String,
    pub context_files: Vec<RetrievalResult>,
    pub llm_prompt: String,
}

pub struct ChatService {
    retriever: Arc<PassageRetriever>,
    completion: Arc<dyn CompletionGateway>,
    llm: LlmConfig,
}

impl ChatService {
    pub fn new(
        retriever: Arc<PassageRetriever>,
        completion: Arc<dyn CompletionGateway>,
        llm: LlmConfig,
    ) -> Self {
        Self {
            retriever,
            completion,
            llm,
        }
    }

    /// Answers `request.prompt` from retrieved documentation.
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatReply, CoreError> {
        let product = request.product.as_deref();
        let version = request.version.as_deref();

        let context_files = self
            .retriever
            .retrieve(
                &request.prompt,
                product,
                version,
                self.retriever.default_top_k(),
            )
            .await?;

        let system_instructions = match request.system_instructions {
            Some(custom) if !custom.trim().is_empty() => custom,
            _ => default_system_instructions(product, version),
        };
        let llm_prompt = build_chat_prompt(
            &system_instructions,
            &request.history,
            &context_files,
            &request.prompt,
        );

        let model = request
            .model
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.llm.default_model.clone());
        tracing::info!(
            "Chat with {} over {} context passages",
            model,
            context_files.len()
        );
        let response = self.completion.complete(&llm_prompt, &model).await?;

        Ok(ChatReply {
            response,
            context_files,
            llm_prompt,
        })
    }

    /// Up to five rewrites of a partially typed question.
    pub async fn suggestions(
        &self,
        query: &str,
        recent_context: &[String],
        product: Option<&str>,
        version: Option<&str>,
    ) -> Result<Vec<String>, CoreError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let mut passages = self
            .retriever
            .retrieve(query, product, version, self.retriever.default_top_k())
            .await?;
        passages.truncate(SUGGESTION_PASSAGES);

        let recent = &recent_context[recent_context.len().saturating_sub(SUGGESTION_CONTEXT_LINES)..];
        let prompt = build_suggestion_prompt(query, recent, &passages);
        let completion = self
            .completion
            .complete(&prompt, &self.llm.suggestion_model)
            .await?;

        Ok(parse_suggestions(&completion, MAX_SUGGESTIONS))
    }

    /// Has the judge model pick the best answer; `labels[i]` names the model
    /// or version that produced `answers[i]`.
    pub async fn pick_best(
        &self,
        question: &str,
        labels: &[String],
        answers: &[String],
        kind: CandidateKind,
    ) -> Result<String, CoreError> {
        if answers.is_empty() {
            return Err(CoreError::Validation("No answers to compare".to_string()));
        }
        if labels.len() != answers.len() {
            return Err(CoreError::Validation(format!(
                "Got {} answers but {} labels",
                answers.len(),
                labels.len()
            )));
        }

        let prompt = build_judge_prompt(question, labels, answers, kind);
        self.completion.complete(&prompt, &self.llm.judge_model).await
    }
}
