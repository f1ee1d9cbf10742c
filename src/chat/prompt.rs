//! Prompt text for the answer, suggestion and judge calls.

use crate::llm::ChatMessage;
use crate::rag::RetrievalResult;

/// Who produced the answers a judge prompt compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    Models,
    Versions,
}

/// `User: …` for user turns, `Bot: …` for everything else, one per line.
pub fn render_history(history: &[ChatMessage]) -> String {
    let mut rendered = String::new();
    for turn in history {
        let speaker = if turn.role == "user" { "User" } else { "Bot" };
        rendered.push_str(&format!("{}: {}\n", speaker, turn.content));
    }
    rendered
}

pub fn render_context(passages: &[RetrievalResult]) -> String {
    passages
        .iter()
        .map(|p| format!("Collection: {}\nDocument:\n{}", p.collection_name, p.document))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn default_system_instructions(product: Option<&str>, version: Option<&str>) -> String {
    format!(
        r#"You are a highly knowledgeable assistant for Temenos banking products.

You will be given:
- A conversation history between the user and assistant, which may contain follow-up questions, references, or pronouns.
- Context blocks from official documentation. Each block contains section headers marked as h1:, h2:, etc., followed by the content from that section.

Instructions:
- Carefully read the h1:, h2:, and other header markers to understand the topic and subtopic of each context block.
- Use the information under these headers to answer the user's question as accurately as possible.
- If the answer requires information from multiple sections, synthesize a complete answer using all relevant blocks.
- When possible, cite the h1:/h2: section titles in your answer to help the user understand where the information comes from.
- Look for the following abbreviations in the context:
    -"COB" for "Close of Business"
    -"AA" for "Arrangement Architecture"
    -"MM" for "Money Market"
    -"FX" for "Foreign Exchange"
    -"SW" for "SWAP"
    -"LC" for "Letter of Credit"
    -"MD" for "Miscellaneous Deals"
- If there are typos in the query provided to you try to provide the correct word and ask them for clarification before answering.
- If the context does not contain enough information, reply: "Not enough context provided."
- Do not speculate or use external information.
- Provide clear, structured answers, using examples, pseudocode, or markdown if applicable.

Always base your answer on the provided context.
You are currently helping with product: {} and version: {}.
Mention the product and version in your answer."#,
        product.unwrap_or("unspecified"),
        version.unwrap_or("unspecified")
    )
}

pub fn build_chat_prompt(
    system_instructions: &str,
    history: &[ChatMessage],
    context: &[RetrievalResult],
    question: &str,
) -> String {
    format!(
        "{}\n\n--- CONVERSATION HISTORY ---\n{}\n--- CONTEXT ---\n{}\n\n--- QUESTION ---\n{}",
        system_instructions,
        render_history(history),
        render_context(context),
        question
    )
}

pub fn build_suggestion_prompt(
    query: &str,
    recent_context: &[String],
    passages: &[RetrievalResult],
) -> String {
    let chat_context = recent_context.join("\n");
    let docs_context = passages
        .iter()
        .map(|p| format!("- {}", p.document))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r#"You are an assistant helping users write better prompts for an AI banking assistant.

They are currently typing: "{}"

Recent conversation context:
{}

Relevant documentation context:
{}

Your task:
- Analyze the user's query and provide 5 possible questions they might want to ask.
- Include variations: corrections, completions, or focused rephrasing.
- If there are typos in the query, correct them.
- If the query is too vague, make specific follow-ups.
- If the query is already good, make minor improvements.
- Format the questions to be more specific, clear, and actionable.

Suggestions (write one per line):
"#,
        query,
        if chat_context.is_empty() { "None" } else { chat_context.as_str() },
        if docs_context.is_empty() { "None" } else { docs_context.as_str() },
    )
}

/// Asks the judge model to return the best of `answers` verbatim. `labels`
/// name the model or version behind each answer, pairwise.
pub fn build_judge_prompt(
    question: &str,
    labels: &[String],
    answers: &[String],
    kind: CandidateKind,
) -> String {
    let heading = match kind {
        CandidateKind::Models => "Here are answers from different AI models:",
        CandidateKind::Versions => "Here are answers for different product versions:",
    };
    let candidates = labels
        .iter()
        .zip(answers)
        .enumerate()
        .map(|(idx, (label, answer))| format!("{}. {}: {}", idx + 1, label, answer))
        .collect::<Vec<_>>()
        .join("\n");

    let mut instructions = vec![];
    if kind == CandidateKind::Models {
        instructions.push("- Do not be influenced by the model names or writing style.");
    }
    instructions.push(
        "- Compare the answers for semantic accuracy, factual correctness, and how well they address the question.",
    );
    instructions.push("- Select the answer that is most accurate, complete, and helpful.");
    if kind == CandidateKind::Models {
        instructions
            .push("- Do not favor answers that simply repeat the question or are overly verbose.");
    }
    instructions.push(
        "- Do not provide any explanation or commentary, just output the best answer verbatim.",
    );

    format!(
        "You are an impartial expert evaluator. Your task is to select the best answer to the following question, based solely on accuracy, completeness, and clarity.\n\n\
         Question: \"{}\"\n\n\
         {}\n{}\n\n\
         Instructions:\n{}\n\n\
         Best Answer:",
        question,
        heading,
        candidates,
        instructions.join("\n")
    )
}

/// Trimmed, non-empty lines of a suggestion completion, at most `limit`.
pub fn parse_suggestions(completion: &str, limit: usize) -> Vec<String> {
    completion
        .trim()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(limit)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passage(collection: &str, document: &str) -> RetrievalResult {
        RetrievalResult {
            document: document.to_string(),
            collection_name: collection.to_string(),
            similarity: 0.8,
        }
    }

    #[test]
    fn history_uses_user_and_bot_speakers() {
        let history = vec![
            ChatMessage::user("What is COB?"),
            ChatMessage {
                role: "bot".to_string(),
                content: "Close of Business.".to_string(),
            },
        ];
        assert_eq!(
            render_history(&history),
            "User: What is COB?\nBot: Close of Business.\n"
        );
        assert_eq!(render_history(&[]), "");
    }

    #[test]
    fn chat_prompt_has_all_sections_in_order() {
        let prompt = build_chat_prompt(
            "SYSTEM",
            &[ChatMessage::user("hi")],
            &[passage("temenos_transact_r23", "h1: Fees\nThe cap is 100.")],
            "What is the cap?",
        );
        assert_eq!(
            prompt,
            "SYSTEM\n\n--- CONVERSATION HISTORY ---\nUser: hi\n\n--- CONTEXT ---\n\
             Collection: temenos_transact_r23\nDocument:\nh1: Fees\nThe cap is 100.\n\n\
             --- QUESTION ---\nWhat is the cap?"
        );
    }

    #[test]
    fn system_instructions_mention_scope() {
        let text = default_system_instructions(Some("transact"), Some("r23"));
        assert!(text.contains("product: transact and version: r23"));
        let text = default_system_instructions(None, None);
        assert!(text.contains("product: unspecified and version: unspecified"));
    }

    #[test]
    fn suggestion_prompt_falls_back_to_none() {
        let prompt = build_suggestion_prompt("cob tim", &[], &[]);
        assert!(prompt.contains("They are currently typing: \"cob tim\""));
        assert!(prompt.contains("Recent conversation context:\nNone"));
        assert!(prompt.contains("Relevant documentation context:\nNone"));

        let prompt = build_suggestion_prompt(
            "cob",
            &["first".to_string(), "second".to_string()],
            &[passage("c", "doc one"), passage("c", "doc two")],
        );
        assert!(prompt.contains("first\nsecond"));
        assert!(prompt.contains("- doc one\n\n- doc two"));
    }

    #[test]
    fn judge_prompt_numbers_candidates() {
        let prompt = build_judge_prompt(
            "What changed?",
            &["r23".to_string(), "r22".to_string()],
            &["New waiver.".to_string(), "Nothing.".to_string()],
            CandidateKind::Versions,
        );
        assert!(prompt.contains("Question: \"What changed?\""));
        assert!(prompt.contains("for different product versions:\n1. r23: New waiver.\n2. r22: Nothing."));
        assert!(!prompt.contains("model names"));
        assert!(prompt.ends_with("Best Answer:"));

        let prompt = build_judge_prompt(
            "q",
            &["azure/gpt-4.1-mini".to_string()],
            &["a".to_string()],
            CandidateKind::Models,
        );
        assert!(prompt.contains("different AI models:\n1. azure/gpt-4.1-mini: a"));
        assert!(prompt.contains("model names"));
    }

    #[test]
    fn suggestions_are_trimmed_and_capped() {
        let completion = "\n  one \n\ntwo\nthree\nfour\nfive\nsix\n";
        assert_eq!(
            parse_suggestions(completion, 5),
            vec!["one", "two", "three", "four", "five"]
        );
        assert!(parse_suggestions("   ", 5).is_empty());
    }
}
