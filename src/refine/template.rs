//! Fixed instruction template wrapped around user text.

use serde::{Deserialize, Serialize};

/// System instructions that define the transformation.
pub const SYSTEM_PROMPT: &str = "You are an expert prompt engineer. \
Your task is to transform unclear, rambling, or poorly structured text into clear, \
concise, and effective system prompts.

Follow these principles:
1. Extract the core intent and requirements
2. Structure the prompt with clear sections
3. Use specific, actionable language
4. Remove ambiguity and redundancy
5. Maintain the original goal while improving clarity
6. Format for maximum LLM comprehension

Output a refined prompt that will produce better results when used with AI models.";

const USER_PREFIX: &str = "Please refine this prompt:\n\n";

/// Chat roles understood by the generation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// The system + user message pair sent for `text`.
pub fn refinement_messages(text: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(format!("{USER_PREFIX}{text}")),
    ]
}
