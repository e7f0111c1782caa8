use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::validation::require_text;
use crate::core::{AppError, FieldError, Result};
use crate::string_enum;

pub const MAX_MESSAGE_LEN: usize = 4000;
pub const MAX_HISTORY: usize = 20;

string_enum! {
    /// Who produced an assistant answer
    pub enum AssistantSource {
        OpenAi => "openai",
        Rules => "rules",
    }
}

string_enum! {
    pub enum ChatRole {
        System => "system",
        User => "user",
        Assistant => "assistant",
    }
}

string_enum! {
    /// Forms the autofill endpoint knows how to complete
    pub enum AutofillEntity {
        Customer => "customer",
        Supplier => "supplier",
        EnquiryItem => "enquiry_item",
        InventoryItem => "inventory_item",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

impl ChatRequest {
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        require_text(&mut errors, "message", &self.message, MAX_MESSAGE_LEN);
        if self.history.len() > MAX_HISTORY {
            errors.push(FieldError::new(
                "history",
                format!("history cannot exceed {} messages", MAX_HISTORY),
            ));
        }
        AppError::from_fields(errors)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    pub source: AssistantSource,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AutofillRequest {
    pub entity: AutofillEntity,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutofillResponse {
    pub suggestions: Map<String, Value>,
    pub source: AssistantSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_names() {
        let request: AutofillRequest =
            serde_json::from_str(r#"{"entity": "enquiry_item", "fields": {"description": "x"}}"#)
                .unwrap();
        assert_eq!(request.entity, AutofillEntity::EnquiryItem);
        assert!(serde_json::from_str::<AutofillRequest>(r#"{"entity": "invoice"}"#).is_err());
    }

    #[test]
    fn test_chat_validation() {
        let blank = ChatRequest {
            message: "  ".to_string(),
            history: vec![],
        };
        assert!(matches!(blank.validate(), Err(AppError::FieldValidation(_))));

        let long_history = ChatRequest {
            message: "hello".to_string(),
            history: vec![ChatMessage::new(ChatRole::User, "hi"); MAX_HISTORY + 1],
        };
        assert!(long_history.validate().is_err());
    }

    #[test]
    fn test_source_serializes_lowercase() {
        let reply = ChatReply {
            reply: "ok".to_string(),
            source: AssistantSource::OpenAi,
        };
        assert_eq!(serde_json::to_value(&reply).unwrap()["source"], "openai");
    }
}
