use std::sync::Arc;

use serde_json::{Map, Value};

use crate::core::Result;
use crate::modules::assistant::models::{
    AssistantSource, AutofillRequest, AutofillResponse, ChatMessage, ChatReply, ChatRequest,
    ChatRole,
};
use crate::modules::assistant::services::provider::ChatProvider;
use crate::modules::assistant::services::rules;

const CHAT_PROMPT: &str = "You are the assistant of a trading company's ERP system. It manages \
     customers, suppliers, inventory, enquiries, quotations, sales orders, supplier LPOs, \
     material receipts, receipt returns, stock issues and purchase invoices. Answer briefly and \
     practically.";

const AUTOFILL_PROMPT: &str = "You complete ERP form fields. Reply with a single JSON object \
     of suggested field values and nothing else. Keep values the user typed unless they are \
     clearly malformed.";

/// Chat and form autofill, answered by the completion provider when one is
/// configured and by deterministic rules otherwise
pub struct AssistantService {
    provider: Option<Arc<dyn ChatProvider>>,
}

impl AssistantService {
    pub fn new(provider: Option<Arc<dyn ChatProvider>>) -> Self {
        Self { provider }
    }

    pub fn rules_only() -> Self {
        Self::new(None)
    }

    pub async fn chat(&self, request: ChatRequest) -> Result<ChatReply> {
        request.validate()?;

        if let Some(provider) = &self.provider {
            let mut messages = Vec::with_capacity(request.history.len() + 2);
            messages.push(ChatMessage::new(ChatRole::System, CHAT_PROMPT));
            messages.extend(
                request
                    .history
                    .iter()
                    .filter(|m| m.role != ChatRole::System)
                    .cloned(),
            );
            messages.push(ChatMessage::new(ChatRole::User, request.message.trim()));

            match provider.complete(&messages).await {
                Ok(reply) => {
                    return Ok(ChatReply {
                        reply,
                        source: AssistantSource::OpenAi,
                    })
                }
                Err(e) => {
                    tracing::warn!(provider = provider.name(), error = %e, "Chat provider failed, answering from rules");
                }
            }
        }

        Ok(ChatReply {
            reply: rules::chat_reply(&request.message),
            source: AssistantSource::Rules,
        })
    }

    pub async fn autofill(&self, request: AutofillRequest) -> Result<AutofillResponse> {
        let mut suggestions = rules::autofill(request.entity, &request.fields);

        if let Some(provider) = &self.provider {
            let prompt = serde_json::json!({
                "entity": request.entity,
                "fields": request.fields,
                "normalized": suggestions,
            });
            let messages = [
                ChatMessage::new(ChatRole::System, AUTOFILL_PROMPT),
                ChatMessage::new(ChatRole::User, prompt.to_string()),
            ];

            match provider.complete(&messages).await {
                Ok(reply) => match parse_suggestions(&reply) {
                    Some(extra) => {
                        suggestions.extend(extra);
                        return Ok(AutofillResponse {
                            suggestions,
                            source: AssistantSource::OpenAi,
                        });
                    }
                    None => {
                        tracing::warn!(entity = %request.entity, "Autofill reply was not a JSON object, using rules");
                    }
                },
                Err(e) => {
                    tracing::warn!(provider = provider.name(), error = %e, "Autofill provider failed, using rules");
                }
            }
        }

        Ok(AutofillResponse {
            suggestions,
            source: AssistantSource::Rules,
        })
    }
}

/// JSON object from a completion, tolerating a fenced code block around it
fn parse_suggestions(reply: &str) -> Option<Map<String, Value>> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    if end < start {
        return None;
    }
    match serde_json::from_str::<Value>(&reply[start..=end]) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}
