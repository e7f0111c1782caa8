pub mod assistant;

pub use assistant::{
    AssistantSource, AutofillEntity, AutofillRequest, AutofillResponse, ChatMessage, ChatReply,
    ChatRequest, ChatRole,
};
