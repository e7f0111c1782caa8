pub mod assistant_service;
pub mod provider;
pub mod rules;

pub use assistant_service::AssistantService;
pub use provider::{ChatProvider, OpenAiProvider};
