pub mod controllers;
pub mod models;
pub mod services;

pub use models::{AssistantSource, AutofillEntity};
pub use services::{AssistantService, ChatProvider, OpenAiProvider};
