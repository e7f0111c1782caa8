pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{Party, PartyKind, PartyRequest};
pub use repositories::{MySqlPartyRepository, PartyRepository};
pub use services::PartyService;
