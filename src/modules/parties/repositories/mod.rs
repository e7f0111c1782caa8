pub mod party_repository;

pub use party_repository::{MySqlPartyRepository, PartyRepository};
