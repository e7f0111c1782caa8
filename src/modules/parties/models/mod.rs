pub mod party;

pub use party::{Party, PartyKind, PartyRequest};
