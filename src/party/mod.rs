mod party_manager;
mod party_models;

pub use party_manager::{parse_genres, PartyManager};
pub use party_models::{Member, MemberRole, NewParty, Party};
