//! PartyPlay library
//!
//! Party song banks and the album catalog over a JSON document store.

pub mod config;
pub mod counters;
pub mod document_store;
pub mod error;
pub mod party;
pub mod party_play;
mod records;
pub mod song_bank;
pub mod sqlite_persistence;
pub mod user;

pub use document_store::{DocumentStore, MemoryDocumentStore, SqliteDocumentStore};
pub use error::{PartyError, PartyResult};
pub use party_play::{PartyPlay, Stats};
