//! Wires the managers over one store.

use crate::config::AppConfig;
use crate::counters::Counters;
use crate::document_store::{
    Collection, DocumentStore, KeyedLocks, MemoryDocumentStore, SqliteDocumentStore,
};
use crate::error::PartyResult;
use crate::party::PartyManager;
use crate::song_bank::{Album, SongBankAggregator, DEFAULT_TOP_ALBUMS_LIMIT};
use crate::user::UserManager;
use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub users: usize,
    pub parties: usize,
}

pub struct PartyPlay {
    store: Arc<dyn DocumentStore>,
    users: Arc<UserManager>,
    parties: PartyManager,
    song_bank: SongBankAggregator,
    top_albums_limit: usize,
}

impl PartyPlay {
    /// All managers share `store` and a single set of record locks.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        let locks = Arc::new(KeyedLocks::new());
        let counters = Arc::new(Counters::new(store.clone()));
        let users = Arc::new(UserManager::new(
            store.clone(),
            locks.clone(),
            counters.clone(),
        ));
        let parties = PartyManager::new(store.clone(), locks.clone(), counters, users.clone());
        let song_bank = SongBankAggregator::new(store.clone(), locks);
        Self {
            store,
            users,
            parties,
            song_bank,
            top_albums_limit: DEFAULT_TOP_ALBUMS_LIMIT,
        }
    }

    /// Opens the store named by the config, an in-memory one if it names none.
    pub fn open(config: &AppConfig) -> Result<Self> {
        let store: Arc<dyn DocumentStore> = match &config.db_path {
            Some(path) => Arc::new(
                SqliteDocumentStore::new(path)
                    .with_context(|| format!("Failed to open database {:?}", path))?,
            ),
            None => {
                info!("No database configured, records will not outlive this run");
                Arc::new(MemoryDocumentStore::new())
            }
        };
        Ok(Self::new(store).with_top_albums_limit(config.top_albums_limit))
    }

    pub fn with_top_albums_limit(mut self, limit: usize) -> Self {
        self.top_albums_limit = limit;
        self
    }

    pub fn users(&self) -> &UserManager {
        &self.users
    }

    pub fn parties(&self) -> &PartyManager {
        &self.parties
    }

    pub fn song_bank(&self) -> &SongBankAggregator {
        &self.song_bank
    }

    /// Top albums with the configured limit.
    pub fn top_albums(&self) -> PartyResult<Vec<Album>> {
        self.song_bank.top_albums(self.top_albums_limit)
    }

    pub fn current_stats(&self) -> PartyResult<Stats> {
        Ok(Stats {
            users: self.store.count(Collection::Users)?,
            parties: self.store.count(Collection::Parties)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::party::NewParty;
    use crate::song_bank::{AlbumObservation, SongSubmission};
    use crate::user::NewUser;

    #[test]
    fn test_party_lifecycle_through_facade() {
        let app = PartyPlay::new(Arc::new(MemoryDocumentStore::new()));
        assert_eq!(
            app.current_stats().unwrap(),
            Stats {
                users: 0,
                parties: 0
            }
        );

        app.users()
            .create_user(NewUser::new("host", "Host"))
            .unwrap();
        app.users()
            .create_user(NewUser::new("guest", "Guest"))
            .unwrap();
        app.parties()
            .create_party("host", NewParty::new("P1", "Friday"))
            .unwrap();
        app.parties().join_party("guest", "P1").unwrap();
        app.song_bank()
            .merge_songs("P1", vec![SongSubmission::new("a")])
            .unwrap();
        app.parties().join_party("guest", "P1").unwrap();

        // Membership changes and song merges touch the same record.
        let party = app.parties().get_party("P1").unwrap();
        assert_eq!(party.members.len(), 2);
        assert_eq!(party.songs.len(), 1);
        assert_eq!(
            app.current_stats().unwrap(),
            Stats {
                users: 2,
                parties: 1
            }
        );
    }

    #[test]
    fn test_configured_top_albums_limit() {
        let app = PartyPlay::new(Arc::new(MemoryDocumentStore::new())).with_top_albums_limit(2);
        let observations: Vec<AlbumObservation> = ["a", "b", "c"]
            .iter()
            .map(|id| AlbumObservation::new(*id, *id, "artist"))
            .collect();
        app.song_bank()
            .record_album_observations(&observations)
            .unwrap();

        assert_eq!(app.top_albums().unwrap().len(), 2);
    }

    #[test]
    fn test_open_without_db_path_uses_memory() {
        let config = AppConfig::resolve(&crate::config::CliConfig::default(), None).unwrap();
        let app = PartyPlay::open(&config).unwrap();
        assert_eq!(app.current_stats().unwrap().users, 0);
    }
}
