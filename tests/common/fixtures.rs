//! Test fixtures backed by a SQLite file in a temporary directory

use super::constants::*;
use partyplay::party::NewParty;
use partyplay::user::NewUser;
use partyplay::{PartyPlay, SqliteDocumentStore};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

pub struct TestApp {
    pub app: PartyPlay,
    pub db_path: PathBuf,
    // Deleted on drop
    _dir: TempDir,
}

impl TestApp {
    /// An app over an empty database.
    pub fn empty() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = dir.path().join("partyplay.db");
        let app = Self::open(&db_path);
        Self {
            app,
            db_path,
            _dir: dir,
        }
    }

    /// An app with a host, a guest and one party hosted by the host.
    pub fn with_party() -> Self {
        let test_app = Self::empty();
        let users = test_app.app.users();
        users
            .create_user(
                NewUser::new(HOST_SPOTIFY_ID, HOST_NAME).with_tokens("host-access", "host-refresh"),
            )
            .expect("Failed to create host");
        users
            .create_user(NewUser::new(GUEST_SPOTIFY_ID, GUEST_NAME))
            .expect("Failed to create guest");
        test_app
            .app
            .parties()
            .create_party(HOST_SPOTIFY_ID, NewParty::new(PARTY_ID, PARTY_NAME))
            .expect("Failed to create party");
        test_app
    }

    fn open(db_path: &PathBuf) -> PartyPlay {
        let store = SqliteDocumentStore::new(db_path).expect("Failed to open test database");
        PartyPlay::new(Arc::new(store))
    }

    /// A second app over the same database file.
    pub fn reopen(&self) -> PartyPlay {
        Self::open(&self.db_path)
    }
}
