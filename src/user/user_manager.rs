use super::user_models::{NewUser, User};
use crate::counters::{Counters, USERS_COUNTER};
use crate::document_store::{Collection, DocumentStore, KeyedLocks};
use crate::error::{PartyError, PartyResult};
use crate::records;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct UserManager {
    store: Arc<dyn DocumentStore>,
    locks: Arc<KeyedLocks>,
    counters: Arc<Counters>,
}

impl UserManager {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        locks: Arc<KeyedLocks>,
        counters: Arc<Counters>,
    ) -> Self {
        Self {
            store,
            locks,
            counters,
        }
    }

    /// Registers a user and returns its numeric id.
    pub fn create_user(&self, new_user: NewUser) -> PartyResult<u64> {
        if new_user.spotify_id.trim().is_empty() {
            warn!("Rejected user without spotify id");
            return Err(PartyError::invalid("the spotify id cannot be empty"));
        }
        let spotify_id = new_user.spotify_id.clone();

        self.locks.run(Collection::Users, &spotify_id, || -> PartyResult<u64> {
            if self.store.get(Collection::Users, &spotify_id)?.is_some() {
                return Err(PartyError::already_exists(Collection::Users, &spotify_id));
            }
            let id = self.counters.next(USERS_COUNTER)?;
            let user = new_user.into_user(id);
            let record = records::encode(Collection::Users, &spotify_id, &user)?;
            if !self.store.insert(Collection::Users, &spotify_id, &record)? {
                return Err(PartyError::already_exists(Collection::Users, &spotify_id));
            }
            info!("Created user {} with id {}", spotify_id, id);
            Ok(id)
        })
    }

    pub fn find_by_spotify_id(&self, spotify_id: &str) -> PartyResult<Option<User>> {
        records::load(&*self.store, Collection::Users, spotify_id)
    }

    fn require_by_spotify_id(&self, spotify_id: &str) -> PartyResult<User> {
        records::require(&*self.store, Collection::Users, spotify_id)
    }

    pub fn get_user(&self, id: u64) -> PartyResult<User> {
        let (key, value) = self
            .store
            .find_one(Collection::Users, "id", &Value::from(id))?
            .ok_or_else(|| PartyError::not_found(Collection::Users, id.to_string()))?;
        records::decode(Collection::Users, &key, value)
    }

    pub fn get_users(&self) -> PartyResult<Vec<User>> {
        self.store
            .list(Collection::Users)?
            .into_iter()
            .map(|value| {
                let key = value
                    .get("spotify_id")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                records::decode(Collection::Users, &key, value)
            })
            .collect()
    }

    pub fn get_user_id(&self, spotify_id: &str) -> PartyResult<u64> {
        Ok(self.require_by_spotify_id(spotify_id)?.id)
    }

    pub fn get_access_token(&self, id: u64) -> PartyResult<String> {
        Ok(self.get_user(id)?.access_token)
    }

    /// Applies `f` to the stored user and writes it back, holding the user's lock.
    fn modify_user<T>(
        &self,
        spotify_id: &str,
        f: impl FnOnce(&mut User) -> T,
    ) -> PartyResult<T> {
        self.locks.run(Collection::Users, spotify_id, || -> PartyResult<T> {
            let mut user = self.require_by_spotify_id(spotify_id)?;
            let result = f(&mut user);
            records::save(&*self.store, Collection::Users, spotify_id, &user)?;
            Ok(result)
        })
    }

    pub fn update_tokens(
        &self,
        spotify_id: &str,
        access_token: &str,
        refresh_token: &str,
    ) -> PartyResult<()> {
        self.modify_user(spotify_id, |user| {
            user.access_token = access_token.to_string();
            user.refresh_token = refresh_token.to_string();
        })?;
        debug!("Updated tokens of user {}", spotify_id);
        Ok(())
    }

    /// Records `playlist_id` among the user's parties.
    /// Returns false if it was already there.
    pub fn add_party(&self, spotify_id: &str, playlist_id: &str) -> PartyResult<bool> {
        let added = self.modify_user(spotify_id, |user| {
            if user.parties.iter().any(|p| p == playlist_id) {
                false
            } else {
                user.parties.push(playlist_id.to_string());
                true
            }
        })?;
        if added {
            debug!("Added party {} to user {}", playlist_id, spotify_id);
        }
        Ok(added)
    }
}
