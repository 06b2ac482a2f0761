use super::party_models::{Member, MemberRole, NewParty, Party};
use crate::counters::{Counters, PARTIES_COUNTER};
use crate::document_store::{Collection, DocumentStore, KeyedLocks};
use crate::error::{PartyError, PartyResult};
use crate::records;
use crate::user::UserManager;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Splits a "rock/indie pop/jazz" style string into genre tags.
pub fn parse_genres(genres: &str) -> Vec<String> {
    genres
        .split('/')
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect()
}

pub struct PartyManager {
    store: Arc<dyn DocumentStore>,
    locks: Arc<KeyedLocks>,
    counters: Arc<Counters>,
    users: Arc<UserManager>,
}

impl PartyManager {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        locks: Arc<KeyedLocks>,
        counters: Arc<Counters>,
        users: Arc<UserManager>,
    ) -> Self {
        Self {
            store,
            locks,
            counters,
            users,
        }
    }

    /// Captures the current details of a user as a party member.
    pub fn member_snapshot(&self, spotify_id: &str, role: MemberRole) -> PartyResult<Member> {
        let user = self
            .users
            .find_by_spotify_id(spotify_id)?
            .ok_or_else(|| PartyError::not_found(Collection::Users, spotify_id))?;
        Ok(Member {
            name: user.name,
            spotify_id: user.spotify_id,
            role,
            uri: user.uri,
            join_time: chrono::Utc::now().timestamp_millis(),
        })
    }

    /// Creates a party hosted by `host_spotify_id` and returns its numeric id.
    ///
    /// The party record is written before the host's party list. If the
    /// second write fails the party exists without being listed on the host;
    /// `join_party` by the host lists it.
    pub fn create_party(&self, host_spotify_id: &str, new_party: NewParty) -> PartyResult<u64> {
        if new_party.playlist_id.trim().is_empty() {
            warn!("Rejected party without playlist id");
            return Err(PartyError::invalid("the playlist id cannot be empty"));
        }
        let host = self.member_snapshot(host_spotify_id, MemberRole::Host)?;
        let playlist_id = new_party.playlist_id.clone();

        let id = self.locks.run(Collection::Parties, &playlist_id, || {
            self.insert_party(host, new_party)
        })?;

        self.users.add_party(host_spotify_id, &playlist_id)?;
        info!(
            "Created party {} ({}) hosted by {}",
            playlist_id, id, host_spotify_id
        );
        Ok(id)
    }

    /// Stores a new party record. Callers hold the party's lock.
    fn insert_party(&self, host: Member, new_party: NewParty) -> PartyResult<u64> {
        let playlist_id = new_party.playlist_id;
        if self.store.get(Collection::Parties, &playlist_id)?.is_some() {
            return Err(PartyError::already_exists(Collection::Parties, playlist_id));
        }
        let id = self.counters.next(PARTIES_COUNTER)?;
        let party = Party {
            id,
            playlist_id: playlist_id.clone(),
            playlist_name: new_party.playlist_name,
            members: vec![host.clone()],
            host,
            songs: Vec::new(),
            genres: new_party.genres,
            duration_minutes: new_party.duration_minutes,
        };
        let record = records::encode(Collection::Parties, &playlist_id, &party)?;
        if !self
            .store
            .insert(Collection::Parties, &playlist_id, &record)?
        {
            return Err(PartyError::already_exists(Collection::Parties, playlist_id));
        }
        Ok(id)
    }

    /// Applies `f` to the stored party and writes it back, holding the party's lock.
    fn modify_party<T>(
        &self,
        playlist_id: &str,
        f: impl FnOnce(&mut Party) -> PartyResult<T>,
    ) -> PartyResult<T> {
        self.locks.run(Collection::Parties, playlist_id, || -> PartyResult<T> {
            let mut party: Party =
                records::require(&*self.store, Collection::Parties, playlist_id)?;
            let result = f(&mut party)?;
            records::save(&*self.store, Collection::Parties, playlist_id, &party)?;
            Ok(result)
        })
    }

    pub fn update_party(
        &self,
        playlist_id: &str,
        playlist_name: &str,
        genres: Vec<String>,
        duration_minutes: u32,
    ) -> PartyResult<()> {
        self.modify_party(playlist_id, |party| {
            party.playlist_name = playlist_name.to_string();
            party.genres = genres;
            party.duration_minutes = duration_minutes;
            Ok(())
        })?;
        debug!("Updated party {}", playlist_id);
        Ok(())
    }

    /// Adds the user to the party as a guest and returns their member entry.
    /// A user who already belongs to the party gets their existing entry back.
    pub fn join_party(&self, spotify_id: &str, playlist_id: &str) -> PartyResult<Member> {
        let member = self.modify_party(playlist_id, |party| {
            if let Some(existing) = party.member(spotify_id) {
                return Ok(existing.clone());
            }
            let member = self.member_snapshot(spotify_id, MemberRole::Guest)?;
            party.members.push(member.clone());
            Ok(member)
        })?;

        if self.users.add_party(spotify_id, playlist_id)? {
            info!("User {} joined party {}", spotify_id, playlist_id);
        }
        Ok(member)
    }

    pub fn get_party(&self, playlist_id: &str) -> PartyResult<Party> {
        records::require(&*self.store, Collection::Parties, playlist_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document_store::failing_store::FailingDocumentStore;
    use crate::document_store::MemoryDocumentStore;
    use crate::user::NewUser;

    fn create_manager() -> PartyManager {
        create_manager_over(Arc::new(MemoryDocumentStore::new()))
    }

    fn create_manager_over(store: Arc<dyn DocumentStore>) -> PartyManager {
        let locks = Arc::new(KeyedLocks::new());
        let counters = Arc::new(Counters::new(store.clone()));
        let users = Arc::new(UserManager::new(
            store.clone(),
            locks.clone(),
            counters.clone(),
        ));
        users
            .create_user(NewUser::new("host-id", "Hosting Harriet"))
            .unwrap();
        users
            .create_user(NewUser::new("guest-id", "Guest Gabe"))
            .unwrap();
        PartyManager::new(store, locks, counters, users)
    }

    #[test]
    fn test_parse_genres() {
        assert_eq!(
            parse_genres("rock/ indie pop /jazz"),
            vec!["rock", "indie pop", "jazz"]
        );
        assert_eq!(parse_genres("house//"), vec!["house"]);
        assert!(parse_genres("").is_empty());
    }

    #[test]
    fn test_create_party() {
        let manager = create_manager();
        let mut new_party = NewParty::new("P1", "Friday");
        new_party.genres = parse_genres("rock/pop");
        new_party.duration_minutes = 90;

        let id = manager.create_party("host-id", new_party).unwrap();
        assert_eq!(id, 1);

        let party = manager.get_party("P1").unwrap();
        assert_eq!(party.host.spotify_id, "host-id");
        assert_eq!(party.host.role, MemberRole::Host);
        assert_eq!(party.members, vec![party.host.clone()]);
        assert!(party.songs.is_empty());
        assert_eq!(party.genres, vec!["rock", "pop"]);
        assert_eq!(party.duration_minutes, 90);

        let host = manager.users.find_by_spotify_id("host-id").unwrap().unwrap();
        assert_eq!(host.parties, vec!["P1"]);
    }

    #[test]
    fn test_create_party_errors() {
        let manager = create_manager();
        manager
            .create_party("host-id", NewParty::new("P1", "Friday"))
            .unwrap();

        assert!(matches!(
            manager.create_party("host-id", NewParty::new("P1", "Again")),
            Err(PartyError::AlreadyExists { .. })
        ));
        assert!(matches!(
            manager.create_party("nobody", NewParty::new("P2", "Orphan")),
            Err(PartyError::NotFound { .. })
        ));
        assert!(matches!(
            manager.create_party("host-id", NewParty::new("", "Blank")),
            Err(PartyError::InvalidArgument(_))
        ));
        assert_eq!(manager.get_party("P1").unwrap().playlist_name, "Friday");
    }

    #[test]
    fn test_update_party() {
        let manager = create_manager();
        manager
            .create_party("host-id", NewParty::new("P1", "Friday"))
            .unwrap();

        manager
            .update_party("P1", "Saturday", parse_genres("jazz"), 45)
            .unwrap();

        let party = manager.get_party("P1").unwrap();
        assert_eq!(party.playlist_name, "Saturday");
        assert_eq!(party.genres, vec!["jazz"]);
        assert_eq!(party.duration_minutes, 45);
        assert!(matches!(
            manager.update_party("missing", "x", vec![], 0),
            Err(PartyError::NotFound { .. })
        ));
    }

    #[test]
    fn test_join_party_once() {
        let manager = create_manager();
        manager
            .create_party("host-id", NewParty::new("P1", "Friday"))
            .unwrap();

        let member = manager.join_party("guest-id", "P1").unwrap();
        assert_eq!(member.role, MemberRole::Guest);
        assert_eq!(member.name, "Guest Gabe");

        let again = manager.join_party("guest-id", "P1").unwrap();
        assert_eq!(again, member);

        let party = manager.get_party("P1").unwrap();
        let ids: Vec<&str> = party.members.iter().map(|m| m.spotify_id.as_str()).collect();
        assert_eq!(ids, vec!["host-id", "guest-id"]);

        let guest = manager.users.find_by_spotify_id("guest-id").unwrap().unwrap();
        assert_eq!(guest.parties, vec!["P1"]);
    }

    #[test]
    fn test_host_joining_own_party_is_a_no_op() {
        let manager = create_manager();
        manager
            .create_party("host-id", NewParty::new("P1", "Friday"))
            .unwrap();

        let member = manager.join_party("host-id", "P1").unwrap();
        assert_eq!(member.role, MemberRole::Host);
        assert_eq!(manager.get_party("P1").unwrap().members.len(), 1);
    }

    #[test]
    fn test_join_errors_leave_party_untouched() {
        let manager = create_manager();
        manager
            .create_party("host-id", NewParty::new("P1", "Friday"))
            .unwrap();

        assert!(matches!(
            manager.join_party("guest-id", "missing"),
            Err(PartyError::NotFound { .. })
        ));
        assert!(matches!(
            manager.join_party("stranger", "P1"),
            Err(PartyError::NotFound { .. })
        ));
        assert_eq!(manager.get_party("P1").unwrap().members.len(), 1);
    }

    #[test]
    fn test_host_rejoin_lists_party_after_failed_listing() {
        let store = Arc::new(FailingDocumentStore::new());
        let manager = create_manager_over(store.clone());

        store.fail_writes(Collection::Users);
        assert!(matches!(
            manager.create_party("host-id", NewParty::new("P1", "Friday")),
            Err(PartyError::StoreUnavailable(_))
        ));
        assert_eq!(manager.get_party("P1").unwrap().host.spotify_id, "host-id");
        let host = manager.users.find_by_spotify_id("host-id").unwrap().unwrap();
        assert!(host.parties.is_empty());

        store.heal(Collection::Users);
        let member = manager.join_party("host-id", "P1").unwrap();
        assert_eq!(member.role, MemberRole::Host);
        assert_eq!(manager.get_party("P1").unwrap().members.len(), 1);
        let host = manager.users.find_by_spotify_id("host-id").unwrap().unwrap();
        assert_eq!(host.parties, vec!["P1"]);
    }
}
