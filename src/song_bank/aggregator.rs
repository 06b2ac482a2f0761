use super::song_models::{Album, AlbumObservation, Song, SongSubmission};
use crate::document_store::{Collection, DocumentStore, Increment, KeyedLocks};
use crate::error::{PartyError, PartyResult};
use crate::records;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// How many albums `top_albums` returns when the caller has no preference.
pub const DEFAULT_TOP_ALBUMS_LIMIT: usize = 12;

const SONGS_FIELD: &str = "songs";
const ALBUM_COUNT_FIELD: &str = "count";

/// Merges `incoming` into `bank`.
///
/// A link already in the bank gets its score bumped by one and keeps its
/// stored metadata; a new link is appended with its own score (1 unless the
/// submission carries one). Order is first insertion.
///
/// Fails with `InvalidArgument` if a score would go past `u32::MAX`.
pub fn merge_into_bank(bank: Vec<Song>, incoming: Vec<SongSubmission>) -> PartyResult<Vec<Song>> {
    let mut merged = bank;
    let mut index_by_link: HashMap<String, usize> = merged
        .iter()
        .enumerate()
        .map(|(index, song)| (song.link.clone(), index))
        .collect();

    for submission in incoming {
        match index_by_link.get(&submission.link) {
            Some(&index) => {
                let song = &mut merged[index];
                song.score = song.score.checked_add(1).ok_or_else(|| {
                    PartyError::invalid(format!("score of {} cannot grow any further", song.link))
                })?;
            }
            None => {
                index_by_link.insert(submission.link.clone(), merged.len());
                merged.push(submission.into_song());
            }
        }
    }
    Ok(merged)
}

/// Keeps each party's song bank and the global album catalog.
///
/// Song bank updates take the party's entry in the shared `KeyedLocks`, the
/// same one every other writer of party records uses.
pub struct SongBankAggregator {
    store: Arc<dyn DocumentStore>,
    locks: Arc<KeyedLocks>,
}

impl SongBankAggregator {
    pub fn new(store: Arc<dyn DocumentStore>, locks: Arc<KeyedLocks>) -> Self {
        Self { store, locks }
    }

    fn load_party(&self, party_key: &str) -> PartyResult<Map<String, Value>> {
        let value = self
            .store
            .get(Collection::Parties, party_key)?
            .ok_or_else(|| PartyError::not_found(Collection::Parties, party_key))?;
        records::decode(Collection::Parties, party_key, value)
    }

    fn songs_of(party_key: &str, party: &Map<String, Value>) -> PartyResult<Vec<Song>> {
        match party.get(SONGS_FIELD) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(songs) => records::decode(Collection::Parties, party_key, songs.clone()),
        }
    }

    /// Adds the submitted songs to the party's song bank.
    pub fn merge_songs(&self, party_key: &str, incoming: Vec<SongSubmission>) -> PartyResult<()> {
        if let Err(e) = incoming.iter().try_for_each(SongSubmission::validate) {
            warn!("Rejected song submission for party {}: {}", party_key, e);
            return Err(e);
        }
        let submitted = incoming.len();

        self.locks.run(Collection::Parties, party_key, || -> PartyResult<()> {
            let mut party = self.load_party(party_key)?;
            let bank = Self::songs_of(party_key, &party)?;
            let merged = merge_into_bank(bank, incoming)?;
            let bank_size = merged.len();

            let songs = records::encode(Collection::Parties, party_key, &merged)?;
            party.insert(SONGS_FIELD.to_string(), songs);
            self.store.put(Collection::Parties, party_key, &Value::Object(party))?;

            debug!(
                "Merged {} submissions into party {}, song bank has {} songs",
                submitted, party_key, bank_size
            );
            Ok(())
        })
    }

    /// Returns the party's song bank in insertion order.
    pub fn get_song_bank(&self, party_key: &str) -> PartyResult<Vec<Song>> {
        let party = self.load_party(party_key)?;
        Self::songs_of(party_key, &party)
    }

    /// Counts each observation against its album, creating albums on their
    /// first sighting. Metadata of an existing album is never overwritten.
    pub fn record_album_observations(&self, observations: &[AlbumObservation]) -> PartyResult<()> {
        if let Some(bad) = observations.iter().find(|o| o.id.trim().is_empty()) {
            warn!("Rejected album observation without catalog key: {:?}", bad);
            return Err(PartyError::invalid("album catalog key cannot be empty"));
        }

        let seeds = observations
            .iter()
            .map(|o| records::encode(Collection::Albums, &o.id, o))
            .collect::<PartyResult<Vec<_>>>()?;
        let increments: Vec<Increment<'_>> = observations
            .iter()
            .zip(seeds.iter())
            .map(|(o, seed)| Increment {
                key: &o.id,
                field: ALBUM_COUNT_FIELD,
                delta: 1,
                seed,
            })
            .collect();

        self.store
            .increment_or_insert(Collection::Albums, &increments)?;
        debug!("Recorded {} album observations", observations.len());
        Ok(())
    }

    /// Returns up to `limit` albums, most observed first. Albums with the same
    /// count keep the order in which they were first seen.
    pub fn top_albums(&self, limit: usize) -> PartyResult<Vec<Album>> {
        if limit == 0 {
            return Err(PartyError::invalid("top albums limit must be positive"));
        }
        let mut albums = self.get_all_albums()?;
        // sort_by is stable, ties stay in insertion order
        albums.sort_by(|a, b| b.count.cmp(&a.count));
        albums.truncate(limit);
        Ok(albums)
    }

    /// Returns the whole album catalog in insertion order.
    pub fn get_all_albums(&self) -> PartyResult<Vec<Album>> {
        self.store
            .list(Collection::Albums)?
            .into_iter()
            .map(|value| {
                let key = value
                    .get("id")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                records::decode(Collection::Albums, &key, value)
            })
            .collect()
    }
}
