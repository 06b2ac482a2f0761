//! Song banks of parties and the album catalog.

mod aggregator;
mod song_models;
mod top_tracks;

pub use aggregator::{merge_into_bank, SongBankAggregator, DEFAULT_TOP_ALBUMS_LIMIT};
pub use song_models::{Album, AlbumObservation, Song, SongSubmission};
pub use top_tracks::album_observations_from_top_tracks;
