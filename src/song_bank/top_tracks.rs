//! Album observations from a member's "top tracks" listening data.
//!
//! The payload is the music service's paged track list; only the album of
//! each item is looked at.

use super::song_models::AlbumObservation;
use crate::error::{PartyError, PartyResult};
use serde::Deserialize;

#[derive(Deserialize)]
struct TopTracksPage {
    #[serde(default)]
    items: Vec<TopTrack>,
}

#[derive(Deserialize)]
struct TopTrack {
    album: TrackAlbum,
}

#[derive(Deserialize)]
struct TrackAlbum {
    id: String,
    name: String,
    #[serde(default)]
    artists: Vec<AlbumArtist>,
    #[serde(default)]
    images: Vec<AlbumImage>,
    #[serde(default)]
    external_urls: ExternalUrls,
}

#[derive(Deserialize)]
struct AlbumArtist {
    name: String,
}

#[derive(Deserialize)]
struct AlbumImage {
    url: String,
}

#[derive(Deserialize, Default)]
struct ExternalUrls {
    spotify: Option<String>,
}

impl From<TrackAlbum> for AlbumObservation {
    fn from(album: TrackAlbum) -> Self {
        // Images come largest first; the second one is the mid-size cover.
        let art = album
            .images
            .get(1)
            .or_else(|| album.images.first())
            .map(|image| image.url.clone());
        AlbumObservation {
            id: album.id,
            name: album.name,
            artist: album
                .artists
                .into_iter()
                .next()
                .map(|artist| artist.name)
                .unwrap_or_default(),
            art,
            link: album.external_urls.spotify,
        }
    }
}

/// Turns a top tracks payload into one observation per listed track.
pub fn album_observations_from_top_tracks(payload: &str) -> PartyResult<Vec<AlbumObservation>> {
    let page: TopTracksPage = serde_json::from_str(payload)
        .map_err(|e| PartyError::invalid(format!("malformed top tracks payload: {}", e)))?;
    Ok(page
        .items
        .into_iter()
        .map(|track| AlbumObservation::from(track.album))
        .collect())
}
