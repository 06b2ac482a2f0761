//! Shared constants for integration tests

/// Spotify id of the user hosting the test party
pub const HOST_SPOTIFY_ID: &str = "spotify-host";

/// Display name of the host user
pub const HOST_NAME: &str = "Hosting Harriet";

/// Spotify id of a registered user who is not in the party yet
pub const GUEST_SPOTIFY_ID: &str = "spotify-guest";

pub const GUEST_NAME: &str = "Guest Gabe";

/// Playlist id of the party created by `TestApp::with_party`
pub const PARTY_ID: &str = "playlist-friday";

pub const PARTY_NAME: &str = "Friday Night";

/// Top tracks payload with two tracks from album-1 and one from album-2
pub const TOP_TRACKS_JSON: &str = include_str!("../fixtures/top-tracks.json");
