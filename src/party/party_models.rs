use crate::song_bank::Song;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Host,
    Guest,
}

/// A user's details as captured when they entered a party. Never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    pub spotify_id: String,
    pub role: MemberRole,
    #[serde(default)]
    pub uri: String,
    /// Unix millis.
    pub join_time: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub id: u64,
    pub playlist_id: String,
    pub playlist_name: String,
    pub host: Member,
    /// Host first, then guests in joining order.
    pub members: Vec<Member>,
    #[serde(default)]
    pub songs: Vec<Song>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub duration_minutes: u32,
}

impl Party {
    pub fn member(&self, spotify_id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.spotify_id == spotify_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewParty {
    pub playlist_id: String,
    pub playlist_name: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub duration_minutes: u32,
}

impl NewParty {
    pub fn new(playlist_id: impl Into<String>, playlist_name: impl Into<String>) -> Self {
        Self {
            playlist_id: playlist_id.into(),
            playlist_name: playlist_name.into(),
            ..Default::default()
        }
    }
}
