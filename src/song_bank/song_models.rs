use crate::error::{PartyError, PartyResult};
use serde::{Deserialize, Serialize};

/// An entry of a party's song bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    /// Track link, unique within one song bank.
    pub link: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub artist: String,
    /// Number of submissions that referenced this link.
    pub score: u32,
}

/// A song as submitted by a party member.
///
/// `score` is only set when re-submitting songs that already went through a
/// merge elsewhere; a fresh suggestion leaves it empty and starts at 1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongSubmission {
    pub link: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
}

impl SongSubmission {
    pub fn new(link: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            ..Default::default()
        }
    }

    pub fn with_metadata(mut self, name: impl Into<String>, artist: impl Into<String>) -> Self {
        self.name = name.into();
        self.artist = artist.into();
        self
    }

    pub fn with_score(mut self, score: u32) -> Self {
        self.score = Some(score);
        self
    }

    pub(crate) fn validate(&self) -> PartyResult<()> {
        if self.link.trim().is_empty() {
            return Err(PartyError::invalid("song link cannot be empty"));
        }
        if self.score == Some(0) {
            return Err(PartyError::invalid(format!(
                "song {} has a score of 0, scores start at 1",
                self.link
            )));
        }
        Ok(())
    }

    pub(crate) fn into_song(self) -> Song {
        Song {
            score: self.score.unwrap_or(1),
            link: self.link,
            name: self.name,
            artist: self.artist,
        }
    }
}

/// A catalog album with the number of times it was observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    /// Catalog key from the music service.
    pub id: String,
    pub name: String,
    pub artist: String,
    #[serde(default)]
    pub art: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    pub count: u64,
}

/// One sighting of an album in a member's listening data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumObservation {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub art: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

impl AlbumObservation {
    pub fn new(id: impl Into<String>, name: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            artist: artist.into(),
            ..Default::default()
        }
    }
}
