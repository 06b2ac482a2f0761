use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    /// Identity on the music service, unique across users.
    pub spotify_id: String,
    pub name: String,
    #[serde(default)]
    pub uri: String,
    /// Playlist ids of the parties this user hosts or joined.
    #[serde(default)]
    pub parties: Vec<String>,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
}

/// What a caller provides to register a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub spotify_id: String,
    pub name: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
}

impl NewUser {
    pub fn new(spotify_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            spotify_id: spotify_id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_tokens(
        mut self,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        self.access_token = access_token.into();
        self.refresh_token = refresh_token.into();
        self
    }

    pub(crate) fn into_user(self, id: u64) -> User {
        User {
            id,
            spotify_id: self.spotify_id,
            name: self.name,
            uri: self.uri,
            parties: Vec::new(),
            access_token: self.access_token,
            refresh_token: self.refresh_token,
        }
    }
}
