use crate::document_store::Collection;
use thiserror::Error;

/// Errors surfaced by the party, user and song bank operations.
#[derive(Debug, Error)]
pub enum PartyError {
    #[error("{collection} record not found: {key}")]
    NotFound { collection: Collection, key: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{collection} record already exists: {key}")]
    AlreadyExists { collection: Collection, key: String },

    #[error("malformed {collection} record {key}: {source}")]
    MalformedRecord {
        collection: Collection,
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] anyhow::Error),
}

impl PartyError {
    pub fn not_found(collection: Collection, key: impl Into<String>) -> Self {
        PartyError::NotFound {
            collection,
            key: key.into(),
        }
    }

    pub fn already_exists(collection: Collection, key: impl Into<String>) -> Self {
        PartyError::AlreadyExists {
            collection,
            key: key.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        PartyError::InvalidArgument(message.into())
    }
}

pub type PartyResult<T> = Result<T, PartyError>;
