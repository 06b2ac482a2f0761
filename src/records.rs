//! Typed access to JSON documents.

use crate::document_store::{Collection, DocumentStore};
use crate::error::{PartyError, PartyResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

pub(crate) fn decode<T: DeserializeOwned>(
    collection: Collection,
    key: &str,
    value: Value,
) -> PartyResult<T> {
    serde_json::from_value(value).map_err(|source| PartyError::MalformedRecord {
        collection,
        key: key.to_string(),
        source,
    })
}

pub(crate) fn encode<T: Serialize>(
    collection: Collection,
    key: &str,
    record: &T,
) -> PartyResult<Value> {
    serde_json::to_value(record).map_err(|source| PartyError::MalformedRecord {
        collection,
        key: key.to_string(),
        source,
    })
}

/// Loads and decodes the record under `key`, Ok(None) if there is none.
pub(crate) fn load<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: Collection,
    key: &str,
) -> PartyResult<Option<T>> {
    store
        .get(collection, key)?
        .map(|value| decode(collection, key, value))
        .transpose()
}

/// Loads and decodes the record under `key`, failing with `NotFound`.
pub(crate) fn require<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: Collection,
    key: &str,
) -> PartyResult<T> {
    load(store, collection, key)?.ok_or_else(|| PartyError::not_found(collection, key))
}

pub(crate) fn save<T: Serialize>(
    store: &dyn DocumentStore,
    collection: Collection,
    key: &str,
    record: &T,
) -> PartyResult<()> {
    let value = encode(collection, key, record)?;
    store.put(collection, key, &value)?;
    Ok(())
}
