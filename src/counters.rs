//! Named sequences handing out numeric record ids.

use crate::document_store::{Collection, DocumentStore, Increment};
use crate::error::{PartyError, PartyResult};
use anyhow::anyhow;
use serde_json::{json, Value};
use std::sync::Arc;

const VALUE_FIELD: &str = "value";

pub const USERS_COUNTER: &str = "users";
pub const PARTIES_COUNTER: &str = "parties";

pub struct Counters {
    store: Arc<dyn DocumentStore>,
}

impl Counters {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Returns the next id of the `name` sequence. The first id is 1.
    pub fn next(&self, name: &str) -> PartyResult<u64> {
        let seed: Value = json!({ "name": name });
        let values = self.store.increment_or_insert(
            Collection::Counters,
            &[Increment {
                key: name,
                field: VALUE_FIELD,
                delta: 1,
                seed: &seed,
            }],
        )?;
        let value = values
            .first()
            .copied()
            .ok_or_else(|| PartyError::not_found(Collection::Counters, name))?;
        u64::try_from(value)
            .map_err(|_| anyhow!("Counter {} went negative: {}", name, value).into())
    }

    /// The last id handed out for `name`, 0 if none was.
    pub fn current(&self, name: &str) -> PartyResult<u64> {
        let value = self
            .store
            .get(Collection::Counters, name)?
            .and_then(|record| record.get(VALUE_FIELD).and_then(Value::as_u64));
        Ok(value.unwrap_or(0))
    }
}
