use super::schema::DOCUMENT_VERSIONED_SCHEMAS;
use super::{seeded_record, validate_field_name, Collection, DocumentStore, Increment};
use crate::sqlite_persistence::{read_schema_version, VersionedSchema};
use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

const UPSERT_INCREMENT_SQL: &str = "INSERT INTO documents (collection, key, body, updated_at)
     VALUES (?1, ?2, ?3, ?6)
     ON CONFLICT(collection, key) DO UPDATE SET
         body = json_set(documents.body, ?4, COALESCE(json_extract(documents.body, ?4), 0) + ?5),
         updated_at = ?6
     RETURNING json_extract(body, ?4)";

pub struct SqliteDocumentStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDocumentStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let path = db_path.as_ref();
        let is_new_db = !path.exists();

        let conn = Connection::open(path).context("Failed to open document database")?;

        if is_new_db {
            info!("Creating new document database at {:?}", path);
            Self::latest_schema()?.create(&conn)?;
        } else {
            let db_version = read_schema_version(&conn)?;
            if db_version < 1 {
                bail!(
                    "Document database version {} is invalid (expected >= 1)",
                    db_version
                );
            }

            let schema = DOCUMENT_VERSIONED_SCHEMAS
                .iter()
                .find(|s| s.version as i64 == db_version)
                .with_context(|| format!("Unknown document database version {}", db_version))?;
            schema.validate(&conn).with_context(|| {
                format!(
                    "Document database schema validation failed for version {}",
                    db_version
                )
            })?;
            info!("Opened document database at {:?} (version {})", path, db_version);
        }

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn latest_schema() -> Result<&'static VersionedSchema> {
        DOCUMENT_VERSIONED_SCHEMAS
            .last()
            .context("No document schema defined")
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("Document database connection lock poisoned"))
    }

    fn now() -> i64 {
        Utc::now().timestamp()
    }

    fn json_path(field: &str) -> Result<String> {
        validate_field_name(field)?;
        Ok(format!("$.{}", field))
    }

    fn parse_body(collection: Collection, key: &str, body: &str) -> Result<Value> {
        serde_json::from_str(body)
            .with_context(|| format!("Corrupt JSON body for {}/{}", collection, key))
    }

    fn json_to_sql(value: &Value) -> Result<SqlValue> {
        Ok(match value {
            Value::String(s) => SqlValue::Text(s.clone()),
            Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => SqlValue::Integer(i),
                (None, Some(f)) => SqlValue::Real(f),
                _ => bail!("Unsupported number {} in document query", n),
            },
            other => bail!("Cannot match documents on value {}", other),
        })
    }
}

impl DocumentStore for SqliteDocumentStore {
    fn get(&self, collection: Collection, key: &str) -> Result<Option<Value>> {
        let conn = self.conn()?;
        let body: Option<String> = conn
            .query_row(
                "SELECT body FROM documents WHERE collection = ?1 AND key = ?2",
                params![collection.as_str(), key],
                |row| row.get(0),
            )
            .optional()?;

        body.map(|b| Self::parse_body(collection, key, &b))
            .transpose()
    }

    fn find_one(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Option<(String, Value)>> {
        let path = Self::json_path(field)?;
        let needle = Self::json_to_sql(value)?;
        let conn = self.conn()?;
        let found: Option<(String, String)> = conn
            .query_row(
                "SELECT key, body FROM documents
                 WHERE collection = ?1 AND json_extract(body, ?2) = ?3
                 ORDER BY seq LIMIT 1",
                params![collection.as_str(), path, needle],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        found
            .map(|(key, body)| -> Result<(String, Value)> {
                let record = Self::parse_body(collection, &key, &body)?;
                Ok((key, record))
            })
            .transpose()
    }

    fn list(&self, collection: Collection) -> Result<Vec<Value>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT key, body FROM documents WHERE collection = ?1 ORDER BY seq")?;
        let rows = stmt
            .query_map(params![collection.as_str()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.iter()
            .map(|(key, body)| Self::parse_body(collection, key, body))
            .collect()
    }

    fn count(&self, collection: Collection) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?1",
            params![collection.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn put(&self, collection: Collection, key: &str, record: &Value) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO documents (collection, key, body, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(collection, key) DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at",
            params![collection.as_str(), key, record.to_string(), Self::now()],
        )?;
        debug!("Stored {}/{}", collection, key);
        Ok(())
    }

    fn insert(&self, collection: Collection, key: &str, record: &Value) -> Result<bool> {
        let conn = self.conn()?;
        let inserted = conn.execute(
            "INSERT INTO documents (collection, key, body, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(collection, key) DO NOTHING",
            params![collection.as_str(), key, record.to_string(), Self::now()],
        )?;
        Ok(inserted == 1)
    }

    fn atomic_increment(
        &self,
        collection: Collection,
        key: &str,
        field: &str,
        delta: i64,
    ) -> Result<Option<i64>> {
        let path = Self::json_path(field)?;
        let conn = self.conn()?;
        let value: Option<i64> = conn
            .query_row(
                "UPDATE documents
                 SET body = json_set(body, ?3, COALESCE(json_extract(body, ?3), 0) + ?4),
                     updated_at = ?5
                 WHERE collection = ?1 AND key = ?2
                 RETURNING json_extract(body, ?3)",
                params![collection.as_str(), key, path, delta, Self::now()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn increment_or_insert(
        &self,
        collection: Collection,
        increments: &[Increment<'_>],
    ) -> Result<Vec<i64>> {
        // Build every statement argument up front so a bad increment fails
        // before the transaction starts.
        let prepared = increments
            .iter()
            .map(|inc| -> Result<(&Increment<'_>, String, String)> {
                let path = Self::json_path(inc.field)?;
                let seed = seeded_record(inc.seed, inc.field, inc.delta)?;
                Ok((inc, path, seed.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut conn = self.conn()?;
        let now = Self::now();
        let tx = conn.transaction()?;
        let mut values = Vec::with_capacity(prepared.len());
        {
            let mut stmt = tx.prepare(UPSERT_INCREMENT_SQL)?;
            for (inc, path, seed) in &prepared {
                let value: i64 = stmt.query_row(
                    params![collection.as_str(), inc.key, seed, path, inc.delta, now],
                    |row| row.get(0),
                )?;
                values.push(value);
            }
        }
        tx.commit()?;
        Ok(values)
    }
}
