//! SQLite schema definitions for the document database.
//!
//! Every collection lives in the same `documents` table; a record is the
//! JSON body stored under a `(collection, key)` pair. `seq` is the rowid
//! alias and gives collections their insertion order.

use crate::sqlite_column;
use crate::sqlite_persistence::{SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP};

// =============================================================================
// Version 1 - Documents
// =============================================================================

const DOCUMENTS_TABLE_V1: Table = Table {
    name: "documents",
    columns: &[
        sqlite_column!("seq", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("collection", &SqlType::Text, non_null = true),
        sqlite_column!("key", &SqlType::Text, non_null = true),
        sqlite_column!("body", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created_at",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!("updated_at", &SqlType::Integer),
    ],
    indices: &[("idx_documents_collection", "collection")],
    unique_constraints: &[&["collection", "key"]],
};

/// All versioned schemas for the document database, oldest first.
///
/// Version 1: documents table
pub const DOCUMENT_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 1,
    tables: &[DOCUMENTS_TABLE_V1],
}];
