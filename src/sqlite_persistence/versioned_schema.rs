use anyhow::{bail, Result};
use rusqlite::{params, types::Type, Connection};

pub const DEFAULT_TIMESTAMP: &str = "(cast(strftime('%s','now') as int))";

/// `PRAGMA user_version` is stored as `BASE_DB_VERSION + schema version`, so a
/// database created by something else (user_version 0) is never mistaken for ours.
pub const BASE_DB_VERSION: usize = 71000;

#[macro_export]
macro_rules! sqlite_column {
    ($name:expr, $sql_type:expr $(, $field:ident = $value:expr)*) => {
        {
            #[allow(unused_mut)]
            let mut column = $crate::sqlite_persistence::Column {
                name: $name,
                sql_type: $sql_type,
                is_primary_key: false,
                non_null: false,
                default_value: None,
            };
            $(
                column.$field = $value;
            )*
            column
        }
    };
}

#[derive(Debug, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Integer,
    Real,
    Blob,
}

impl SqlType {
    fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
            SqlType::Blob => "BLOB",
        }
    }

    fn parse(s: &str) -> Option<&'static SqlType> {
        match s {
            "TEXT" => Some(&SqlType::Text),
            "INTEGER" => Some(&SqlType::Integer),
            "REAL" => Some(&SqlType::Real),
            "BLOB" => Some(&SqlType::Blob),
            _ => None,
        }
    }
}

pub struct Column<'a, S: AsRef<str>> {
    pub name: S,
    pub sql_type: &'a SqlType,
    pub is_primary_key: bool,
    pub non_null: bool,
    pub default_value: Option<S>,
}

pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column<'static, &'static str>],
    pub indices: &'static [(&'static str, &'static str)],
    pub unique_constraints: &'static [&'static [&'static str]],
}

impl Table {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        let columns_sql = self
            .columns
            .iter()
            .map(|column| {
                let mut sql = format!("{} {}", column.name, column.sql_type.as_sql());
                if column.is_primary_key {
                    sql.push_str(" PRIMARY KEY");
                }
                if column.non_null {
                    sql.push_str(" NOT NULL");
                }
                if let Some(default_value) = column.default_value {
                    sql.push_str(&format!(" DEFAULT {}", default_value));
                }
                sql
            })
            .chain(
                self.unique_constraints
                    .iter()
                    .map(|columns| format!("UNIQUE ({})", columns.join(", "))),
            )
            .collect::<Vec<_>>()
            .join(", ");

        conn.execute(
            &format!("CREATE TABLE {} ({});", self.name, columns_sql),
            params![],
        )?;

        for (index_name, column_name) in self.indices {
            conn.execute(
                &format!(
                    "CREATE INDEX {} ON {}({});",
                    index_name, self.name, column_name
                ),
                params![],
            )?;
        }
        Ok(())
    }

    fn read_columns(&self, conn: &Connection) -> Result<Vec<Column<'static, String>>> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", self.name))?;
        let columns = stmt
            .query_map(params![], |row| {
                let type_name: String = row.get(2)?;
                let sql_type = SqlType::parse(&type_name).ok_or_else(|| {
                    rusqlite::Error::InvalidColumnType(2, type_name.clone(), Type::Text)
                })?;
                Ok(Column {
                    name: row.get::<_, String>(1)?,
                    sql_type,
                    non_null: row.get::<_, i32>(3)? == 1,
                    default_value: row.get::<_, Option<String>>(4)?,
                    is_primary_key: row.get::<_, i32>(5)? == 1,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(columns)
    }

    fn validate(&self, conn: &Connection) -> Result<()> {
        let actual_columns = self.read_columns(conn)?;
        if actual_columns.len() != self.columns.len() {
            bail!(
                "Table {} has {} columns, expected {}. Found: {}, expected: {}",
                self.name,
                actual_columns.len(),
                self.columns.len(),
                actual_columns
                    .iter()
                    .map(|c| c.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
                self.columns
                    .iter()
                    .map(|c| c.name)
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        for (actual, expected) in actual_columns.iter().zip(self.columns.iter()) {
            if actual.name != expected.name {
                bail!(
                    "Table {} column name mismatch: expected {}, got {}",
                    self.name,
                    expected.name,
                    actual.name
                );
            }
            if actual.sql_type != expected.sql_type {
                bail!(
                    "Table {} column {} type mismatch: expected {:?}, got {:?}",
                    self.name,
                    expected.name,
                    expected.sql_type,
                    actual.sql_type
                );
            }
            if actual.non_null != expected.non_null {
                bail!(
                    "Table {} column {} non-null mismatch: expected {}, got {}",
                    self.name,
                    expected.name,
                    expected.non_null,
                    actual.non_null
                );
            }
            // SQLite may or may not report the parentheses around expression defaults
            if actual
                .default_value
                .as_ref()
                .map(strip_leading_and_trailing_parentheses)
                != expected
                    .default_value
                    .map(strip_leading_and_trailing_parentheses)
            {
                bail!(
                    "Table {} column {} default value mismatch: expected {:?}, got {:?}",
                    self.name,
                    expected.name,
                    expected.default_value,
                    actual.default_value
                );
            }
            if actual.is_primary_key != expected.is_primary_key {
                bail!(
                    "Table {} column {} primary key mismatch: expected {}, got {}",
                    self.name,
                    expected.name,
                    expected.is_primary_key,
                    actual.is_primary_key
                );
            }
        }

        for (index_name, _columns) in self.indices {
            let index_exists: bool = conn
                .query_row(
                    "SELECT 1 FROM sqlite_master WHERE type='index' AND name=?1 AND tbl_name=?2",
                    params![index_name, self.name],
                    |_| Ok(true),
                )
                .unwrap_or(false);
            if !index_exists {
                bail!("Table {} is missing index '{}'", self.name, index_name);
            }
        }

        if !self.unique_constraints.is_empty() {
            let unique_index_columns = self.read_unique_index_columns(conn)?;
            for expected_columns in self.unique_constraints {
                let mut expected_sorted: Vec<&str> = expected_columns.to_vec();
                expected_sorted.sort();
                let found = unique_index_columns.iter().any(|actual| {
                    actual.iter().map(|s| s.as_str()).collect::<Vec<_>>() == expected_sorted
                });
                if !found {
                    bail!(
                        "Table {} is missing unique constraint on columns ({})",
                        self.name,
                        expected_columns.join(", ")
                    );
                }
            }
        }
        Ok(())
    }

    /// Column sets (sorted) of every unique index on this table, including
    /// the implicit ones SQLite creates for `UNIQUE (...)` clauses.
    fn read_unique_index_columns(&self, conn: &Connection) -> Result<Vec<Vec<String>>> {
        let mut stmt = conn.prepare(&format!("PRAGMA index_list({})", self.name))?;
        let unique_indices: Vec<String> = stmt
            .query_map([], |row| {
                let name: String = row.get(1)?;
                let is_unique: i32 = row.get(2)?;
                Ok((name, is_unique))
            })?
            .filter_map(|r| r.ok())
            .filter(|(_, is_unique)| *is_unique == 1)
            .map(|(name, _)| name)
            .collect();

        let mut result = Vec::with_capacity(unique_indices.len());
        for index_name in &unique_indices {
            let mut idx_stmt = conn.prepare(&format!("PRAGMA index_info({})", index_name))?;
            let mut cols: Vec<String> = idx_stmt
                .query_map([], |row| row.get::<_, String>(2))?
                .filter_map(|r| r.ok())
                .collect();
            cols.sort();
            result.push(cols);
        }
        Ok(result)
    }
}

pub struct VersionedSchema {
    pub version: usize,
    pub tables: &'static [Table],
}

fn strip_leading_and_trailing_parentheses<S: AsRef<str>>(s: S) -> String {
    let s = s.as_ref();
    if s.starts_with('(') && s.ends_with(')') {
        s[1..s.len() - 1].to_string()
    } else {
        s.to_string()
    }
}

impl VersionedSchema {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        for table in self.tables {
            table.create(conn)?;
        }
        conn.execute(
            &format!("PRAGMA user_version = {}", BASE_DB_VERSION + self.version),
            [],
        )?;
        Ok(())
    }

    pub fn validate(&self, conn: &Connection) -> Result<()> {
        for table in self.tables {
            table.validate(conn)?;
        }
        Ok(())
    }
}

/// Reads the schema version stored in `PRAGMA user_version`.
pub fn read_schema_version(conn: &Connection) -> Result<i64> {
    let raw_version: i64 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    Ok(raw_version - BASE_DB_VERSION as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite_column;

    const PEOPLE_TABLE: Table = Table {
        name: "people",
        columns: &[
            sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
            sqlite_column!("email", &SqlType::Text, non_null = true),
            sqlite_column!("handle", &SqlType::Text, non_null = true),
            sqlite_column!(
                "created_at",
                &SqlType::Integer,
                non_null = true,
                default_value = Some(DEFAULT_TIMESTAMP)
            ),
        ],
        indices: &[("idx_people_handle", "handle")],
        unique_constraints: &[&["email", "handle"]],
    };

    const SCHEMA: VersionedSchema = VersionedSchema {
        version: 3,
        tables: &[PEOPLE_TABLE],
    };

    #[test]
    fn test_create_then_validate() {
        let conn = Connection::open_in_memory().unwrap();
        SCHEMA.create(&conn).unwrap();
        SCHEMA.validate(&conn).unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), 3);
    }

    #[test]
    fn test_validate_detects_missing_column() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(
            "CREATE TABLE people (id INTEGER PRIMARY KEY, email TEXT NOT NULL, handle TEXT NOT NULL)",
            [],
        )
        .unwrap();

        let err = SCHEMA.validate(&conn).unwrap_err().to_string();
        assert!(err.contains("has 3 columns, expected 4"), "{}", err);
    }

    #[test]
    fn test_validate_detects_missing_index() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(
            &format!(
                "CREATE TABLE people (id INTEGER PRIMARY KEY, email TEXT NOT NULL, handle TEXT NOT NULL, created_at INTEGER NOT NULL DEFAULT {}, UNIQUE (email, handle))",
                DEFAULT_TIMESTAMP
            ),
            [],
        )
        .unwrap();

        let err = SCHEMA.validate(&conn).unwrap_err().to_string();
        assert!(err.contains("missing index 'idx_people_handle'"), "{}", err);
    }

    #[test]
    fn test_validate_detects_missing_unique_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(
            &format!(
                "CREATE TABLE people (id INTEGER PRIMARY KEY, email TEXT NOT NULL, handle TEXT NOT NULL, created_at INTEGER NOT NULL DEFAULT {})",
                DEFAULT_TIMESTAMP
            ),
            [],
        )
        .unwrap();
        conn.execute("CREATE INDEX idx_people_handle ON people(handle)", [])
            .unwrap();

        let err = SCHEMA.validate(&conn).unwrap_err().to_string();
        assert!(err.contains("missing unique constraint"), "{}", err);
        assert!(err.contains("email, handle"), "{}", err);
    }

    #[test]
    fn test_validate_detects_type_mismatch() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(
            &format!(
                "CREATE TABLE people (id INTEGER PRIMARY KEY, email BLOB NOT NULL, handle TEXT NOT NULL, created_at INTEGER NOT NULL DEFAULT {}, UNIQUE (email, handle))",
                DEFAULT_TIMESTAMP
            ),
            [],
        )
        .unwrap();

        let err = SCHEMA.validate(&conn).unwrap_err().to_string();
        assert!(err.contains("column email type mismatch"), "{}", err);
    }
}
