//! Metadata providers
//!
//! The engine asks for table metadata through [`MetadataProvider`]. Lookups are
//! synchronous: live databases are captured up front into a [`Catalog`] by the
//! MySQL introspector, so traversal never blocks on I/O.

use crate::meta::types::{qualified_name, TableSnapshot};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors raised while collecting metadata
#[derive(Error, Debug)]
pub enum MetaError {
    #[error("table {0} not found in metadata")]
    TableNotFound(String),

    #[error("no metadata available in offline mode")]
    Offline,

    #[error("failed to read meta file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse meta file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("MySQL error: {0}")]
    Mysql(#[from] mysql_async::Error),

    #[error("invalid DSN: {0}")]
    InvalidDsn(String),
}

/// Read-only table metadata lookup
pub trait MetadataProvider: Send + Sync {
    fn get_table_meta(&self, schema: &str, table: &str) -> Result<TableSnapshot, MetaError>;

    fn mysql_version(&self) -> &str;
}

/// In-memory set of table snapshots, keyed by `schema.table` and by bare table name
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    snapshots: Vec<TableSnapshot>,
    index: HashMap<String, usize>,
    mysql_version: String,
}

impl Catalog {
    pub fn new(mysql_version: impl Into<String>) -> Self {
        Self {
            snapshots: Vec::new(),
            index: HashMap::new(),
            mysql_version: mysql_version.into(),
        }
    }

    /// Build a catalog from snapshots, stamping each with the server version
    pub fn from_snapshots(snapshots: Vec<TableSnapshot>, mysql_version: &str) -> Self {
        let mut catalog = Self::new(mysql_version);
        for snapshot in snapshots {
            catalog.insert(snapshot);
        }
        catalog
    }

    /// Parse a JSON array of table snapshots
    pub fn from_json(json: &str, mysql_version: &str) -> Result<Self, MetaError> {
        let snapshots: Vec<TableSnapshot> = serde_json::from_str(json)?;
        Ok(Self::from_snapshots(snapshots, mysql_version))
    }

    /// Load a metadata file (`--meta-file`)
    pub fn load_file(path: impl AsRef<Path>, mysql_version: &str) -> Result<Self, MetaError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&content, mysql_version)?;
        debug!("Loaded {} table snapshots from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn insert(&mut self, mut snapshot: TableSnapshot) {
        if !self.mysql_version.is_empty() {
            snapshot.mysql_version = self.mysql_version.clone();
        }
        let position = self.snapshots.len();
        self.index.insert(snapshot.qualified_name(), position);
        self.index.insert(snapshot.table.clone(), position);
        self.snapshots.push(snapshot);
    }

    pub fn get(&self, schema: &str, table: &str) -> Option<&TableSnapshot> {
        self.index
            .get(&qualified_name(schema, table))
            .or_else(|| self.index.get(table))
            .and_then(|&position| self.snapshots.get(position))
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Add every snapshot of `other` not already present under its qualified name
    pub fn merge(&mut self, other: Catalog) {
        for snapshot in other.snapshots {
            if !self.index.contains_key(&snapshot.qualified_name()) {
                self.insert(snapshot);
            }
        }
    }
}

impl MetadataProvider for Catalog {
    fn get_table_meta(&self, schema: &str, table: &str) -> Result<TableSnapshot, MetaError> {
        self.get(schema, table)
            .cloned()
            .ok_or_else(|| MetaError::TableNotFound(qualified_name(schema, table)))
    }

    fn mysql_version(&self) -> &str {
        &self.mysql_version
    }
}

/// Provider used with `--offline` and no metadata file: every lookup fails
#[derive(Debug, Clone)]
pub struct OfflineProvider {
    mysql_version: String,
}

impl OfflineProvider {
    pub fn new(mysql_version: impl Into<String>) -> Self {
        Self {
            mysql_version: mysql_version.into(),
        }
    }
}

impl MetadataProvider for OfflineProvider {
    fn get_table_meta(&self, _schema: &str, _table: &str) -> Result<TableSnapshot, MetaError> {
        Err(MetaError::Offline)
    }

    fn mysql_version(&self) -> &str {
        &self.mysql_version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const META_JSON: &str = r#"[
        {
            "schema": "shop",
            "table": "orders",
            "engine": "InnoDB",
            "row_count": 1200000,
            "data_length": 549453824,
            "index_length": 104857600,
            "columns": [
                {"name": "id", "ordinal_position": 1, "column_type": "bigint", "is_nullable": false},
                {"name": "user_id", "ordinal_position": 2, "column_type": "bigint", "is_nullable": false}
            ],
            "foreign_keys": [
                {
                    "constraint_name": "fk_orders_user",
                    "source_schema": "shop",
                    "source_table": "orders",
                    "source_columns": ["user_id"],
                    "referenced_schema": "shop",
                    "referenced_table": "users",
                    "referenced_columns": ["id"]
                }
            ]
        },
        {"schema": "shop", "table": "users", "engine": "InnoDB"}
    ]"#;

    #[test]
    fn test_catalog_lookup_by_qualified_and_bare_name() {
        let catalog = Catalog::from_json(META_JSON, "8.0.36").unwrap();
        assert_eq!(catalog.len(), 2);

        let orders = catalog.get_table_meta("shop", "orders").unwrap();
        assert_eq!(orders.row_count, 1_200_000);
        assert_eq!(orders.mysql_version, "8.0.36");

        // Unknown schema falls back to the bare table name
        let users = catalog.get_table_meta("", "users").unwrap();
        assert_eq!(users.schema, "shop");
        let users = catalog.get_table_meta("other", "users").unwrap();
        assert_eq!(users.table, "users");
    }

    #[test]
    fn test_catalog_missing_table() {
        let catalog = Catalog::from_json(META_JSON, "8.0").unwrap();
        let err = catalog.get_table_meta("shop", "payments").unwrap_err();
        assert!(matches!(err, MetaError::TableNotFound(ref name) if name == "shop.payments"));
    }

    #[test]
    fn test_catalog_rejects_malformed_json() {
        let err = Catalog::from_json("{not json", "8.0").unwrap_err();
        assert!(matches!(err, MetaError::Json(_)));
    }

    #[test]
    fn test_load_file_reports_io_errors() {
        let err = Catalog::load_file("/definitely/not/here.json", "8.0").unwrap_err();
        assert!(matches!(err, MetaError::Io(_)));
    }

    #[test]
    fn test_merge_keeps_first_capture() {
        let mut catalog = Catalog::from_json(META_JSON, "8.0").unwrap();
        let other = Catalog::from_snapshots(
            vec![
                TableSnapshot {
                    schema: "shop".into(),
                    table: "orders".into(),
                    row_count: 1,
                    ..Default::default()
                },
                TableSnapshot {
                    schema: "shop".into(),
                    table: "payments".into(),
                    ..Default::default()
                },
            ],
            "8.0",
        );
        catalog.merge(other);

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get_table_meta("shop", "orders").unwrap().row_count, 1_200_000);
        assert!(catalog.get_table_meta("shop", "payments").is_ok());
    }

    #[test]
    fn test_offline_provider_always_fails() {
        let provider = OfflineProvider::new("8.0");
        assert!(matches!(
            provider.get_table_meta("shop", "orders"),
            Err(MetaError::Offline)
        ));
        assert_eq!(provider.mysql_version(), "8.0");
    }
}
