//! Core data model shared by the parser, predictor, FK resolver and reporters.
//!
//! Everything in here is plain data: built once per analysis run and never
//! mutated by the engine.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// CLASSIFICATION ENUMS
// =============================================================================

/// DDL execution algorithm chosen by InnoDB
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Algorithm {
    /// Metadata-only change, no rewrite
    Instant,
    /// Online rewrite in place
    Inplace,
    /// Blocking full-table copy
    Copy,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Instant => "INSTANT",
            Algorithm::Inplace => "INPLACE",
            Algorithm::Copy => "COPY",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concurrent DML lock level held while the DDL runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LockLevel {
    None,
    Shared,
    Exclusive,
}

impl LockLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LockLevel::None => "NONE",
            LockLevel::Shared => "SHARED",
            LockLevel::Exclusive => "EXCLUSIVE",
        }
    }

    /// Suffix used by the text report after the lock name
    pub fn describe(&self) -> &'static str {
        match self {
            LockLevel::None => " (concurrent DML allowed)",
            LockLevel::Shared => " (DML writes blocked)",
            LockLevel::Exclusive => " (DML blocked)",
        }
    }
}

impl fmt::Display for LockLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk tiers, ordered from least to most dangerous
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// ALTER ACTIONS
// =============================================================================

/// Every ALTER TABLE action kind the analyzer understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    // Column operations
    AddColumn,
    DropColumn,
    ModifyColumn,
    ChangeColumn,
    RenameColumn,
    AlterColumnSetDefault,
    AlterColumnDropDefault,

    // Index and key operations
    AddIndex,
    AddUniqueIndex,
    AddFulltextIndex,
    AddSpatialIndex,
    DropIndex,
    RenameIndex,
    AddPrimaryKey,
    DropPrimaryKey,
    AddForeignKey,
    DropForeignKey,

    // Table operations
    RenameTable,
    ConvertCharacterSet,
    SpecifyCharacterSet,
    ChangeEngine,
    ChangeRowFormat,
    ChangeAutoIncrement,
    ChangeKeyBlockSize,
    ForceRebuild,
    SetTableStats,
    TableEncryption,

    // Partition operations
    AddPartition,
    DropPartition,
    CoalescePartition,
    ReorganizePartition,
    TruncatePartition,
    RebuildPartition,
    ExchangePartition,
    CheckPartition,
    OptimizePartition,
    RepairPartition,
    DiscardPartitionTablespace,
    ImportPartitionTablespace,
    RemovePartitioning,
    PartitionBy,
}

impl ActionKind {
    pub const ALL: [ActionKind; 41] = [
        ActionKind::AddColumn,
        ActionKind::DropColumn,
        ActionKind::ModifyColumn,
        ActionKind::ChangeColumn,
        ActionKind::RenameColumn,
        ActionKind::AlterColumnSetDefault,
        ActionKind::AlterColumnDropDefault,
        ActionKind::AddIndex,
        ActionKind::AddUniqueIndex,
        ActionKind::AddFulltextIndex,
        ActionKind::AddSpatialIndex,
        ActionKind::DropIndex,
        ActionKind::RenameIndex,
        ActionKind::AddPrimaryKey,
        ActionKind::DropPrimaryKey,
        ActionKind::AddForeignKey,
        ActionKind::DropForeignKey,
        ActionKind::RenameTable,
        ActionKind::ConvertCharacterSet,
        ActionKind::SpecifyCharacterSet,
        ActionKind::ChangeEngine,
        ActionKind::ChangeRowFormat,
        ActionKind::ChangeAutoIncrement,
        ActionKind::ChangeKeyBlockSize,
        ActionKind::ForceRebuild,
        ActionKind::SetTableStats,
        ActionKind::TableEncryption,
        ActionKind::AddPartition,
        ActionKind::DropPartition,
        ActionKind::CoalescePartition,
        ActionKind::ReorganizePartition,
        ActionKind::TruncatePartition,
        ActionKind::RebuildPartition,
        ActionKind::ExchangePartition,
        ActionKind::CheckPartition,
        ActionKind::OptimizePartition,
        ActionKind::RepairPartition,
        ActionKind::DiscardPartitionTablespace,
        ActionKind::ImportPartitionTablespace,
        ActionKind::RemovePartitioning,
        ActionKind::PartitionBy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::AddColumn => "ADD_COLUMN",
            ActionKind::DropColumn => "DROP_COLUMN",
            ActionKind::ModifyColumn => "MODIFY_COLUMN",
            ActionKind::ChangeColumn => "CHANGE_COLUMN",
            ActionKind::RenameColumn => "RENAME_COLUMN",
            ActionKind::AlterColumnSetDefault => "ALTER_COLUMN_SET_DEFAULT",
            ActionKind::AlterColumnDropDefault => "ALTER_COLUMN_DROP_DEFAULT",
            ActionKind::AddIndex => "ADD_INDEX",
            ActionKind::AddUniqueIndex => "ADD_UNIQUE_INDEX",
            ActionKind::AddFulltextIndex => "ADD_FULLTEXT_INDEX",
            ActionKind::AddSpatialIndex => "ADD_SPATIAL_INDEX",
            ActionKind::DropIndex => "DROP_INDEX",
            ActionKind::RenameIndex => "RENAME_INDEX",
            ActionKind::AddPrimaryKey => "ADD_PRIMARY_KEY",
            ActionKind::DropPrimaryKey => "DROP_PRIMARY_KEY",
            ActionKind::AddForeignKey => "ADD_FOREIGN_KEY",
            ActionKind::DropForeignKey => "DROP_FOREIGN_KEY",
            ActionKind::RenameTable => "RENAME_TABLE",
            ActionKind::ConvertCharacterSet => "CONVERT_CHARACTER_SET",
            ActionKind::SpecifyCharacterSet => "SPECIFY_CHARACTER_SET",
            ActionKind::ChangeEngine => "CHANGE_ENGINE",
            ActionKind::ChangeRowFormat => "CHANGE_ROW_FORMAT",
            ActionKind::ChangeAutoIncrement => "CHANGE_AUTO_INCREMENT",
            ActionKind::ChangeKeyBlockSize => "CHANGE_KEY_BLOCK_SIZE",
            ActionKind::ForceRebuild => "FORCE_REBUILD",
            ActionKind::SetTableStats => "SET_TABLE_STATS",
            ActionKind::TableEncryption => "TABLE_ENCRYPTION",
            ActionKind::AddPartition => "ADD_PARTITION",
            ActionKind::DropPartition => "DROP_PARTITION",
            ActionKind::CoalescePartition => "COALESCE_PARTITION",
            ActionKind::ReorganizePartition => "REORGANIZE_PARTITION",
            ActionKind::TruncatePartition => "TRUNCATE_PARTITION",
            ActionKind::RebuildPartition => "REBUILD_PARTITION",
            ActionKind::ExchangePartition => "EXCHANGE_PARTITION",
            ActionKind::CheckPartition => "CHECK_PARTITION",
            ActionKind::OptimizePartition => "OPTIMIZE_PARTITION",
            ActionKind::RepairPartition => "REPAIR_PARTITION",
            ActionKind::DiscardPartitionTablespace => "DISCARD_PARTITION_TABLESPACE",
            ActionKind::ImportPartitionTablespace => "IMPORT_PARTITION_TABLESPACE",
            ActionKind::RemovePartitioning => "REMOVE_PARTITIONING",
            ActionKind::PartitionBy => "PARTITION_BY",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generated column flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GeneratedKind {
    Stored,
    Virtual,
}

/// Payload of an action. Only the fields relevant to its kind are populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionDetail {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub column_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub old_column_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub column_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub old_column_type: String,
    /// `None` means the statement did not say; MySQL treats that as nullable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_nullable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub was_nullable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// "" for trailing, "FIRST" or "AFTER <col>"
    #[serde(skip_serializing_if = "String::is_empty")]
    pub position: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub index_name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub index_columns: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub old_index_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub constraint_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ref_table: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ref_columns: Vec<String>,
    /// Target of RENAME TO
    #[serde(skip_serializing_if = "String::is_empty")]
    pub new_table: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub engine: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub charset: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub row_format: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_auto_increment: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_type: Option<GeneratedKind>,
}

impl ActionDetail {
    /// Nullability as MySQL resolves it: unspecified is nullable
    pub fn resolved_nullable(&self) -> bool {
        self.is_nullable.unwrap_or(true)
    }

    pub fn is_trailing(&self) -> bool {
        self.position.is_empty()
    }
}

/// A single ALTER TABLE action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterAction {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    #[serde(default)]
    pub detail: ActionDetail,
}

impl AlterAction {
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            detail: ActionDetail::default(),
        }
    }

    pub fn with_detail(kind: ActionKind, detail: ActionDetail) -> Self {
        Self { kind, detail }
    }
}

/// One parsed ALTER TABLE statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterOperation {
    #[serde(default)]
    pub schema: String,
    pub table: String,
    pub actions: Vec<AlterAction>,
    #[serde(default)]
    pub raw_sql: String,
}

// =============================================================================
// TABLE METADATA
// =============================================================================

/// Read-only metadata for one table, captured at analysis time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSnapshot {
    pub schema: String,
    pub table: String,
    pub engine: String,
    pub row_count: u64,
    pub data_length: u64,
    pub index_length: u64,
    pub is_partitioned: bool,
    /// RANGE, LIST, HASH, KEY, LINEAR HASH, LINEAR KEY
    pub partition_type: String,
    pub columns: Vec<ColumnMeta>,
    pub indexes: Vec<IndexMeta>,
    /// Keys this table declares (pointing at parents)
    pub foreign_keys: Vec<ForeignKeyMeta>,
    /// Keys other tables declare against this table (children)
    pub referenced_by: Vec<ForeignKeyMeta>,
    pub mysql_version: String,
}

impl TableSnapshot {
    /// Case-insensitive column lookup
    pub fn column(&self, name: &str) -> Option<&ColumnMeta> {
        self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn is_innodb(&self) -> bool {
        self.engine.eq_ignore_ascii_case("InnoDB")
    }

    pub fn has_fulltext_index(&self) -> bool {
        self.indexes
            .iter()
            .any(|idx| idx.index_type.eq_ignore_ascii_case("FULLTEXT"))
    }

    /// HASH and KEY partitioning redistribute rows when partitions change
    pub fn is_hash_or_key_partitioned(&self) -> bool {
        matches!(
            self.partition_type.to_ascii_uppercase().as_str(),
            "HASH" | "KEY" | "LINEAR HASH" | "LINEAR KEY"
        )
    }

    /// True if an inbound foreign key references `column`
    pub fn is_referenced_column(&self, column: &str) -> bool {
        self.referenced_by.iter().any(|fk| {
            fk.referenced_columns
                .iter()
                .any(|c| c.eq_ignore_ascii_case(column))
        })
    }

    pub fn qualified_name(&self) -> String {
        qualified_name(&self.schema, &self.table)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMeta {
    pub name: String,
    pub ordinal_position: u32,
    pub data_type: String,
    pub column_type: String,
    pub is_nullable: bool,
    pub column_key: String,
    pub default_value: Option<String>,
    /// e.g. "auto_increment", "STORED GENERATED", "VIRTUAL GENERATED"
    pub extra: String,
    pub character_set: String,
    pub collation: String,
}

impl ColumnMeta {
    pub fn is_generated(&self) -> bool {
        self.extra.to_ascii_uppercase().contains("GENERATED")
    }

    pub fn is_stored_generated(&self) -> bool {
        self.extra.to_ascii_uppercase().contains("STORED GENERATED")
    }

    pub fn is_virtual_generated(&self) -> bool {
        self.extra.to_ascii_uppercase().contains("VIRTUAL GENERATED")
    }

    pub fn same_type_as(&self, column_type: &str) -> bool {
        self.column_type.eq_ignore_ascii_case(column_type)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexMeta {
    pub name: String,
    pub columns: Vec<String>,
    pub is_unique: bool,
    pub is_primary: bool,
    /// BTREE, FULLTEXT, SPATIAL, HASH
    pub index_type: String,
}

/// A foreign key edge, as declared by `source_table`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForeignKeyMeta {
    pub constraint_name: String,
    pub source_schema: String,
    pub source_table: String,
    pub source_columns: Vec<String>,
    pub referenced_schema: String,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
    pub on_delete: String,
    pub on_update: String,
}

impl ForeignKeyMeta {
    /// True if `column` is on either side of the constraint
    pub fn involves_column(&self, column: &str) -> bool {
        self.source_columns
            .iter()
            .chain(self.referenced_columns.iter())
            .any(|c| c.eq_ignore_ascii_case(column))
    }
}

// =============================================================================
// TABLE IDENTITY
// =============================================================================

/// "schema.table", collapsing to the bare table when the schema is empty
pub fn qualified_name(schema: &str, table: &str) -> String {
    if schema.is_empty() {
        table.to_string()
    } else {
        format!("{}.{}", schema, table)
    }
}

/// Inverse of [`qualified_name`]. Only the first dot separates schema from table.
pub fn split_qualified_name(name: &str) -> (String, String) {
    match name.split_once('.') {
        Some((schema, table)) => (schema.to_string(), table.to_string()),
        None => (String::new(), name.to_string()),
    }
}
