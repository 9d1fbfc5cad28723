//! FK dependency graph types

use crate::meta::{ForeignKeyMeta, LockLevel};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which way an edge points relative to the altered table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FkDirection {
    /// The altered table (or an ancestor) references this table
    Parent,
    /// This table references the altered table (or a descendant)
    Child,
}

impl FkDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            FkDirection::Parent => "PARENT",
            FkDirection::Child => "CHILD",
        }
    }
}

impl fmt::Display for FkDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lock a linked table is expected to take while the DDL runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockImpact {
    /// A metadata lock is taken on the linked table
    pub metadata_lock: bool,
    pub lock_level: LockLevel,
    /// Human-readable cause
    pub reason: String,
}

/// One edge of the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FkRelation {
    /// Qualified name of the linked table
    pub table: String,
    /// The constraint that links it
    pub constraint: ForeignKeyMeta,
    pub direction: FkDirection,
    /// Hops from the altered table, starting at 1
    pub depth: u32,
    pub lock_impact: LockImpact,
}

/// Tables transitively linked to the altered table through foreign keys
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FkGraph {
    pub root: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<FkRelation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FkRelation>,
    pub max_depth: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl FkGraph {
    pub fn new(root: impl Into<String>, max_depth: u32) -> Self {
        Self {
            root: root.into(),
            max_depth,
            ..Default::default()
        }
    }

    pub fn total_affected_tables(&self) -> usize {
        self.parents.len() + self.children.len()
    }

    /// Parents first, then children
    pub fn all_relations(&self) -> Vec<&FkRelation> {
        self.parents.iter().chain(self.children.iter()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.total_affected_tables() == 0
    }
}
