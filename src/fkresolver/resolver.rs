//! Foreign key traversal
//!
//! Walks outbound keys (parents) and inbound keys (children) from the altered
//! table. One visited set is created per `resolve` call and seeded with the
//! root, so cycles stop with a warning instead of looping. Depth is bounded by
//! `max_depth` independently of cycle detection.

use crate::fkresolver::graph::{FkDirection, FkGraph, FkRelation};
use crate::fkresolver::propagation::determine_lock_impact;
use crate::meta::{qualified_name, AlterAction, ForeignKeyMeta, MetadataProvider};
use std::collections::HashSet;
use tracing::debug;

pub const DEFAULT_MAX_DEPTH: u32 = 5;

/// FK dependency resolver
#[derive(Debug, Clone, Copy)]
pub struct Resolver {
    max_depth: u32,
    fk_checks: bool,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH, true)
    }
}

impl Resolver {
    pub fn new(max_depth: u32, fk_checks: bool) -> Self {
        Self { max_depth, fk_checks }
    }

    /// Build the FK graph around `schema.table`.
    ///
    /// Never fails: with FK checks disabled or no metadata for the root, the
    /// graph is empty.
    pub fn resolve(
        &self,
        provider: &dyn MetadataProvider,
        schema: &str,
        table: &str,
        actions: &[AlterAction],
    ) -> FkGraph {
        let root = qualified_name(schema, table);
        let mut walk = Traversal {
            provider,
            actions,
            max_depth: self.max_depth,
            visited: HashSet::from([root.clone()]),
            graph: FkGraph::new(root, self.max_depth),
        };

        if !self.fk_checks {
            debug!("FK checks disabled, skipping resolution for {}", walk.graph.root);
            return walk.graph;
        }

        let snapshot = match provider.get_table_meta(schema, table) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                debug!("No metadata for {}, skipping FK resolution: {}", walk.graph.root, e);
                return walk.graph;
            }
        };

        for fk in &snapshot.foreign_keys {
            walk.parent(fk, 1);
        }
        for fk in &snapshot.referenced_by {
            walk.child(fk, 1);
        }

        debug!(
            "Resolved FK graph for {}: {} parents, {} children, {} warnings",
            walk.graph.root,
            walk.graph.parents.len(),
            walk.graph.children.len(),
            walk.graph.warnings.len()
        );
        walk.graph
    }
}

/// State of one `resolve` call
struct Traversal<'a> {
    provider: &'a dyn MetadataProvider,
    actions: &'a [AlterAction],
    max_depth: u32,
    visited: HashSet<String>,
    graph: FkGraph,
}

impl Traversal<'_> {
    /// Record `key` as visited, or warn and return false if it already was
    fn enter(&mut self, key: &str) -> bool {
        if self.visited.insert(key.to_string()) {
            return true;
        }
        self.graph
            .warnings
            .push(format!("Circular FK reference detected: {} (skipping)", key));
        false
    }

    fn relation(&self, key: String, fk: &ForeignKeyMeta, direction: FkDirection, depth: u32) -> FkRelation {
        FkRelation {
            table: key,
            constraint: fk.clone(),
            direction,
            depth,
            lock_impact: determine_lock_impact(self.actions, fk),
        }
    }

    fn parent(&mut self, fk: &ForeignKeyMeta, depth: u32) {
        if depth > self.max_depth {
            return;
        }
        let key = qualified_name(&fk.referenced_schema, &fk.referenced_table);
        if !self.enter(&key) {
            return;
        }
        let relation = self.relation(key, fk, FkDirection::Parent, depth);
        self.graph.parents.push(relation);

        // A missing parent truncates this branch only
        if let Ok(parent) = self
            .provider
            .get_table_meta(&fk.referenced_schema, &fk.referenced_table)
        {
            for next in &parent.foreign_keys {
                self.parent(next, depth + 1);
            }
        }
    }

    fn child(&mut self, fk: &ForeignKeyMeta, depth: u32) {
        if depth > self.max_depth {
            return;
        }
        let key = qualified_name(&fk.source_schema, &fk.source_table);
        if !self.enter(&key) {
            return;
        }
        let relation = self.relation(key, fk, FkDirection::Child, depth);
        self.graph.children.push(relation);

        if let Ok(child) = self.provider.get_table_meta(&fk.source_schema, &fk.source_table) {
            for next in &child.referenced_by {
                self.child(next, depth + 1);
            }
        }
    }
}
