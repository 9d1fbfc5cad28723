//! Rule table
//!
//! One entry per action kind. An entry is either a fixed outcome (context-free
//! kinds such as DROP INDEX) or an ordered list of guarded rules. Inside a list
//! the first rule whose condition holds wins, so rules are declared from the
//! most specific condition down to an unconditional catch-all. Reordering them
//! changes results.

mod columns;
mod indexes;
mod partitions;
mod tables;

use crate::meta::{ActionKind, Algorithm, AlterAction, LockLevel, RiskLevel, TableSnapshot};
use crate::predictor::risk::classify_risk;
use crate::predictor::PredictOptions;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

/// What a rule predicts
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub description: &'static str,
    pub algorithm: Algorithm,
    pub lock: LockLevel,
    pub rebuild: bool,
    pub notes: &'static [&'static str],
    pub warnings: &'static [&'static str],
}

impl Outcome {
    pub fn new(description: &'static str, algorithm: Algorithm, lock: LockLevel, rebuild: bool) -> Self {
        Self {
            description,
            algorithm,
            lock,
            rebuild,
            notes: &[],
            warnings: &[],
        }
    }

    pub fn notes(mut self, notes: &'static [&'static str]) -> Self {
        self.notes = notes;
        self
    }

    pub fn warnings(mut self, warnings: &'static [&'static str]) -> Self {
        self.warnings = warnings;
        self
    }

    pub fn risk(&self) -> RiskLevel {
        classify_risk(self.algorithm, self.lock, self.rebuild)
    }
}

/// Everything a condition may look at
pub struct RuleContext<'a> {
    pub action: &'a AlterAction,
    pub table: Option<&'a TableSnapshot>,
    pub options: &'a PredictOptions,
}

pub type Condition = fn(&RuleContext<'_>) -> bool;

/// A guarded outcome
#[derive(Debug, Clone)]
pub struct Rule {
    pub condition: Condition,
    pub outcome: Outcome,
}

impl Rule {
    pub fn when(condition: Condition, outcome: Outcome) -> Self {
        Self { condition, outcome }
    }

    /// Catch-all rule, always last in its list
    pub fn otherwise(outcome: Outcome) -> Self {
        Self {
            condition: always,
            outcome,
        }
    }
}

/// Rules for one action kind
#[derive(Debug, Clone)]
pub enum RuleSet {
    Fixed(Outcome),
    Ordered(Vec<Rule>),
}

impl RuleSet {
    fn select(&self, ctx: &RuleContext<'_>) -> Option<&Outcome> {
        match self {
            RuleSet::Fixed(outcome) => Some(outcome),
            RuleSet::Ordered(rules) => rules
                .iter()
                .find(|rule| (rule.condition)(ctx))
                .map(|rule| &rule.outcome),
        }
    }

    fn outcomes(&self) -> Vec<(&Outcome, bool)> {
        match self {
            RuleSet::Fixed(outcome) => vec![(outcome, false)],
            RuleSet::Ordered(rules) => rules.iter().map(|rule| (&rule.outcome, true)).collect(),
        }
    }
}

/// Flattened rule listing for `rules` output and `GET /api/rules`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSummary {
    pub action_type: ActionKind,
    pub description: String,
    pub algorithm: Algorithm,
    pub lock_level: LockLevel,
    pub table_rebuild: bool,
    pub risk_level: RiskLevel,
    /// False for context-free kinds that always produce the same outcome
    pub conditional: bool,
}

/// The full catalogue, built once per predictor
#[derive(Debug, Clone)]
pub struct RuleTable {
    entries: HashMap<ActionKind, RuleSet>,
}

impl RuleTable {
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        for (kind, set) in columns::rules()
            .into_iter()
            .chain(indexes::rules())
            .chain(tables::rules())
            .chain(partitions::rules())
        {
            entries.insert(kind, set);
        }
        Self { entries }
    }

    /// The single dispatch point: fixed outcome, or first matching rule
    pub fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<&Outcome> {
        self.get(ctx.action.kind).and_then(|set| set.select(ctx))
    }

    pub fn get(&self, kind: ActionKind) -> Option<&RuleSet> {
        self.entries.get(&kind)
    }

    /// Every rule in action-kind order, then declaration order
    pub fn list(&self) -> Vec<RuleSummary> {
        ActionKind::ALL
            .iter()
            .filter_map(|kind| self.get(*kind).map(|set| (*kind, set)))
            .flat_map(|(kind, set)| {
                set.outcomes()
                    .into_iter()
                    .map(move |(outcome, conditional)| RuleSummary {
                        action_type: kind,
                        description: outcome.description.to_string(),
                        algorithm: outcome.algorithm,
                        lock_level: outcome.lock,
                        table_rebuild: outcome.rebuild,
                        risk_level: outcome.risk(),
                        conditional,
                    })
            })
            .collect()
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// CONDITION HELPERS
// =============================================================================

fn always(_: &RuleContext<'_>) -> bool {
    true
}

static VARCHAR_LENGTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)varchar\((\d+)\)").expect("valid varchar pattern"));

/// Declared length of a `VARCHAR(n)` type, if it is one
pub(crate) fn varchar_length(column_type: &str) -> Option<u32> {
    VARCHAR_LENGTH
        .captures(column_type)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// ENUM(...) or SET(...) column type
pub(crate) fn enum_or_set_base(column_type: &str) -> Option<&'static str> {
    let upper = column_type.trim_start().to_ascii_uppercase();
    if upper.starts_with("ENUM") {
        Some("ENUM")
    } else if upper.starts_with("SET") {
        Some("SET")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_every_kind_has_rules() {
        let table = RuleTable::new();
        for kind in ActionKind::ALL {
            assert!(table.get(kind).is_some(), "no rules for {}", kind);
        }
    }

    #[test]
    fn test_every_kind_matches_without_context() {
        let table = RuleTable::new();
        let options = PredictOptions::default();
        for kind in ActionKind::ALL {
            let action = AlterAction::new(kind);
            let ctx = RuleContext {
                action: &action,
                table: None,
                options: &options,
            };
            assert!(table.evaluate(&ctx).is_some(), "{} has no catch-all", kind);
        }
    }

    #[test]
    fn test_varchar_length_extraction() {
        assert_eq!(varchar_length("varchar(255)"), Some(255));
        assert_eq!(varchar_length("VARCHAR(1024) CHARACTER SET utf8mb4"), Some(1024));
        assert_eq!(varchar_length("text"), None);
        assert_eq!(varchar_length("char(10)"), None);
    }

    #[test]
    fn test_enum_or_set_base() {
        assert_eq!(enum_or_set_base("enum('a','b')"), Some("ENUM"));
        assert_eq!(enum_or_set_base("SET('x')"), Some("SET"));
        assert_eq!(enum_or_set_base("varchar(10)"), None);
    }

    #[test]
    fn test_listing_covers_all_rules() {
        let table = RuleTable::new();
        let listing = table.list();
        assert!(listing.len() > ActionKind::ALL.len());
        let drop_pk = listing
            .iter()
            .find(|r| r.action_type == ActionKind::DropPrimaryKey)
            .unwrap();
        assert_eq!(drop_pk.risk_level, RiskLevel::Critical);
        assert!(!drop_pk.conditional);
    }
}
