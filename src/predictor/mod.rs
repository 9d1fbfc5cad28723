//! Lock prediction engine
//!
//! Maps one ALTER action plus the (optional) target table snapshot to a
//! [`Prediction`]. Total: every action gets an answer, falling back to the most
//! conservative outcome when nothing more specific applies.

pub mod duration;
pub mod risk;
pub mod rules;

pub use duration::{estimate_duration, DurationEstimate, TableInfo};
pub use risk::classify_risk;
pub use rules::{Outcome, RuleContext, RuleSummary, RuleTable};

use crate::meta::{ActionKind, Algorithm, AlterAction, AlterOperation, LockLevel, RiskLevel, TableSnapshot};
use serde::{Deserialize, Serialize};

/// Session settings that change rule outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictOptions {
    /// `foreign_key_checks` as it will be set when the DDL runs
    pub foreign_key_checks: bool,
}

impl Default for PredictOptions {
    fn default() -> Self {
        Self {
            foreign_key_checks: true,
        }
    }
}

/// Predicted behavior of one action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub action_type: ActionKind,
    pub description: String,
    pub algorithm: Algorithm,
    pub lock_level: LockLevel,
    pub table_rebuild: bool,
    pub risk_level: RiskLevel,
    pub table_info: TableInfo,
    pub duration: DurationEstimate,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Prediction {
    fn from_outcome(
        kind: ActionKind,
        description: String,
        outcome: (Algorithm, LockLevel, bool),
        table: Option<&TableSnapshot>,
    ) -> Self {
        let (algorithm, lock_level, table_rebuild) = outcome;
        Self {
            action_type: kind,
            description,
            algorithm,
            lock_level,
            table_rebuild,
            risk_level: classify_risk(algorithm, lock_level, table_rebuild),
            table_info: TableInfo::collect(table),
            duration: estimate_duration(algorithm, table_rebuild, table),
            notes: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// Rule-driven predictor
#[derive(Debug, Clone, Default)]
pub struct Predictor {
    rules: RuleTable,
    options: PredictOptions,
}

impl Predictor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: PredictOptions) -> Self {
        Self {
            rules: RuleTable::new(),
            options,
        }
    }

    pub fn list_rules(&self) -> Vec<RuleSummary> {
        self.rules.list()
    }

    /// Predict one action
    ///
    /// A snapshot with a known non-InnoDB engine short-circuits every rule:
    /// such engines only support COPY with an exclusive lock.
    pub fn predict(&self, action: &AlterAction, table: Option<&TableSnapshot>) -> Prediction {
        if let Some(snapshot) = table {
            if !snapshot.engine.is_empty() && !snapshot.is_innodb() {
                let mut prediction = Prediction::from_outcome(
                    action.kind,
                    format!("{} (non-InnoDB)", action.kind),
                    (Algorithm::Copy, LockLevel::Exclusive, true),
                    table,
                );
                prediction.warnings.push(
                    "Non-InnoDB engine: all operations use COPY algorithm with EXCLUSIVE lock".to_string(),
                );
                return prediction;
            }
        }

        let ctx = RuleContext {
            action,
            table,
            options: &self.options,
        };

        match self.rules.evaluate(&ctx) {
            Some(outcome) => {
                let mut prediction = Prediction::from_outcome(
                    action.kind,
                    outcome.description.to_string(),
                    (outcome.algorithm, outcome.lock, outcome.rebuild),
                    table,
                );
                prediction.notes = outcome.notes.iter().map(|s| s.to_string()).collect();
                prediction.warnings = outcome.warnings.iter().map(|s| s.to_string()).collect();
                prediction
            }
            None => {
                let mut prediction = Prediction::from_outcome(
                    action.kind,
                    format!("{} (unknown)", action.kind),
                    (Algorithm::Copy, LockLevel::Exclusive, true),
                    table,
                );
                prediction
                    .warnings
                    .push("Unknown operation: defaulting to COPY/EXCLUSIVE for safety".to_string());
                prediction
            }
        }
    }

    /// Predict every action of a statement, in order
    pub fn predict_all(&self, operation: &AlterOperation, table: Option<&TableSnapshot>) -> Vec<Prediction> {
        operation
            .actions
            .iter()
            .map(|action| self.predict(action, table))
            .collect()
    }
}
