//! Report rendering
//!
//! - `text`: human-readable report for terminals
//! - `json`: flat, one entry per prediction, for CI pipelines

pub mod json;
pub mod text;

pub use json::JsonReporter;
pub use text::TextReporter;

use crate::fkresolver::FkGraph;
use crate::meta::{LockLevel, RiskLevel};
use crate::predictor::Prediction;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to format report: {0}")]
    Fmt(#[from] std::fmt::Error),
}

/// Analysis of one ALTER TABLE statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Qualified name of the altered table
    pub table: String,
    pub sql: String,
    pub predictions: Vec<Prediction>,
    #[serde(rename = "fk_propagation", skip_serializing_if = "Option::is_none")]
    pub fk_graph: Option<FkGraph>,
}

impl AnalysisResult {
    /// FK graph, only when it links at least one table or carries warnings
    pub fn fk_propagation(&self) -> Option<&FkGraph> {
        self.fk_graph
            .as_ref()
            .filter(|graph| !graph.is_empty() || !graph.warnings.is_empty())
    }
}

/// All analyses of one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub analyses: Vec<AnalysisResult>,
}

impl Report {
    /// Every prediction across all analyses
    pub fn predictions(&self) -> impl Iterator<Item = &Prediction> {
        self.analyses.iter().flat_map(|a| a.predictions.iter())
    }

    pub fn worst_risk_level(&self) -> RiskLevel {
        worst_risk_level(self.predictions())
    }
}

/// Renders a report to a string
pub trait Reporter {
    fn render(&self, report: &Report) -> Result<String, ReportError>;
}

/// Highest risk tier among `predictions`, LOW when there are none
pub fn worst_risk_level<'a>(predictions: impl IntoIterator<Item = &'a Prediction>) -> RiskLevel {
    predictions
        .into_iter()
        .map(|p| p.risk_level)
        .max()
        .unwrap_or(RiskLevel::Low)
}

/// Lock name shown for a linked table: InnoDB takes a shared read MDL unless
/// the constraint itself changes
pub fn fk_lock_type(level: LockLevel) -> &'static str {
    match level {
        LockLevel::Exclusive => "EXCLUSIVE",
        LockLevel::Shared | LockLevel::None => "SHARED_READ",
    }
}

/// Output format selectable from the CLI and the HTTP API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn reporter(&self) -> Box<dyn Reporter + Send + Sync> {
        match self {
            OutputFormat::Text => Box::new(TextReporter),
            OutputFormat::Json => Box::new(JsonReporter),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unsupported format: {} (expected text or json)", other)),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::fkresolver::{FkDirection, FkRelation, LockImpact};
    use crate::meta::{ActionKind, AlterAction, ForeignKeyMeta, TableSnapshot};
    use crate::predictor::Predictor;

    pub fn orders_snapshot() -> TableSnapshot {
        TableSnapshot {
            schema: "shop".into(),
            table: "orders".into(),
            engine: "InnoDB".into(),
            row_count: 1_200_000,
            data_length: 524 * 1024 * 1024,
            index_length: 64 * 1024 * 1024,
            ..Default::default()
        }
    }

    pub fn relation(table: &str, direction: FkDirection, depth: u32, lock_level: LockLevel) -> FkRelation {
        FkRelation {
            table: table.into(),
            constraint: ForeignKeyMeta {
                constraint_name: format!("fk_{}", table.replace('.', "_")),
                source_columns: vec!["user_id".into()],
                referenced_columns: vec!["id".into()],
                ..Default::default()
            },
            direction,
            depth,
            lock_impact: LockImpact {
                metadata_lock: true,
                lock_level,
                reason: "FK: orders.user_id -> users.id".into(),
            },
        }
    }

    /// ADD COLUMN on `shop.orders`, with one parent and one grandchild
    pub fn sample_report(with_metadata: bool) -> Report {
        let snapshot = orders_snapshot();
        let table = with_metadata.then_some(&snapshot);
        let prediction = Predictor::new().predict(&AlterAction::new(ActionKind::AddColumn), table);

        let mut graph = FkGraph::new("shop.orders", 5);
        graph
            .parents
            .push(relation("shop.users", FkDirection::Parent, 1, LockLevel::Shared));
        graph
            .children
            .push(relation("shop.refunds", FkDirection::Child, 2, LockLevel::Exclusive));

        Report {
            analyses: vec![AnalysisResult {
                table: "shop.orders".into(),
                sql: "ALTER TABLE orders ADD COLUMN note TEXT".into(),
                predictions: vec![prediction],
                fk_graph: Some(graph),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{ActionKind, AlterAction};
    use crate::predictor::Predictor;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_worst_risk_level_of_nothing_is_low() {
        assert_eq!(worst_risk_level(Vec::<Prediction>::new().iter()), RiskLevel::Low);
        assert_eq!(Report::default().worst_risk_level(), RiskLevel::Low);
    }

    #[test]
    fn test_worst_risk_level_takes_max() {
        let predictor = Predictor::new();
        let predictions = vec![
            predictor.predict(&AlterAction::new(ActionKind::RenameTable), None),
            predictor.predict(&AlterAction::new(ActionKind::ForceRebuild), None),
            predictor.predict(&AlterAction::new(ActionKind::AddIndex), None),
        ];
        assert_eq!(worst_risk_level(&predictions), RiskLevel::High);
    }

    #[test]
    fn test_fk_lock_type() {
        assert_eq!(fk_lock_type(LockLevel::Exclusive), "EXCLUSIVE");
        assert_eq!(fk_lock_type(LockLevel::Shared), "SHARED_READ");
        assert_eq!(fk_lock_type(LockLevel::None), "SHARED_READ");
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("text".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_empty_fk_graph_is_not_propagation() {
        let mut report = fixtures::sample_report(false);
        assert!(report.analyses[0].fk_propagation().is_some());
        report.analyses[0].fk_graph = Some(FkGraph::new("shop.orders", 5));
        assert!(report.analyses[0].fk_propagation().is_none());
    }

    #[test]
    fn test_warning_only_graph_is_kept() {
        let mut report = fixtures::sample_report(false);
        let mut graph = FkGraph::new("shop.orders", 5);
        graph
            .warnings
            .push("Circular FK reference detected: shop.orders (skipping)".into());
        report.analyses[0].fk_graph = Some(graph);

        let kept = report.analyses[0].fk_propagation();
        assert_eq!(kept.map(FkGraph::total_affected_tables), Some(0));
        assert_eq!(kept.map(|g| g.warnings.len()), Some(1));
    }
}
