//! Analysis orchestration
//!
//! Runs every parsed ALTER statement through the predictor and the FK resolver
//! against one metadata provider.

use crate::fkresolver::Resolver;
use crate::meta::{qualified_name, AlterOperation, MetadataProvider};
use crate::predictor::{PredictOptions, Predictor};
use crate::reporter::{AnalysisResult, Report};
use tracing::{debug, info};

pub struct Analyzer {
    predictor: Predictor,
    resolver: Resolver,
    default_database: String,
}

impl Analyzer {
    pub fn new(fk_checks: bool, fk_depth: u32, default_database: impl Into<String>) -> Self {
        Self {
            predictor: Predictor::with_options(PredictOptions {
                foreign_key_checks: fk_checks,
            }),
            resolver: Resolver::new(fk_depth, fk_checks),
            default_database: default_database.into(),
        }
    }

    /// Statement schema, else the configured default database
    pub fn schema_for<'a>(&'a self, operation: &'a AlterOperation) -> &'a str {
        if operation.schema.is_empty() {
            &self.default_database
        } else {
            &operation.schema
        }
    }

    pub fn analyze(&self, operations: &[AlterOperation], provider: &dyn MetadataProvider) -> Report {
        info!(
            "Analyzing {} ALTER statements (MySQL {})",
            operations.len(),
            provider.mysql_version()
        );

        let analyses = operations
            .iter()
            .map(|operation| self.analyze_operation(operation, provider))
            .collect();

        Report { analyses }
    }

    fn analyze_operation(&self, operation: &AlterOperation, provider: &dyn MetadataProvider) -> AnalysisResult {
        let schema = self.schema_for(operation);
        let table = qualified_name(schema, &operation.table);

        let snapshot = match provider.get_table_meta(schema, &operation.table) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                debug!("No metadata for {}: {}", table, e);
                None
            }
        };

        let predictions = self.predictor.predict_all(operation, snapshot.as_ref());
        let fk_graph = self
            .resolver
            .resolve(provider, schema, &operation.table, &operation.actions);

        debug!(
            "{}: {} actions, {} FK-linked tables",
            table,
            predictions.len(),
            fk_graph.total_affected_tables()
        );

        AnalysisResult {
            table,
            sql: operation.raw_sql.clone(),
            predictions,
            fk_graph: Some(fk_graph),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{Algorithm, Catalog, ForeignKeyMeta, OfflineProvider, RiskLevel, TableSnapshot};
    use crate::parser::parse;
    use pretty_assertions::assert_eq;

    fn catalog() -> Catalog {
        let fk = ForeignKeyMeta {
            constraint_name: "fk_orders_user".into(),
            source_schema: "shop".into(),
            source_table: "orders".into(),
            source_columns: vec!["user_id".into()],
            referenced_schema: "shop".into(),
            referenced_table: "users".into(),
            referenced_columns: vec!["id".into()],
            ..Default::default()
        };
        Catalog::from_snapshots(
            vec![
                TableSnapshot {
                    schema: "shop".into(),
                    table: "users".into(),
                    engine: "InnoDB".into(),
                    referenced_by: vec![fk.clone()],
                    ..Default::default()
                },
                TableSnapshot {
                    schema: "shop".into(),
                    table: "orders".into(),
                    engine: "InnoDB".into(),
                    row_count: 10_000,
                    data_length: 100 * 1024 * 1024,
                    foreign_keys: vec![fk],
                    ..Default::default()
                },
            ],
            "8.0.36",
        )
    }

    #[test]
    fn test_default_database_fills_missing_schema() {
        let ops = parse("ALTER TABLE orders ADD INDEX idx_note (note); ALTER TABLE other.t FORCE;").unwrap();
        let report = Analyzer::new(true, 5, "shop").analyze(&ops, &catalog());

        assert_eq!(report.analyses.len(), 2);
        assert_eq!(report.analyses[0].table, "shop.orders");
        assert_eq!(report.analyses[0].sql, "ALTER TABLE orders ADD INDEX idx_note (note)");
        assert_eq!(report.analyses[1].table, "other.t");
    }

    #[test]
    fn test_snapshot_feeds_predictions_and_graph() {
        let ops = parse("ALTER TABLE orders ADD INDEX idx_note (note)").unwrap();
        let report = Analyzer::new(true, 5, "shop").analyze(&ops, &catalog());
        let analysis = &report.analyses[0];

        assert_eq!(analysis.predictions[0].algorithm, Algorithm::Inplace);
        assert!(analysis.predictions[0].duration.available);
        assert_eq!(analysis.fk_propagation().map(|g| g.total_affected_tables()), Some(1));
    }

    #[test]
    fn test_offline_analysis_has_no_table_data() {
        let ops = parse("ALTER TABLE orders DROP COLUMN note, ENGINE=InnoDB").unwrap();
        let report = Analyzer::new(true, 5, "").analyze(&ops, &OfflineProvider::new("8.0"));
        let analysis = &report.analyses[0];

        assert_eq!(analysis.table, "orders");
        assert_eq!(analysis.predictions.len(), 2);
        assert!(analysis.predictions.iter().all(|p| !p.duration.available));
        assert!(analysis.fk_propagation().is_none());
        assert_eq!(report.worst_risk_level(), RiskLevel::Critical);
    }

    #[test]
    fn test_fk_checks_off_changes_prediction_and_graph() {
        let ops = parse("ALTER TABLE orders ADD CONSTRAINT fk_x FOREIGN KEY (x_id) REFERENCES x (id)").unwrap();
        let report = Analyzer::new(false, 5, "shop").analyze(&ops, &catalog());
        let analysis = &report.analyses[0];

        assert_eq!(analysis.predictions[0].algorithm, Algorithm::Inplace);
        assert!(analysis.fk_propagation().is_none());
    }

    #[test]
    fn test_self_referencing_fk_reports_cycle_warning() {
        let fk = ForeignKeyMeta {
            constraint_name: "fk_employee_manager".into(),
            source_schema: "hr".into(),
            source_table: "employees".into(),
            source_columns: vec!["manager_id".into()],
            referenced_schema: "hr".into(),
            referenced_table: "employees".into(),
            referenced_columns: vec!["id".into()],
            ..Default::default()
        };
        let catalog = Catalog::from_snapshots(
            vec![TableSnapshot {
                schema: "hr".into(),
                table: "employees".into(),
                engine: "InnoDB".into(),
                foreign_keys: vec![fk.clone()],
                referenced_by: vec![fk],
                ..Default::default()
            }],
            "8.0.36",
        );
        let ops = parse("ALTER TABLE employees ADD INDEX idx_name (name)").unwrap();
        let report = Analyzer::new(true, 5, "hr").analyze(&ops, &catalog);

        let graph = report.analyses[0].fk_propagation();
        assert_eq!(graph.map(|g| g.total_affected_tables()), Some(0));
        let warnings = graph.map(|g| g.warnings.clone()).unwrap_or_default();
        assert!(!warnings.is_empty());
        assert!(warnings
            .iter()
            .all(|w| w == "Circular FK reference detected: hr.employees (skipping)"));
    }
}
