//! Machine-readable report: one flat entry per prediction

use super::{fk_lock_type, Report, ReportError, Reporter};
use crate::fkresolver::{FkDirection, FkGraph};
use crate::meta::{ActionKind, Algorithm, LockLevel, RiskLevel};
use serde::Serialize;

pub struct JsonReporter;

#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    analyses: Vec<JsonAnalysis<'a>>,
}

#[derive(Debug, Serialize)]
struct JsonAnalysis<'a> {
    table: &'a str,
    sql: &'a str,
    operation: ActionKind,
    algorithm: Algorithm,
    lock_level: LockLevel,
    table_rebuild: bool,
    #[serde(rename = "estimated_duration_sec", skip_serializing_if = "Option::is_none")]
    duration: Option<JsonDuration>,
    risk_level: RiskLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    fk_propagation: Option<JsonFkPropagation<'a>>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    notes: &'a [String],
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    warnings: &'a [String],
}

#[derive(Debug, Serialize)]
struct JsonDuration {
    min: f64,
    max: f64,
}

#[derive(Debug, Serialize)]
struct JsonFkPropagation<'a> {
    total_affected_tables: usize,
    relations: Vec<JsonFkRelation<'a>>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    warnings: &'a [String],
}

#[derive(Debug, Serialize)]
struct JsonFkRelation<'a> {
    direction: FkDirection,
    table: &'a str,
    constraint: &'a str,
    columns: &'a [String],
    referenced_columns: &'a [String],
    lock_type: &'static str,
    depth: u32,
}

impl<'a> JsonFkPropagation<'a> {
    fn from_graph(graph: &'a FkGraph) -> Self {
        Self {
            total_affected_tables: graph.total_affected_tables(),
            relations: graph
                .all_relations()
                .into_iter()
                .map(|relation| JsonFkRelation {
                    direction: relation.direction,
                    table: &relation.table,
                    constraint: &relation.constraint.constraint_name,
                    columns: &relation.constraint.source_columns,
                    referenced_columns: &relation.constraint.referenced_columns,
                    lock_type: fk_lock_type(relation.lock_impact.lock_level),
                    depth: relation.depth,
                })
                .collect(),
            warnings: &graph.warnings,
        }
    }
}

impl Reporter for JsonReporter {
    fn render(&self, report: &Report) -> Result<String, ReportError> {
        let mut analyses = Vec::new();

        for analysis in &report.analyses {
            let graph = analysis.fk_propagation();
            for prediction in &analysis.predictions {
                analyses.push(JsonAnalysis {
                    table: &analysis.table,
                    sql: &analysis.sql,
                    operation: prediction.action_type,
                    algorithm: prediction.algorithm,
                    lock_level: prediction.lock_level,
                    table_rebuild: prediction.table_rebuild,
                    duration: prediction.duration.available.then(|| JsonDuration {
                        min: prediction.duration.min_seconds,
                        max: prediction.duration.max_seconds,
                    }),
                    risk_level: prediction.risk_level,
                    fk_propagation: graph.map(JsonFkPropagation::from_graph),
                    notes: &prediction.notes,
                    warnings: &prediction.warnings,
                });
            }
        }

        Ok(serde_json::to_string_pretty(&JsonOutput { analyses })?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::fixtures::sample_report;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn render(report: &Report) -> Value {
        let text = JsonReporter.render(report).unwrap();
        serde_json::from_str(&text).unwrap()
    }

    #[test]
    fn test_offline_entry_omits_duration() {
        let value = render(&sample_report(false));
        let entry = &value["analyses"][0];

        assert_eq!(entry["table"], "shop.orders");
        assert_eq!(entry["operation"], "ADD_COLUMN");
        assert_eq!(entry["algorithm"], "INSTANT");
        assert_eq!(entry["lock_level"], "NONE");
        assert_eq!(entry["table_rebuild"], false);
        assert_eq!(entry["risk_level"], "LOW");
        assert!(entry.get("estimated_duration_sec").is_none());
        assert!(entry.get("warnings").is_none());
        assert_eq!(entry["notes"].as_array().map(Vec::len), Some(3));
    }

    #[test]
    fn test_duration_present_with_metadata() {
        let value = render(&sample_report(true));
        assert_eq!(
            value["analyses"][0]["estimated_duration_sec"],
            json!({"min": 0.0, "max": 0.0})
        );
    }

    #[test]
    fn test_fk_propagation_relations() {
        let value = render(&sample_report(false));
        let fk = &value["analyses"][0]["fk_propagation"];

        assert_eq!(fk["total_affected_tables"], 2);
        assert_eq!(
            fk["relations"][0],
            json!({
                "direction": "PARENT",
                "table": "shop.users",
                "constraint": "fk_shop_users",
                "columns": ["user_id"],
                "referenced_columns": ["id"],
                "lock_type": "SHARED_READ",
                "depth": 1
            })
        );
        assert_eq!(fk["relations"][1]["direction"], "CHILD");
        assert_eq!(fk["relations"][1]["lock_type"], "EXCLUSIVE");
        assert!(fk.get("warnings").is_none());
    }

    #[test]
    fn test_circular_warning_survives_without_relations() {
        let mut report = sample_report(false);
        let mut graph = FkGraph::new("shop.orders", 5);
        graph
            .warnings
            .push("Circular FK reference detected: shop.orders (skipping)".into());
        report.analyses[0].fk_graph = Some(graph);
        let value = render(&report);

        assert_eq!(
            value["analyses"][0]["fk_propagation"],
            json!({
                "total_affected_tables": 0,
                "relations": [],
                "warnings": ["Circular FK reference detected: shop.orders (skipping)"]
            })
        );
    }

    #[test]
    fn test_empty_graph_omits_fk_propagation() {
        let mut report = sample_report(false);
        report.analyses[0].fk_graph = Some(FkGraph::new("shop.orders", 5));
        let value = render(&report);
        assert!(value["analyses"][0].get("fk_propagation").is_none());
    }

    #[test]
    fn test_empty_report() {
        assert_eq!(render(&Report::default()), json!({"analyses": []}));
    }
}
