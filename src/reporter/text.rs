//! Human-readable report

use super::{fk_lock_type, AnalysisResult, Report, ReportError, Reporter};
use crate::fkresolver::{FkGraph, FkRelation};
use std::fmt::Write;

pub struct TextReporter;

impl Reporter for TextReporter {
    fn render(&self, report: &Report) -> Result<String, ReportError> {
        let mut out = String::from("=== DDL Lock Analysis Report ===\n");
        for (i, analysis) in report.analyses.iter().enumerate() {
            if i > 0 {
                out.push_str("\n---\n");
            }
            render_analysis(&mut out, analysis)?;
        }
        Ok(out)
    }
}

fn render_analysis(out: &mut String, analysis: &AnalysisResult) -> Result<(), ReportError> {
    writeln!(out, "\nTable: {}", analysis.table)?;
    writeln!(out, "SQL:   {}", analysis.sql)?;

    for prediction in &analysis.predictions {
        writeln!(out, "\n  Operation     : {}", prediction.description)?;
        writeln!(out, "  Algorithm     : {}", prediction.algorithm)?;
        writeln!(
            out,
            "  Lock Level    : {}{}",
            prediction.lock_level,
            prediction.lock_level.describe()
        )?;
        writeln!(
            out,
            "  Table Rebuild : {}",
            if prediction.table_rebuild { "Yes" } else { "No" }
        )?;
        writeln!(out, "  Table Info    : {}", prediction.table_info.label)?;
        if prediction.duration.available {
            writeln!(out, "  Est. Duration : {}", prediction.duration.label)?;
        }
        writeln!(out, "  Risk Level    : {}", prediction.risk_level)?;

        bullet_block(out, "Note", &prediction.notes)?;
        bullet_block(out, "Warning", &prediction.warnings)?;
    }

    if let Some(graph) = analysis.fk_propagation() {
        render_fk_propagation(out, &analysis.table, graph)?;
    }
    Ok(())
}

fn bullet_block(out: &mut String, title: &str, items: &[String]) -> Result<(), ReportError> {
    if items.is_empty() {
        return Ok(());
    }
    writeln!(out, "\n  {}:", title)?;
    for item in items {
        writeln!(out, "    - {}", item)?;
    }
    Ok(())
}

fn render_fk_propagation(out: &mut String, table: &str, graph: &FkGraph) -> Result<(), ReportError> {
    let total = graph.total_affected_tables();

    out.push_str("\n  FK Lock Propagation:\n");
    if total == 0 {
        writeln!(out, "    {} has no FK-linked tables to lock", table)?;
        return bullet_block(out, "FK Warning", &graph.warnings);
    }

    writeln!(
        out,
        "    {} has {} FK relationships: MDL will propagate to related tables\n",
        table, total
    )?;
    writeln!(out, "    {:<10} {:<22} {:<15} {}", "Direction", "Table", "Lock Type", "Reason")?;
    writeln!(
        out,
        "    {} {} {} {}",
        "─".repeat(10),
        "─".repeat(22),
        "─".repeat(15),
        "─".repeat(30)
    )?;
    for relation in graph.all_relations() {
        render_relation(out, relation)?;
    }

    if !graph.warnings.is_empty() {
        bullet_block(out, "FK Warning", &graph.warnings)?;
    }

    out.push_str("\n  Warning:\n");
    writeln!(out, "    - MDL propagation to {} related tables detected", total)?;
    out.push_str("    - Long-running DDL on related tables may cause MDL wait queue buildup\n");
    out.push_str("    - If concurrent DDL on related tables is planned, coordinate execution order\n");
    Ok(())
}

fn render_relation(out: &mut String, relation: &FkRelation) -> Result<(), ReportError> {
    writeln!(
        out,
        "    {:<10} {:<22} {:<15} {}",
        depth_prefix(relation),
        relation.table,
        fk_lock_type(relation.lock_impact.lock_level),
        relation.lock_impact.reason
    )?;
    Ok(())
}

/// `PARENT` at depth 1, indented tree markers below that
fn depth_prefix(relation: &FkRelation) -> String {
    let indent = relation.depth.saturating_sub(1) as usize;
    format!("{}{}", "  └─".repeat(indent), relation.direction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fkresolver::FkDirection;
    use crate::meta::LockLevel;
    use crate::reporter::fixtures::{relation, sample_report};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_offline_report() {
        let mut report = sample_report(false);
        report.analyses[0].fk_graph = None;
        let text = TextReporter.render(&report).unwrap();

        let expected = "\
=== DDL Lock Analysis Report ===

Table: shop.orders
SQL:   ALTER TABLE orders ADD COLUMN note TEXT

  Operation     : ADD COLUMN (trailing, NULLABLE)
  Algorithm     : INSTANT
  Lock Level    : NONE (concurrent DML allowed)
  Table Rebuild : No
  Table Info    : N/A (no table metadata)
  Risk Level    : LOW

  Note:
    - INSTANT algorithm available (MySQL 8.0.12+)
    - No table rebuild required
    - DML operations are not blocked
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_render_with_metadata_shows_duration() {
        let text = TextReporter.render(&sample_report(true)).unwrap();
        assert!(text.contains("  Table Info    : rows: ~1,200,000, data: 524MB, indexes: 0\n"));
        assert!(text.contains("  Est. Duration : ~0s (metadata only)\n"));
    }

    #[test]
    fn test_render_fk_propagation() {
        let text = TextReporter.render(&sample_report(false)).unwrap();

        assert!(text.contains("\n  FK Lock Propagation:\n"));
        assert!(text.contains("    shop.orders has 2 FK relationships: MDL will propagate to related tables\n"));
        assert!(text.contains(&format!(
            "    {:<10} {:<22} {:<15} {}\n",
            "PARENT", "shop.users", "SHARED_READ", "FK: orders.user_id -> users.id"
        )));
        assert!(text.contains(&format!(
            "    {:<10} {:<22} {:<15} {}\n",
            "  └─CHILD", "shop.refunds", "EXCLUSIVE", "FK: orders.user_id -> users.id"
        )));
        assert!(text.contains("    - MDL propagation to 2 related tables detected\n"));
        assert!(!text.contains("FK Warning"));
    }

    #[test]
    fn test_render_fk_warnings_and_separator() {
        let mut report = sample_report(false);
        if let Some(graph) = report.analyses[0].fk_graph.as_mut() {
            graph
                .warnings
                .push("Circular FK reference detected: shop.users (skipping)".into());
        }
        report.analyses.push(report.analyses[0].clone());
        let text = TextReporter.render(&report).unwrap();

        assert!(text.contains("\n  FK Warning:\n    - Circular FK reference detected: shop.users (skipping)\n"));
        assert_eq!(text.matches("\n---\n").count(), 1);
    }

    #[test]
    fn test_render_warning_only_fk_graph() {
        let mut report = sample_report(false);
        let mut graph = FkGraph::new("shop.orders", 5);
        graph
            .warnings
            .push("Circular FK reference detected: shop.orders (skipping)".into());
        report.analyses[0].fk_graph = Some(graph);
        let text = TextReporter.render(&report).unwrap();

        assert!(text.contains("\n  FK Lock Propagation:\n    shop.orders has no FK-linked tables to lock\n"));
        assert!(text.contains("\n  FK Warning:\n    - Circular FK reference detected: shop.orders (skipping)\n"));
        assert!(!text.contains("Direction"));
        assert!(!text.contains("MDL propagation"));
    }

    #[test]
    fn test_depth_prefix() {
        assert_eq!(depth_prefix(&relation("a", FkDirection::Parent, 1, LockLevel::Shared)), "PARENT");
        assert_eq!(
            depth_prefix(&relation("a", FkDirection::Child, 3, LockLevel::Shared)),
            "  └─  └─CHILD"
        );
    }

    #[test]
    fn test_render_empty_report() {
        assert_eq!(
            TextReporter.render(&Report::default()).unwrap(),
            "=== DDL Lock Analysis Report ===\n"
        );
    }
}
