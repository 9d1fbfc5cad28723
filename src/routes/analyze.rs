//! Analysis route handlers
//!
//! The HTTP API never connects to MySQL: metadata is supplied inline or the
//! analysis runs offline.

use crate::analyzer::Analyzer;
use crate::error::{validation_error, ApiResult, AppError};
use crate::meta::{Catalog, MetadataProvider, OfflineProvider};
use crate::models::{AnalyzeRequest, AnalyzeResponse};
use crate::parser::parse;
use crate::reporter::Reporter;
use crate::state::SharedState;
use axum::{extract::State, Json};
use tracing::{debug, info};
use validator::Validate;

/// Analyze ALTER TABLE statements
pub async fn analyze(
    State(state): State<SharedState>,
    Json(payload): Json<AnalyzeRequest>,
) -> ApiResult<Json<AnalyzeResponse>> {
    payload.validate().map_err(|e| validation_error(e.to_string()))?;
    if payload.sql.trim().is_empty() {
        return Err(validation_error("SQL is required"));
    }

    let defaults = &state.analysis;
    let fk_checks = payload.fk_checks.unwrap_or(defaults.fk_checks);
    let fk_depth = payload.fk_depth.unwrap_or(defaults.fk_depth);
    let database = payload
        .database
        .clone()
        .unwrap_or_else(|| defaults.default_database.clone());

    let operations = parse(&payload.sql)?;
    debug!("Parsed {} ALTER statements", operations.len());

    let provider: Box<dyn MetadataProvider> = match payload.metadata {
        Some(snapshots) => {
            if let Some(position) = snapshots.iter().position(|s| s.table.trim().is_empty()) {
                return Err(AppError::BadRequest(format!(
                    "metadata[{}] has no table name",
                    position
                )));
            }
            Box::new(Catalog::from_snapshots(snapshots, &defaults.mysql_version))
        }
        None => Box::new(OfflineProvider::new(defaults.mysql_version.clone())),
    };

    let report = Analyzer::new(fk_checks, fk_depth, database).analyze(&operations, provider.as_ref());
    let worst_risk_level = report.worst_risk_level();

    let rendered = match payload.format {
        Some(format) => Some(format.reporter().render(&report)?),
        None => None,
    };

    info!(
        "Analyzed {} statements, worst risk {}",
        report.analyses.len(),
        worst_risk_level
    );

    Ok(Json(AnalyzeResponse {
        success: true,
        message: format!("Analyzed {} ALTER TABLE statement(s)", report.analyses.len()),
        report,
        worst_risk_level,
        rendered,
    }))
}
