//! Data models and DTOs (Data Transfer Objects)
//!
//! Request/response structures used by the HTTP API.

use crate::meta::{RiskLevel, TableSnapshot};
use crate::predictor::RuleSummary;
use crate::reporter::{OutputFormat, Report};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to analyze one or more ALTER TABLE statements
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[validate(length(min = 1, message = "SQL is required"))]
    pub sql: String,

    /// Also render the report in this format
    #[serde(default)]
    pub format: Option<OutputFormat>,

    #[serde(default)]
    pub fk_checks: Option<bool>,

    #[validate(range(min = 1, max = 20, message = "fkDepth must be between 1 and 20"))]
    #[serde(default)]
    pub fk_depth: Option<u32>,

    /// Schema for statements that do not name one
    #[serde(default)]
    pub database: Option<String>,

    /// Table snapshots to analyze against; offline when absent
    #[serde(default)]
    pub metadata: Option<Vec<TableSnapshot>>,
}

/// Analysis result
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub success: bool,
    pub message: String,
    pub report: Report,
    pub worst_risk_level: RiskLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rendered: Option<String>,
}

/// Rule catalogue listing
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesListResponse {
    pub success: bool,
    pub count: usize,
    pub rules: Vec<RuleSummary>,
}
