//! Rule catalogue route

use crate::models::RulesListResponse;
use crate::state::SharedState;
use axum::{extract::State, Json};

/// List every prediction rule
pub async fn list_rules(State(state): State<SharedState>) -> Json<RulesListResponse> {
    Json(RulesListResponse {
        success: true,
        count: state.rules.len(),
        rules: state.rules.clone(),
    })
}
