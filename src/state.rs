//! Application state management
//!
//! Shared, read-only state for the HTTP handlers.

use crate::config::AnalysisConfig;
use crate::predictor::{Predictor, RuleSummary};
use std::sync::Arc;

/// Application state shared across all handlers
pub struct AppState {
    /// Defaults applied when a request leaves an option out
    pub analysis: AnalysisConfig,

    /// Rule catalogue, built once for `/api/rules`
    pub rules: Vec<RuleSummary>,
}

impl AppState {
    pub fn new(analysis: AnalysisConfig) -> Self {
        Self {
            analysis,
            rules: Predictor::new().list_rules(),
        }
    }
}

/// Type alias for shared state
pub type SharedState = Arc<AppState>;
