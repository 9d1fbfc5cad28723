//! Duration heuristics and table sizing labels
//!
//! Purely informational. Nothing here feeds back into risk classification.

use crate::meta::{Algorithm, TableSnapshot};
use serde::{Deserialize, Serialize};

const MB: f64 = 1024.0 * 1024.0;

/// Estimated wall-clock range for a DDL
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DurationEstimate {
    #[serde(rename = "min")]
    pub min_seconds: f64,
    #[serde(rename = "max")]
    pub max_seconds: f64,
    pub label: String,
    /// False when no snapshot was available and no estimate was attempted
    #[serde(skip)]
    pub available: bool,
}

impl DurationEstimate {
    fn unavailable() -> Self {
        Self {
            label: "N/A (offline mode)".to_string(),
            ..Default::default()
        }
    }

    fn range(min_seconds: f64, max_seconds: f64, table: &TableSnapshot) -> Self {
        Self {
            min_seconds,
            max_seconds,
            label: duration_label(min_seconds, max_seconds, table),
            available: true,
        }
    }
}

pub fn estimate_duration(
    algorithm: Algorithm,
    rebuild: bool,
    table: Option<&TableSnapshot>,
) -> DurationEstimate {
    let Some(table) = table else {
        return DurationEstimate::unavailable();
    };

    let data_mb = table.data_length as f64 / MB;
    let total_mb = total_length(table) as f64 / MB;

    match algorithm {
        Algorithm::Instant => DurationEstimate {
            label: "~0s (metadata only)".to_string(),
            available: true,
            ..Default::default()
        },
        Algorithm::Inplace if !rebuild => DurationEstimate::range(data_mb * 0.01, data_mb * 0.05, table),
        Algorithm::Inplace => DurationEstimate::range(total_mb * 0.05, total_mb * 0.2, table),
        Algorithm::Copy => DurationEstimate::range(total_mb * 0.1, total_mb * 0.4, table),
    }
}

/// Data plus index bytes, clamped at `u64::MAX` for hand-written metadata
fn total_length(table: &TableSnapshot) -> u64 {
    table.data_length.saturating_add(table.index_length)
}

fn duration_label(min_seconds: f64, max_seconds: f64, table: &TableSnapshot) -> String {
    let size = format_size(total_length(table));
    let rows = format_count(table.row_count);
    if max_seconds < 1.0 {
        format!("~0s (rows: ~{}, size: {})", rows, size)
    } else {
        format!(
            "~{} - ~{} (rows: ~{}, size: {})",
            format_seconds(min_seconds),
            format_seconds(max_seconds),
            rows,
            size
        )
    }
}

// =============================================================================
// TABLE INFO
// =============================================================================

/// Size summary of the target table, shown next to every prediction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableInfo {
    pub row_count: u64,
    pub data_length: u64,
    pub index_length: u64,
    pub index_count: usize,
    pub label: String,
}

impl TableInfo {
    pub fn collect(table: Option<&TableSnapshot>) -> Self {
        match table {
            Some(table) => Self {
                row_count: table.row_count,
                data_length: table.data_length,
                index_length: table.index_length,
                index_count: table.indexes.len(),
                label: format!(
                    "rows: ~{}, data: {}, indexes: {}",
                    format_count(table.row_count),
                    format_size(table.data_length),
                    table.indexes.len()
                ),
            },
            None => Self {
                label: "N/A (no table metadata)".to_string(),
                ..Default::default()
            },
        }
    }
}

// =============================================================================
// FORMATTING
// =============================================================================

pub fn format_seconds(seconds: f64) -> String {
    if seconds < 60.0 {
        format!("{:.0}s", seconds)
    } else if seconds < 3600.0 {
        format!("{:.0}m", seconds / 60.0)
    } else {
        format!("{:.1}h", seconds / 3600.0)
    }
}

pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1}GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.0}MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.0}KB", bytes as f64 / KB as f64)
    } else {
        format!("{}B", bytes)
    }
}

/// 1200000 -> "1,200,000"
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
