//! Risk classification
//!
//! Evaluated in priority order:
//! 1. COPY or an EXCLUSIVE lock is always CRITICAL
//! 2. INSTANT is LOW
//! 3. INPLACE with a rebuild is HIGH, without one MEDIUM

use crate::meta::{Algorithm, LockLevel, RiskLevel};

pub fn classify_risk(algorithm: Algorithm, lock: LockLevel, rebuild: bool) -> RiskLevel {
    if algorithm == Algorithm::Copy || lock == LockLevel::Exclusive {
        return RiskLevel::Critical;
    }
    match algorithm {
        Algorithm::Instant => RiskLevel::Low,
        _ if rebuild => RiskLevel::High,
        _ => RiskLevel::Medium,
    }
}
