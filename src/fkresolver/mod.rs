//! Foreign key dependency resolution
//!
//! Finds every table linked to the altered one through foreign keys, and the
//! lock each of them is expected to take.

pub mod graph;
pub mod propagation;
pub mod resolver;

pub use graph::{FkDirection, FkGraph, FkRelation, LockImpact};
pub use propagation::determine_lock_impact;
pub use resolver::{Resolver, DEFAULT_MAX_DEPTH};
