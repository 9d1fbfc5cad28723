//! Table metadata and the ALTER action model
//!
//! - `types`: actions, snapshots and classification enums
//! - `catalog`: the synchronous provider trait plus file/offline providers
//! - `mysql`: live capture from information_schema

pub mod catalog;
pub mod mysql;
pub mod types;

pub use catalog::{Catalog, MetaError, MetadataProvider, OfflineProvider};
pub use mysql::MysqlIntrospector;
pub use types::*;
