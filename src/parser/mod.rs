//! ALTER TABLE parsing
//!
//! Turns a SQL script into [`AlterOperation`](crate::meta::AlterOperation)s.
//! Statements other than ALTER TABLE are skipped.

pub mod alter;
pub mod lexer;

pub use alter::{parse, ParseError};
