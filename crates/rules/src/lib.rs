//! Rule engine for the vehicle signal manager.
//!
//! This crate provides:
//! - A constrained condition language (lexer, parser, pure interpreter)
//! - YAML rule definitions with serde deserialization
//! - The rule compiler (definition -> immutable [`Rule`])
//! - The rule index, loaded once from a directory and keyed by trigger

pub mod compiler;
pub mod expr;
pub mod loader;
pub mod schema;

pub use compiler::{compile, Action, CompileError, Rule};
pub use expr::{EvalError, Expr, ExprError};
pub use loader::{LoadResult, LoadStatus, RuleError, RuleIndex};
pub use schema::RuleDefinition;
