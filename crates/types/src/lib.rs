//! Foundation types for the GraphQL pagination compiler.
//!
//! Shared by the config loader, the pass and the CLI. It has zero external
//! dependencies so every other crate can sit on top of it.
//!
//! # Type Categories
//!
//! - **Source types**: [`SourceId`]
//! - **Position types**: [`OffsetRange`], [`Position`], [`LineIndex`]
//! - **Severity types**: [`DiagnosticSeverity`]

mod position;
mod severity;
mod source;

pub use position::{LineIndex, OffsetRange, Position};
pub use severity::DiagnosticSeverity;
pub use source::SourceId;
