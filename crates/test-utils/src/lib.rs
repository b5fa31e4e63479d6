//! # GraphQL Test Utilities
//!
//! Shared test infrastructure for the pagination compiler crates.

// Test utilities are less strict than production code
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::needless_raw_string_hashes)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
//!
//! ## Quick Start
//!
//! ```ignore
//! use graphql_test_utils::{parse_document, test_schema};
//!
//! let schema = test_schema();
//! let document = parse_document("query Users { usersByCursor(first: 10) @paginate { edges { node { id } } } }");
//! ```
//!
//! ## Modules
//!
//! - [`fixtures`] - The shared schema and type configuration
//! - [`inspect`] - Read fields, arguments and variables back out of a document
//! - [`assertions`] - Formatting helpers for snapshot tests

pub mod assertions;
pub mod fixtures;
pub mod inspect;

pub use assertions::{format_diagnostics, squash_whitespace};
pub use fixtures::{ghost_config, parse_document, test_schema, TEST_SCHEMA};
pub use inspect::{
    field_arguments, field_at, fragment_arguments, selection_names, variable_definitions,
};
