//! Refetch specs handed to the runtime store.

use crate::document::DocumentKind;
use crate::field::PaginatedField;
use crate::identity::Identity;
use crate::mode::PaginationMode;
use crate::variables::VariableSet;
use apollo_compiler::ast::Value;
use apollo_compiler::Name;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaginationMethod {
    Cursor,
    Offset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaginationDirection {
    Forward,
    Backward,
    Both,
}

/// Where the next page starts: a cursor string or an integer offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StartValue {
    Cursor(String),
    Offset(i32),
}

/// Everything a runtime needs to fetch the next page of one field.
///
/// Key order is part of the output format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefetchSpec {
    pub path: Vec<String>,
    pub method: PaginationMethod,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub page_size: Option<i32>,
    pub embedded: bool,
    pub target_type: String,
    pub paginated: bool,
    pub direction: PaginationDirection,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub start: Option<StartValue>,
}

/// Inputs of [`build_refetch_spec`], gathered by the pipeline.
pub struct RefetchInputs<'a> {
    pub field: &'a PaginatedField,
    pub mode: PaginationMode,
    pub kind: DocumentKind,
    /// Fragment type condition, `None` for operations
    pub type_condition: Option<&'a str>,
    pub query_root: &'a str,
    /// Identity used to refetch a fragment's parent object
    pub identity: Option<&'a Identity>,
    pub variables: &'a VariableSet,
    /// Pagination argument name → the variable bound to it
    pub bindings: &'a IndexMap<Name, Name>,
}

/// Build the refetch spec of a paginated field after promotion.
#[must_use]
pub fn build_refetch_spec(inputs: &RefetchInputs<'_>) -> RefetchSpec {
    let mode = inputs.mode;
    let (anchors, starts): (&[&str], &[&str]) = match mode {
        PaginationMode::CursorForward => (&["first"], &["after"]),
        PaginationMode::CursorBackward => (&["last"], &["before"]),
        PaginationMode::CursorBoth => (&["first", "last"], &["after", "before"]),
        PaginationMode::Offset => (&["limit"], &["offset"]),
    };
    let page_size = effective_value(inputs, anchors).and_then(Value::to_i32);
    let start = effective_value(inputs, starts).and_then(|value| match value {
        Value::String(cursor) => Some(StartValue::Cursor(cursor.clone())),
        Value::Int(_) => value.to_i32().map(StartValue::Offset),
        _ => None,
    });

    let on_root = inputs.type_condition.is_none_or(|condition| condition == inputs.query_root);
    let embedded = inputs.kind.is_fragment() && !on_root;
    let target_type = match (inputs.identity, on_root) {
        (Some(identity), false) => identity.target_type().to_string(),
        _ => inputs.query_root.to_string(),
    };

    RefetchSpec {
        path: inputs.field.path.iter().map(ToString::to_string).collect(),
        method: mode.method(),
        page_size,
        embedded,
        target_type,
        paginated: true,
        direction: mode.direction(),
        start,
    }
}

/// Default of the variable bound to the first of `arguments` that has one.
fn effective_value<'a>(inputs: &RefetchInputs<'a>, arguments: &[&str]) -> Option<&'a Value> {
    arguments.iter().find_map(|argument| {
        let variable = inputs.bindings.get(*argument)?;
        inputs
            .variables
            .default_of(variable.as_str())
            .map(|value| &**value)
    })
}
