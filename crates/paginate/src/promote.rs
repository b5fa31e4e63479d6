//! Lifting pagination arguments into variables.
//!
//! After promotion every pagination argument of the field is a variable, so
//! the runtime can fetch the next page by overriding variables alone.

use crate::error::{PaginateError, Result};
use crate::field::PaginatedField;
use crate::mode::PaginationMode;
use crate::schema_utils::{field_definition, nullable};
use crate::variables::{RequestKind, VariableOrigin, VariableRequest, VariableSet};
use apollo_compiler::ast::{self, Value};
use apollo_compiler::{name, Name, Node, Schema};
use indexmap::IndexMap;

/// Result of promoting one field's arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Promotion {
    /// The document's variables after promotion
    pub variables: VariableSet,
    /// The field's arguments after promotion
    pub arguments: Vec<Node<ast::Argument>>,
    /// Pagination argument → variable bound to it
    pub bindings: IndexMap<Name, Name>,
}

fn fallback_type(argument: &str) -> ast::Type {
    match argument {
        "after" | "before" => ast::Type::Named(name!("String")),
        _ => ast::Type::Named(name!("Int")),
    }
}

/// Promote the pagination arguments `mode` needs into variables.
///
/// `existing` holds what the document already declares. The returned
/// variable set keeps those bindings first and in order.
#[tracing::instrument(skip_all, fields(field = %field.display_path(), ?mode))]
pub fn promote_arguments(
    schema: &Schema,
    field: &PaginatedField,
    mode: PaginationMode,
    existing: &VariableSet,
) -> Result<Promotion> {
    let definition = field_definition(schema, field.parent_type.as_str(), field.name.as_str());
    let mut requests = Vec::new();
    let mut bindings = IndexMap::new();

    for argument in mode.arguments() {
        let argument_name = Name::new(argument).map_err(|_| PaginateError::InvalidName {
            value: (*argument).to_string(),
        })?;
        let ty = definition
            .and_then(|definition| {
                definition
                    .arguments
                    .iter()
                    .find(|declared| declared.name == argument_name)
            })
            .map_or_else(|| fallback_type(argument), |declared| nullable(&declared.ty));

        let (variable, kind) = match field.argument(argument).map(|value| (value, &**value)) {
            Some((_, Value::Variable(variable))) => (variable.clone(), RequestKind::Reference),
            Some((value, _)) => (argument_name.clone(), RequestKind::Literal(value.clone())),
            None => {
                let fallback = if *argument == mode.anchor() {
                    field.page_size.clone()
                } else {
                    None
                };
                (argument_name.clone(), RequestKind::Absent { fallback })
            }
        };
        tracing::trace!(argument, variable = %variable, "binding pagination argument");
        bindings.insert(argument_name.clone(), variable.clone());
        requests.push(VariableRequest {
            name: variable,
            ty,
            argument: argument_name,
            origin: VariableOrigin::Promoted,
            kind,
        });
    }

    let variables = existing.merge(&requests)?;

    let mut arguments: Vec<Node<ast::Argument>> = field
        .arguments
        .iter()
        .map(|authored| match bindings.get(&authored.name) {
            Some(variable) if !matches!(*authored.value, Value::Variable(_)) => {
                Node::new(ast::Argument {
                    name: authored.name.clone(),
                    value: Node::new(Value::Variable(variable.clone())),
                })
            }
            _ => authored.clone(),
        })
        .collect();
    for (argument, variable) in &bindings {
        if !field.arguments.iter().any(|authored| authored.name == *argument) {
            arguments.push(Node::new(ast::Argument {
                name: argument.clone(),
                value: Node::new(Value::Variable(variable.clone())),
            }));
        }
    }

    Ok(Promotion {
        variables,
        arguments,
        bindings,
    })
}
