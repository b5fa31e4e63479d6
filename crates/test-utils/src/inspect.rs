//! Read fields, arguments and variables back out of a document.
//!
//! Tests assert on these instead of on printed text, so they do not depend
//! on how the printer wraps lines.

use apollo_compiler::ast::{Definition, Document, Field, Selection, Value};

fn definition_selections<'a>(document: &'a Document, name: &str) -> Option<&'a [Selection]> {
    document
        .definitions
        .iter()
        .find_map(|definition| match definition {
            Definition::OperationDefinition(operation)
                if operation.name.as_ref().map(|n| n.as_str()) == Some(name) =>
            {
                Some(operation.selection_set.as_slice())
            }
            Definition::FragmentDefinition(fragment) if fragment.name.as_str() == name => {
                Some(fragment.selection_set.as_slice())
            }
            _ => None,
        })
}

fn find_in<'a>(selections: &'a [Selection], key: &str) -> Option<&'a Field> {
    selections.iter().find_map(|selection| match selection {
        Selection::Field(field) => {
            let response_key = field.alias.as_ref().unwrap_or(&field.name);
            (response_key.as_str() == key).then_some(&**field)
        }
        Selection::InlineFragment(inline) => find_in(&inline.selection_set, key),
        Selection::FragmentSpread(_) => None,
    })
}

/// The field at `path` (response keys) inside the named operation or
/// fragment. Inline fragments are looked through.
pub fn field_at<'a>(document: &'a Document, definition: &str, path: &[&str]) -> Option<&'a Field> {
    let (first, rest) = path.split_first()?;
    let mut field = find_in(definition_selections(document, definition)?, first)?;
    for key in rest {
        field = find_in(&field.selection_set, key)?;
    }
    Some(field)
}

/// `(name, printed value)` for every argument of a field, in order.
pub fn field_arguments(field: &Field) -> Vec<(String, String)> {
    field
        .arguments
        .iter()
        .map(|argument| (argument.name.to_string(), argument.value.to_string()))
        .collect()
}

/// Response keys of a selection set; spreads print as `...Name`.
pub fn selection_names(selections: &[Selection]) -> Vec<String> {
    selections
        .iter()
        .map(|selection| match selection {
            Selection::Field(field) => field.alias.as_ref().unwrap_or(&field.name).to_string(),
            Selection::FragmentSpread(spread) => format!("...{}", spread.fragment_name),
            Selection::InlineFragment(inline) => match &inline.type_condition {
                Some(condition) => format!("... on {condition}"),
                None => "...".to_string(),
            },
        })
        .collect()
}

/// Variable declarations of the named operation as `$name: Type = default`.
pub fn variable_definitions(document: &Document, operation: &str) -> Vec<String> {
    document
        .definitions
        .iter()
        .find_map(|definition| match definition {
            Definition::OperationDefinition(op)
                if op.name.as_ref().map(|n| n.as_str()) == Some(operation) =>
            {
                Some(
                    op.variables
                        .iter()
                        .map(|variable| match &variable.default_value {
                            Some(default) => format!(
                                "${}: {} = {}",
                                variable.name, &*variable.ty, &**default
                            ),
                            None => format!("${}: {}", variable.name, &*variable.ty),
                        })
                        .collect(),
                )
            }
            _ => None,
        })
        .unwrap_or_default()
}

/// Entries of a fragment's `@arguments` directive as
/// `(name, type, printed default)`.
pub fn fragment_arguments(
    document: &Document,
    fragment: &str,
) -> Vec<(String, String, Option<String>)> {
    let Some(definition) = document.definitions.iter().find_map(|definition| match definition {
        Definition::FragmentDefinition(def) if def.name.as_str() == fragment => Some(def),
        _ => None,
    }) else {
        return Vec::new();
    };
    let Some(directive) = definition
        .directives
        .0
        .iter()
        .find(|directive| directive.name.as_str() == "arguments")
    else {
        return Vec::new();
    };

    directive
        .arguments
        .iter()
        .map(|argument| {
            let Value::Object(entries) = &*argument.value else {
                panic!("@arguments entry `{}` is not an object", argument.name);
            };
            let lookup = |key: &str| {
                entries
                    .iter()
                    .find(|(name, _)| name.as_str() == key)
                    .map(|(_, value)| value)
            };
            let ty = match lookup("type").map(|value| &**value) {
                Some(Value::String(ty)) => ty.clone(),
                other => panic!("@arguments entry `{}` has type {other:?}", argument.name),
            };
            (
                argument.name.to_string(),
                ty,
                lookup("default").map(|value| value.to_string()),
            )
        })
        .collect()
}
