//! Locating the field marked with `@paginate`.

use crate::directives::{self, PassDirective};
use crate::document::{CollectedDocument, DocumentKind};
use crate::error::{PaginateError, Result};
use crate::schema_utils::{field_type, query_root};
use apollo_compiler::ast::{self, Selection};
use apollo_compiler::{Name, Node, Schema};
use graphql_types::OffsetRange;

/// The one field of a document that carries `@paginate`.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginatedField {
    pub name: Name,
    /// Alias if present, otherwise the field name
    pub response_key: Name,
    /// Arguments as authored
    pub arguments: Vec<Node<ast::Argument>>,
    /// Response keys from the document root down to and including this field
    pub path: Vec<Name>,
    /// Type declaring the field
    pub parent_type: Name,
    /// `@paginate(pageSize:)`, if given
    pub page_size: Option<Node<ast::Value>>,
    pub span: Option<OffsetRange>,
    /// Selection indices leading to the field, see [`CollectedDocument::field`]
    pub indices: Vec<usize>,
}

impl PaginatedField {
    /// Dotted response path, for messages.
    #[must_use]
    pub fn display_path(&self) -> String {
        join(&self.path)
    }

    #[must_use]
    pub fn argument(&self, name: &str) -> Option<&Node<ast::Value>> {
        self.arguments
            .iter()
            .find(|argument| argument.name.as_str() == name)
            .map(|argument| &argument.value)
    }
}

struct Found<'a> {
    field: &'a Node<ast::Field>,
    directive: &'a ast::Directive,
    parent_type: Option<Name>,
    path: Vec<Name>,
    indices: Vec<usize>,
}

/// Find the paginated field of a document.
///
/// Returns `Ok(None)` when nothing is marked. Only fields and inline
/// fragments are searched; spread fragments are documents of their own.
#[tracing::instrument(skip_all, fields(document = %document.name))]
pub fn find_paginated_field(
    schema: &Schema,
    document: &CollectedDocument,
) -> Result<Option<PaginatedField>> {
    let (Some(kind), Some(selections)) = (document.kind(), document.selection_set()) else {
        return Ok(None);
    };
    let root_type = match (kind, document.fragment()) {
        (DocumentKind::Fragment, Some(fragment)) => Some(fragment.type_condition.clone()),
        (DocumentKind::Query, _) => query_root(schema).cloned(),
        _ => None,
    };

    let mut found = Vec::new();
    search(schema, selections, root_type.as_ref(), &[], &[], &mut found);

    let mut found = found.into_iter();
    let Some(first) = found.next() else {
        return Ok(None);
    };
    if let Some(second) = found.next() {
        return Err(PaginateError::MultiplePaginateDirectives {
            first: join(&first.path),
            second: join(&second.path),
        });
    }
    if matches!(kind, DocumentKind::Mutation | DocumentKind::Subscription) {
        return Err(PaginateError::UnsupportedOperation {
            operation: kind.to_string(),
        });
    }

    let page_size = match PassDirective::decode(first.directive)? {
        Some(PassDirective::Paginate { page_size }) => page_size,
        _ => None,
    };
    let parent_type = first.parent_type.ok_or_else(|| {
        PaginateError::unsupported(join(&first.path), "its parent type is not in the schema")
    })?;
    let field = first.field;
    tracing::debug!(path = %join(&first.path), parent = %parent_type, "found paginated field");

    Ok(Some(PaginatedField {
        name: field.name.clone(),
        response_key: field.alias.clone().unwrap_or_else(|| field.name.clone()),
        arguments: field.arguments.clone(),
        path: first.path,
        parent_type,
        page_size,
        span: field
            .location()
            .map(|location| OffsetRange::new(location.offset(), location.end_offset())),
        indices: first.indices,
    }))
}

fn join(path: &[Name]) -> String {
    path.iter().map(Name::as_str).collect::<Vec<_>>().join(".")
}

fn search<'a>(
    schema: &Schema,
    selections: &'a [Selection],
    parent_type: Option<&Name>,
    path: &[Name],
    indices: &[usize],
    found: &mut Vec<Found<'a>>,
) {
    for (index, selection) in selections.iter().enumerate() {
        let mut indices = indices.to_vec();
        indices.push(index);
        match selection {
            Selection::Field(field) => {
                let mut path = path.to_vec();
                path.push(field.alias.clone().unwrap_or_else(|| field.name.clone()));
                if let Some(directive) = directives::find(&field.directives, directives::PAGINATE) {
                    found.push(Found {
                        field,
                        directive,
                        parent_type: parent_type.cloned(),
                        path: path.clone(),
                        indices: indices.clone(),
                    });
                }
                let child_type = parent_type
                    .and_then(|parent| field_type(schema, parent.as_str(), field.name.as_str()))
                    .map(|ty| ty.inner_named_type().clone());
                search(
                    schema,
                    &field.selection_set,
                    child_type.as_ref(),
                    &path,
                    &indices,
                    found,
                );
            }
            Selection::InlineFragment(inline) => {
                let condition = inline.type_condition.as_ref().or(parent_type);
                search(schema, &inline.selection_set, condition, path, &indices, found);
            }
            Selection::FragmentSpread(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphql_test_utils::{parse_document, test_schema};
    use graphql_types::SourceId;

    fn find(source: &str) -> Result<Option<PaginatedField>> {
        let schema = test_schema();
        let document =
            CollectedDocument::new("Doc", SourceId::new("doc.graphql"), parse_document(source));
        find_paginated_field(&schema, &document)
    }

    #[test]
    fn test_field_in_query() {
        let field = find("query Users { usersByCursor(first: 10) @paginate { edges { cursor } } }")
            .unwrap()
            .unwrap();
        assert_eq!(field.name.as_str(), "usersByCursor");
        assert_eq!(field.parent_type.as_str(), "Query");
        assert_eq!(field.display_path(), "usersByCursor");
        assert_eq!(field.indices, vec![0]);
        assert_eq!(field.argument("first").and_then(|value| value.to_i32()), Some(10));
        assert!(field.span.is_some());
    }

    #[test]
    fn test_nested_field_in_fragment_with_alias() {
        let field = find(
            "fragment F on Query { viewer { id ... on User { pals: friendsByCursor(first: 10) @paginate(pageSize: 5) { edges { cursor } } } } }",
        )
        .unwrap()
        .unwrap();
        assert_eq!(field.display_path(), "viewer.pals");
        assert_eq!(field.response_key.as_str(), "pals");
        assert_eq!(field.parent_type.as_str(), "User");
        assert_eq!(field.indices, vec![0, 1, 0]);
        assert_eq!(field.page_size.and_then(|value| value.to_i32()), Some(5));
    }

    #[test]
    fn test_document_without_paginate() {
        assert_eq!(find("query Q { viewer { id } }").unwrap(), None);
        assert_eq!(find("fragment F on User { ...G }").unwrap(), None);
    }

    #[test]
    fn test_two_paginated_fields() {
        let error = find(
            "query Q { usersByCursor @paginate { edges { cursor } } usersByOffset @paginate { id } }",
        )
        .unwrap_err();
        assert_eq!(
            error,
            PaginateError::MultiplePaginateDirectives {
                first: "usersByCursor".to_string(),
                second: "usersByOffset".to_string(),
            }
        );
    }

    #[test]
    fn test_mutation_is_rejected() {
        let error = find("mutation M { renameUser(id: 1, name: \"x\") { friendsByCursor @paginate { edges { cursor } } } }")
            .unwrap_err();
        assert_eq!(error.code(), "unsupported-operation");
    }

    #[test]
    fn test_unknown_parent_type() {
        let error = find("query Q { missing { friendsByCursor @paginate { edges { cursor } } } }")
            .unwrap_err();
        assert_eq!(error.code(), "unsupported-selection-shape");
    }
}
