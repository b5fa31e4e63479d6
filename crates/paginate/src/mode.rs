//! Classifying how a paginated field pages.

use crate::error::{PaginateError, Result};
use crate::field::PaginatedField;
use crate::refetch::{PaginationDirection, PaginationMethod};
use crate::schema_utils::{field_definition, is_list, ConnectionShape};
use apollo_compiler::Schema;

const FORWARD: &[&str] = &["first", "after"];
const BACKWARD: &[&str] = &["last", "before"];
const OFFSET: &[&str] = &["limit", "offset"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaginationMode {
    CursorForward,
    CursorBackward,
    CursorBoth,
    Offset,
}

impl PaginationMode {
    #[must_use]
    pub const fn method(self) -> PaginationMethod {
        match self {
            Self::Offset => PaginationMethod::Offset,
            _ => PaginationMethod::Cursor,
        }
    }

    #[must_use]
    pub const fn direction(self) -> PaginationDirection {
        match self {
            Self::CursorForward | Self::Offset => PaginationDirection::Forward,
            Self::CursorBackward => PaginationDirection::Backward,
            Self::CursorBoth => PaginationDirection::Both,
        }
    }

    /// Arguments the field must end up passing, in canonical order.
    #[must_use]
    pub const fn arguments(self) -> &'static [&'static str] {
        match self {
            Self::CursorForward => &["first", "after"],
            Self::CursorBackward => &["last", "before"],
            Self::CursorBoth => &["first", "after", "last", "before"],
            Self::Offset => &["limit", "offset"],
        }
    }

    /// The argument holding the page size.
    #[must_use]
    pub const fn anchor(self) -> &'static str {
        match self {
            Self::CursorForward | Self::CursorBoth => "first",
            Self::CursorBackward => "last",
            Self::Offset => "limit",
        }
    }

    #[must_use]
    pub const fn is_cursor(self) -> bool {
        !matches!(self, Self::Offset)
    }

    const fn cursor(forward: bool, backward: bool) -> Self {
        match (forward, backward) {
            (true, true) => Self::CursorBoth,
            (false, true) => Self::CursorBackward,
            _ => Self::CursorForward,
        }
    }
}

fn any_of(names: &[&str], group: &[&str]) -> bool {
    group.iter().any(|argument| names.contains(argument))
}

fn present(names: &[&str], groups: &[&[&str]]) -> String {
    names
        .iter()
        .copied()
        .filter(|name| groups.iter().any(|group| group.contains(name)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Decide the pagination mode of `field`.
///
/// Arguments the field passes take precedence over what the schema declares;
/// a field passing nothing falls back to its declared arguments and then to
/// its return type.
#[tracing::instrument(skip_all, fields(field = %field.display_path()))]
pub fn detect_mode(schema: &Schema, field: &PaginatedField) -> Result<PaginationMode> {
    let display = field.display_path();
    let definition = field_definition(schema, field.parent_type.as_str(), field.name.as_str())
        .ok_or_else(|| {
            PaginateError::unsupported(
                &display,
                format!("`{}` has no field `{}`", field.parent_type, field.name),
            )
        })?;

    let supplied: Vec<&str> = field
        .arguments
        .iter()
        .map(|argument| argument.name.as_str())
        .collect();
    let declared: Vec<&str> = definition
        .arguments
        .iter()
        .map(|argument| argument.name.as_str())
        .collect();

    let supplied_cursor = any_of(&supplied, FORWARD) || any_of(&supplied, BACKWARD);
    let supplied_offset = any_of(&supplied, OFFSET);
    let return_type = definition.ty.inner_named_type();

    let mode = if supplied_cursor && supplied_offset {
        return Err(PaginateError::AmbiguousMode {
            field: display,
            cursor: present(&supplied, &[FORWARD, BACKWARD]),
            offset: present(&supplied, &[OFFSET]),
        });
    } else if supplied_offset {
        PaginationMode::Offset
    } else if supplied_cursor {
        PaginationMode::cursor(
            any_of(&supplied, FORWARD) || any_of(&declared, FORWARD),
            any_of(&supplied, BACKWARD) || any_of(&declared, BACKWARD),
        )
    } else if any_of(&declared, FORWARD) || any_of(&declared, BACKWARD) {
        PaginationMode::cursor(any_of(&declared, FORWARD), any_of(&declared, BACKWARD))
    } else if any_of(&declared, OFFSET) {
        PaginationMode::Offset
    } else if ConnectionShape::of(schema, return_type.as_str()).is_bidirectional() {
        PaginationMode::CursorBoth
    } else {
        return Err(PaginateError::unsupported(
            display,
            "it takes no pagination arguments and does not return a connection",
        ));
    };

    if mode.is_cursor() && !ConnectionShape::of(schema, return_type.as_str()).is_connection() {
        return Err(PaginateError::unsupported(
            display,
            format!("cursor pagination needs `edges` and `pageInfo` on `{return_type}`"),
        ));
    }
    if mode == PaginationMode::Offset && !is_list(&definition.ty) {
        return Err(PaginateError::unsupported(
            display,
            format!("offset pagination needs a list, found `{}`", definition.ty),
        ));
    }

    tracing::debug!(?mode, "detected pagination mode");
    Ok(mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::CollectedDocument;
    use crate::field::find_paginated_field;
    use graphql_test_utils::{parse_document, test_schema};
    use graphql_types::SourceId;

    fn mode_of(source: &str) -> Result<PaginationMode> {
        let schema = test_schema();
        let document =
            CollectedDocument::new("Doc", SourceId::new("doc.graphql"), parse_document(source));
        let field = find_paginated_field(&schema, &document)?.unwrap();
        detect_mode(&schema, &field)
    }

    #[test]
    fn test_forward_only_field() {
        let mode = mode_of(
            "query Q { usersByForwardsCursor(first: 10) @paginate { edges { node { id } } } }",
        )
        .unwrap();
        assert_eq!(mode, PaginationMode::CursorForward);
        assert_eq!(mode.direction(), PaginationDirection::Forward);
        assert_eq!(mode.method(), PaginationMethod::Cursor);
    }

    #[test]
    fn test_backward_only_field() {
        let mode = mode_of(
            "query Q { usersByBackwardsCursor(last: 10) @paginate { edges { node { id } } } }",
        )
        .unwrap();
        assert_eq!(mode, PaginationMode::CursorBackward);
        assert_eq!(mode.anchor(), "last");
    }

    #[test]
    fn test_declared_backward_arguments_make_both() {
        let mode =
            mode_of("query Q { usersByCursor(first: 10) @paginate { edges { node { id } } } }")
                .unwrap();
        assert_eq!(mode, PaginationMode::CursorBoth);
        assert_eq!(mode.arguments(), &["first", "after", "last", "before"]);
    }

    #[test]
    fn test_offset_field() {
        let mode = mode_of("query Q { usersByOffset(limit: 10) @paginate { id } }").unwrap();
        assert_eq!(mode, PaginationMode::Offset);
        assert_eq!(mode.direction(), PaginationDirection::Forward);
        assert!(!mode.is_cursor());
    }

    #[test]
    fn test_nothing_supplied_uses_declared_arguments() {
        let mode = mode_of("query Q { usersByOffset @paginate { id } }").unwrap();
        assert_eq!(mode, PaginationMode::Offset);
        let mode =
            mode_of("query Q { usersByMixed @paginate { edges { node { id } } } }").unwrap();
        assert_eq!(mode, PaginationMode::CursorForward);
    }

    #[test]
    fn test_bare_connection_is_both() {
        let mode = mode_of("query Q { usersConnection @paginate { edges { node { id } } } }")
            .unwrap();
        assert_eq!(mode, PaginationMode::CursorBoth);
    }

    #[test]
    fn test_mixed_arguments_are_ambiguous() {
        let error = mode_of(
            "query Q { usersByMixed(first: 10, offset: 5) @paginate { edges { node { id } } } }",
        )
        .unwrap_err();
        assert_eq!(
            error,
            PaginateError::AmbiguousMode {
                field: "usersByMixed".to_string(),
                cursor: "first".to_string(),
                offset: "offset".to_string(),
            }
        );
    }

    #[test]
    fn test_offset_on_connection_is_unsupported() {
        let error = mode_of("query Q { usersByMixed(limit: 10) @paginate { edges { cursor } } }")
            .unwrap_err();
        assert_eq!(error.code(), "unsupported-selection-shape");
        assert_eq!(
            error.to_string(),
            "`usersByMixed` cannot be paginated: offset pagination needs a list, found `UserConnection!`"
        );
    }

    #[test]
    fn test_field_without_pagination_shape() {
        let error = mode_of("query Q { search(term: \"a\") @paginate { __typename } }").unwrap_err();
        assert_eq!(error.code(), "unsupported-selection-shape");
    }

    #[test]
    fn test_cursor_on_plain_list_is_unsupported() {
        let error = mode_of("query Q { usersByOffset(first: 10) @paginate { id } }").unwrap_err();
        assert!(error.to_string().contains("edges"));
    }
}
