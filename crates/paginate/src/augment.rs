//! Making sure a paginated selection fetches what the runtime needs.

use crate::identity::TypeConfigLookup;
use crate::mode::PaginationMode;
use crate::refetch::PaginationDirection;
use crate::schema_utils::{field_type, has_field, ConnectionShape, TYPENAME};
use apollo_compiler::ast::{self, Selection};
use apollo_compiler::{Name, Node, Schema};
use serde::{Deserialize, Serialize};

pub(crate) const EDGES: &str = "edges";
pub(crate) const NODE: &str = "node";
pub(crate) const CURSOR: &str = "cursor";
pub(crate) const PAGE_INFO: &str = "pageInfo";
pub(crate) const PAGE_INFO_FIELDS: [&str; 4] =
    ["hasPreviousPage", "hasNextPage", "startCursor", "endCursor"];

/// How the runtime merges a new page into a cached list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateHint {
    Append,
    Prepend,
}

/// Hints for one generated variant of a field paging in `direction`.
#[must_use]
pub const fn update_hints(direction: PaginationDirection) -> &'static [UpdateHint] {
    match direction {
        PaginationDirection::Forward => &[UpdateHint::Append],
        PaginationDirection::Backward => &[UpdateHint::Prepend],
        PaginationDirection::Both => &[UpdateHint::Append, UpdateHint::Prepend],
    }
}

fn new_field(name: &str) -> Option<Selection> {
    let name = Name::new(name).ok()?;
    Some(Selection::Field(Node::new(ast::Field {
        alias: None,
        name,
        arguments: Vec::new(),
        directives: ast::DirectiveList(Vec::new()),
        selection_set: Vec::new(),
    })))
}

fn is_plain_field(selection: &Selection, name: &str) -> bool {
    matches!(
        selection,
        Selection::Field(field) if field.alias.is_none() && field.name.as_str() == name
    )
}

/// The unaliased field `name` in `selections`, appended if missing.
fn ensure_field<'a>(selections: &'a mut Vec<Selection>, name: &str) -> Option<&'a mut ast::Field> {
    if !selections.iter().any(|selection| is_plain_field(selection, name)) {
        tracing::trace!(field = name, "injecting field");
        selections.push(new_field(name)?);
    }
    selections.iter_mut().find_map(|selection| match selection {
        Selection::Field(field) if field.alias.is_none() && field.name.as_str() == name => {
            Some(field.make_mut())
        }
        _ => None,
    })
}

/// Inject the connection fields a cursor-paginated `field` needs.
///
/// `parent_type` is the type declaring `field`. Offset pagination needs
/// nothing beyond what the author selected. Authored selections keep their
/// order; missing fields are appended.
#[tracing::instrument(skip_all, fields(field = %field.name, ?mode))]
pub fn augment_selection(
    schema: &Schema,
    config: &dyn TypeConfigLookup,
    field: &mut ast::Field,
    parent_type: &str,
    mode: PaginationMode,
) {
    if !mode.is_cursor() {
        return;
    }
    let Some(return_type) = field_type(schema, parent_type, field.name.as_str()) else {
        return;
    };
    let shape = ConnectionShape::of(schema, return_type.inner_named_type().as_str());

    if let Some(edges) = ensure_field(&mut field.selection_set, EDGES) {
        if let Some(node_type) = &shape.node_type {
            if let Some(node) = ensure_field(&mut edges.selection_set, NODE) {
                let keys = config.keys_for(node_type.as_str());
                for key in keys
                    .iter()
                    .filter(|key| has_field(schema, node_type.as_str(), key))
                {
                    ensure_field(&mut node.selection_set, key);
                }
                ensure_field(&mut node.selection_set, TYPENAME);
            }
        }
        ensure_field(&mut edges.selection_set, CURSOR);
    }

    if let (Some(page_info_type), Some(page_info)) = (
        &shape.page_info_type,
        ensure_field(&mut field.selection_set, PAGE_INFO),
    ) {
        for name in PAGE_INFO_FIELDS
            .iter()
            .filter(|name| has_field(schema, page_info_type.as_str(), name))
        {
            ensure_field(&mut page_info.selection_set, name);
        }
    }
}
