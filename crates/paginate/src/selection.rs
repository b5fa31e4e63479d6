//! Runtime view of a generated query's selection.
//!
//! The store walks this tree instead of the document: every response key
//! maps to its type, its cache key and, for the paginated connection, how
//! new pages are merged.

use crate::augment::{update_hints, UpdateHint, EDGES, PAGE_INFO};
use crate::directives::{self, PAGINATE};
use crate::refetch::{PaginationMethod, RefetchSpec};
use crate::schema_utils::{field_type, is_abstract, possible_types};
use apollo_compiler::ast::{self, Selection};
use apollo_compiler::{Name, Node, Schema};
use indexmap::IndexMap;
use serde::Serialize;

const PAGINATION_ARGUMENTS: [&str; 6] = ["first", "after", "last", "before", "limit", "offset"];

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionMetadata {
    pub fields: IndexMap<String, FieldMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abstract_fields: Option<AbstractFields>,
}

/// Per-concrete-type selections under an abstract parent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AbstractFields {
    pub fields: IndexMap<String, IndexMap<String, FieldMetadata>>,
    /// Concrete type → the abstract entry in `fields` that applies to it
    pub type_map: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMetadata {
    #[serde(rename = "type")]
    pub type_name: String,
    pub key_raw: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub updates: Vec<UpdateHint>,
    #[serde(skip_serializing_if = "is_false")]
    pub nullable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<SelectionMetadata>,
    #[serde(rename = "abstract", skip_serializing_if = "is_false")]
    pub is_abstract: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Plain,
    /// Children of the paginated field
    Connection,
    /// Children of the paginated field's `pageInfo`
    PageInfo,
}

struct Builder<'a> {
    schema: &'a Schema,
    fragments: IndexMap<&'a str, &'a Node<ast::FragmentDefinition>>,
    method: Option<PaginationMethod>,
    hints: Vec<UpdateHint>,
}

/// One field occurrence after flattening fragments.
struct Occurrence<'a> {
    condition: Option<&'a Name>,
    field: &'a Node<ast::Field>,
}

impl<'a> Builder<'a> {
    fn flatten(
        &self,
        selections: &'a [Selection],
        condition: Option<&'a Name>,
        out: &mut Vec<Occurrence<'a>>,
    ) {
        for selection in selections {
            match selection {
                Selection::Field(field) => out.push(Occurrence { condition, field }),
                Selection::InlineFragment(inline) => self.flatten(
                    &inline.selection_set,
                    inline.type_condition.as_ref().or(condition),
                    out,
                ),
                Selection::FragmentSpread(spread) => {
                    match self.fragments.get(spread.fragment_name.as_str()) {
                        Some(fragment) => self.flatten(
                            &fragment.selection_set,
                            Some(&fragment.type_condition),
                            out,
                        ),
                        None => {
                            tracing::trace!(
                                fragment = %spread.fragment_name,
                                "skipping unknown fragment"
                            );
                        }
                    }
                }
            }
        }
    }

    /// Metadata of the merged `selection_sets`, all selected on `parent_type`.
    fn selection(
        &self,
        parent_type: &str,
        selection_sets: &[&'a [Selection]],
        context: Context,
    ) -> SelectionMetadata {
        let mut occurrences = Vec::new();
        for selections in selection_sets {
            self.flatten(selections, None, &mut occurrences);
        }

        let parent_is_abstract = is_abstract(self.schema, parent_type);
        let mut common: Vec<Occurrence<'a>> = Vec::new();
        let mut specific: IndexMap<&'a str, Vec<Occurrence<'a>>> = IndexMap::new();
        for occurrence in occurrences {
            match occurrence.condition {
                Some(condition) if parent_is_abstract && condition.as_str() != parent_type => {
                    specific.entry(condition.as_str()).or_default().push(occurrence);
                }
                _ => common.push(occurrence),
            }
        }

        let fields = self.fields(parent_type, &common, context);
        let abstract_fields = (!specific.is_empty()).then(|| {
            let mut abstract_fields = AbstractFields::default();
            for (condition, occurrences) in &specific {
                let mut merged = self.fields(condition, occurrences, context);
                for (key, field) in &fields {
                    merged.entry(key.clone()).or_insert_with(|| field.clone());
                }
                abstract_fields.fields.insert((*condition).to_string(), merged);
            }
            for condition in specific.keys() {
                if !is_abstract(self.schema, condition) {
                    continue;
                }
                for concrete in possible_types(self.schema, condition) {
                    if !specific.contains_key(concrete.as_str()) {
                        abstract_fields
                            .type_map
                            .entry(concrete.to_string())
                            .or_insert_with(|| (*condition).to_string());
                    }
                }
            }
            abstract_fields
        });

        SelectionMetadata {
            fields,
            abstract_fields,
        }
    }

    /// Metadata for each response key, merging repeated keys.
    fn fields(
        &self,
        parent_type: &str,
        occurrences: &[Occurrence<'a>],
        context: Context,
    ) -> IndexMap<String, FieldMetadata> {
        let mut grouped: IndexMap<&'a Name, Vec<&Occurrence<'a>>> = IndexMap::new();
        for occurrence in occurrences {
            let field = occurrence.field;
            grouped
                .entry(field.alias.as_ref().unwrap_or(&field.name))
                .or_default()
                .push(occurrence);
        }

        let mut fields = IndexMap::new();
        for (key, group) in grouped {
            let first = group[0];
            let type_parent = first.condition.map_or(parent_type, Name::as_str);
            let Some(ty) = field_type(self.schema, type_parent, first.field.name.as_str()) else {
                tracing::trace!(
                    field = %first.field.name,
                    parent = type_parent,
                    "skipping unknown field"
                );
                continue;
            };
            let named = ty.inner_named_type().as_str();
            let name = first.field.name.as_str();
            let paginated = group.iter().any(|occurrence| {
                directives::find(&occurrence.field.directives, PAGINATE).is_some()
            });

            let children: Vec<&'a [Selection]> = group
                .iter()
                .map(|occurrence| occurrence.field.selection_set.as_slice())
                .filter(|selections| !selections.is_empty())
                .collect();
            let child_context = match (context, paginated, name) {
                (_, true, _) => Context::Connection,
                (Context::Connection, _, PAGE_INFO) => Context::PageInfo,
                _ => Context::Plain,
            };
            let selection =
                (!children.is_empty()).then(|| self.selection(named, &children, child_context));

            let updates = match (context, paginated, self.method, name) {
                (_, true, Some(PaginationMethod::Offset), _)
                | (Context::Connection, _, Some(PaginationMethod::Cursor), EDGES)
                | (Context::PageInfo, _, Some(PaginationMethod::Cursor), _) => self.hints.clone(),
                _ => Vec::new(),
            };

            fields.insert(
                key.to_string(),
                FieldMetadata {
                    type_name: named.to_string(),
                    key_raw: key_raw(first.field, paginated),
                    updates,
                    nullable: !ty.is_non_null(),
                    selection,
                    is_abstract: is_abstract(self.schema, named),
                },
            );
        }
        fields
    }
}

/// Cache key of a field: its name plus the arguments that select data.
///
/// The paginated field drops its pagination arguments, since every page
/// lands in the same list.
fn key_raw(field: &ast::Field, paginated: bool) -> String {
    let mut arguments: Vec<&Node<ast::Argument>> = field
        .arguments
        .iter()
        .filter(|argument| !paginated || !PAGINATION_ARGUMENTS.contains(&argument.name.as_str()))
        .collect();
    arguments.sort_by(|a, b| a.name.as_str().cmp(b.name.as_str()));

    let mut key = field.name.to_string();
    if !arguments.is_empty() {
        let printed: Vec<String> = arguments
            .iter()
            .map(|argument| format!("{}: {}", argument.name, &*argument.value))
            .collect();
        key = format!("{key}({})", printed.join(", "));
    }
    if paginated {
        key.push_str("::paginated");
    }
    key
}

/// Selection metadata of the primary operation of `document`.
///
/// `variants` is how many generated documents reach the paginated field;
/// its merge hints are repeated once per variant.
#[must_use]
pub fn selection_metadata(
    schema: &Schema,
    document: &ast::Document,
    root_type: &str,
    refetch: Option<&RefetchSpec>,
    variants: usize,
) -> SelectionMetadata {
    let fragments = document
        .definitions
        .iter()
        .filter_map(|definition| match definition {
            ast::Definition::FragmentDefinition(fragment) => {
                Some((fragment.name.as_str(), fragment))
            }
            _ => None,
        })
        .collect();
    let hints = refetch
        .map(|spec| {
            let hints: &[UpdateHint] = match spec.method {
                PaginationMethod::Cursor => update_hints(spec.direction),
                PaginationMethod::Offset => &[UpdateHint::Append],
            };
            hints.repeat(variants)
        })
        .unwrap_or_default();
    let builder = Builder {
        schema,
        fragments,
        method: refetch.map(|spec| spec.method),
        hints,
    };
    let selections = document
        .definitions
        .iter()
        .find_map(|definition| match definition {
            ast::Definition::OperationDefinition(operation) => {
                Some(operation.selection_set.as_slice())
            }
            _ => None,
        })
        .unwrap_or_default();
    builder.selection(root_type, &[selections], Context::Plain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refetch::PaginationDirection;
    use graphql_test_utils::{parse_document, test_schema};

    fn spec(method: PaginationMethod, direction: PaginationDirection) -> RefetchSpec {
        RefetchSpec {
            path: vec!["usersByCursor".to_string()],
            method,
            page_size: Some(10),
            embedded: false,
            target_type: "Query".to_string(),
            paginated: true,
            direction,
            start: None,
        }
    }

    #[test]
    fn test_connection_hints_and_keys() {
        let schema = test_schema();
        let document = parse_document(
            r#"query Users($first: Int = 10, $after: String) {
                usersByCursor(first: $first, after: $after) @paginate {
                    edges { cursor node { id name } }
                    pageInfo { hasNextPage endCursor }
                }
                user(id: "1") { name }
            }"#,
        );
        let refetch = spec(PaginationMethod::Cursor, PaginationDirection::Forward);
        let metadata = selection_metadata(&schema, &document, "Query", Some(&refetch), 1);

        let users = &metadata.fields["usersByCursor"];
        assert_eq!(users.key_raw, "usersByCursor::paginated");
        assert!(users.updates.is_empty());
        assert!(!users.nullable);

        let connection = users.selection.as_ref().unwrap();
        assert_eq!(connection.fields["edges"].updates, vec![UpdateHint::Append]);
        let page_info = connection.fields["pageInfo"].selection.as_ref().unwrap();
        assert_eq!(page_info.fields["hasNextPage"].updates, vec![UpdateHint::Append]);
        let edges = connection.fields["edges"].selection.as_ref().unwrap();
        assert!(edges.fields["cursor"].updates.is_empty());

        let user = &metadata.fields["user"];
        assert_eq!(user.key_raw, "user(id: \"1\")");
        assert!(user.nullable);
    }

    #[test]
    fn test_hints_repeat_per_variant() {
        let schema = test_schema();
        let document = parse_document(
            "query Users { usersByCursor(first: 10) @paginate { edges { node { id } } } }",
        );
        let refetch = spec(PaginationMethod::Cursor, PaginationDirection::Both);
        let metadata = selection_metadata(&schema, &document, "Query", Some(&refetch), 2);
        let connection = metadata.fields["usersByCursor"].selection.as_ref().unwrap();
        assert_eq!(
            connection.fields["edges"].updates,
            vec![
                UpdateHint::Append,
                UpdateHint::Prepend,
                UpdateHint::Append,
                UpdateHint::Prepend
            ]
        );
    }

    #[test]
    fn test_offset_tags_the_list() {
        let schema = test_schema();
        let document =
            parse_document("query Users { usersByOffset(limit: 10) @paginate { id } }");
        let refetch = spec(PaginationMethod::Offset, PaginationDirection::Forward);
        let metadata = selection_metadata(&schema, &document, "Query", Some(&refetch), 1);
        let users = &metadata.fields["usersByOffset"];
        assert_eq!(users.key_raw, "usersByOffset::paginated");
        assert_eq!(users.updates, vec![UpdateHint::Append]);
    }

    #[test]
    fn test_abstract_parent_splits_fields() {
        let schema = test_schema();
        let document = parse_document(
            r#"query Lookup($id: ID!) {
                node(id: $id) { __typename id ...UserName }
            }
            fragment UserName on User { name }"#,
        );
        let metadata = selection_metadata(&schema, &document, "Query", None, 1);
        let node = &metadata.fields["node"];
        assert_eq!(node.key_raw, "node(id: $id)");
        assert!(node.is_abstract);
        let selection = node.selection.as_ref().unwrap();
        assert_eq!(
            selection.fields.keys().collect::<Vec<_>>(),
            vec!["__typename", "id"]
        );
        let abstract_fields = selection.abstract_fields.as_ref().unwrap();
        assert_eq!(
            abstract_fields.fields["User"].keys().collect::<Vec<_>>(),
            vec!["name", "__typename", "id"]
        );
        assert!(abstract_fields.type_map.is_empty());
    }

    #[test]
    fn test_abstract_conditions_fill_type_map() {
        let schema = test_schema();
        let document = parse_document(
            r#"query Search { search(term: "x") { ... on Node { id } ... on Cat { name } } }"#,
        );
        let metadata = selection_metadata(&schema, &document, "Query", None, 1);
        let search = metadata.fields["search"].selection.as_ref().unwrap();
        let abstract_fields = search.abstract_fields.as_ref().unwrap();
        assert!(abstract_fields.fields.contains_key("Node"));
        assert!(abstract_fields.fields.contains_key("Cat"));
        assert_eq!(abstract_fields.type_map.get("User").map(String::as_str), Some("Node"));
        assert!(!abstract_fields.type_map.contains_key("Cat"));
    }

    #[test]
    fn test_repeated_keys_merge() {
        let schema = test_schema();
        let document = parse_document(
            "query Viewer { viewer { id } viewer { name } me: viewer { id } }",
        );
        let metadata = selection_metadata(&schema, &document, "Query", None, 1);
        let viewer = metadata.fields["viewer"].selection.as_ref().unwrap();
        assert_eq!(viewer.fields.keys().collect::<Vec<_>>(), vec!["id", "name"]);
        assert_eq!(metadata.fields["me"].key_raw, "viewer");
    }

    #[test]
    fn test_serialized_shape() {
        let schema = test_schema();
        let document = parse_document("query Viewer { viewer { id } }");
        let metadata = selection_metadata(&schema, &document, "Query", None, 1);
        insta::assert_json_snapshot!(metadata, @r#"
        {
          "fields": {
            "viewer": {
              "type": "User",
              "keyRaw": "viewer",
              "nullable": true,
              "selection": {
                "fields": {
                  "id": {
                    "type": "ID",
                    "keyRaw": "id"
                  }
                }
              }
            }
          }
        }
        "#);
    }
}
