//! The record a build writes out for a pagination query.

use crate::document::{CollectedDocument, DocumentKind};
use crate::naming::content_hash;
use crate::print::{print_normalized, print_raw};
use crate::refetch::RefetchSpec;
use crate::schema_utils::query_root;
use crate::selection::{selection_metadata, SelectionMetadata};
use apollo_compiler::schema::ExtendedType;
use apollo_compiler::Schema;
use indexmap::IndexMap;
use serde::Serialize;

/// Generated documents reaching the paginated field of a synthetic query:
/// the wrapper fragment and the query itself.
const SYNTHETIC_VARIANTS: usize = 2;

/// Variables of a query and the input object types they reach.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArtifactInput {
    /// Variable → named type
    pub fields: IndexMap<String, String>,
    /// Input object → field → named type
    pub types: IndexMap<String, IndexMap<String, String>>,
}

impl ArtifactInput {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryArtifact {
    pub name: String,
    pub kind: &'static str,
    pub hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refetch: Option<RefetchSpec>,
    pub raw: String,
    pub root_type: String,
    pub selection: SelectionMetadata,
    #[serde(skip_serializing_if = "ArtifactInput::is_empty")]
    pub input: ArtifactInput,
}

impl QueryArtifact {
    /// Artifact of a query document, `None` for fragments and other
    /// operation kinds.
    #[must_use]
    #[tracing::instrument(skip_all, fields(document = %document.name))]
    pub fn build(schema: &Schema, document: &CollectedDocument) -> Option<Self> {
        if document.kind()? != DocumentKind::Query {
            return None;
        }
        let operation = document.operation()?;
        let root_type = query_root(schema)?;

        let variants = if document.is_generated() {
            SYNTHETIC_VARIANTS
        } else {
            1
        };
        let hash = document.generated.as_ref().map_or_else(
            || content_hash(&print_normalized(&document.document)),
            |generated| generated.hash.clone(),
        );

        let mut input = ArtifactInput::default();
        for variable in &operation.variables {
            let named = variable.ty.inner_named_type();
            input
                .fields
                .insert(variable.name.to_string(), named.to_string());
            collect_input_types(schema, named.as_str(), &mut input.types);
        }

        Some(Self {
            name: document.name.clone(),
            kind: "Query",
            hash,
            refetch: document.refetch.clone(),
            raw: print_raw(&document.document),
            root_type: root_type.to_string(),
            selection: selection_metadata(
                schema,
                &document.document,
                root_type.as_str(),
                document.refetch.as_ref(),
                variants,
            ),
            input,
        })
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Record `type_name` and every input object it reaches, once each.
fn collect_input_types(
    schema: &Schema,
    type_name: &str,
    types: &mut IndexMap<String, IndexMap<String, String>>,
) {
    if types.contains_key(type_name) {
        return;
    }
    let Some(ExtendedType::InputObject(input)) = schema.types.get(type_name) else {
        return;
    };
    let fields: IndexMap<String, String> = input
        .fields
        .iter()
        .map(|(name, field)| (name.to_string(), field.ty.inner_named_type().to_string()))
        .collect();
    let nested: Vec<String> = fields.values().cloned().collect();
    types.insert(type_name.to_string(), fields);
    for field_type in nested {
        collect_input_types(schema, &field_type, types);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphql_test_utils::{parse_document, test_schema};
    use graphql_types::SourceId;

    fn collected(source: &str) -> CollectedDocument {
        let document = parse_document(source);
        let name = match &document.definitions[0] {
            apollo_compiler::ast::Definition::OperationDefinition(operation) => operation
                .name
                .as_ref()
                .map_or_else(String::new, ToString::to_string),
            apollo_compiler::ast::Definition::FragmentDefinition(fragment) => fragment.name.to_string(),
            _ => String::new(),
        };
        CollectedDocument::new(name, SourceId::new("document.graphql"), document)
    }

    #[test]
    fn test_input_types_are_collected_transitively() {
        let schema = test_schema();
        let document = collected(
            "query Filtered($filter: UserFilter, $first: Int = 10) { filteredUsers(filter: $filter, first: $first) { edges { cursor } } }",
        );
        let artifact = QueryArtifact::build(&schema, &document).unwrap();
        assert_eq!(artifact.kind, "Query");
        assert_eq!(artifact.root_type, "Query");
        assert_eq!(
            artifact.input.fields.iter().collect::<Vec<_>>(),
            vec![
                (&"filter".to_string(), &"UserFilter".to_string()),
                (&"first".to_string(), &"Int".to_string())
            ]
        );
        assert_eq!(
            artifact.input.types.keys().collect::<Vec<_>>(),
            vec!["UserFilter", "NestedFilter"]
        );
        assert_eq!(artifact.input.types["UserFilter"]["role"], "Role");
        assert_eq!(artifact.input.types["NestedFilter"]["createdAfter"], "String");
    }

    #[test]
    fn test_authored_query_hash_covers_raw_text() {
        let schema = test_schema();
        let document = collected("query Viewer { viewer { id } }");
        let artifact = QueryArtifact::build(&schema, &document).unwrap();
        assert_eq!(
            artifact.hash,
            content_hash(&print_normalized(&document.document))
        );
        assert!(artifact.input.is_empty());
        let json = artifact.to_json().unwrap();
        assert!(!json.contains("\"input\""));
        assert!(!json.contains("\"refetch\""));
    }

    #[test]
    fn test_fragments_have_no_artifact() {
        let schema = test_schema();
        let document = collected("fragment F on User { id }");
        assert!(QueryArtifact::build(&schema, &document).is_none());
    }
}
