//! One named definition flowing through the pass.

use crate::directives::{self, encode_arguments};
use crate::error::Result;
use crate::refetch::RefetchSpec;
use crate::variables::{variable_definition, VariableSet};
use apollo_compiler::ast::{self, Definition, OperationType};
use apollo_compiler::Node;
use graphql_types::{OffsetRange, SourceId};

/// What a collected document's primary definition is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Query,
    Mutation,
    Subscription,
    Fragment,
}

impl DocumentKind {
    #[must_use]
    pub const fn is_fragment(self) -> bool {
        matches!(self, Self::Fragment)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Subscription => "subscription",
            Self::Fragment => "fragment",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance of a synthetic pagination query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedInfo {
    /// The fragment the query was generated for
    pub fragment: String,
    /// Name of the renamed copy of that fragment the query spreads
    pub wrapper: String,
    /// SHA-256 of the query's raw text
    pub hash: String,
}

/// A single operation or fragment, plus everything the pass attaches to it.
///
/// The first definition of `document` is the primary one. Authored documents
/// hold exactly that definition; synthetic queries also carry the wrapper
/// fragment and every fragment it spreads.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectedDocument {
    pub name: String,
    pub source: SourceId,
    pub document: ast::Document,
    pub refetch: Option<RefetchSpec>,
    pub generated: Option<GeneratedInfo>,
}

impl CollectedDocument {
    #[must_use]
    pub fn new(name: impl Into<String>, source: SourceId, document: ast::Document) -> Self {
        Self {
            name: name.into(),
            source,
            document,
            refetch: None,
            generated: None,
        }
    }

    #[must_use]
    pub fn primary(&self) -> Option<&Definition> {
        self.document.definitions.first()
    }

    #[must_use]
    pub fn kind(&self) -> Option<DocumentKind> {
        match self.primary()? {
            Definition::OperationDefinition(operation) => Some(match operation.operation_type {
                OperationType::Query => DocumentKind::Query,
                OperationType::Mutation => DocumentKind::Mutation,
                OperationType::Subscription => DocumentKind::Subscription,
            }),
            Definition::FragmentDefinition(_) => Some(DocumentKind::Fragment),
            _ => None,
        }
    }

    #[must_use]
    pub fn operation(&self) -> Option<&Node<ast::OperationDefinition>> {
        match self.primary()? {
            Definition::OperationDefinition(operation) => Some(operation),
            _ => None,
        }
    }

    #[must_use]
    pub fn fragment(&self) -> Option<&Node<ast::FragmentDefinition>> {
        match self.primary()? {
            Definition::FragmentDefinition(fragment) => Some(fragment),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_generated(&self) -> bool {
        self.generated.is_some()
    }

    /// Byte range of the primary definition in its source file.
    #[must_use]
    pub fn span(&self) -> Option<OffsetRange> {
        let location = match self.primary()? {
            Definition::OperationDefinition(operation) => operation.location(),
            Definition::FragmentDefinition(fragment) => fragment.location(),
            _ => None,
        }?;
        Some(OffsetRange::new(location.offset(), location.end_offset()))
    }

    /// Variables declared by the primary definition.
    pub fn variables(&self) -> Result<VariableSet> {
        match self.primary() {
            Some(Definition::OperationDefinition(operation)) => {
                Ok(VariableSet::from_operation(operation))
            }
            Some(Definition::FragmentDefinition(fragment)) => VariableSet::from_fragment(fragment),
            _ => Ok(VariableSet::new()),
        }
    }

    /// Write `variables` back into the primary definition.
    ///
    /// Operations keep their existing declarations and gain the new ones at
    /// the end. Fragments get their `@arguments` directive rewritten in
    /// place, or appended when they had none.
    pub fn apply_variables(&mut self, variables: &VariableSet) {
        match self.document.definitions.first_mut() {
            Some(Definition::OperationDefinition(operation)) => {
                let operation = operation.make_mut();
                for (name, binding) in variables.iter() {
                    if !operation.variables.iter().any(|declared| declared.name == *name) {
                        operation.variables.push(variable_definition(name, binding));
                    }
                }
            }
            Some(Definition::FragmentDefinition(fragment)) => {
                let fragment = fragment.make_mut();
                let arguments = variables.to_fragment_arguments();
                let encoded = encode_arguments(&arguments);
                let existing = fragment
                    .directives
                    .0
                    .iter()
                    .position(|directive| directive.name.as_str() == directives::ARGUMENTS);
                match existing {
                    Some(index) => fragment.directives.0[index] = encoded,
                    None if !arguments.is_empty() => fragment.directives.0.push(encoded),
                    None => {}
                }
            }
            _ => {}
        }
    }

    /// Top-level selections of the primary definition.
    #[must_use]
    pub fn selection_set(&self) -> Option<&[ast::Selection]> {
        match self.primary()? {
            Definition::OperationDefinition(operation) => Some(operation.selection_set.as_slice()),
            Definition::FragmentDefinition(fragment) => Some(fragment.selection_set.as_slice()),
            _ => None,
        }
    }

    /// The field at `indices`, where each index walks one selection set and
    /// inline fragments count as a step.
    #[must_use]
    pub fn field(&self, indices: &[usize]) -> Option<&ast::Field> {
        let (last, steps) = indices.split_last()?;
        let mut selections = self.selection_set()?;
        for index in steps {
            selections = match selections.get(*index)? {
                ast::Selection::Field(field) => field.selection_set.as_slice(),
                ast::Selection::InlineFragment(inline) => inline.selection_set.as_slice(),
                ast::Selection::FragmentSpread(_) => return None,
            };
        }
        match selections.get(*last)? {
            ast::Selection::Field(field) => Some(&**field),
            _ => None,
        }
    }

    /// Mutable counterpart of [`CollectedDocument::field`].
    pub fn field_mut(&mut self, indices: &[usize]) -> Option<&mut ast::Field> {
        let (last, steps) = indices.split_last()?;
        let mut selections = match self.document.definitions.first_mut()? {
            Definition::OperationDefinition(operation) => &mut operation.make_mut().selection_set,
            Definition::FragmentDefinition(fragment) => &mut fragment.make_mut().selection_set,
            _ => return None,
        };
        for index in steps {
            selections = match selections.get_mut(*index)? {
                ast::Selection::Field(field) => &mut field.make_mut().selection_set,
                ast::Selection::InlineFragment(inline) => &mut inline.make_mut().selection_set,
                ast::Selection::FragmentSpread(_) => return None,
            };
        }
        match selections.get_mut(*last)? {
            ast::Selection::Field(field) => Some(field.make_mut()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphql_test_utils::{fragment_arguments, parse_document, variable_definitions};

    fn collected(source: &str) -> CollectedDocument {
        CollectedDocument::new("Doc", SourceId::new("doc.graphql"), parse_document(source))
    }

    #[test]
    fn test_kind() {
        assert_eq!(collected("query Q { viewer { id } }").kind(), Some(DocumentKind::Query));
        assert_eq!(
            collected("mutation M { renameUser(id: 1, name: \"a\") { id } }").kind(),
            Some(DocumentKind::Mutation)
        );
        assert_eq!(
            collected("fragment F on User { id }").kind(),
            Some(DocumentKind::Fragment)
        );
        assert!(DocumentKind::Fragment.is_fragment());
        assert_eq!(DocumentKind::Subscription.to_string(), "subscription");
    }

    #[test]
    fn test_span_covers_definition() {
        let document = collected("query Q { viewer { id } }");
        let span = document.span().unwrap();
        assert_eq!(span.start, 0);
        assert_eq!(span.end, "query Q { viewer { id } }".len());
    }

    #[test]
    fn test_field_by_indices() {
        let document = collected("query Q { viewer { id ... on User { name } } }");
        assert_eq!(document.field(&[0]).map(|f| f.name.as_str()), Some("viewer"));
        assert_eq!(document.field(&[0, 1, 0]).map(|f| f.name.as_str()), Some("name"));
        assert!(document.field(&[0, 1]).is_none());
        assert!(document.field(&[3]).is_none());
    }

    #[test]
    fn test_field_mut_edits_in_place() {
        let mut document = collected("query Q { viewer { id } }");
        let viewer = document.field_mut(&[0]).unwrap();
        viewer.selection_set.clear();
        assert!(document.field(&[0]).unwrap().selection_set.is_empty());
    }

    #[test]
    fn test_apply_variables_to_operation_appends() {
        let mut document = collected("query Q($after: String) { viewer { id } }");
        let fragment = collected(r#"fragment F on User @arguments(first: {type: "Int", default: 10}, after: {type: "String"}) { id }"#);
        let variables = fragment.variables().unwrap();
        document.apply_variables(&variables);
        assert_eq!(
            variable_definitions(&document.document, "Q"),
            vec!["$after: String".to_string(), "$first: Int = 10".to_string()]
        );
    }

    #[test]
    fn test_apply_variables_to_fragment_rewrites_arguments() {
        let mut document = collected(
            r#"fragment F on User @arguments(first: {type: "Int"}) @include(if: true) { id }"#,
        );
        let operation = collected("query Q($first: Int = 5, $after: String) { viewer { id } }");
        document.apply_variables(&operation.variables().unwrap());
        assert_eq!(
            fragment_arguments(&document.document, "F"),
            vec![
                ("first".to_string(), "Int".to_string(), Some("5".to_string())),
                ("after".to_string(), "String".to_string(), None),
            ]
        );
        let directives = &document.fragment().unwrap().directives;
        assert_eq!(directives.0[0].name.as_str(), "arguments");
        assert_eq!(directives.0[1].name.as_str(), "include");
    }

    #[test]
    fn test_apply_empty_variables_leaves_fragment_alone() {
        let mut document = collected("fragment F on User { id }");
        document.apply_variables(&VariableSet::new());
        assert!(document.fragment().unwrap().directives.0.is_empty());
    }
}
