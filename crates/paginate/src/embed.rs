//! Generating a standalone query for a paginated fragment.
//!
//! A fragment cannot be sent on its own, so every paginated fragment gets a
//! query that looks its parent object up again and spreads a renamed copy of
//! the fragment (the "wrapper"):
//!
//! ```graphql
//! query UserFriends_Pagination_Query($first: Int = 10, $after: String, $id: ID!) {
//!   node(id: $id) {
//!     __typename
//!     id
//!     ...UserFriends_1a2b3c4d @with(first: $first, after: $after)
//!   }
//! }
//! ```

use crate::directives::encode_with;
use crate::document::{CollectedDocument, GeneratedInfo};
use crate::error::{PaginateError, Result};
use crate::identity::Identity;
use crate::naming::{content_hash, pagination_query_name, wrapper_fragment_name, NameRegistry};
use crate::print::print_normalized;
use crate::schema_utils::TYPENAME;
use crate::variables::{RequestKind, VariableOrigin, VariableRequest, VariableSet};
use apollo_compiler::ast::{self, Definition, OperationType, Selection, Value};
use apollo_compiler::{name, Name, Node};
use indexmap::{IndexMap, IndexSet};

/// Processed fragments by name, used to inline what a wrapper spreads.
pub type FragmentIndex<'a> = IndexMap<&'a str, &'a Node<ast::FragmentDefinition>>;

fn to_name(value: &str) -> Result<Name> {
    Name::new(value).map_err(|_| PaginateError::InvalidName {
        value: value.to_string(),
    })
}

fn field(
    name: Name,
    arguments: Vec<Node<ast::Argument>>,
    selection_set: Vec<Selection>,
) -> Selection {
    Selection::Field(Node::new(ast::Field {
        alias: None,
        name,
        arguments,
        directives: ast::DirectiveList(Vec::new()),
        selection_set,
    }))
}

fn variable_argument(argument: &Name, variable: &Name) -> Node<ast::Argument> {
    Node::new(ast::Argument {
        name: argument.clone(),
        value: Node::new(Value::Variable(variable.clone())),
    })
}

/// Variables the lookup needs, as `(argument, variable, type)`.
fn identity_variables(identity: &Identity) -> Vec<(Name, Name, ast::Type)> {
    match identity {
        Identity::Root { .. } => Vec::new(),
        Identity::Node => vec![(name!("id"), name!("id"), ast::Type::NonNullNamed(name!("ID")))],
        Identity::Resolver { arguments, .. } => arguments
            .iter()
            .map(|argument| {
                (
                    argument.argument.clone(),
                    argument.argument.clone(),
                    argument.ty.clone(),
                )
            })
            .collect(),
    }
}

/// Root selection of the pagination query around `spread`.
fn lookup_selection(identity: &Identity, spread: Selection) -> Vec<Selection> {
    let lookup_field = match identity {
        Identity::Root { .. } => return vec![spread],
        Identity::Node => name!("node"),
        Identity::Resolver { query_field, .. } => query_field.clone(),
    };
    let arguments = identity_variables(identity)
        .iter()
        .map(|(argument, variable, _)| variable_argument(argument, variable))
        .collect();
    let mut selections = vec![field(name!("__typename"), Vec::new(), Vec::new())];
    selections.extend(
        identity
            .key_fields()
            .into_iter()
            .filter(|key| key.as_str() != TYPENAME)
            .map(|key| field(key, Vec::new(), Vec::new())),
    );
    selections.push(spread);
    vec![field(lookup_field, arguments, selections)]
}

fn collect_spreads(selections: &[Selection], spreads: &mut Vec<Name>) {
    for selection in selections {
        match selection {
            Selection::Field(field) => collect_spreads(&field.selection_set, spreads),
            Selection::InlineFragment(inline) => collect_spreads(&inline.selection_set, spreads),
            Selection::FragmentSpread(spread) => spreads.push(spread.fragment_name.clone()),
        }
    }
}

/// Fragments reachable from `root`, in discovery order, excluding `root`.
fn transitive_fragments<'a>(
    root: &ast::FragmentDefinition,
    index: &FragmentIndex<'a>,
) -> Result<Vec<&'a Node<ast::FragmentDefinition>>> {
    let mut seen: IndexSet<Name> = IndexSet::new();
    seen.insert(root.name.clone());
    let mut found = Vec::new();
    let mut pending = Vec::new();
    collect_spreads(&root.selection_set, &mut pending);
    pending.reverse();

    while let Some(name) = pending.pop() {
        if !seen.insert(name.clone()) {
            continue;
        }
        let fragment = index.get(name.as_str()).ok_or_else(|| {
            PaginateError::unsupported(
                format!("...{name}"),
                format!("fragment `{name}` is not part of this run"),
            )
        })?;
        let mut nested = Vec::new();
        collect_spreads(&fragment.selection_set, &mut nested);
        pending.extend(nested.into_iter().rev());
        found.push(*fragment);
    }
    Ok(found)
}

/// Build the pagination query of a processed fragment.
///
/// `document` must already carry its refetch spec; the query inherits it.
/// Both generated names are claimed in `registry`.
#[tracing::instrument(skip_all, fields(fragment = %document.name))]
pub fn embed_fragment(
    document: &CollectedDocument,
    identity: &Identity,
    fragments: &FragmentIndex<'_>,
    registry: &NameRegistry,
) -> Result<CollectedDocument> {
    let Some(fragment) = document.fragment() else {
        return Err(PaginateError::unsupported(
            document.name.clone(),
            "only fragments can be embedded",
        ));
    };
    let arguments = document.variables()?;
    let query_name = to_name(&pagination_query_name(fragment.name.as_str()))?;
    let wrapper_name = to_name(&wrapper_fragment_name(
        fragment.name.as_str(),
        &arguments.canonical_text(),
    ))?;

    let requests: Vec<VariableRequest> = identity_variables(identity)
        .into_iter()
        .map(|(argument, variable, ty)| VariableRequest {
            name: variable,
            ty,
            argument,
            origin: VariableOrigin::Identity,
            kind: RequestKind::Absent { fallback: None },
        })
        .collect();
    let variables: VariableSet = arguments.merge(&requests)?;

    let mut spread_directives = ast::DirectiveList(Vec::new());
    if !arguments.is_empty() {
        spread_directives.0.push(encode_with(arguments.names()));
    }
    let spread = Selection::FragmentSpread(Node::new(ast::FragmentSpread {
        fragment_name: wrapper_name.clone(),
        directives: spread_directives,
    }));

    let operation = ast::OperationDefinition {
        operation_type: OperationType::Query,
        name: Some(query_name.clone()),
        variables: variables.to_variable_definitions(),
        directives: ast::DirectiveList(Vec::new()),
        selection_set: lookup_selection(identity, spread),
    };
    let mut wrapper = (**fragment).clone();
    wrapper.name = wrapper_name.clone();

    let mut generated = ast::Document::new();
    generated
        .definitions
        .push(Definition::OperationDefinition(Node::new(operation)));
    generated
        .definitions
        .push(Definition::FragmentDefinition(Node::new(wrapper)));
    for included in transitive_fragments(fragment, fragments)? {
        generated
            .definitions
            .push(Definition::FragmentDefinition(included.clone()));
    }

    let hash = content_hash(&print_normalized(&generated));
    registry.claim(query_name.as_str(), &hash)?;
    if let Err(error) = registry.claim(wrapper_name.as_str(), &hash) {
        registry.release(query_name.as_str());
        return Err(error);
    }
    tracing::debug!(
        query = %query_name,
        wrapper = %wrapper_name,
        %hash,
        "generated pagination query"
    );

    Ok(CollectedDocument {
        name: query_name.to_string(),
        source: document.source.clone(),
        document: generated,
        refetch: document.refetch.clone(),
        generated: Some(GeneratedInfo {
            fragment: fragment.name.to_string(),
            wrapper: wrapper_name.to_string(),
            hash,
        }),
    })
}
