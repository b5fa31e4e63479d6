//! Splitting a source file into collected documents.

use crate::document::CollectedDocument;
use crate::error::ParseError;
use apollo_compiler::ast::{self, Definition};
use graphql_types::SourceId;

/// Name given to operations without one.
pub const ANONYMOUS: &str = "<anonymous>";

/// Parse `source` and return one document per operation or fragment, in
/// source order. Type system definitions are skipped.
#[tracing::instrument(skip(source), fields(path = %path.as_str()))]
pub fn collect_documents(
    source: &str,
    path: &SourceId,
) -> Result<Vec<CollectedDocument>, ParseError> {
    let parsed = ast::Document::parse(source, path.as_str()).map_err(|errors| ParseError {
        path: path.clone(),
        message: errors.errors.to_string(),
    })?;

    let mut documents = Vec::new();
    for definition in &parsed.definitions {
        let name = match definition {
            Definition::OperationDefinition(operation) => operation
                .name
                .as_ref()
                .map_or_else(|| ANONYMOUS.to_string(), ToString::to_string),
            Definition::FragmentDefinition(fragment) => fragment.name.to_string(),
            _ => {
                tracing::trace!("skipping type system definition");
                continue;
            }
        };
        let mut document = parsed.clone();
        document.definitions = vec![definition.clone()];
        documents.push(CollectedDocument::new(name, path.clone(), document));
    }
    tracing::debug!(count = documents.len(), "collected documents");
    Ok(documents)
}
