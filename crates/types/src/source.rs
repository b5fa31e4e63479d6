//! Source identity for collected documents.

use std::path::Path;
use std::sync::Arc;

/// Identifies where a document came from.
///
/// Usually a file path relative to the project root. Synthetic documents
/// reuse the source of the fragment they were generated from, so diagnostics
/// always point at something the user authored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(Arc<str>);

impl SourceId {
    /// Create a new `SourceId` from a string.
    #[must_use]
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Create a `SourceId` from a filesystem path.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        Self(path.to_string_lossy().into())
    }

    /// Get the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the source looks like a GraphQL document file.
    #[must_use]
    pub fn is_graphql_file(&self) -> bool {
        Path::new(self.as_str())
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| matches!(ext, "graphql" | "gql"))
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_id_display() {
        let source = SourceId::new("src/users.graphql");
        assert_eq!(source.to_string(), "src/users.graphql");
        assert_eq!(source.as_str(), "src/users.graphql");
    }

    #[test]
    fn test_source_id_from_path() {
        let source = SourceId::from_path(Path::new("queries/friends.gql"));
        assert_eq!(source.as_str(), "queries/friends.gql");
        assert!(source.is_graphql_file());
    }

    #[test]
    fn test_non_graphql_source() {
        assert!(!SourceId::new("schema.json").is_graphql_file());
        assert!(!SourceId::new("<inline>").is_graphql_file());
    }
}
