//! Common schema and configuration fixtures.

use apollo_compiler::ast::Document;
use apollo_compiler::validation::Valid;
use apollo_compiler::Schema;
use graphql_config::{PaginateConfig, ResolveConfig, TypeConfig};

/// Schema covering every pagination shape the pass understands.
///
/// - `usersByCursor` / `friendsByCursor`: bidirectional cursor connections
/// - `*ByForwardsCursor` / `*ByBackwardsCursor`: one-directional connections
/// - `*ByOffset`: limit/offset lists
/// - `Ghost`: not a `Node`, resolvable through `ghost(name:, aka:)` when configured
/// - `Post`: neither a `Node` nor configured
pub const TEST_SCHEMA: &str = r#"
interface Node {
  id: ID!
}

type PageInfo {
  hasPreviousPage: Boolean!
  hasNextPage: Boolean!
  startCursor: String
  endCursor: String
}

type User implements Node {
  id: ID!
  name: String!
  friendsByCursor(first: Int, after: String, last: Int, before: String): UserConnection!
  friendsByForwardsCursor(first: Int, after: String): UserConnection!
  friendsByBackwardsCursor(last: Int, before: String): UserConnection!
  friendsByOffset(limit: Int, offset: Int): [User!]!
  friendsConnection(first: Int, after: String, filter: String): UserConnection!
}

type Cat implements Node {
  id: ID!
  name: String!
  owner: User
}

union SearchResult = User | Cat

type UserEdge {
  cursor: String!
  node: User
}

type UserConnection {
  edges: [UserEdge!]!
  pageInfo: PageInfo!
}

type Ghost {
  name: String!
  aka: String!
  friendsConnection(first: Int, after: String): GhostConnection!
}

type GhostEdge {
  cursor: String!
  node: Ghost
}

type GhostConnection {
  edges: [GhostEdge!]!
  pageInfo: PageInfo!
}

type Comment {
  id: ID!
  body: String!
}

type CommentEdge {
  cursor: String!
  node: Comment
}

type CommentConnection {
  edges: [CommentEdge!]!
  pageInfo: PageInfo!
}

type Post {
  title: String!
  comments(first: Int, after: String): CommentConnection!
}

type NodeEdge {
  cursor: String!
  node: Node
}

type NodeConnection {
  edges: [NodeEdge!]!
  pageInfo: PageInfo!
}

enum Role {
  ADMIN
  MEMBER
}

input UserFilter {
  name: String
  role: Role
  nested: NestedFilter
}

input NestedFilter {
  createdAfter: String
}

type Query {
  node(id: ID!): Node
  user(id: ID!): User
  viewer: User
  ghost(name: String!, aka: String!): Ghost!
  post(title: String!): Post
  usersByCursor(first: Int, after: String, last: Int, before: String): UserConnection!
  usersByForwardsCursor(first: Int, after: String): UserConnection!
  usersByBackwardsCursor(last: Int, before: String): UserConnection!
  usersByOffset(limit: Int, offset: Int): [User!]!
  usersByMixed(first: Int, after: String, limit: Int, offset: Int): UserConnection!
  usersConnection: UserConnection!
  filteredUsers(first: Int, after: String, filter: UserFilter): UserConnection!
  nodes(first: Int, after: String): NodeConnection!
  search(term: String!): [SearchResult!]!
}

type Mutation {
  renameUser(id: ID!, name: String!): User
}
"#;

/// The fixture schema, parsed and validated.
pub fn test_schema() -> Valid<Schema> {
    Schema::parse_and_validate(TEST_SCHEMA, "schema.graphql").expect("fixture schema is valid")
}

/// Configuration that resolves `Ghost` through `ghost(name: $name, aka: $aka)`.
pub fn ghost_config() -> PaginateConfig {
    PaginateConfig::new("schema.graphql").with_type(
        "Ghost",
        TypeConfig::with_keys(["name", "aka"]).resolved_by(
            ResolveConfig::new("ghost")
                .with_argument("name", "name")
                .with_argument("aka", "aka"),
        ),
    )
}

/// Parse an executable document, panicking on syntax errors.
pub fn parse_document(source: &str) -> Document {
    Document::parse(source, "document.graphql").expect("fixture document parses")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_is_valid() {
        let schema = test_schema();
        assert!(schema.types.contains_key("Ghost"));
        assert!(schema.types.contains_key("UserConnection"));
    }

    #[test]
    fn test_ghost_config() {
        let config = ghost_config();
        let ghost = config.type_config("Ghost").unwrap();
        assert_eq!(ghost.keys, vec!["name".to_string(), "aka".to_string()]);
        assert_eq!(
            ghost.resolve.as_ref().map(|resolve| resolve.query_field.as_str()),
            Some("ghost")
        );
    }

    #[test]
    fn test_parse_document() {
        let document = parse_document("query Users { viewer { id } }");
        assert_eq!(document.definitions.len(), 1);
    }
}
