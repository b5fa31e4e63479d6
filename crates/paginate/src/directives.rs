//! The directives this pass reads and writes.
//!
//! Every directive is decoded once into [`PassDirective`]; the rest of the
//! pass never looks at raw directive arguments again.
//!
//! ```graphql
//! fragment UserFriends on User
//!     @arguments(first: {type: "Int", default: 10}, after: {type: "String"}) {
//!   friendsByCursor(first: $first, after: $after) @paginate { ... }
//! }
//!
//! query UserFriends_Pagination_Query($first: Int = 10, $after: String, $id: ID!) {
//!   node(id: $id) { ...UserFriends_1a2b3c4d @with(first: $first, after: $after) }
//! }
//! ```

use crate::error::{PaginateError, Result};
use crate::schema_utils::parse_type_reference;
use apollo_compiler::ast::{self, Value};
use apollo_compiler::{name, Name, Node};

pub const PAGINATE: &str = "paginate";
pub const ARGUMENTS: &str = "arguments";
pub const WITH: &str = "with";

/// Whether a directive belongs to this pass (and is stripped from raw text).
#[must_use]
pub fn is_pass_directive(name: &str) -> bool {
    matches!(name, PAGINATE | ARGUMENTS | WITH)
}

/// One typed, optionally defaulted fragment parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentArgument {
    pub name: Name,
    pub ty: ast::Type,
    pub default: Option<Node<Value>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PassDirective {
    /// `@paginate(pageSize: Int)` on the paginated field.
    Paginate { page_size: Option<Node<Value>> },
    /// `@arguments(...)` on a fragment definition.
    Arguments(Vec<FragmentArgument>),
    /// `@with(...)` on a fragment spread.
    With(Vec<(Name, Node<Value>)>),
}

impl PassDirective {
    /// Decode a directive. Directives that belong to someone else are `None`.
    pub fn decode(directive: &ast::Directive) -> Result<Option<Self>> {
        let decoded = match directive.name.as_str() {
            PAGINATE => Self::Paginate {
                page_size: decode_paginate(directive)?,
            },
            ARGUMENTS => Self::Arguments(decode_arguments(directive)?),
            WITH => Self::With(
                directive
                    .arguments
                    .iter()
                    .map(|argument| (argument.name.clone(), argument.value.clone()))
                    .collect(),
            ),
            _ => return Ok(None),
        };
        Ok(Some(decoded))
    }
}

fn malformed(directive: &'static str, reason: impl Into<String>) -> PaginateError {
    PaginateError::MalformedDirective {
        directive,
        reason: reason.into(),
    }
}

fn decode_paginate(directive: &ast::Directive) -> Result<Option<Node<Value>>> {
    let mut page_size = None;
    for argument in &directive.arguments {
        match argument.name.as_str() {
            "pageSize" if argument.value.to_i32().is_some() => {
                page_size = Some(argument.value.clone());
            }
            "pageSize" => {
                return Err(malformed(PAGINATE, "pageSize must be an integer literal"));
            }
            other => return Err(malformed(PAGINATE, format!("unknown argument `{other}`"))),
        }
    }
    Ok(page_size)
}

fn decode_arguments(directive: &ast::Directive) -> Result<Vec<FragmentArgument>> {
    directive
        .arguments
        .iter()
        .map(|argument| {
            let Value::Object(entries) = &*argument.value else {
                return Err(malformed(
                    ARGUMENTS,
                    format!("`{}` must be an object like {{type: \"Int\"}}", argument.name),
                ));
            };

            let mut ty = None;
            let mut default = None;
            for (key, value) in entries {
                match (key.as_str(), &**value) {
                    ("type", Value::String(text)) => {
                        ty = Some(parse_type_reference(text).ok_or_else(|| {
                            malformed(
                                ARGUMENTS,
                                format!("`{}` has an invalid type `{text}`", argument.name),
                            )
                        })?);
                    }
                    ("default", _) => default = Some(value.clone()),
                    (other, _) => {
                        return Err(malformed(
                            ARGUMENTS,
                            format!("`{}` has an unexpected key `{other}`", argument.name),
                        ));
                    }
                }
            }

            let ty = ty.ok_or_else(|| {
                malformed(ARGUMENTS, format!("`{}` is missing its type", argument.name))
            })?;
            Ok(FragmentArgument {
                name: argument.name.clone(),
                ty,
                default,
            })
        })
        .collect()
}

/// Build `@arguments(name: {type: "T", default: v}, ...)`.
#[must_use]
pub fn encode_arguments<'a>(
    arguments: impl IntoIterator<Item = &'a FragmentArgument>,
) -> Node<ast::Directive> {
    let arguments = arguments
        .into_iter()
        .map(|argument| {
            let mut entries = vec![(
                name!("type"),
                Node::new(Value::String(argument.ty.to_string())),
            )];
            if let Some(default) = &argument.default {
                entries.push((name!("default"), default.clone()));
            }
            Node::new(ast::Argument {
                name: argument.name.clone(),
                value: Node::new(Value::Object(entries)),
            })
        })
        .collect();
    Node::new(ast::Directive {
        name: name!("arguments"),
        arguments,
    })
}

/// Build `@with(name: $name, ...)` forwarding each name as a variable.
#[must_use]
pub fn encode_with<'a>(names: impl IntoIterator<Item = &'a Name>) -> Node<ast::Directive> {
    Node::new(ast::Directive {
        name: name!("with"),
        arguments: names
            .into_iter()
            .map(|name| {
                Node::new(ast::Argument {
                    name: name.clone(),
                    value: Node::new(Value::Variable(name.clone())),
                })
            })
            .collect(),
    })
}

/// The first directive in `directives` named `name`.
pub(crate) fn find<'a>(
    directives: &'a ast::DirectiveList,
    name: &str,
) -> Option<&'a Node<ast::Directive>> {
    directives
        .0
        .iter()
        .find(|directive| directive.name.as_str() == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use apollo_compiler::ast::Definition;
    use graphql_test_utils::parse_document;

    fn directives_of(source: &str) -> ast::DirectiveList {
        match &parse_document(source).definitions[0] {
            Definition::FragmentDefinition(fragment) => fragment.directives.clone(),
            Definition::OperationDefinition(operation) => match &operation.selection_set[0] {
                ast::Selection::Field(field) => field.directives.clone(),
                other => panic!("unexpected selection {other:?}"),
            },
            other => panic!("unexpected definition {other:?}"),
        }
    }

    #[test]
    fn test_decode_paginate() {
        let directives = directives_of("query Q { users @paginate { id } }");
        let decoded = PassDirective::decode(&directives.0[0]).unwrap();
        assert_eq!(decoded, Some(PassDirective::Paginate { page_size: None }));
    }

    #[test]
    fn test_decode_paginate_page_size() {
        let directives = directives_of("query Q { users @paginate(pageSize: 25) { id } }");
        let Some(PassDirective::Paginate { page_size }) =
            PassDirective::decode(&directives.0[0]).unwrap()
        else {
            panic!("expected @paginate");
        };
        assert_eq!(page_size.and_then(|value| value.to_i32()), Some(25));
    }

    #[test]
    fn test_decode_paginate_rejects_unknown_arguments() {
        let directives = directives_of("query Q { users @paginate(mode: \"infinite\") { id } }");
        let error = PassDirective::decode(&directives.0[0]).unwrap_err();
        assert_eq!(error.code(), "malformed-directive");
    }

    #[test]
    fn test_decode_arguments() {
        let directives = directives_of(
            r#"fragment F on User @arguments(first: {type: "Int", default: 10}, ids: {type: "[ID!]!"}) { id }"#,
        );
        let Some(PassDirective::Arguments(arguments)) =
            PassDirective::decode(&directives.0[0]).unwrap()
        else {
            panic!("expected @arguments");
        };
        assert_eq!(arguments.len(), 2);
        assert_eq!(arguments[0].name.as_str(), "first");
        assert_eq!(arguments[0].ty.to_string(), "Int");
        assert_eq!(
            arguments[0].default.as_ref().and_then(|value| value.to_i32()),
            Some(10)
        );
        assert_eq!(arguments[1].ty.to_string(), "[ID!]!");
        assert!(arguments[1].default.is_none());
    }

    #[test]
    fn test_decode_arguments_requires_type() {
        let directives = directives_of("fragment F on User @arguments(first: {default: 10}) { id }");
        let error = PassDirective::decode(&directives.0[0]).unwrap_err();
        assert!(error.to_string().contains("missing its type"));
    }

    #[test]
    fn test_decode_arguments_rejects_scalars() {
        let directives = directives_of("fragment F on User @arguments(first: 10) { id }");
        assert!(PassDirective::decode(&directives.0[0]).is_err());
    }

    #[test]
    fn test_foreign_directives_are_ignored() {
        let directives = directives_of("query Q { users @include(if: true) { id } }");
        assert_eq!(PassDirective::decode(&directives.0[0]).unwrap(), None);
        assert!(!is_pass_directive("include"));
        assert!(is_pass_directive("with"));
    }

    #[test]
    fn test_encode_arguments_round_trips() {
        let directives = directives_of(
            r#"fragment F on User @arguments(first: {type: "Int", default: 10}, after: {type: "String"}) { id }"#,
        );
        let Some(PassDirective::Arguments(arguments)) =
            PassDirective::decode(&directives.0[0]).unwrap()
        else {
            panic!("expected @arguments");
        };
        let encoded = encode_arguments(&arguments);
        assert_eq!(
            PassDirective::decode(&encoded).unwrap(),
            Some(PassDirective::Arguments(arguments))
        );
    }

    #[test]
    fn test_encode_with() {
        let names = [name!("first"), name!("after")];
        let directive = encode_with(&names);
        assert_eq!(directive.name.as_str(), "with");
        let printed: Vec<String> = directive
            .arguments
            .iter()
            .map(|argument| format!("{}: {}", argument.name, &*argument.value))
            .collect();
        assert_eq!(printed, vec!["first: $first", "after: $after"]);
    }
}
