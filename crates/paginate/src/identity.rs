//! How a fragment's parent object is found again from the query root.

use crate::error::{PaginateError, Result};
use crate::schema_utils::{
    field_definition, has_field, implements, query_root, NODE_FIELD, NODE_INTERFACE,
};
use apollo_compiler::ast;
use apollo_compiler::{name, Name, Schema};
use graphql_config::{PaginateConfig, TypeConfig};

/// Read-only access to per-type identity configuration.
///
/// Shared by every worker of a run, hence `Sync`.
pub trait TypeConfigLookup: Sync {
    fn type_config(&self, type_name: &str) -> Option<TypeConfig>;

    /// Fallback key fields for types without configured `keys`.
    fn default_keys(&self) -> Vec<String> {
        vec!["id".to_string()]
    }

    /// Key fields of a type.
    fn keys_for(&self, type_name: &str) -> Vec<String> {
        match self.type_config(type_name) {
            Some(config) if !config.keys.is_empty() => config.keys,
            _ => self.default_keys(),
        }
    }
}

impl TypeConfigLookup for PaginateConfig {
    fn type_config(&self, type_name: &str) -> Option<TypeConfig> {
        PaginateConfig::type_config(self, type_name).cloned()
    }

    fn default_keys(&self) -> Vec<String> {
        self.default_keys.clone()
    }
}

impl<F> TypeConfigLookup for F
where
    F: Fn(&str) -> Option<TypeConfig> + Sync,
{
    fn type_config(&self, type_name: &str) -> Option<TypeConfig> {
        self(type_name)
    }
}

/// One argument of a custom resolver field.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityArgument {
    /// Key field on the resolved type
    pub key: Name,
    /// Argument of the resolver field it is passed as
    pub argument: Name,
    /// Declared type of that argument
    pub ty: ast::Type,
}

/// Strategy for refetching an object of some type.
#[derive(Debug, Clone, PartialEq)]
pub enum Identity {
    /// The type is the query root; no lookup needed.
    Root { type_name: Name },
    /// `node(id: $id)` on the query root.
    Node,
    /// A configured root field taking the type's key fields.
    Resolver {
        type_name: Name,
        query_field: Name,
        arguments: Vec<IdentityArgument>,
    },
}

impl Identity {
    /// `targetType` of refetch specs using this identity.
    #[must_use]
    pub fn target_type(&self) -> &str {
        match self {
            Self::Root { type_name } | Self::Resolver { type_name, .. } => type_name.as_str(),
            Self::Node => NODE_INTERFACE,
        }
    }

    /// Fields selected next to `__typename` at the lookup site.
    #[must_use]
    pub fn key_fields(&self) -> Vec<Name> {
        match self {
            Self::Root { .. } => Vec::new(),
            Self::Node => vec![name!("id")],
            Self::Resolver { arguments, .. } => {
                arguments.iter().map(|argument| argument.key.clone()).collect()
            }
        }
    }
}

fn to_name(value: &str) -> Result<Name> {
    Name::new(value).map_err(|_| PaginateError::InvalidName {
        value: value.to_string(),
    })
}

/// Decide how objects of `type_name` are refetched.
///
/// The query root needs nothing. A configured resolver wins over `Node`, so
/// a type can opt out of `node(id:)` lookups.
#[tracing::instrument(skip(schema, config))]
pub fn resolve_identity(
    schema: &Schema,
    config: &dyn TypeConfigLookup,
    type_name: &str,
) -> Result<Identity> {
    let root = query_root(schema).ok_or_else(|| {
        PaginateError::unresolvable(type_name, "the schema has no query root type")
    })?;
    if root.as_str() == type_name {
        return Ok(Identity::Root {
            type_name: root.clone(),
        });
    }

    if let Some(resolve) = config.type_config(type_name).and_then(|config| config.resolve) {
        let query_field = to_name(&resolve.query_field)?;
        let definition = field_definition(schema, root.as_str(), query_field.as_str())
            .ok_or_else(|| {
                PaginateError::unresolvable(
                    type_name,
                    format!("`{root}` has no field `{query_field}`"),
                )
            })?;
        let arguments = config
            .keys_for(type_name)
            .iter()
            .map(|key| {
                let argument = resolve.argument_for(key);
                let declared = definition
                    .arguments
                    .iter()
                    .find(|declared| declared.name.as_str() == argument)
                    .ok_or_else(|| {
                        PaginateError::unresolvable(
                            type_name,
                            format!("`{root}.{query_field}` has no argument `{argument}`"),
                        )
                    })?;
                Ok(IdentityArgument {
                    key: to_name(key)?,
                    argument: declared.name.clone(),
                    ty: (*declared.ty).clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(query_field = %query_field, "resolving through configured field");
        return Ok(Identity::Resolver {
            type_name: to_name(type_name)?,
            query_field,
            arguments,
        });
    }

    if implements(schema, type_name, NODE_INTERFACE) && has_field(schema, root.as_str(), NODE_FIELD)
    {
        return Ok(Identity::Node);
    }

    Err(PaginateError::unresolvable(
        type_name,
        format!("it does not implement `{NODE_INTERFACE}` and has no configured resolver"),
    ))
}
