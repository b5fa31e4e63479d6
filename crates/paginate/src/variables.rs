//! The variables a document declares, and how new ones are merged in.
//!
//! Operations declare variables with `($name: Type = default)`; fragments
//! declare the same information through `@arguments`. Both are loaded into a
//! [`VariableSet`] so promotion can treat them alike.

use crate::directives::{self, FragmentArgument, PassDirective};
use crate::error::{PaginateError, Result};
use apollo_compiler::ast::{self, Value};
use apollo_compiler::{Name, Node};
use indexmap::IndexMap;

/// Who introduced a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableOrigin {
    /// Written by the document's author.
    Declared,
    /// Minted by argument promotion.
    Promoted,
    /// Minted by the embedder to look up the fragment's parent object.
    Identity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableBinding {
    pub ty: ast::Type,
    pub default: Option<Node<Value>>,
    pub origin: VariableOrigin,
}

/// How the field supplied the argument a variable is requested for.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestKind {
    /// The field already passes `$name`.
    Reference,
    /// The field passes a literal, which becomes the default.
    Literal(Node<Value>),
    /// The field does not pass the argument; `fallback` is used as default
    /// when the variable has to be minted.
    Absent { fallback: Option<Node<Value>> },
}

/// A variable the promoter needs bound for one field argument.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableRequest {
    pub name: Name,
    pub ty: ast::Type,
    pub argument: Name,
    pub origin: VariableOrigin,
    pub kind: RequestKind,
}

/// Ordered variable bindings of one document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VariableSet {
    bindings: IndexMap<Name, VariableBinding>,
}

impl VariableSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The variables an operation declares.
    #[must_use]
    pub fn from_operation(operation: &ast::OperationDefinition) -> Self {
        let bindings = operation
            .variables
            .iter()
            .map(|variable| {
                (
                    variable.name.clone(),
                    VariableBinding {
                        ty: (*variable.ty).clone(),
                        default: variable.default_value.clone(),
                        origin: VariableOrigin::Declared,
                    },
                )
            })
            .collect();
        Self { bindings }
    }

    /// The parameters a fragment declares through `@arguments`.
    pub fn from_fragment(fragment: &ast::FragmentDefinition) -> Result<Self> {
        let Some(directive) = directives::find(&fragment.directives, directives::ARGUMENTS) else {
            return Ok(Self::new());
        };
        let Some(PassDirective::Arguments(arguments)) = PassDirective::decode(directive)? else {
            return Ok(Self::new());
        };
        let bindings = arguments
            .into_iter()
            .map(|argument| {
                (
                    argument.name,
                    VariableBinding {
                        ty: argument.ty,
                        default: argument.default,
                        origin: VariableOrigin::Declared,
                    },
                )
            })
            .collect();
        Ok(Self { bindings })
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&VariableBinding> {
        self.bindings.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Name, &VariableBinding)> {
        self.bindings.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &Name> {
        self.bindings.keys()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Default value of a variable, if it is bound and has one.
    #[must_use]
    pub fn default_of(&self, name: &str) -> Option<&Node<Value>> {
        self.get(name)?.default.as_ref()
    }

    /// Merge requests into a copy of this set.
    ///
    /// An unbound name is inserted. A bound name is reused when its named
    /// type matches and reusing it cannot change what the caller meant: a
    /// literal may only reuse a variable whose default is that same literal,
    /// and identity variables never share a name with anything else. Every
    /// other case is a [`PaginateError::VariableCollision`].
    pub fn merge(&self, requests: &[VariableRequest]) -> Result<Self> {
        let mut merged = self.clone();
        for request in requests {
            let Some(existing) = merged.bindings.get(&request.name) else {
                let default = match &request.kind {
                    RequestKind::Reference => None,
                    RequestKind::Literal(value) => Some(value.clone()),
                    RequestKind::Absent { fallback } => fallback.clone(),
                };
                tracing::trace!(
                    variable = %request.name,
                    origin = ?request.origin,
                    "binding new variable"
                );
                merged.bindings.insert(
                    request.name.clone(),
                    VariableBinding {
                        ty: request.ty.clone(),
                        default,
                        origin: request.origin,
                    },
                );
                continue;
            };

            let collision = || PaginateError::VariableCollision {
                name: request.name.to_string(),
                argument: request.argument.to_string(),
                existing: existing.ty.to_string(),
                requested: request.ty.to_string(),
            };

            let identity_clash = existing.origin != request.origin
                && (existing.origin == VariableOrigin::Identity
                    || request.origin == VariableOrigin::Identity);
            if identity_clash || existing.ty.inner_named_type() != request.ty.inner_named_type() {
                return Err(collision());
            }
            if let RequestKind::Literal(value) = &request.kind {
                if existing.default.as_ref() != Some(value) {
                    return Err(collision());
                }
            }
            tracing::trace!(variable = %request.name, "reusing declared variable");
        }
        Ok(merged)
    }

    /// Bindings in this set whose names are not bound in `before`.
    pub fn added_since<'a>(
        &'a self,
        before: &'a Self,
    ) -> impl Iterator<Item = (&'a Name, &'a VariableBinding)> + 'a {
        self.bindings
            .iter()
            .filter(move |(name, _)| !before.bindings.contains_key(*name))
    }

    /// One variable definition per binding, in order.
    #[must_use]
    pub fn to_variable_definitions(&self) -> Vec<Node<ast::VariableDefinition>> {
        self.bindings
            .iter()
            .map(|(name, binding)| variable_definition(name, binding))
            .collect()
    }

    /// The bindings as fragment parameters, in order.
    #[must_use]
    pub fn to_fragment_arguments(&self) -> Vec<FragmentArgument> {
        self.bindings
            .iter()
            .map(|(name, binding)| FragmentArgument {
                name: name.clone(),
                ty: binding.ty.clone(),
                default: binding.default.clone(),
            })
            .collect()
    }

    /// Deterministic text form (`first:Int=10,after:String`) used to derive
    /// names from the set's content.
    #[must_use]
    pub fn canonical_text(&self) -> String {
        self.bindings
            .iter()
            .map(|(name, binding)| match &binding.default {
                Some(default) => format!("{name}:{}={}", binding.ty, &**default),
                None => format!("{name}:{}", binding.ty),
            })
            .collect::<Vec<_>>()
            .join(",")
    }
}

pub(crate) fn variable_definition(
    name: &Name,
    binding: &VariableBinding,
) -> Node<ast::VariableDefinition> {
    Node::new(ast::VariableDefinition {
        name: name.clone(),
        ty: Node::new(binding.ty.clone()),
        default_value: binding.default.clone(),
        directives: ast::DirectiveList(Vec::new()),
    })
}
