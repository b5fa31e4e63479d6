//! Schema lookups shared by the pass.

use apollo_compiler::ast::{FieldDefinition, Type};
use apollo_compiler::schema::ExtendedType;
use apollo_compiler::{name, Name, Node, Schema};

pub(crate) const TYPENAME: &str = "__typename";
pub(crate) const NODE_INTERFACE: &str = "Node";
pub(crate) const NODE_FIELD: &str = "node";

/// Name of the schema's query root type.
pub(crate) fn query_root(schema: &Schema) -> Option<&Name> {
    schema
        .schema_definition
        .query
        .as_ref()
        .map(|component| &component.name)
}

/// Definition of `field` on an object or interface type.
pub(crate) fn field_definition<'s>(
    schema: &'s Schema,
    type_name: &str,
    field: &str,
) -> Option<&'s Node<FieldDefinition>> {
    let component = match schema.types.get(type_name)? {
        ExtendedType::Object(object) => object.fields.get(field)?,
        ExtendedType::Interface(interface) => interface.fields.get(field)?,
        _ => return None,
    };
    Some(&component.node)
}

/// Type of `field` on `type_name`, including the `__typename` meta field.
pub(crate) fn field_type(schema: &Schema, type_name: &str, field: &str) -> Option<Type> {
    if field == TYPENAME {
        return Some(Type::NonNullNamed(name!("String")));
    }
    field_definition(schema, type_name, field).map(|definition| definition.ty.clone())
}

pub(crate) fn has_field(schema: &Schema, type_name: &str, field: &str) -> bool {
    field == TYPENAME || field_definition(schema, type_name, field).is_some()
}

pub(crate) fn is_abstract(schema: &Schema, type_name: &str) -> bool {
    matches!(
        schema.types.get(type_name),
        Some(ExtendedType::Interface(_) | ExtendedType::Union(_))
    )
}

/// Whether `type_name` is `interface` or declares that it implements it.
pub(crate) fn implements(schema: &Schema, type_name: &str, interface: &str) -> bool {
    if type_name == interface {
        return true;
    }
    match schema.types.get(type_name) {
        Some(ExtendedType::Object(object)) => object
            .implements_interfaces
            .iter()
            .any(|implemented| implemented.name.as_str() == interface),
        Some(ExtendedType::Interface(iface)) => iface
            .implements_interfaces
            .iter()
            .any(|implemented| implemented.name.as_str() == interface),
        _ => false,
    }
}

/// Concrete object types that can appear where `type_name` is expected, in
/// schema order.
pub(crate) fn possible_types(schema: &Schema, type_name: &str) -> Vec<Name> {
    match schema.types.get(type_name) {
        Some(ExtendedType::Object(object)) => vec![object.name.clone()],
        Some(ExtendedType::Union(union_)) => union_
            .members
            .iter()
            .map(|member| member.name.clone())
            .collect(),
        Some(ExtendedType::Interface(_)) => schema
            .types
            .iter()
            .filter(|(_, ty)| matches!(ty, ExtendedType::Object(_)))
            .filter(|(name, _)| implements(schema, name.as_str(), type_name))
            .map(|(name, _)| name.clone())
            .collect(),
        _ => Vec::new(),
    }
}

pub(crate) const fn is_list(ty: &Type) -> bool {
    matches!(ty, Type::List(_) | Type::NonNullList(_))
}

/// The same type without its outermost non-null marker.
pub(crate) fn nullable(ty: &Type) -> Type {
    match ty {
        Type::NonNullNamed(named) => Type::Named(named.clone()),
        Type::NonNullList(inner) => Type::List(inner.clone()),
        other => other.clone(),
    }
}

/// Parse a type reference such as `Int`, `[ID!]!` or `String!`.
pub(crate) fn parse_type_reference(text: &str) -> Option<Type> {
    let text = text.trim();
    let (inner, non_null) = match text.strip_suffix('!') {
        Some(rest) => (rest.trim_end(), true),
        None => (text, false),
    };
    if let Some(list) = inner.strip_prefix('[') {
        let item = parse_type_reference(list.strip_suffix(']')?)?;
        return Some(if non_null {
            Type::NonNullList(Box::new(item))
        } else {
            Type::List(Box::new(item))
        });
    }
    let named = Name::new(inner).ok()?;
    Some(if non_null {
        Type::NonNullNamed(named)
    } else {
        Type::Named(named)
    })
}

/// The connection pieces a cursor-paginated field's return type exposes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ConnectionShape {
    pub edge_type: Option<Name>,
    pub node_type: Option<Name>,
    pub page_info_type: Option<Name>,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl ConnectionShape {
    pub(crate) fn of(schema: &Schema, type_name: &str) -> Self {
        let edge_type =
            field_type(schema, type_name, "edges").map(|ty| ty.inner_named_type().clone());
        let node_type = edge_type.as_ref().and_then(|edge| {
            field_type(schema, edge.as_str(), "node").map(|ty| ty.inner_named_type().clone())
        });
        let page_info_type =
            field_type(schema, type_name, "pageInfo").map(|ty| ty.inner_named_type().clone());
        let (has_next_page, has_previous_page) =
            page_info_type.as_ref().map_or((false, false), |page_info| {
                (
                    has_field(schema, page_info.as_str(), "hasNextPage"),
                    has_field(schema, page_info.as_str(), "hasPreviousPage"),
                )
            });
        Self {
            edge_type,
            node_type,
            page_info_type,
            has_next_page,
            has_previous_page,
        }
    }

    pub(crate) const fn is_connection(&self) -> bool {
        self.edge_type.is_some() && self.page_info_type.is_some()
    }

    pub(crate) const fn is_bidirectional(&self) -> bool {
        self.is_connection() && self.has_next_page && self.has_previous_page
    }
}
