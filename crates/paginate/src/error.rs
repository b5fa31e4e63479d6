use graphql_types::SourceId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PaginateError>;

/// Why a single document could not be paginated.
///
/// These never abort a run: the pipeline reports them as diagnostics and
/// leaves the offending document as authored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginateError {
    #[error("`{field}` mixes cursor arguments ({cursor}) with offset arguments ({offset})")]
    AmbiguousMode {
        field: String,
        cursor: String,
        offset: String,
    },

    #[error("`{type_name}` cannot be refetched: {reason}")]
    UnresolvableIdentity { type_name: String, reason: String },

    #[error("variable `${name}` is declared as `{existing}` and cannot also be `{argument}: {requested}`")]
    VariableCollision {
        name: String,
        argument: String,
        existing: String,
        requested: String,
    },

    #[error("`{field}` cannot be paginated: {reason}")]
    UnsupportedSelectionShape { field: String, reason: String },

    #[error("only one field per document can be paginated, found `{first}` and `{second}`")]
    MultiplePaginateDirectives { first: String, second: String },

    #[error("@paginate is not supported in {operation} operations")]
    UnsupportedOperation { operation: String },

    #[error("malformed @{directive}: {reason}")]
    MalformedDirective {
        directive: &'static str,
        reason: String,
    },

    #[error("generated name `{name}` is already taken by another document")]
    NameCollision { name: String },

    #[error("`{value}` is not a valid GraphQL name")]
    InvalidName { value: String },
}

impl PaginateError {
    /// Stable identifier for tooling output.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::AmbiguousMode { .. } => "ambiguous-mode",
            Self::UnresolvableIdentity { .. } => "unresolvable-identity",
            Self::VariableCollision { .. } => "variable-collision",
            Self::UnsupportedSelectionShape { .. } => "unsupported-selection-shape",
            Self::MultiplePaginateDirectives { .. } => "multiple-paginate-directives",
            Self::UnsupportedOperation { .. } => "unsupported-operation",
            Self::MalformedDirective { .. } => "malformed-directive",
            Self::NameCollision { .. } => "name-collision",
            Self::InvalidName { .. } => "invalid-name",
        }
    }

    pub(crate) fn unsupported(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsupportedSelectionShape {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unresolvable(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnresolvableIdentity {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }
}

/// Errors that stop a whole run before any document is touched.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("the schema does not define a query root type")]
    MissingQueryRoot,
}

/// A source file that could not be split into documents.
#[derive(Debug, Error)]
#[error("failed to parse {path}: {message}")]
pub struct ParseError {
    pub path: SourceId,
    pub message: String,
}
