//! Compile-time pagination for GraphQL documents.
//!
//! Fields marked `@paginate` are rewritten so every page can be fetched by
//! changing variables alone: pagination arguments become variables, the
//! selection gains the cursor and identity fields the runtime needs, and a
//! [`RefetchSpec`] describes how to fetch the next page. A paginated fragment
//! also gets a standalone `<Fragment>_Pagination_Query`.
//!
//! ```rust,ignore
//! use graphql_paginate::{collect_documents, Pipeline};
//!
//! let documents = collect_documents(&source, &"users.graphql".into())?;
//! let report = Pipeline::new(&schema, &config).run(documents)?;
//! for document in &report.documents {
//!     println!("{}", graphql_paginate::print_document(&document.document));
//! }
//! ```

mod artifact;
mod augment;
mod collect;
mod diagnostics;
mod directives;
mod document;
mod embed;
mod error;
mod field;
mod identity;
mod mode;
mod naming;
mod pipeline;
mod print;
mod promote;
mod refetch;
mod schema_utils;
mod selection;
mod variables;

pub use artifact::{ArtifactInput, QueryArtifact};
pub use augment::{augment_selection, update_hints, UpdateHint};
pub use collect::{collect_documents, ANONYMOUS};
pub use diagnostics::{Diagnostic, Stage};
pub use directives::{
    encode_arguments, encode_with, is_pass_directive, FragmentArgument, PassDirective, ARGUMENTS,
    PAGINATE, WITH,
};
pub use document::{CollectedDocument, DocumentKind, GeneratedInfo};
pub use embed::{embed_fragment, FragmentIndex};
pub use error::{PaginateError, ParseError, PipelineError, Result};
pub use field::{find_paginated_field, PaginatedField};
pub use identity::{resolve_identity, Identity, IdentityArgument, TypeConfigLookup};
pub use mode::{detect_mode, PaginationMode};
pub use naming::{
    content_hash, pagination_query_name, short_digest, wrapper_fragment_name, NameRegistry,
};
pub use pipeline::{PassOptions, PassReport, Pipeline};
pub use print::{print_document, print_normalized, print_raw, strip_pass_directives};
pub use promote::{promote_arguments, Promotion};
pub use refetch::{
    build_refetch_spec, PaginationDirection, PaginationMethod, RefetchInputs, RefetchSpec,
    StartValue,
};
pub use selection::{selection_metadata, AbstractFields, FieldMetadata, SelectionMetadata};
pub use variables::{RequestKind, VariableBinding, VariableOrigin, VariableRequest, VariableSet};
