//! Running the pass over a batch of documents.
//!
//! Phase one takes every authored document through
//! `decode → detect mode → promote → augment → build spec`. Phase two builds
//! the pagination query of every processed fragment; it runs after phase one
//! so a generated query inlines the processed version of every fragment it
//! spreads. Both phases fan documents out over scoped worker threads.
//!
//! A failing document is reported and kept exactly as authored. Nothing a
//! document does affects its siblings, apart from the names it claims.

use crate::augment::augment_selection;
use crate::diagnostics::{Diagnostic, Stage};
use crate::document::CollectedDocument;
use crate::embed::{embed_fragment, FragmentIndex};
use crate::error::{PaginateError, PipelineError};
use crate::field::find_paginated_field;
use crate::identity::{resolve_identity, Identity, TypeConfigLookup};
use crate::mode::detect_mode;
use crate::naming::NameRegistry;
use crate::promote::promote_arguments;
use crate::refetch::{build_refetch_spec, RefetchInputs};
use crate::schema_utils::query_root;
use apollo_compiler::Schema;
use std::collections::HashSet;
use std::thread;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassOptions {
    /// Worker threads per phase; `0` is treated as `1`
    pub workers: usize,
}

impl Default for PassOptions {
    fn default() -> Self {
        Self { workers: 1 }
    }
}

/// Output of a run.
#[derive(Debug, Clone, Default)]
pub struct PassReport {
    /// Authored documents in input order, then generated queries in the
    /// order of their fragments
    pub documents: Vec<CollectedDocument>,
    pub diagnostics: Vec<Diagnostic>,
}

impl PassReport {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diagnostic| diagnostic.severity.is_error())
    }

    pub fn generated(&self) -> impl Iterator<Item = &CollectedDocument> {
        self.documents.iter().filter(|document| document.is_generated())
    }
}

/// A document that made it through phase one.
struct Processed {
    document: CollectedDocument,
    /// Set for paginated fragments
    identity: Option<Identity>,
}

pub struct Pipeline<'a> {
    schema: &'a Schema,
    config: &'a dyn TypeConfigLookup,
    options: PassOptions,
}

impl<'a> Pipeline<'a> {
    #[must_use]
    pub fn new(schema: &'a Schema, config: &'a dyn TypeConfigLookup) -> Self {
        Self {
            schema,
            config,
            options: PassOptions::default(),
        }
    }

    #[must_use]
    pub const fn with_options(mut self, options: PassOptions) -> Self {
        self.options = options;
        self
    }

    /// Run the pass over `documents`.
    ///
    /// Generated queries from an earlier run are dropped and built again, so
    /// feeding a report's documents back in yields the same report.
    #[tracing::instrument(skip_all, fields(documents = documents.len(), workers = self.options.workers))]
    pub fn run(&self, documents: Vec<CollectedDocument>) -> Result<PassReport, PipelineError> {
        if query_root(self.schema).is_none() {
            return Err(PipelineError::MissingQueryRoot);
        }

        let authored: Vec<CollectedDocument> = documents
            .into_iter()
            .filter(|document| !document.is_generated())
            .collect();
        let mut report = PassReport::default();

        // Phase one
        let outcomes = self.fan_out(&authored, |document| self.process(document));
        let mut processed = Vec::with_capacity(authored.len());
        for (document, outcome) in authored.iter().zip(outcomes) {
            match outcome {
                Ok(Some(done)) => processed.push(done),
                Ok(None) => processed.push(Processed {
                    document: document.clone(),
                    identity: None,
                }),
                Err(diagnostic) => {
                    report.diagnostics.push(diagnostic);
                    processed.push(Processed {
                        document: document.clone(),
                        identity: None,
                    });
                }
            }
        }

        // Phase two
        let registry = NameRegistry::seeded(authored.iter().map(|document| document.name.clone()));
        let fragments: FragmentIndex<'_> = processed
            .iter()
            .filter_map(|entry| entry.document.fragment())
            .map(|fragment| (fragment.name.as_str(), fragment))
            .collect();
        let embeddable: Vec<(usize, &Processed)> = processed
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.identity.is_some())
            .collect();
        let embedded = self.fan_out(&embeddable, |(_, entry)| {
            let identity = entry.identity.as_ref()?;
            Some(
                embed_fragment(&entry.document, identity, &fragments, &registry).map_err(|error| {
                    tracing::debug!(document = %entry.document.name, %error, "embedding failed");
                    Diagnostic::error(&entry.document, None, Stage::Embed, error)
                }),
            )
        });

        let mut generated = Vec::new();
        let mut reverted = HashSet::new();
        for ((index, _), outcome) in embeddable.iter().zip(embedded) {
            match outcome {
                Some(Ok(document)) => generated.push(document),
                Some(Err(diagnostic)) => {
                    report.diagnostics.push(diagnostic);
                    reverted.insert(*index);
                }
                None => {}
            }
        }

        report.documents = processed
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                if reverted.contains(&index) {
                    authored[index].clone()
                } else {
                    entry.document
                }
            })
            .chain(generated)
            .collect();
        tracing::info!(
            documents = report.documents.len(),
            diagnostics = report.diagnostics.len(),
            "pass finished"
        );
        Ok(report)
    }

    /// Phase one for a single document. `Ok(None)` means nothing to paginate.
    #[tracing::instrument(skip_all, fields(document = %document.name))]
    fn process(&self, document: &CollectedDocument) -> Result<Option<Processed>, Diagnostic> {
        let fail = |span, stage, error: PaginateError| {
            tracing::debug!(%stage, %error, "document left as authored");
            Diagnostic::error(document, span, stage, error)
        };

        let field = match find_paginated_field(self.schema, document) {
            Ok(Some(field)) => field,
            Ok(None) => return Ok(None),
            Err(error) => return Err(fail(None, Stage::Decode, error)),
        };
        let span = field.span;
        let existing = document
            .variables()
            .map_err(|error| fail(span, Stage::Decode, error))?;

        let mode = detect_mode(self.schema, &field)
            .map_err(|error| fail(span, Stage::DetectMode, error))?;

        let promotion = promote_arguments(self.schema, &field, mode, &existing)
            .map_err(|error| fail(span, Stage::PromoteArguments, error))?;
        let mut working = document.clone();
        working.apply_variables(&promotion.variables);
        let Some(target) = working.field_mut(&field.indices) else {
            return Err(fail(
                span,
                Stage::PromoteArguments,
                PaginateError::unsupported(
                    field.display_path(),
                    "the field moved during promotion",
                ),
            ));
        };
        target.arguments.clone_from(&promotion.arguments);

        augment_selection(self.schema, self.config, target, field.parent_type.as_str(), mode);

        let (Some(kind), Some(root)) = (working.kind(), query_root(self.schema)) else {
            return Ok(None);
        };
        let type_condition = working
            .fragment()
            .map(|fragment| fragment.type_condition.to_string());
        let identity = match &type_condition {
            Some(type_name) => Some(
                resolve_identity(self.schema, self.config, type_name)
                    .map_err(|error| fail(span, Stage::BuildSpec, error))?,
            ),
            None => None,
        };
        let refetch = build_refetch_spec(&RefetchInputs {
            field: &field,
            mode,
            kind,
            type_condition: type_condition.as_deref(),
            query_root: root.as_str(),
            identity: identity.as_ref(),
            variables: &promotion.variables,
            bindings: &promotion.bindings,
        });
        tracing::debug!(path = ?refetch.path, ?mode, "built refetch spec");
        working.refetch = Some(refetch);

        Ok(Some(Processed {
            document: working,
            identity,
        }))
    }

    /// Map `items` over the configured workers, keeping input order.
    fn fan_out<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync,
    {
        let workers = self.options.workers.max(1);
        if workers == 1 || items.len() < 2 {
            return items.iter().map(&f).collect();
        }
        let chunk_size = items.len().div_ceil(workers);
        thread::scope(|scope| {
            let handles: Vec<_> = items
                .chunks(chunk_size)
                .map(|chunk| {
                    let f = &f;
                    scope.spawn(move || chunk.iter().map(f).collect::<Vec<R>>())
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
                })
                .collect()
        })
    }
}
