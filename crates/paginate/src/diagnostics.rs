//! Document-scoped diagnostics.

use crate::document::CollectedDocument;
use crate::error::PaginateError;
use graphql_types::{DiagnosticSeverity, OffsetRange, SourceId};
use std::fmt;

/// Step of the per-document state machine that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    /// Decoding pass directives and locating the paginated field
    Decode,
    DetectMode,
    PromoteArguments,
    BuildSpec,
    Embed,
}

impl Stage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Decode => "decode",
            Self::DetectMode => "detect-mode",
            Self::PromoteArguments => "promote-arguments",
            Self::BuildSpec => "build-spec",
            Self::Embed => "embed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure tied to one document. The document itself is left as authored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub document: String,
    pub source: SourceId,
    /// Byte range of the paginated field, or of the whole definition when
    /// the field was never located
    pub span: Option<OffsetRange>,
    pub severity: DiagnosticSeverity,
    pub stage: Stage,
    pub error: PaginateError,
}

impl Diagnostic {
    #[must_use]
    pub fn error(
        document: &CollectedDocument,
        span: Option<OffsetRange>,
        stage: Stage,
        error: PaginateError,
    ) -> Self {
        Self {
            document: document.name.clone(),
            source: document.source.clone(),
            span: span.or_else(|| document.span()),
            severity: DiagnosticSeverity::Error,
            stage,
            error,
        }
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.error.code()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} [{}] in `{}` during {}: {}",
            self.source,
            self.severity,
            self.code(),
            self.document,
            self.stage,
            self.error
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphql_test_utils::parse_document;

    #[test]
    fn test_stage_names() {
        let stages = [
            Stage::Decode,
            Stage::DetectMode,
            Stage::PromoteArguments,
            Stage::BuildSpec,
            Stage::Embed,
        ];
        let names: Vec<String> = stages.iter().map(ToString::to_string).collect();
        assert_eq!(
            names,
            vec!["decode", "detect-mode", "promote-arguments", "build-spec", "embed"]
        );
    }

    #[test]
    fn test_display() {
        let document = CollectedDocument::new(
            "Users",
            SourceId::new("users.graphql"),
            parse_document("query Users { viewer { id } }"),
        );
        let diagnostic = Diagnostic::error(
            &document,
            None,
            Stage::DetectMode,
            PaginateError::unsupported("viewer", "no pagination arguments"),
        );
        assert_eq!(diagnostic.code(), "unsupported-selection-shape");
        assert_eq!(diagnostic.span, Some(OffsetRange::new(0, 29)));
        assert_eq!(
            diagnostic.to_string(),
            "users.graphql: error [unsupported-selection-shape] in `Users` during detect-mode: `viewer` cannot be paginated: no pagination arguments"
        );
    }
}
