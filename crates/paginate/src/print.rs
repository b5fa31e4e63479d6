//! Printing documents.
//!
//! The full text keeps this pass's directives so a later run can read them
//! again. The raw text is what goes over the wire: pass directives removed.

use crate::directives::is_pass_directive;
use apollo_compiler::ast::{self, Definition, Selection};

/// Pretty-printed document including pass directives.
#[must_use]
pub fn print_document(document: &ast::Document) -> String {
    document.to_string()
}

/// Pretty-printed document without pass directives.
#[must_use]
pub fn print_raw(document: &ast::Document) -> String {
    strip_pass_directives(document).to_string()
}

/// Single-line raw text, the input of content hashes.
#[must_use]
pub fn print_normalized(document: &ast::Document) -> String {
    strip_pass_directives(document)
        .serialize()
        .no_indent()
        .to_string()
}

/// A copy of `document` with `@paginate`, `@arguments` and `@with` removed.
#[must_use]
pub fn strip_pass_directives(document: &ast::Document) -> ast::Document {
    let mut stripped = document.clone();
    for definition in &mut stripped.definitions {
        match definition {
            Definition::OperationDefinition(operation) => {
                let operation = operation.make_mut();
                strip_list(&mut operation.directives);
                strip_selections(&mut operation.selection_set);
            }
            Definition::FragmentDefinition(fragment) => {
                let fragment = fragment.make_mut();
                strip_list(&mut fragment.directives);
                strip_selections(&mut fragment.selection_set);
            }
            _ => {}
        }
    }
    stripped
}

fn strip_list(directives: &mut ast::DirectiveList) {
    directives
        .0
        .retain(|directive| !is_pass_directive(directive.name.as_str()));
}

fn strip_selections(selections: &mut [Selection]) {
    for selection in selections {
        match selection {
            Selection::Field(field) => {
                let field = field.make_mut();
                strip_list(&mut field.directives);
                strip_selections(&mut field.selection_set);
            }
            Selection::FragmentSpread(spread) => strip_list(&mut spread.make_mut().directives),
            Selection::InlineFragment(inline) => {
                let inline = inline.make_mut();
                strip_list(&mut inline.directives);
                strip_selections(&mut inline.selection_set);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphql_test_utils::{parse_document, squash_whitespace};

    const SOURCE: &str = r#"
fragment F on User @arguments(first: {type: "Int", default: 10}) @deprecated {
  friendsByCursor(first: $first) @paginate @include(if: true) {
    edges { node { ...G @with(x: 1) } }
  }
}
"#;

    #[test]
    fn test_raw_text_has_no_pass_directives() {
        let raw = print_raw(&parse_document(SOURCE));
        assert!(!raw.contains("@arguments"));
        assert!(!raw.contains("@paginate"));
        assert!(!raw.contains("@with"));
        assert!(raw.contains("@include(if: true)"));
        assert!(raw.contains("@deprecated"));
    }

    #[test]
    fn test_full_text_keeps_pass_directives() {
        let full = print_document(&parse_document(SOURCE));
        assert!(full.contains("@paginate"));
        assert!(full.contains("@arguments"));
    }

    #[test]
    fn test_normalized_text_is_one_line() {
        let normalized = print_normalized(&parse_document("query Q {\n  viewer {\n    id\n  }\n}\n"));
        assert!(!normalized.trim_end().contains('\n'));
        assert_eq!(squash_whitespace(&normalized), "query Q { viewer { id } }");
    }

    #[test]
    fn test_printing_reparses() {
        let document = parse_document(SOURCE);
        let reparsed = parse_document(&print_document(&document));
        assert_eq!(print_document(&reparsed), print_document(&document));
    }
}
