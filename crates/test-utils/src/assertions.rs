//! Snapshot formatting for diagnostics and printed documents.

/// Format a list of diagnostics for snapshot testing, one per line.
///
/// # Example
///
/// ```ignore
/// use graphql_test_utils::assertions::format_diagnostics;
///
/// let report = pipeline.run(documents).unwrap();
/// insta::assert_snapshot!(format_diagnostics(&report.diagnostics));
/// ```
pub fn format_diagnostics<D: std::fmt::Display>(diagnostics: &[D]) -> String {
    if diagnostics.is_empty() {
        return String::from("(no diagnostics)");
    }

    diagnostics
        .iter()
        .enumerate()
        .map(|(i, d)| format!("[{}] {d}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collapse all whitespace runs to single spaces, so printed documents can
/// be compared without caring about line breaks.
pub fn squash_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
