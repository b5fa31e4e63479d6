//! Subcommands and the output they share.

pub mod check;
pub mod compile;

use crate::exit_code::ExitCode;
use crate::project::Project;
use crate::OutputFormat;
use colored::Colorize;
use graphql_paginate::{Diagnostic, PassOptions, PassReport, Pipeline};
use graphql_types::LineIndex;
use serde_json::{json, Value};
use std::path::PathBuf;

/// Load the project and run the pass, or report why that failed.
pub fn run_pass(
    config_path: Option<PathBuf>,
    workers: usize,
    format: OutputFormat,
) -> Result<(Project, PassReport), ExitCode> {
    let fail = |message: String, code: ExitCode| {
        match format {
            OutputFormat::Human => eprintln!("{} {message}", "✗".red()),
            OutputFormat::Json => {
                eprintln!("{}", json!({ "error": message, "exitCode": code.code() }));
            }
        }
        code
    };

    let project = Project::load(config_path).map_err(|error| {
        let code = error.exit_code();
        fail(error.to_string(), code)
    })?;
    let report = Pipeline::new(&project.schema, &project.config)
        .with_options(PassOptions { workers })
        .run(project.documents.clone())
        .map_err(|error| fail(error.to_string(), ExitCode::SchemaError))?;
    Ok((project, report))
}

/// `path:line:column` of a diagnostic, or just the path when the source
/// text is unknown.
pub fn location(diagnostic: &Diagnostic, project: &Project) -> String {
    match (diagnostic.span, project.sources.get(&diagnostic.source)) {
        (Some(span), Some(text)) => {
            let position = LineIndex::new(text).position(span.start);
            format!("{}:{position}", diagnostic.source)
        }
        _ => diagnostic.source.to_string(),
    }
}

pub fn print_diagnostics(report: &PassReport, project: &Project) {
    for diagnostic in &report.diagnostics {
        eprintln!(
            "{} {} {}",
            location(diagnostic, project).bold(),
            format!("error[{}]", diagnostic.code()).red(),
            diagnostic.error
        );
        eprintln!(
            "  {} `{}` left as authored ({})",
            "→".dimmed(),
            diagnostic.document,
            diagnostic.stage
        );
    }
}

pub fn diagnostic_json(diagnostic: &Diagnostic, project: &Project) -> Value {
    json!({
        "document": diagnostic.document,
        "source": diagnostic.source.as_str(),
        "location": location(diagnostic, project),
        "span": diagnostic.span.map(|span| json!({ "start": span.start, "end": span.end })),
        "severity": diagnostic.severity.to_string(),
        "stage": diagnostic.stage.as_str(),
        "code": diagnostic.code(),
        "message": diagnostic.error.to_string(),
    })
}

pub fn exit_code(report: &PassReport) -> ExitCode {
    if report.has_errors() {
        ExitCode::DocumentErrors
    } else {
        ExitCode::Success
    }
}
