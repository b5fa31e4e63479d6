//! `check`: run the pass and report diagnostics only.

use super::{diagnostic_json, exit_code, print_diagnostics, run_pass};
use crate::exit_code::ExitCode;
use crate::OutputFormat;
use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::json;
use std::path::PathBuf;

pub fn run(config_path: Option<PathBuf>, workers: usize, format: OutputFormat) -> Result<ExitCode> {
    let (project, report) = match run_pass(config_path, workers, format) {
        Ok(loaded) => loaded,
        Err(code) => return Ok(code),
    };

    match format {
        OutputFormat::Human => {
            print_diagnostics(&report, &project);
            let paginated = report
                .documents
                .iter()
                .filter(|document| !document.is_generated() && document.refetch.is_some())
                .count();
            if report.has_errors() {
                println!(
                    "\n{} {} error(s) in {} document(s)",
                    "✗".red(),
                    report.diagnostics.len(),
                    project.documents.len()
                );
            } else {
                println!(
                    "{} {} document(s) checked, {paginated} paginated",
                    "✓".green(),
                    project.documents.len()
                );
            }
        }
        OutputFormat::Json => {
            let output = json!({
                "documents": project.documents.len(),
                "diagnostics": report
                    .diagnostics
                    .iter()
                    .map(|diagnostic| diagnostic_json(diagnostic, &project))
                    .collect::<Vec<_>>(),
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&output).context("failed to serialize report")?
            );
        }
    }
    Ok(exit_code(&report))
}
