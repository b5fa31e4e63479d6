//! `compile`: run the pass and print every resulting document.

use super::{diagnostic_json, exit_code, print_diagnostics, run_pass};
use crate::exit_code::ExitCode;
use crate::project::Project;
use crate::OutputFormat;
use anyhow::{Context, Result};
use colored::Colorize;
use graphql_paginate::{
    print_document, print_raw, CollectedDocument, DocumentKind, PassReport, QueryArtifact,
};
use serde_json::{json, Value};
use std::path::PathBuf;

pub fn run(config_path: Option<PathBuf>, workers: usize, format: OutputFormat) -> Result<ExitCode> {
    let (project, report) = match run_pass(config_path, workers, format) {
        Ok(loaded) => loaded,
        Err(code) => return Ok(code),
    };

    match format {
        OutputFormat::Human => print_human(&project, &report)?,
        OutputFormat::Json => {
            let output = json_report(&project, &report);
            println!(
                "{}",
                serde_json::to_string_pretty(&output).context("failed to serialize report")?
            );
        }
    }
    Ok(exit_code(&report))
}

fn print_human(project: &Project, report: &PassReport) -> Result<()> {
    for document in &report.documents {
        let header = match &document.generated {
            Some(generated) => format!(
                "{} ({}, generated from {})",
                document.name, document.source, generated.fragment
            ),
            None => format!("{} ({})", document.name, document.source),
        };
        println!("{} {}", "#".dimmed(), header.bold());
        println!("{}", print_document(&document.document).trim_end());
        if let Some(refetch) = &document.refetch {
            let refetch =
                serde_json::to_string(refetch).context("failed to serialize refetch spec")?;
            println!("{} {refetch}", "refetch:".cyan());
        }
        println!();
    }

    print_diagnostics(report, project);
    let generated = report.generated().count();
    if report.has_errors() {
        println!(
            "{} {} document(s) left as authored",
            "✗".red(),
            report.diagnostics.len()
        );
    } else {
        println!(
            "{} {} document(s) compiled, {generated} pagination quer{} generated",
            "✓".green(),
            report.documents.len() - generated,
            if generated == 1 { "y" } else { "ies" }
        );
    }
    Ok(())
}

fn document_json(document: &CollectedDocument) -> Value {
    json!({
        "name": document.name,
        "source": document.source.as_str(),
        "kind": document.kind().map(DocumentKind::as_str),
        "generatedFrom": document.generated.as_ref().map(|generated| generated.fragment.as_str()),
        "text": print_document(&document.document),
        "raw": print_raw(&document.document),
        "refetch": document.refetch,
    })
}

fn json_report(project: &Project, report: &PassReport) -> Value {
    let artifacts: Vec<QueryArtifact> = report
        .generated()
        .filter_map(|document| QueryArtifact::build(&project.schema, document))
        .collect();
    json!({
        "documents": report.documents.iter().map(document_json).collect::<Vec<_>>(),
        "artifacts": artifacts,
        "diagnostics": report
            .diagnostics
            .iter()
            .map(|diagnostic| diagnostic_json(diagnostic, project))
            .collect::<Vec<_>>(),
    })
}
