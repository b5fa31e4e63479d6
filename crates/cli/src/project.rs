//! Loading a project: config, schema and document files.

use crate::exit_code::ExitCode;
use apollo_compiler::validation::Valid;
use apollo_compiler::Schema;
use graphql_config::{find_config, load_config, ConfigError, PaginateConfig};
use graphql_paginate::{collect_documents, CollectedDocument, ParseError};
use graphql_types::SourceId;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("no config file found in {} or any parent directory", .0.display())]
    NoConfig(PathBuf),

    #[error("invalid document pattern `{pattern}`: {message}")]
    Pattern { pattern: String, message: String },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid schema:\n{0}")]
    Schema(String),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl LoadError {
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        match self {
            Self::Config(_) | Self::NoConfig(_) | Self::Pattern { .. } => ExitCode::ConfigError,
            Self::Io { .. } => ExitCode::IoError,
            Self::Schema(_) => ExitCode::SchemaError,
            Self::Parse(_) => ExitCode::ParseError,
        }
    }
}

/// Everything a command needs to run the pass.
pub struct Project {
    pub config: PaginateConfig,
    pub schema: Valid<Schema>,
    pub documents: Vec<CollectedDocument>,
    /// Source text of every document file, for line/column output
    pub sources: HashMap<SourceId, String>,
}

impl Project {
    /// Load the project described by `config_path`, or by the config file
    /// found walking up from the working directory.
    #[tracing::instrument(skip_all)]
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, LoadError> {
        let config_path = match config_path {
            Some(path) => path,
            None => {
                let cwd = std::env::current_dir().map_err(|source| LoadError::Io {
                    path: PathBuf::from("."),
                    source,
                })?;
                find_config(&cwd)?.ok_or(LoadError::NoConfig(cwd))?
            }
        };
        let config = load_config(&config_path)?;
        let base_dir = config_path
            .parent()
            .map_or_else(PathBuf::new, Path::to_path_buf);
        Self::from_config(config, &base_dir)
    }

    /// Load schema and documents of `config`, resolving paths against `base_dir`.
    pub fn from_config(config: PaginateConfig, base_dir: &Path) -> Result<Self, LoadError> {
        let schema = load_schema(&config, base_dir)?;

        let mut documents = Vec::new();
        let mut sources = HashMap::new();
        for path in document_paths(&config, base_dir)? {
            let text = read(&path)?;
            let relative = path.strip_prefix(base_dir).unwrap_or(&path);
            let source = SourceId::from_path(relative);
            documents.extend(collect_documents(&text, &source)?);
            sources.insert(source, text);
        }
        tracing::info!(documents = documents.len(), files = sources.len(), "project loaded");

        Ok(Self {
            config,
            schema,
            documents,
            sources,
        })
    }
}

fn read(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn load_schema(config: &PaginateConfig, base_dir: &Path) -> Result<Valid<Schema>, LoadError> {
    let mut builder = Schema::builder();
    for path in config.schema.paths() {
        let path = base_dir.join(path);
        tracing::debug!(path = %path.display(), "reading schema file");
        builder = builder.parse(read(&path)?, &path);
    }
    let schema = builder
        .build()
        .map_err(|errors| LoadError::Schema(errors.errors.to_string()))?;
    schema
        .validate()
        .map_err(|errors| LoadError::Schema(errors.errors.to_string()))
}

/// Files matched by the config's document patterns, sorted and deduplicated.
fn document_paths(
    config: &PaginateConfig,
    base_dir: &Path,
) -> Result<BTreeSet<PathBuf>, LoadError> {
    let mut paths = BTreeSet::new();
    let Some(documents) = &config.documents else {
        return Ok(paths);
    };
    for pattern in documents.patterns() {
        let full = base_dir.join(pattern);
        let entries = glob::glob(&full.to_string_lossy()).map_err(|error| LoadError::Pattern {
            pattern: pattern.to_string(),
            message: error.to_string(),
        })?;
        for entry in entries {
            let path = entry.map_err(|error| LoadError::Io {
                path: error.path().to_path_buf(),
                source: error.into_error(),
            })?;
            if path.is_file() {
                paths.insert(path);
            }
        }
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphql_test_utils::TEST_SCHEMA;
    use tempfile::TempDir;

    fn write(dir: &TempDir, path: &str, contents: &str) {
        let path = dir.path().join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn project_dir() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "schema.graphql", TEST_SCHEMA);
        write(
            &dir,
            "paginate.config.yaml",
            "schema: schema.graphql\ndocuments: \"src/**/*.graphql\"\n",
        );
        dir
    }

    #[test]
    fn test_loads_documents_in_path_order() {
        let dir = project_dir();
        write(&dir, "src/b.graphql", "query B { viewer { id } }");
        write(&dir, "src/a/a.graphql", "query A { viewer { id } }\nfragment F on User { id }");

        let project = Project::load(Some(dir.path().join("paginate.config.yaml"))).unwrap();
        let names: Vec<&str> = project
            .documents
            .iter()
            .map(|document| document.name.as_str())
            .collect();
        assert_eq!(names, vec!["A", "F", "B"]);
        assert_eq!(project.sources.len(), 2);
        assert!(project
            .sources
            .contains_key(&SourceId::from_path(Path::new("src/b.graphql"))));
    }

    #[test]
    fn test_invalid_schema() {
        let dir = project_dir();
        write(&dir, "schema.graphql", "type Query { user: Missing }");
        let error = Project::load(Some(dir.path().join("paginate.config.yaml")))
            .err()
            .unwrap();
        assert_eq!(error.exit_code(), ExitCode::SchemaError);
    }

    #[test]
    fn test_document_syntax_error() {
        let dir = project_dir();
        write(&dir, "src/broken.graphql", "query {");
        let error = Project::load(Some(dir.path().join("paginate.config.yaml")))
            .err()
            .unwrap();
        assert_eq!(error.exit_code(), ExitCode::ParseError);
    }

    #[test]
    fn test_missing_schema_file() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "paginate.config.yaml", "schema: missing.graphql\n");
        let error = Project::load(Some(dir.path().join("paginate.config.yaml")))
            .err()
            .unwrap();
        assert_eq!(error.exit_code(), ExitCode::IoError);
    }
}
