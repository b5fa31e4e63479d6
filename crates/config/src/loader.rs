use crate::{ConfigError, PaginateConfig, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Config file names to search for, in order of preference
pub const CONFIG_FILES: &[&str] = &[
    "paginate.config.yml",
    "paginate.config.yaml",
    "paginate.config.json",
    ".paginaterc",
];

/// Find a config file by walking up the directory tree from the given start directory.
/// Returns the path to the config file if found.
#[tracing::instrument(fields(start = %start_dir.display()))]
pub fn find_config(start_dir: &Path) -> Result<Option<PathBuf>> {
    let mut current_dir = start_dir.to_path_buf();
    let mut checked_dirs = 0;

    loop {
        tracing::trace!(dir = %current_dir.display(), "Checking directory for config files");
        for file_name in CONFIG_FILES {
            let config_path = current_dir.join(file_name);
            if config_path.is_file() {
                tracing::info!(path = %config_path.display(), checked_dirs, "Found config file");
                return Ok(Some(config_path));
            }
        }

        checked_dirs += 1;
        if !current_dir.pop() {
            tracing::debug!(checked_dirs, "No config file found");
            break;
        }
    }

    Ok(None)
}

/// Load a config from the specified path.
/// Automatically detects the format based on file extension.
#[tracing::instrument(fields(path = %path.display()))]
pub fn load_config(path: &Path) -> Result<PaginateConfig> {
    tracing::debug!("Reading config file");
    let contents = fs::read_to_string(path)?;
    let config = load_config_from_str(&contents, path)?;
    tracing::info!(
        types = config.types.len(),
        default_keys = ?config.default_keys,
        "Config loaded successfully"
    );
    Ok(config)
}

/// Load a config from a string.
/// The path is used for error messages and format detection.
#[tracing::instrument(skip(contents), fields(path = %path.display(), size = contents.len()))]
pub fn load_config_from_str(contents: &str, path: &Path) -> Result<PaginateConfig> {
    let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("");

    tracing::debug!(extension, file_name, "Detecting config format");

    let config = match extension {
        "yml" | "yaml" => parse_yaml(contents, path)?,
        "json" => parse_json(contents, path)?,
        // .paginaterc without extension - try YAML first, then JSON
        "" if file_name == ".paginaterc" => {
            parse_yaml(contents, path).or_else(|_| parse_json(contents, path))?
        }
        _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    };

    validate_config(&config, path)?;
    Ok(config)
}

fn parse_yaml(contents: &str, path: &Path) -> Result<PaginateConfig> {
    serde_yaml::from_str(contents).map_err(|e| ConfigError::Invalid {
        path: path.to_path_buf(),
        message: format!("YAML parse error: {e}"),
    })
}

fn parse_json(contents: &str, path: &Path) -> Result<PaginateConfig> {
    serde_json::from_str(contents).map_err(|e| ConfigError::Invalid {
        path: path.to_path_buf(),
        message: format!("JSON parse error: {e}"),
    })
}

fn is_graphql_name(value: &str) -> bool {
    let mut chars = value.chars();
    chars
        .next()
        .is_some_and(|first| first == '_' || first.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

#[tracing::instrument(skip(config, path), fields(path = %path.display(), types = config.types.len()))]
fn validate_config(config: &PaginateConfig, path: &Path) -> Result<()> {
    let invalid = |message: String| ConfigError::Invalid {
        path: path.to_path_buf(),
        message,
    };

    let schema_paths = config.schema.paths();
    if schema_paths.is_empty() || schema_paths.iter().any(|p| p.trim().is_empty()) {
        return Err(invalid("schema must name at least one non-empty path".into()));
    }

    if let Some(documents) = &config.documents {
        let patterns = documents.patterns();
        if patterns.is_empty() || patterns.iter().any(|p| p.trim().is_empty()) {
            return Err(invalid(
                "documents must contain at least one non-empty pattern".into(),
            ));
        }
    }

    if let Some(key) = config.default_keys.iter().find(|k| !is_graphql_name(k)) {
        return Err(invalid(format!("defaultKeys entry '{key}' is not a field name")));
    }

    for (type_name, type_config) in &config.types {
        tracing::trace!(type_name, "Validating type config");
        if !is_graphql_name(type_name) {
            return Err(invalid(format!("'{type_name}' is not a type name")));
        }
        if let Some(key) = type_config.keys.iter().find(|k| !is_graphql_name(k)) {
            return Err(invalid(format!(
                "type '{type_name}' has key '{key}' which is not a field name"
            )));
        }

        let Some(resolve) = &type_config.resolve else {
            continue;
        };
        if !is_graphql_name(&resolve.query_field) {
            return Err(invalid(format!(
                "type '{type_name}' resolves through '{}' which is not a field name",
                resolve.query_field
            )));
        }
        let keys = config.keys_for(type_name);
        for (key, argument) in &resolve.arguments {
            if !keys.contains(key) {
                return Err(invalid(format!(
                    "type '{type_name}' maps argument '{argument}' from '{key}', which is not one of its keys"
                )));
            }
            if !is_graphql_name(argument) {
                return Err(invalid(format!(
                    "type '{type_name}' maps '{key}' to '{argument}', which is not an argument name"
                )));
            }
        }
    }

    tracing::debug!("Config validation passed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DocumentsConfig;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_yaml() {
        let yaml = r#"
schema: "schema.graphql"
documents: "src/**/*.graphql"
types:
  Ghost:
    keys: [name, aka]
    resolve:
      queryField: ghost
      arguments:
        name: name
        aka: aka
"#;

        let mut file = NamedTempFile::with_suffix(".yml").unwrap();
        file.write_all(yaml.as_bytes()).unwrap();
        file.flush().unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.schema.paths(), vec!["schema.graphql"]);
        assert_eq!(
            config.documents.as_ref().map(DocumentsConfig::patterns),
            Some(vec!["src/**/*.graphql"])
        );
        let ghost = config.type_config("Ghost").unwrap();
        assert_eq!(ghost.keys, vec!["name".to_string(), "aka".to_string()]);
        let resolve = ghost.resolve.as_ref().unwrap();
        assert_eq!(resolve.query_field, "ghost");
        assert_eq!(resolve.argument_for("aka"), "aka");
    }

    #[test]
    fn test_load_json() {
        let json = r#"{
  "schema": ["a.graphql", "b.graphql"],
  "defaultKeys": ["id", "uuid"]
}"#;

        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file.flush().unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.schema.paths(), vec!["a.graphql", "b.graphql"]);
        assert_eq!(config.default_keys, vec!["id".to_string(), "uuid".to_string()]);
        assert!(config.types.is_empty());
    }

    #[test]
    fn test_paginaterc_falls_back_to_json() {
        let config = load_config_from_str(
            r#"{"schema": "schema.graphql"}"#,
            Path::new("/project/.paginaterc"),
        )
        .unwrap();
        assert_eq!(config.schema.paths(), vec!["schema.graphql"]);
    }

    #[test]
    fn test_unsupported_format() {
        let result = load_config_from_str("schema = 'x'", Path::new("paginate.config.toml"));
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_invalid_yaml() {
        let result = load_config_from_str("schema: [", Path::new("paginate.config.yml"));
        let Err(ConfigError::Invalid { message, .. }) = result else {
            panic!("expected invalid config error");
        };
        assert!(message.starts_with("YAML parse error"));
    }

    #[test]
    fn test_empty_schema_rejected() {
        let result = load_config_from_str("schema: \"\"", Path::new("paginate.config.yml"));
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_resolve_argument_must_map_a_key() {
        let yaml = r"
schema: schema.graphql
types:
  Ghost:
    keys: [name]
    resolve:
      queryField: ghost
      arguments:
        aka: aka
";
        let result = load_config_from_str(yaml, Path::new("paginate.config.yaml"));
        let Err(ConfigError::Invalid { message, .. }) = result else {
            panic!("expected invalid config error");
        };
        assert!(message.contains("not one of its keys"));
    }

    #[test]
    fn test_invalid_key_name_rejected() {
        let yaml = r"
schema: schema.graphql
types:
  Ghost:
    keys: ['first name']
";
        let result = load_config_from_str(yaml, Path::new("paginate.config.yaml"));
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_find_config_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("src").join("queries");
        fs::create_dir_all(&nested).unwrap();
        let config_path = dir.path().join("paginate.config.yaml");
        fs::write(&config_path, "schema: schema.graphql\n").unwrap();

        let found = find_config(&nested).unwrap();
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_graphql_names() {
        assert!(is_graphql_name("queryField"));
        assert!(is_graphql_name("_id"));
        assert!(!is_graphql_name("1st"));
        assert!(!is_graphql_name(""));
        assert!(!is_graphql_name("a-b"));
    }
}
