use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Key fields used for types without an explicit `keys` entry.
pub const DEFAULT_KEYS: &[&str] = &["id"];

fn default_keys() -> Vec<String> {
    DEFAULT_KEYS.iter().map(ToString::to_string).collect()
}

/// Top-level configuration of the pagination compiler.
///
/// ```yaml
/// schema: schema.graphql
/// documents: "src/**/*.graphql"
/// defaultKeys: [id]
/// types:
///   Ghost:
///     keys: [name, aka]
///     resolve:
///       queryField: ghost
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginateConfig {
    /// Schema file path(s)
    pub schema: SchemaConfig,

    /// Document glob pattern(s)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<DocumentsConfig>,

    /// Key fields for types that have no entry in `types`
    #[serde(default = "default_keys")]
    pub default_keys: Vec<String>,

    /// Per-type identity configuration, in declaration order
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub types: IndexMap<String, TypeConfig>,
}

impl PaginateConfig {
    /// A config with a single schema path and no type overrides.
    #[must_use]
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: SchemaConfig::Path(schema.into()),
            documents: None,
            default_keys: default_keys(),
            types: IndexMap::new(),
        }
    }

    /// Add (or replace) the configuration of a type.
    #[must_use]
    pub fn with_type(mut self, name: impl Into<String>, config: TypeConfig) -> Self {
        self.types.insert(name.into(), config);
        self
    }

    #[must_use]
    pub fn type_config(&self, type_name: &str) -> Option<&TypeConfig> {
        self.types.get(type_name)
    }

    /// The key fields of a type: its configured `keys`, or `defaultKeys`.
    #[must_use]
    pub fn keys_for(&self, type_name: &str) -> &[String] {
        match self.types.get(type_name) {
            Some(config) if !config.keys.is_empty() => &config.keys,
            _ => &self.default_keys,
        }
    }
}

/// Identity configuration of one type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeConfig {
    /// Fields forming a natural key when the type is not a `Node`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<String>,

    /// How to fetch a single instance by its keys
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolve: Option<ResolveConfig>,
}

impl TypeConfig {
    #[must_use]
    pub fn with_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            resolve: None,
        }
    }

    #[must_use]
    pub fn resolved_by(mut self, resolve: ResolveConfig) -> Self {
        self.resolve = Some(resolve);
        self
    }
}

/// A root query field that returns a single instance of a type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveConfig {
    /// Root query field name, e.g. `ghost`
    pub query_field: String,

    /// Key field to query-field argument. Keys without an entry map to an
    /// argument of the same name.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub arguments: IndexMap<String, String>,
}

impl ResolveConfig {
    #[must_use]
    pub fn new(query_field: impl Into<String>) -> Self {
        Self {
            query_field: query_field.into(),
            arguments: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with_argument(mut self, key: impl Into<String>, argument: impl Into<String>) -> Self {
        self.arguments.insert(key.into(), argument.into());
        self
    }

    /// The query-field argument that receives the value of `key`.
    #[must_use]
    pub fn argument_for<'a>(&'a self, key: &'a str) -> &'a str {
        self.arguments.get(key).map_or(key, String::as_str)
    }
}

/// Schema source: one path or several.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaConfig {
    Path(String),
    Paths(Vec<String>),
}

impl SchemaConfig {
    #[must_use]
    pub fn paths(&self) -> Vec<&str> {
        match self {
            Self::Path(path) => vec![path.as_str()],
            Self::Paths(paths) => paths.iter().map(String::as_str).collect(),
        }
    }
}

/// Document glob pattern(s).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentsConfig {
    /// Single pattern
    Pattern(String),
    /// Multiple patterns
    Patterns(Vec<String>),
}

impl DocumentsConfig {
    /// Get all document patterns
    #[must_use]
    pub fn patterns(&self) -> Vec<&str> {
        match self {
            Self::Pattern(pattern) => vec![pattern.as_str()],
            Self::Patterns(patterns) => patterns.iter().map(String::as_str).collect(),
        }
    }
}
