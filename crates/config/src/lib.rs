mod config;
mod error;
mod loader;

pub use config::{DocumentsConfig, PaginateConfig, ResolveConfig, SchemaConfig, TypeConfig};
pub use error::{ConfigError, Result};
pub use loader::{find_config, load_config, load_config_from_str, CONFIG_FILES};
