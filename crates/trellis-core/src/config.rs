//! Configuration for Trellis services.
//!
//! Configuration is loaded from (in priority order):
//! 1. Environment variables (TRELLIS__ prefix, `__` separator)
//! 2. Config file (trellis.toml, or a caller-supplied prefix)
//! 3. Defaults

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrellisConfig {
    #[serde(default)]
    pub neo4j: Neo4jSettings,

    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub catalog: CatalogSettings,

    #[serde(default)]
    pub patterns: PatternSettings,
}

/// Connection settings for the Neo4j graph store.
#[derive(Debug, Clone, Deserialize)]
pub struct Neo4jSettings {
    #[serde(default = "default_uri")]
    pub uri: String,

    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default = "default_password")]
    pub password: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_fetch_size")]
    pub fetch_size: usize,
}

/// Which document store holds the relationship manager and patterns.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    #[default]
    File,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Root directory for the file backend.
    #[serde(default = "default_store_root")]
    pub root: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogSettings {
    /// Re-check predicate uniqueness against sibling relationships on update.
    #[serde(default)]
    pub recheck_predicate_on_update: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatternSettings {
    /// JSON file holding the active pattern set. When unset, patterns are
    /// read from the document store.
    #[serde(default)]
    pub path: Option<String>,
}

fn default_uri() -> String {
    "bolt://localhost:7687".to_string()
}

fn default_user() -> String {
    "neo4j".to_string()
}

fn default_password() -> String {
    "trellis-dev".to_string()
}

fn default_max_connections() -> u32 {
    16
}

fn default_fetch_size() -> usize {
    256
}

fn default_store_root() -> String {
    "./trellis-data".to_string()
}

impl Default for Neo4jSettings {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            user: default_user(),
            password: default_password(),
            max_connections: default_max_connections(),
            fetch_size: default_fetch_size(),
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            root: default_store_root(),
        }
    }
}

impl TrellisConfig {
    /// Load configuration from `{file_prefix}.toml` (optional) and the environment.
    pub fn load(file_prefix: &str) -> Result<Self, config::ConfigError> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix("TRELLIS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let loaded: Self = cfg.try_deserialize()?;
        tracing::debug!(
            store = ?loaded.store.backend,
            neo4j = %loaded.neo4j.uri,
            "Configuration loaded"
        );
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TrellisConfig::default();
        assert_eq!(config.neo4j.uri, "bolt://localhost:7687");
        assert_eq!(config.store.backend, StoreBackend::File);
        assert!(!config.catalog.recheck_predicate_on_update);
        assert!(config.patterns.path.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trellis.toml");
        std::fs::write(
            &path,
            r#"
[store]
backend = "memory"

[catalog]
recheck_predicate_on_update = true

[neo4j]
uri = "bolt://graph:7687"
"#,
        )
        .unwrap();

        let prefix = dir.path().join("trellis");
        let config = TrellisConfig::load(prefix.to_str().unwrap()).unwrap();
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert!(config.catalog.recheck_predicate_on_update);
        assert_eq!(config.neo4j.uri, "bolt://graph:7687");
        assert_eq!(config.neo4j.user, "neo4j");
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("absent");
        let config = TrellisConfig::load(prefix.to_str().unwrap()).unwrap();
        assert_eq!(config.store.root, "./trellis-data");
    }
}
