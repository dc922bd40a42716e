//! Wiring file - declarative values and binding graph in TOML
//!
//! ```toml
//! [values]
//! db_url = "postgres://localhost/app"
//!
//! [bindings.pool]
//! depends_on = ["db_url"]
//!
//! [bindings.request]
//! depends_on = ["pool"]
//! lifetime = "transient"
//! ```
//!
//! `[values]` entries can be registered directly with
//! [`crate::Registry::register_config_values`]; `[bindings]` only declare
//! shape, for checking a wiring with the CLI before code is written for it.

use crate::binding::Lifetime;
use crate::graph::DependencyGraph;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WiringConfig {
    #[serde(default)]
    pub values: BTreeMap<String, toml::Value>,
    #[serde(default)]
    pub bindings: BTreeMap<String, BindingSpec>,
}

/// Declared shape of a binding
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingSpec {
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub lifetime: Lifetime,
}

impl WiringConfig {
    /// Parse a wiring file, rejecting empty names and names declared both as
    /// a value and as a binding
    pub fn parse(contents: &str) -> crate::Result<Self> {
        let config: WiringConfig =
            toml::from_str(contents).map_err(|e| crate::Error::Config(e.to_string()))?;

        for name in config.values.keys().chain(config.bindings.keys()) {
            crate::name::Identifier::new(name.as_str())?;
        }
        if let Some(name) = config.values.keys().find(|n| config.bindings.contains_key(*n)) {
            return Err(crate::RegistrationError::DuplicateName(name.clone()).into());
        }
        Ok(config)
    }

    /// Adjacency mapping of everything declared; values have no dependencies
    pub fn dependency_graph(&self) -> DependencyGraph {
        self.values
            .keys()
            .map(|name| (name.clone(), Vec::new()))
            .chain(
                self.bindings
                    .iter()
                    .map(|(name, spec)| (name.clone(), spec.depends_on.clone())),
            )
            .collect()
    }

    /// Lifetime of a declared name; values are singletons
    pub fn lifetime(&self, name: &str) -> Option<Lifetime> {
        if self.values.contains_key(name) {
            return Some(Lifetime::Singleton);
        }
        self.bindings.get(name).map(|spec| spec.lifetime)
    }

    /// A small example wiring, written by `injector init`
    pub fn sample() -> Self {
        let mut values = BTreeMap::new();
        values.insert(
            "db_url".to_string(),
            toml::Value::String("postgres://localhost/app".to_string()),
        );

        let mut bindings = BTreeMap::new();
        bindings.insert(
            "pool".to_string(),
            BindingSpec {
                depends_on: vec!["db_url".to_string()],
                lifetime: Lifetime::Singleton,
            },
        );
        bindings.insert(
            "request".to_string(),
            BindingSpec {
                depends_on: vec!["pool".to_string()],
                lifetime: Lifetime::Transient,
            },
        );

        Self { values, bindings }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("injector.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<WiringConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config = WiringConfig::parse(&contents)?;
    tracing::debug!(
        "Loaded {} values and {} bindings from {}",
        config.values.len(),
        config.bindings.len(),
        path.display()
    );
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &WiringConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}
