//! Layered config resolution.
//!
//! Applies every configured file in order, then the environment, into one
//! key-path tree, and binds the result into a typed destination.

mod env;
mod file;
pub(crate) mod merge;

#[cfg(test)]
mod tests;

pub use env::{EnvKeyTransformer, EnvSnapshot};
pub use file::FileFormat;

use crate::bind::{Bind, Binder};
use crate::model::{KeyPath, Tree};
use crate::{ConfigError, LoadOptions, UnmarshalError};
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::PathBuf;

/// One key-path write produced by a source.
pub(crate) type Entry = (KeyPath, Value);

/// Origin of a config layer, lowest precedence first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// A structured file.
    File(PathBuf),
    /// Environment variables under a prefix (empty for all).
    Environment { prefix: String },
}

/// What a single source contributed during resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    /// Where the layer came from.
    pub source: ConfigSource,
    /// Number of key-path writes applied.
    pub entries: usize,
}

/// Merged config tree plus the options needed to bind it.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    tree: Tree,
    sources: Vec<SourceReport>,
    delimiter: String,
    tag: String,
    unmarshal_path: KeyPath,
}

impl ResolvedConfig {
    /// The merged key-path tree.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Sources in the order they were applied.
    pub fn sources(&self) -> &[SourceReport] {
        &self.sources
    }

    /// Look up a value by a path written with the merged-model delimiter.
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.tree.get(path, &self.delimiter)
    }

    /// Flattened leaf keys of the whole tree.
    pub fn keys(&self) -> Vec<String> {
        self.tree.keys(&self.delimiter)
    }

    /// Bind the configured sub-path (root by default) into `dest`.
    pub fn bind<T: Bind + ?Sized>(&self, dest: &mut T) -> Result<(), ConfigError> {
        self.bind_at(&self.unmarshal_path, dest)
    }

    /// Bind an explicit sub-path into `dest`, ignoring the configured one.
    pub fn bind_path<T: Bind + ?Sized>(&self, path: &str, dest: &mut T) -> Result<(), ConfigError> {
        self.bind_at(&KeyPath::parse(path, &self.delimiter), dest)
    }

    /// Deserialize the configured sub-path through serde.
    ///
    /// A missing sub-path decodes from an empty mapping.
    pub fn extract<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        let value = self
            .tree
            .subtree(&self.unmarshal_path)
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));
        serde_json::from_value(value)
            .map_err(|err| ConfigError::Unmarshal(UnmarshalError::Deserialize(err)))
    }

    fn bind_at<T: Bind + ?Sized>(&self, path: &KeyPath, dest: &mut T) -> Result<(), ConfigError> {
        let empty = Value::Object(Map::new());
        let value = match self.tree.subtree(path) {
            Some(value) => value,
            None => {
                debug!("unmarshal path not found, binding nothing (path={path})");
                &empty
            }
        };
        let binder = Binder::new(&self.tag, path.clone()).with_delimiter(&self.delimiter);
        dest.bind(value, &binder)?;
        Ok(())
    }
}

/// Resolve all sources in precedence order: files as given, then environment.
///
/// The first failing source aborts resolution; nothing partial is returned.
pub fn resolve(options: &LoadOptions, env: &EnvSnapshot) -> Result<ResolvedConfig, ConfigError> {
    let delimiter = options.delimiter();
    let mut tree = Tree::new();
    let mut sources = Vec::with_capacity(options.files().len() + 1);

    for path in options.files() {
        let entries = file::load_file(path, delimiter)?;
        debug!(
            "applying file layer (path={}, entries={})",
            path.display(),
            entries.len()
        );
        sources.push(SourceReport {
            source: ConfigSource::File(path.clone()),
            entries: apply(&mut tree, entries),
        });
    }

    let transformer =
        EnvKeyTransformer::new(options.env_prefix(), options.env_delimiter(), delimiter);
    let entries = env::load_env(env, &transformer)?;
    debug!(
        "applying environment layer (prefix={:?}, entries={})",
        options.env_prefix(),
        entries.len()
    );
    sources.push(SourceReport {
        source: ConfigSource::Environment {
            prefix: options.env_prefix().to_string(),
        },
        entries: apply(&mut tree, entries),
    });

    info!("config resolved (sources={})", sources.len());
    Ok(ResolvedConfig {
        tree,
        sources,
        delimiter: delimiter.to_string(),
        tag: options.tag().to_string(),
        unmarshal_path: options
            .unmarshal_path()
            .map(|path| KeyPath::parse(path, delimiter))
            .unwrap_or_default(),
    })
}

/// Resolve against the current process environment and bind into `dest`.
pub fn load<T: Bind + ?Sized>(dest: &mut T, options: &LoadOptions) -> Result<(), ConfigError> {
    load_with_env(dest, options, &EnvSnapshot::capture())
}

/// Resolve against an explicit environment snapshot and bind into `dest`.
pub fn load_with_env<T: Bind + ?Sized>(
    dest: &mut T,
    options: &LoadOptions,
    env: &EnvSnapshot,
) -> Result<(), ConfigError> {
    resolve(options, env)?.bind(dest)
}

fn apply(tree: &mut Tree, entries: Vec<Entry>) -> usize {
    let count = entries.len();
    for (path, value) in entries {
        tree.set(&path, value);
    }
    count
}
