//! Environment source: snapshot capture and key transformation.

use super::Entry;
use crate::error::EnvLoadError;
use crate::model::KeyPath;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Point-in-time copy of environment variables, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, String>,
    unreadable: BTreeSet<String>,
}

impl EnvSnapshot {
    /// An empty environment.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Copy the current process environment.
    ///
    /// Variables whose name or value is not valid unicode are kept aside and
    /// only reported when a load actually selects them.
    pub fn capture() -> Self {
        let mut snapshot = Self::default();
        for (name, value) in std::env::vars_os() {
            match (name.into_string(), value.into_string()) {
                (Ok(name), Ok(value)) => {
                    snapshot.vars.insert(name, value);
                }
                (Ok(name), Err(_)) => {
                    snapshot.unreadable.insert(name);
                }
                (Err(name), _) => {
                    snapshot
                        .unreadable
                        .insert(name.to_string_lossy().into_owned());
                }
            }
        }
        snapshot
    }

    /// Set or replace one variable.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.unreadable.remove(&name);
        self.vars.insert(name, value.into());
    }

    /// Value of one variable.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Number of readable variables.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// True when no readable variables were captured.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Variables in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for EnvSnapshot
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut snapshot = Self::default();
        for (name, value) in iter {
            snapshot.set(name, value);
        }
        snapshot
    }
}

/// Maps environment variable names onto merged-model key paths.
#[derive(Debug, Clone)]
pub struct EnvKeyTransformer {
    prefix: String,
    env_delimiter: String,
    delimiter: String,
}

impl EnvKeyTransformer {
    /// `prefix` is matched verbatim; `env_delimiter` is compared against the
    /// lower-cased name.
    pub fn new(
        prefix: impl Into<String>,
        env_delimiter: impl Into<String>,
        delimiter: impl Into<String>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            env_delimiter: env_delimiter.into().to_lowercase(),
            delimiter: delimiter.into(),
        }
    }

    /// Whether a variable belongs to this transformer's prefix.
    pub fn matches(&self, name: &str) -> bool {
        name.starts_with(&self.prefix)
    }

    /// Strip the prefix, lower-case, swap delimiters and split.
    pub fn transform(&self, name: &str) -> KeyPath {
        let stripped = name.strip_prefix(&self.prefix).unwrap_or(name);
        let lowered = stripped.to_lowercase();
        let key = if self.env_delimiter.is_empty() {
            lowered
        } else {
            lowered.replace(&self.env_delimiter, &self.delimiter)
        };
        KeyPath::parse(&key, &self.delimiter)
    }
}

/// Select and transform the variables matching the transformer's prefix.
pub(super) fn load_env(
    env: &EnvSnapshot,
    transformer: &EnvKeyTransformer,
) -> Result<Vec<Entry>, EnvLoadError> {
    if let Some(name) = env.unreadable.iter().find(|name| transformer.matches(name)) {
        return Err(EnvLoadError::NotUnicode { name: name.clone() });
    }

    Ok(env
        .iter()
        .filter(|(name, _)| transformer.matches(name))
        .map(|(name, value)| (transformer.transform(name), Value::String(value.to_string())))
        .collect())
}
