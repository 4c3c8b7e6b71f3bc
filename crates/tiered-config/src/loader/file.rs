//! File source: format dispatch, parsing and flattening.

use super::Entry;
use crate::error::{ConfigError, FileLoadError};
use crate::model::{KeyPath, value_kind};
use log::debug;
use serde_json::{Map, Number, Value};
use std::fs;
use std::path::Path;

/// Supported config file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Yaml,
}

impl FileFormat {
    /// Pick a format from the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Some(Self::Json),
            Some("yaml" | "yml") => Some(Self::Yaml),
            _ => None,
        }
    }

    /// Parse document contents into a root mapping.
    pub fn parse(self, contents: &str) -> Result<Map<String, Value>, FileLoadError> {
        let value = match self {
            Self::Json => serde_json::from_str::<Value>(contents)?,
            Self::Yaml => {
                let mut document: serde_yaml::Value = serde_yaml::from_str(contents)?;
                document.apply_merge()?;
                yaml_to_json(document)?
            }
        };
        match value {
            Value::Object(map) => Ok(map),
            Value::Null if self == Self::Yaml => Ok(Map::new()),
            other => Err(FileLoadError::NotAMapping(value_kind(&other))),
        }
    }
}

/// Read, parse and flatten one config file.
pub(super) fn load_file(path: &Path, delimiter: &str) -> Result<Vec<Entry>, ConfigError> {
    let format = FileFormat::from_path(path).ok_or_else(|| {
        ConfigError::file(
            path,
            FileLoadError::UnsupportedFormat(path.display().to_string()),
        )
    })?;
    debug!("reading config file (path={}, format={:?})", path.display(), format);
    let contents = fs::read_to_string(path).map_err(|err| ConfigError::file(path, err))?;
    let document = format
        .parse(&contents)
        .map_err(|err| ConfigError::file(path, err))?;

    let mut entries = Vec::new();
    flatten_into(document, &KeyPath::root(), delimiter, &mut entries);
    Ok(entries)
}

/// Flatten a parsed mapping into key-path writes.
///
/// Non-empty mappings are descended; every other value (including empty
/// mappings and sequences) becomes a leaf write. Keys containing the
/// delimiter expand into nested segments.
pub(crate) fn flatten_into(
    map: Map<String, Value>,
    prefix: &KeyPath,
    delimiter: &str,
    out: &mut Vec<Entry>,
) {
    for (key, value) in map {
        let mut path = prefix.clone();
        path.extend(&KeyPath::parse(&key, delimiter));
        if path.is_root() {
            continue;
        }
        match value {
            Value::Object(child) if !child.is_empty() => {
                flatten_into(child, &path, delimiter, out);
            }
            leaf => out.push((path, leaf)),
        }
    }
}

fn yaml_to_json(value: serde_yaml::Value) -> Result<Value, FileLoadError> {
    Ok(match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(flag) => Value::Bool(flag),
        serde_yaml::Value::Number(number) => yaml_number(&number),
        serde_yaml::Value::String(text) => Value::String(text),
        serde_yaml::Value::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<Result<_, _>>()?,
        ),
        serde_yaml::Value::Mapping(mapping) => {
            let mut map = Map::new();
            for (key, value) in mapping {
                map.insert(yaml_key(key)?, yaml_to_json(value)?);
            }
            Value::Object(map)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value)?,
    })
}

fn yaml_number(number: &serde_yaml::Number) -> Value {
    if let Some(int) = number.as_i64() {
        Value::Number(int.into())
    } else if let Some(uint) = number.as_u64() {
        Value::Number(uint.into())
    } else {
        number
            .as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(number.to_string()))
    }
}

fn yaml_key(key: serde_yaml::Value) -> Result<String, FileLoadError> {
    match key {
        serde_yaml::Value::String(text) => Ok(text),
        serde_yaml::Value::Bool(flag) => Ok(flag.to_string()),
        serde_yaml::Value::Number(number) => Ok(number.to_string()),
        serde_yaml::Value::Null => Ok("null".to_string()),
        serde_yaml::Value::Tagged(tagged) => yaml_key(tagged.value),
        other => Err(FileLoadError::UnsupportedKey(format!("{other:?}"))),
    }
}
