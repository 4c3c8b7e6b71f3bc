//! Load options and the directives that build them.

use std::path::{Path, PathBuf};

/// Default merged-model delimiter.
pub const DEFAULT_DELIMITER: &str = ".";
/// Default delimiter inside environment variable names.
pub const DEFAULT_ENV_DELIMITER: &str = "__";
/// Default field tag used when binding.
pub const DEFAULT_TAG: &str = "config";
/// Separator appended to a non-empty environment prefix.
const ENV_PREFIX_SEPARATOR: char = '_';

/// A single configuration directive.
///
/// Directives apply in order; a later directive of the same kind replaces an
/// earlier one, except [`LoadOption::File`] which accumulates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOption {
    /// Add a file to the load set.
    File(PathBuf),
    /// Field tag used to match destination fields; empty is ignored.
    Tag(String),
    /// Merged-model delimiter; empty is ignored.
    Delimiter(String),
    /// Environment variable prefix; empty clears the filter.
    EnvPrefix(String),
    /// Environment variable delimiter; empty is ignored.
    EnvDelimiter(String),
    /// Bind from this path instead of the root; empty means root.
    UnmarshalPath(String),
}

/// Resolved options for one load call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    files: Vec<PathBuf>,
    tag: String,
    delimiter: String,
    env_prefix: String,
    env_delimiter: String,
    unmarshal_path: Option<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            tag: DEFAULT_TAG.to_string(),
            delimiter: DEFAULT_DELIMITER.to_string(),
            env_prefix: String::new(),
            env_delimiter: DEFAULT_ENV_DELIMITER.to_string(),
            unmarshal_path: None,
        }
    }
}

impl LoadOptions {
    /// Options with every default applied.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one directive.
    pub fn apply(&mut self, option: LoadOption) {
        match option {
            LoadOption::File(path) => {
                if !self.files.contains(&path) {
                    self.files.push(path);
                }
            }
            LoadOption::Tag(tag) => {
                if !tag.is_empty() {
                    self.tag = tag;
                }
            }
            LoadOption::Delimiter(delimiter) => {
                if !delimiter.is_empty() {
                    self.delimiter = delimiter;
                }
            }
            LoadOption::EnvPrefix(mut prefix) => {
                if !prefix.is_empty() && !prefix.ends_with(ENV_PREFIX_SEPARATOR) {
                    prefix.push(ENV_PREFIX_SEPARATOR);
                }
                self.env_prefix = prefix;
            }
            LoadOption::EnvDelimiter(delimiter) => {
                if !delimiter.is_empty() {
                    self.env_delimiter = delimiter.to_lowercase();
                }
            }
            LoadOption::UnmarshalPath(path) => {
                self.unmarshal_path = (!path.is_empty()).then_some(path);
            }
        }
    }

    /// Add a config file; files load in the order first added.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.apply(LoadOption::File(path.as_ref().to_path_buf()));
        self
    }

    /// Override the field tag name.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.apply(LoadOption::Tag(tag.into()));
        self
    }

    /// Override the merged-model delimiter.
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.apply(LoadOption::Delimiter(delimiter.into()));
        self
    }

    /// Filter and strip environment variables by prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.apply(LoadOption::EnvPrefix(prefix.into()));
        self
    }

    /// Override the environment variable hierarchy delimiter.
    pub fn with_env_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.apply(LoadOption::EnvDelimiter(delimiter.into()));
        self
    }

    /// Bind from a sub-path of the merged model.
    pub fn with_unmarshal_path(mut self, path: impl Into<String>) -> Self {
        self.apply(LoadOption::UnmarshalPath(path.into()));
        self
    }

    /// Files in load order.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Field tag used when binding.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Merged-model delimiter.
    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// Environment prefix including its trailing `_`, or empty.
    pub fn env_prefix(&self) -> &str {
        &self.env_prefix
    }

    /// Lower-cased environment delimiter.
    pub fn env_delimiter(&self) -> &str {
        &self.env_delimiter
    }

    /// Sub-path bound instead of the root, if any.
    pub fn unmarshal_path(&self) -> Option<&str> {
        self.unmarshal_path.as_deref()
    }
}

impl Extend<LoadOption> for LoadOptions {
    fn extend<I: IntoIterator<Item = LoadOption>>(&mut self, iter: I) {
        for option in iter {
            self.apply(option);
        }
    }
}

impl FromIterator<LoadOption> for LoadOptions {
    fn from_iter<I: IntoIterator<Item = LoadOption>>(iter: I) -> Self {
        let mut options = Self::default();
        options.extend(iter);
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let options = LoadOptions::new();
        assert_eq!(options.tag(), "config");
        assert_eq!(options.delimiter(), ".");
        assert_eq!(options.env_delimiter(), "__");
        assert_eq!(options.env_prefix(), "");
        assert!(options.files().is_empty());
        assert_eq!(options.unmarshal_path(), None);
    }

    #[test]
    fn empty_values_are_ignored() {
        let options = LoadOptions::new()
            .with_tag("")
            .with_delimiter("")
            .with_env_delimiter("");
        assert_eq!(options, LoadOptions::new());
    }

    #[test]
    fn env_prefix_gets_separator() {
        assert_eq!(LoadOptions::new().with_env_prefix("APP").env_prefix(), "APP_");
        assert_eq!(LoadOptions::new().with_env_prefix("APP_").env_prefix(), "APP_");
        let cleared = LoadOptions::new().with_env_prefix("APP").with_env_prefix("");
        assert_eq!(cleared.env_prefix(), "");
    }

    #[test]
    fn env_delimiter_is_lowercased() {
        assert_eq!(LoadOptions::new().with_env_delimiter("_S_").env_delimiter(), "_s_");
    }

    #[test]
    fn later_directives_replace_earlier_ones() {
        let options: LoadOptions = [
            LoadOption::Tag("first".into()),
            LoadOption::Tag("second".into()),
            LoadOption::UnmarshalPath("child".into()),
            LoadOption::UnmarshalPath(String::new()),
        ]
        .into_iter()
        .collect();
        assert_eq!(options.tag(), "second");
        assert_eq!(options.unmarshal_path(), None);
    }

    #[test]
    fn files_keep_first_position_and_dedupe() {
        let options = LoadOptions::new()
            .with_file("a.yml")
            .with_file("b.json")
            .with_file("a.yml");
        assert_eq!(
            options.files(),
            [PathBuf::from("a.yml"), PathBuf::from("b.json")]
        );
    }
}
