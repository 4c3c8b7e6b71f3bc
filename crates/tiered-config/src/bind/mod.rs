//! Binding merged values into typed destinations.
//!
//! Destinations implement [`Bind`]. Scalars and common containers are
//! covered here; records describe their fields with [`Record`], usually
//! through the [`bindable!`](crate::bindable) macro, listing one key per tag
//! name. Only the key registered under the active tag is ever consulted.

mod scalar;


use crate::model::{KeyPath, value_kind};
use crate::{DEFAULT_DELIMITER, UnmarshalError};
use serde_json::{Map, Value};

/// A destination that merged config values can be written into.
pub trait Bind {
    /// Write `value` into `self`. Absent keys leave fields untouched.
    fn bind(&mut self, value: &Value, binder: &Binder<'_>) -> Result<(), UnmarshalError>;
}

/// Binding context: active tag name and the key path being bound.
///
/// Error paths render with the merged-model delimiter (`.` unless set with
/// [`Binder::with_delimiter`]).
#[derive(Debug, Clone)]
pub struct Binder<'t> {
    tag: &'t str,
    delimiter: &'t str,
    path: KeyPath,
}

impl<'t> Binder<'t> {
    /// Context for binding at `path` with the given tag.
    pub fn new(tag: &'t str, path: KeyPath) -> Self {
        Self {
            tag,
            delimiter: DEFAULT_DELIMITER,
            path,
        }
    }

    /// Render error paths with `delimiter`.
    pub fn with_delimiter(mut self, delimiter: &'t str) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Active tag name.
    pub fn tag(&self) -> &str {
        self.tag
    }

    /// Key path currently being bound.
    pub fn path(&self) -> &KeyPath {
        &self.path
    }

    /// Context for a child key.
    pub fn descend(&self, segment: &str) -> Binder<'t> {
        Binder {
            tag: self.tag,
            delimiter: self.delimiter,
            path: self.path.child(segment),
        }
    }

    fn rendered_path(&self) -> String {
        if self.path.is_root() {
            return self.path.to_string();
        }
        self.path.join(self.delimiter)
    }

    /// Start binding a record from a mapping value.
    ///
    /// `null` binds as an empty record; any other non-mapping is an error.
    pub fn record<'a>(&'a self, value: &'a Value) -> Result<Record<'a>, UnmarshalError> {
        let map = match value {
            Value::Object(map) => Some(map),
            Value::Null => None,
            other => return Err(self.mismatch("mapping", other)),
        };
        Ok(Record { map, binder: self })
    }

    /// Error for a value of the wrong kind.
    pub fn mismatch(&self, expected: &'static str, found: &Value) -> UnmarshalError {
        UnmarshalError::TypeMismatch {
            path: self.rendered_path(),
            expected,
            found: value_kind(found),
        }
    }

    /// Error for a scalar that failed to parse.
    pub fn invalid(
        &self,
        expected: &'static str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> UnmarshalError {
        UnmarshalError::InvalidScalar {
            path: self.rendered_path(),
            expected,
            source: source.into(),
        }
    }

    /// Error for a number that does not fit the destination.
    pub fn out_of_range(&self, expected: &'static str) -> UnmarshalError {
        UnmarshalError::OutOfRange {
            path: self.rendered_path(),
            expected,
        }
    }
}

/// Field-by-field binder for a record destination.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    map: Option<&'a Map<String, Value>>,
    binder: &'a Binder<'a>,
}

impl Record<'_> {
    /// Bind one field.
    ///
    /// `tags` pairs tag names with keys. The field is skipped when it has no
    /// key for the active tag or the key is absent from the mapping.
    pub fn field<T: Bind + ?Sized>(
        self,
        tags: &[(&str, &str)],
        target: &mut T,
    ) -> Result<Self, UnmarshalError> {
        let Some(map) = self.map else {
            return Ok(self);
        };
        let Some(key) = tags
            .iter()
            .find(|(tag, _)| *tag == self.binder.tag())
            .map(|(_, key)| key.to_lowercase())
        else {
            return Ok(self);
        };
        if let Some(value) = map.get(&key) {
            target.bind(value, &self.binder.descend(&key))?;
        }
        Ok(self)
    }

    /// End the field chain.
    pub fn finish(self) -> Result<(), UnmarshalError> {
        Ok(())
    }
}

/// Implement [`Bind`] for structs from a field/tag table.
///
/// ```
/// use tiered_config::bindable;
///
/// #[derive(Default)]
/// struct Server {
///     host: String,
///     port: u16,
/// }
///
/// bindable! {
///     Server {
///         host => { config: "host" },
///         port => { config: "port", env: "listen_port" },
///     }
/// }
/// ```
#[macro_export]
macro_rules! bindable {
    ($($ty:ty {
        $($field:ident => { $($tag:ident : $key:literal),* $(,)? }),* $(,)?
    })*) => {
        $(
            impl $crate::Bind for $ty {
                fn bind(
                    &mut self,
                    value: &$crate::Value,
                    binder: &$crate::Binder<'_>,
                ) -> ::std::result::Result<(), $crate::UnmarshalError> {
                    binder
                        .record(value)?
                        $(.field(&[$((stringify!($tag), $key)),*], &mut self.$field)?)*
                        .finish()
                }
            }
        )*
    };
}
