//! Layered configuration loading.
//!
//! Files are merged in the order given, environment variables are applied on
//! top, and the resulting key-path tree is bound into a typed destination
//! through per-field tag tables.
//!
//! ```no_run
//! use tiered_config::{LoadOptions, bindable, load};
//!
//! #[derive(Default)]
//! struct Settings {
//!     name: String,
//!     workers: u32,
//! }
//!
//! bindable! {
//!     Settings {
//!         name => { config: "name" },
//!         workers => { config: "workers" },
//!     }
//! }
//!
//! let mut settings = Settings::default();
//! let options = LoadOptions::new()
//!     .with_file("base.yml")
//!     .with_file("local.json")
//!     .with_env_prefix("APP");
//! load(&mut settings, &options)?;
//! # Ok::<(), tiered_config::ConfigError>(())
//! ```

mod bind;
mod error;
mod loader;
mod model;
mod options;

/// Binding traits and helpers.
pub use bind::{Bind, Binder, Record};
/// Public error types returned by load and bind.
pub use error::{ConfigError, EnvLoadError, FileLoadError, UnmarshalError};
/// Resolution entry points and source types.
pub use loader::{
    ConfigSource, EnvKeyTransformer, EnvSnapshot, FileFormat, ResolvedConfig, SourceReport, load,
    load_with_env, resolve,
};
/// Key-path model.
pub use model::{KeyPath, Tree};
/// Load options.
pub use options::{DEFAULT_DELIMITER, DEFAULT_ENV_DELIMITER, DEFAULT_TAG, LoadOption, LoadOptions};
/// Value type shared by every source.
pub use serde_json::Value;
