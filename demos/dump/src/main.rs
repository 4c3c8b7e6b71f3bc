//! Resolve config files and environment overrides and print the result.

use anyhow::Context;
use clap::Parser;
use log::{debug, info};
use std::path::PathBuf;
use tiered_config::{ConfigSource, EnvSnapshot, LoadOptions, resolve};

/// Command-line options for the dump tool.
#[derive(Parser)]
#[command(name = "tiered-dump", version)]
struct Cli {
    /// Config files, lowest precedence first (.json, .yaml, .yml)
    #[arg(long = "file", short = 'f')]
    files: Vec<PathBuf>,
    /// Environment variable prefix for overrides
    #[arg(long)]
    env_prefix: Option<String>,
    /// Hierarchy delimiter inside environment variable names
    #[arg(long)]
    env_delimiter: Option<String>,
    /// Hierarchy delimiter for config keys
    #[arg(long)]
    delimiter: Option<String>,
    /// Only print the subtree at this path
    #[arg(long)]
    path: Option<String>,
    /// Print flattened keys instead of the tree
    #[arg(long)]
    keys: bool,
}

impl Cli {
    fn options(&self) -> LoadOptions {
        let mut options = LoadOptions::new();
        for file in &self.files {
            options = options.with_file(file);
        }
        if let Some(prefix) = &self.env_prefix {
            options = options.with_env_prefix(prefix);
        }
        if let Some(delimiter) = &self.env_delimiter {
            options = options.with_env_delimiter(delimiter);
        }
        if let Some(delimiter) = &self.delimiter {
            options = options.with_delimiter(delimiter);
        }
        options
    }
}

fn main() -> anyhow::Result<()> {
    let _ = env_logger::builder()
        .format_timestamp_millis()
        .parse_default_env()
        .try_init();

    let cli = Cli::parse();
    let options = cli.options();
    info!(
        "resolving config (files={}, env_prefix={:?})",
        options.files().len(),
        options.env_prefix()
    );

    let resolved =
        resolve(&options, &EnvSnapshot::capture()).context("failed to resolve config")?;
    for report in resolved.sources() {
        match &report.source {
            ConfigSource::File(path) => {
                debug!("file layer {} ({} keys)", path.display(), report.entries)
            }
            ConfigSource::Environment { prefix } => {
                debug!("environment layer {prefix:?} ({} keys)", report.entries)
            }
        }
    }

    if cli.keys {
        for key in resolved.keys() {
            println!("{key}");
        }
        return Ok(());
    }

    let value = match cli.path.as_deref() {
        Some(path) => resolved
            .get(path)
            .with_context(|| format!("no config at path '{path}'"))?,
        None => resolved.tree().as_value(),
    };
    let rendered = serde_json::to_string_pretty(value).context("failed to render config")?;
    println!("{rendered}");
    Ok(())
}
