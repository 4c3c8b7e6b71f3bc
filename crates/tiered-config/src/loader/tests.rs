//! Tests for layered resolution.

use super::*;
use crate::{FileLoadError, bindable};
use pretty_assertions::assert_eq;
use serde::Deserialize;
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Write contents to a path, creating parent directories if needed.
fn write_config(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("dir");
    }
    fs::write(path, contents).expect("write");
}

#[derive(Debug, Default, PartialEq)]
struct Server {
    host: String,
    port: u16,
}

bindable! {
    Server {
        host => { config: "host" },
        port => { config: "port" },
    }
}

#[test]
fn files_apply_in_order_then_env() {
    let temp = TempDir::new().expect("tmp");
    let base = temp.path().join("base.yaml");
    let local = temp.path().join("local.json");
    write_config(&base, "server:\n  host: base\n  port: 80\nname: svc\n");
    write_config(&local, r#"{ "server": { "port": 8080 } }"#);

    let env: EnvSnapshot = [("APP_SERVER__HOST", "env-host")].into_iter().collect();
    let options = LoadOptions::new()
        .with_env_prefix("APP")
        .with_file(&base)
        .with_file(&local);

    let resolved = resolve(&options, &env).expect("resolve");
    assert_eq!(
        resolved.tree().as_value(),
        &json!({"server": {"host": "env-host", "port": 8080}, "name": "svc"})
    );
    assert_eq!(
        resolved.sources(),
        [
            SourceReport {
                source: ConfigSource::File(base.clone()),
                entries: 3,
            },
            SourceReport {
                source: ConfigSource::File(local.clone()),
                entries: 1,
            },
            SourceReport {
                source: ConfigSource::Environment {
                    prefix: "APP_".to_string(),
                },
                entries: 1,
            },
        ]
    );
    assert_eq!(resolved.keys(), vec!["name", "server.host", "server.port"]);
}

#[test]
fn custom_delimiter_splits_file_and_env_keys() {
    let temp = TempDir::new().expect("tmp");
    let path = temp.path().join("config.json");
    write_config(&path, r#"{ "server/host": "file", "dotted.key": 1 }"#);

    let env: EnvSnapshot = [("SVC_SERVER__PORT", "9000")].into_iter().collect();
    let options = LoadOptions::new()
        .with_file(&path)
        .with_delimiter("/")
        .with_env_prefix("SVC");

    let resolved = resolve(&options, &env).expect("resolve");
    assert_eq!(resolved.get("server/host"), Some(&json!("file")));
    assert_eq!(resolved.get("server/port"), Some(&json!("9000")));
    assert_eq!(resolved.get("dotted.key"), Some(&json!(1)));
}

#[test]
fn first_failing_file_aborts() {
    let temp = TempDir::new().expect("tmp");
    let good = temp.path().join("good.yml");
    let bad = temp.path().join("bad.json");
    write_config(&good, "data: ok\n");
    write_config(&bad, "{ broken");

    let options = LoadOptions::new().with_file(&good).with_file(&bad);
    let err = resolve(&options, &EnvSnapshot::empty()).unwrap_err();
    match err {
        ConfigError::FileLoad { path, source } => {
            assert_eq!(path, bad);
            assert!(source.is_parse());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_file_is_a_read_error() {
    let temp = TempDir::new().expect("tmp");
    let options = LoadOptions::new().with_file(temp.path().join("absent.yaml"));
    let err = resolve(&options, &EnvSnapshot::empty()).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::FileLoad {
            source: FileLoadError::Read(_),
            ..
        }
    ));
}

#[test]
fn bind_uses_unmarshal_path() {
    let temp = TempDir::new().expect("tmp");
    let path = temp.path().join("config.yml");
    write_config(&path, "server:\n  host: example\n  port: 443\n");

    let options = LoadOptions::new()
        .with_file(&path)
        .with_unmarshal_path("Server");
    let mut server = Server::default();
    load_with_env(&mut server, &options, &EnvSnapshot::empty()).expect("load");
    assert_eq!(
        server,
        Server {
            host: "example".to_string(),
            port: 443,
        }
    );
}

#[test]
fn missing_unmarshal_path_binds_nothing() {
    let options = LoadOptions::new().with_unmarshal_path("nowhere");
    let mut server = Server {
        host: "kept".to_string(),
        port: 1,
    };
    load_with_env(&mut server, &options, &EnvSnapshot::empty()).expect("load");
    assert_eq!(server.host, "kept");
    assert_eq!(server.port, 1);
}

#[test]
fn bind_path_overrides_configured_path() {
    let env: EnvSnapshot = [("APP_PRIMARY__PORT", "1"), ("APP_BACKUP__PORT", "2")]
        .into_iter()
        .collect();
    let options = LoadOptions::new()
        .with_env_prefix("APP")
        .with_unmarshal_path("primary");
    let resolved = resolve(&options, &env).expect("resolve");

    let mut primary = Server::default();
    resolved.bind(&mut primary).expect("bind");
    let mut backup = Server::default();
    resolved.bind_path("backup", &mut backup).expect("bind");
    assert_eq!(primary.port, 1);
    assert_eq!(backup.port, 2);
}

#[test]
fn extract_through_serde() {
    #[derive(Debug, Deserialize, PartialEq)]
    struct Plain {
        host: String,
        #[serde(default)]
        port: u16,
    }

    let temp = TempDir::new().expect("tmp");
    let path = temp.path().join("config.yaml");
    write_config(&path, "server:\n  host: serde\n");
    let options = LoadOptions::new()
        .with_file(&path)
        .with_unmarshal_path("server");
    let resolved = resolve(&options, &EnvSnapshot::empty()).expect("resolve");
    let plain: Plain = resolved.extract().expect("extract");
    assert_eq!(
        plain,
        Plain {
            host: "serde".to_string(),
            port: 0,
        }
    );
}

#[test]
fn extract_failure_is_unmarshal_error() {
    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Strict {
        required: String,
    }

    let resolved = resolve(&LoadOptions::new(), &EnvSnapshot::empty()).expect("resolve");
    let err = resolved.extract::<Strict>().unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Unmarshal(UnmarshalError::Deserialize(_))
    ));
}

#[test]
fn environment_without_prefix_reads_everything() {
    let env: EnvSnapshot = [("HOST", "plain"), ("SERVER__PORT", "7")].into_iter().collect();
    let resolved = resolve(&LoadOptions::new(), &env).expect("resolve");
    assert_eq!(resolved.get("host"), Some(&json!("plain")));
    assert_eq!(resolved.get("server.port"), Some(&json!("7")));
}

#[test]
fn env_sets_sequence_field_from_single_value() {
    #[derive(Debug, Default, PartialEq)]
    struct Cluster {
        hosts: Vec<String>,
    }

    bindable! {
        Cluster {
            hosts => { config: "hosts" },
        }
    }

    let temp = TempDir::new().expect("tmp");
    let path = temp.path().join("cluster.yaml");
    write_config(&path, "hosts:\n  - a\n  - b\n");

    let env: EnvSnapshot = [("APP_HOSTS", "c")].into_iter().collect();
    let options = LoadOptions::new().with_file(&path).with_env_prefix("APP");
    let mut cluster = Cluster::default();
    load_with_env(&mut cluster, &options, &env).expect("load");
    assert_eq!(cluster.hosts, vec!["c".to_string()]);
}

#[test]
fn unmarshal_error_path_uses_model_delimiter() {
    let env: EnvSnapshot = [("APP_SERVER__PORT", "not-a-port")].into_iter().collect();
    let options = LoadOptions::new()
        .with_env_prefix("APP")
        .with_delimiter("/");
    let mut root = ServerRoot::default();
    let err = load_with_env(&mut root, &options, &env).unwrap_err();
    match err {
        ConfigError::Unmarshal(UnmarshalError::InvalidScalar { path, .. }) => {
            assert_eq!(path, "server/port");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[derive(Debug, Default)]
struct ServerRoot {
    server: Server,
}

bindable! {
    ServerRoot {
        server => { config: "server" },
    }
}
