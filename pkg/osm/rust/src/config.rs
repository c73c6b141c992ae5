// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use anyhow::{Context, Result};
use log::LevelFilter;
use serde::Deserialize;
use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::cli::Args;

const DEFAULT_CONFIG_PATH: &str = "/etc/osm-amenities/osm-amenities.yaml";
const DEFAULT_DATABASE_PATH: &str = "/var/lib/osm-amenities/osm.sqlite3";
const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8000";

/// Contents of the YAML config file. Every key is optional.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct FileConfig {
    pub database_path: Option<PathBuf>,
    pub listen_addr: Option<String>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

/// Fully resolved runtime settings.
#[derive(Debug, PartialEq)]
pub struct Settings {
    pub database_path: PathBuf,
    pub listen_addr: SocketAddr,
    pub log_level: LevelFilter,
    pub log_file: Option<PathBuf>,
}

impl Settings {
    /// Resolve settings. Priority: CLI flag > environment > config file > default.
    pub fn resolve(config: &Option<FileConfig>, args: &Args) -> Result<Settings> {
        let listen_addr = match &args.listen {
            Some(addr) => addr.clone(),
            None => get_listen_addr(config),
        };
        let listen_addr = listen_addr
            .parse()
            .with_context(|| format!("invalid listen address: {listen_addr}"))?;

        Ok(Settings {
            database_path: args
                .database
                .clone()
                .unwrap_or_else(|| get_database_path(config)),
            listen_addr,
            log_level: args
                .log_level
                .as_deref()
                .map(parse_log_level)
                .unwrap_or_else(|| get_log_level(config)),
            log_file: get_log_file(config),
        })
    }
}

/// The config file to read: the `--config` flag, else the default location.
pub fn config_path(flag: Option<&Path>) -> PathBuf {
    flag.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), Path::to_path_buf)
}

/// Loads the YAML config file if it exists.
///
/// Runs before logging is up, so a missing file is reported by the caller.
pub fn load_config(path: &Path) -> Result<Option<FileConfig>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    if contents.trim().is_empty() {
        return Ok(Some(FileConfig::default()));
    }

    // A document holding only comments parses as null.
    let config: Option<FileConfig> = serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse YAML config {}", path.display()))?;
    Ok(Some(config.unwrap_or_default()))
}

fn get_env_nonempty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

pub fn get_database_path(config: &Option<FileConfig>) -> PathBuf {
    if let Some(path) = get_env_nonempty("OSM_DATABASE_PATH") {
        return PathBuf::from(path);
    }

    config
        .as_ref()
        .and_then(|c| c.database_path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH))
}

pub fn get_listen_addr(config: &Option<FileConfig>) -> String {
    if let Some(addr) = get_env_nonempty("OSM_LISTEN_ADDR") {
        return addr;
    }

    config
        .as_ref()
        .and_then(|c| c.listen_addr.clone())
        .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string())
}

pub fn get_log_file(config: &Option<FileConfig>) -> Option<PathBuf> {
    get_env_nonempty("OSM_LOG_FILE")
        .map(PathBuf::from)
        .or_else(|| config.as_ref().and_then(|c| c.log_file.clone()))
}

/// Parse an agent log level name. Unknown levels silently default to Info
fn parse_log_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" | "warning" => LevelFilter::Warn,
        "error" | "critical" => LevelFilter::Error,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Info,
    }
}

/// Gets the log level from configuration.
/// Priority: OSM_LOG_LEVEL > LOG_LEVEL > YAML config > default Info
pub fn get_log_level(config: &Option<FileConfig>) -> LevelFilter {
    if let Some(level) = get_env_nonempty("OSM_LOG_LEVEL").or_else(|| get_env_nonempty("LOG_LEVEL")) {
        return parse_log_level(&level);
    }

    config
        .as_ref()
        .and_then(|c| c.log_level.as_deref())
        .map(parse_log_level)
        .unwrap_or(LevelFilter::Info)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const ENV_KEYS: [&str; 5] = [
        "OSM_DATABASE_PATH",
        "OSM_LISTEN_ADDR",
        "OSM_LOG_LEVEL",
        "LOG_LEVEL",
        "OSM_LOG_FILE",
    ];

    fn create_test_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file
    }

    fn clean_env<F: FnOnce()>(f: F) {
        temp_env::with_vars(ENV_KEYS.map(|k| (k, None::<&str>)), f);
    }

    #[test]
    fn test_load_full_config() {
        let file = create_test_config(
            r#"
database_path: /tmp/osm.sqlite3
listen_addr: 0.0.0.0:9000
log_level: debug
log_file: /tmp/osm.log
"#,
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(
            config,
            Some(FileConfig {
                database_path: Some(PathBuf::from("/tmp/osm.sqlite3")),
                listen_addr: Some("0.0.0.0:9000".to_string()),
                log_level: Some("debug".to_string()),
                log_file: Some(PathBuf::from("/tmp/osm.log")),
            })
        );
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config, None);
    }

    #[test]
    fn test_config_path() {
        assert_eq!(config_path(None), PathBuf::from(DEFAULT_CONFIG_PATH));
        assert_eq!(
            config_path(Some(Path::new("/tmp/osm.yaml"))),
            PathBuf::from("/tmp/osm.yaml")
        );
    }

    #[test]
    fn test_load_empty_and_comment_only_files() {
        for content in ["", "   \n", "# nothing here\n"] {
            let file = create_test_config(content);
            let config = load_config(file.path()).unwrap();
            assert_eq!(config, Some(FileConfig::default()), "content: {content:?}");
        }
    }

    #[test]
    fn test_load_invalid_yaml() {
        let file = create_test_config("listen_addr: [unclosed\n");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_defaults() {
        clean_env(|| {
            let settings = Settings::resolve(&None, &Args::default()).unwrap();
            assert_eq!(settings.database_path, PathBuf::from(DEFAULT_DATABASE_PATH));
            assert_eq!(settings.listen_addr, "127.0.0.1:8000".parse().unwrap());
            assert_eq!(settings.log_level, LevelFilter::Info);
            assert_eq!(settings.log_file, None);
        });
    }

    #[test]
    fn test_env_overrides_yaml() {
        let config = Some(FileConfig {
            database_path: Some(PathBuf::from("/from/yaml.sqlite3")),
            listen_addr: Some("127.0.0.1:7000".to_string()),
            log_level: Some("error".to_string()),
            log_file: None,
        });
        temp_env::with_vars(
            [
                ("OSM_DATABASE_PATH", Some("/from/env.sqlite3")),
                ("OSM_LISTEN_ADDR", Some("127.0.0.1:7001")),
                ("OSM_LOG_LEVEL", Some("warn")),
                ("LOG_LEVEL", None),
                ("OSM_LOG_FILE", Some("/from/env.log")),
            ],
            || {
                let settings = Settings::resolve(&config, &Args::default()).unwrap();
                assert_eq!(settings.database_path, PathBuf::from("/from/env.sqlite3"));
                assert_eq!(settings.listen_addr, "127.0.0.1:7001".parse().unwrap());
                assert_eq!(settings.log_level, LevelFilter::Warn);
                assert_eq!(settings.log_file, Some(PathBuf::from("/from/env.log")));
            },
        );
    }

    #[test]
    fn test_yaml_used_without_env() {
        let config = Some(FileConfig {
            database_path: Some(PathBuf::from("/from/yaml.sqlite3")),
            listen_addr: Some("127.0.0.1:7000".to_string()),
            log_level: Some("error".to_string()),
            log_file: Some(PathBuf::from("/from/yaml.log")),
        });
        clean_env(|| {
            let settings = Settings::resolve(&config, &Args::default()).unwrap();
            assert_eq!(settings.database_path, PathBuf::from("/from/yaml.sqlite3"));
            assert_eq!(settings.listen_addr, "127.0.0.1:7000".parse().unwrap());
            assert_eq!(settings.log_level, LevelFilter::Error);
            assert_eq!(settings.log_file, Some(PathBuf::from("/from/yaml.log")));
        });
    }

    #[test]
    fn test_cli_overrides_env() {
        let args = Args {
            config: None,
            database: Some(PathBuf::from("/from/cli.sqlite3")),
            listen: Some("127.0.0.1:7002".to_string()),
            log_level: Some("trace".to_string()),
        };
        temp_env::with_vars(
            [
                ("OSM_DATABASE_PATH", Some("/from/env.sqlite3")),
                ("OSM_LISTEN_ADDR", Some("127.0.0.1:7001")),
                ("OSM_LOG_LEVEL", Some("warn")),
            ],
            || {
                let settings = Settings::resolve(&None, &args).unwrap();
                assert_eq!(settings.database_path, PathBuf::from("/from/cli.sqlite3"));
                assert_eq!(settings.listen_addr, "127.0.0.1:7002".parse().unwrap());
                assert_eq!(settings.log_level, LevelFilter::Trace);
            },
        );
    }

    #[test]
    fn test_invalid_listen_addr() {
        clean_env(|| {
            let args = Args {
                listen: Some("not-an-address".to_string()),
                ..Args::default()
            };
            let err = Settings::resolve(&None, &args).unwrap_err();
            assert!(err.to_string().contains("invalid listen address"));
        });
    }

    #[test]
    fn test_log_level_fallback_to_log_level_env() {
        temp_env::with_vars(
            [("OSM_LOG_LEVEL", None), ("LOG_LEVEL", Some("debug"))],
            || {
                assert_eq!(get_log_level(&None), LevelFilter::Debug);
            },
        );
    }

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("TRACE"), LevelFilter::Trace);
        assert_eq!(parse_log_level("warning"), LevelFilter::Warn);
        assert_eq!(parse_log_level("critical"), LevelFilter::Error);
        assert_eq!(parse_log_level("off"), LevelFilter::Off);
        assert_eq!(parse_log_level("verbose"), LevelFilter::Info);
    }
}
