// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! `log` backend shared by the workspace binaries.
//!
//! Lines follow the agent layout:
//!
//! ```text
//! 2026-01-02 03:04:05 UTC | OSM | INFO | (pkg/osm/rust/src/server.rs:42 in osm_amenities::server) | message
//! ```
//!
//! Every line goes to stderr and, when a log file is configured, is appended
//! to that file as well.

// Panicking code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
// Debug code that shouldn't be in production
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::{LevelFilter, Log, Metadata, Record};
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Component name printed in the second column.
pub const DEFAULT_COMPONENT: &str = "OSM";

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    /// The log file could not be opened for appending.
    #[error("could not open log file {}: {source}", path.display())]
    OpenFile { path: PathBuf, source: io::Error },
    /// Another logger was installed first.
    #[error("logger already initialized: {0}")]
    AlreadySet(#[source] log::SetLoggerError),
}

pub struct Logger {
    component: &'static str,
    level: LevelFilter,
    file: Option<Mutex<File>>,
}

impl Logger {
    pub fn new(component: &'static str, level: LevelFilter) -> Self {
        Self {
            component,
            level,
            file: None,
        }
    }

    /// Also append every line to `path`, creating it if needed.
    pub fn with_file(mut self, path: &Path) -> Result<Self, InitError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| InitError::OpenFile {
                path: path.to_path_buf(),
                source,
            })?;
        self.file = Some(Mutex::new(file));
        Ok(self)
    }

    /// Install as the global logger.
    pub fn install(self) -> Result<(), InitError> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self)).map_err(InitError::AlreadySet)?;
        log::set_max_level(level);
        Ok(())
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = format_line(OffsetDateTime::now_utc(), self.component, record);

        // Nowhere left to report a failed write to stderr, so it is dropped.
        let _ = writeln!(io::stderr().lock(), "{line}");

        if let Some(file) = &self.file
            && let Ok(mut file) = file.lock()
            && let Err(e) = writeln!(file, "{line}")
        {
            let _ = writeln!(io::stderr().lock(), "failed to write log file: {e}");
        }
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
        if let Some(file) = &self.file
            && let Ok(mut file) = file.lock()
        {
            let _ = file.flush();
        }
    }
}

/// Render one log line without the trailing newline.
pub fn format_line(now: OffsetDateTime, component: &str, record: &Record) -> String {
    let timestamp = now
        .format(TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| now.unix_timestamp().to_string());
    let file = record.file().unwrap_or("<unknown>");
    let line = record.line().unwrap_or(0);
    let module = record.module_path().unwrap_or("<unknown>");

    format!(
        "{timestamp} UTC | {component} | {level} | ({file}:{line} in {module}) | {args}",
        level = record.level(),
        args = record.args(),
    )
}

/// Install the logger at `level`, optionally teeing into `log_file`.
pub fn init(level: LevelFilter, log_file: Option<&Path>) -> Result<(), InitError> {
    let logger = Logger::new(DEFAULT_COMPONENT, level);
    let logger = match log_file {
        Some(path) => logger.with_file(path)?,
        None => logger,
    };
    logger.install()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use log::Level;
    use regex::Regex;
    use time::macros::datetime;

    fn line_regex() -> Regex {
        Regex::new(
            r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2} UTC \| [A-Z]+ \| (TRACE|DEBUG|INFO|WARN|ERROR) \| \([^:]+:\d+ in [\w:]+\) \| .*$",
        )
        .unwrap()
    }

    #[test]
    fn test_format_line_layout() {
        let line = format_line(
            datetime!(2026-01-02 03:04:05 UTC),
            "OSM",
            &Record::builder()
                .level(Level::Info)
                .file(Some("pkg/osm/rust/src/server.rs"))
                .line(Some(42))
                .module_path(Some("osm_amenities::server"))
                .args(format_args!("GET /amenities/ 200"))
                .build(),
        );
        assert_eq!(
            line,
            "2026-01-02 03:04:05 UTC | OSM | INFO | (pkg/osm/rust/src/server.rs:42 in osm_amenities::server) | GET /amenities/ 200"
        );
        assert!(line_regex().is_match(&line));
    }

    #[test]
    fn test_format_line_missing_location() {
        let line = format_line(
            datetime!(2026-01-02 03:04:05 UTC),
            "OSM",
            &Record::builder()
                .level(Level::Warn)
                .args(format_args!("no location"))
                .build(),
        );
        assert!(line.contains("(<unknown>:0 in <unknown>)"), "got: {line}");
        assert!(line.contains("| WARN |"));
    }

    #[test]
    fn test_level_filtering() {
        let logger = Logger::new("OSM", LevelFilter::Warn);
        let info = Metadata::builder().level(Level::Info).build();
        let error = Metadata::builder().level(Level::Error).build();
        assert!(!logger.enabled(&info));
        assert!(logger.enabled(&error));
    }

    #[test]
    fn test_log_file_receives_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("osm.log");
        let logger = Logger::new("OSM", LevelFilter::Debug)
            .with_file(&path)
            .unwrap();

        logger.log(
            &Record::builder()
                .level(Level::Debug)
                .file(Some("src/store.rs"))
                .line(Some(7))
                .module_path(Some("osm_amenities::store"))
                .args(format_args!("opened store"))
                .build(),
        );
        logger.log(
            &Record::builder()
                .level(Level::Trace)
                .args(format_args!("filtered out"))
                .build(),
        );
        logger.flush();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 1);
        assert!(line_regex().is_match(lines[0]), "got: {}", lines[0]);
        assert!(lines[0].ends_with("| opened store"));
    }

    #[test]
    fn test_with_file_reports_open_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("osm.log");
        let err = Logger::new("OSM", LevelFilter::Info)
            .with_file(&path)
            .err()
            .unwrap();
        assert!(err.to_string().contains("could not open log file"));
        assert!(err.to_string().contains("osm.log"));
        let source = std::error::Error::source(&err).unwrap();
        assert!(source.downcast_ref::<io::Error>().is_some());
    }
}
