// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use clap::Parser;
use std::path::PathBuf;

/// Read-only GeoJSON API over a table of OpenStreetMap amenities.
#[derive(Parser, Debug, Default, PartialEq)]
#[command(name = "osm-amenities", version)]
pub struct Args {
    /// Path to the YAML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// SQLite database holding the amenity table
    #[arg(short, long)]
    pub database: Option<PathBuf>,

    /// Address to listen on, e.g. 127.0.0.1:8000
    #[arg(short, long)]
    pub listen: Option<String>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_no_args() {
        let args = Args::try_parse_from(["osm-amenities"]).unwrap();
        assert_eq!(args, Args::default());
    }

    #[test]
    fn test_parse_all_flags() {
        let args = Args::try_parse_from([
            "osm-amenities",
            "--config",
            "/etc/osm.yaml",
            "--database=/var/lib/osm.sqlite3",
            "-l",
            "0.0.0.0:8000",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("/etc/osm.yaml")));
        assert_eq!(args.database, Some(PathBuf::from("/var/lib/osm.sqlite3")));
        assert_eq!(args.listen.as_deref(), Some("0.0.0.0:8000"));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_parse_rejects_unknown_flag() {
        assert!(Args::try_parse_from(["osm-amenities", "--pid", "/run/osm.pid"]).is_err());
    }
}
