// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! SQLite-backed amenity storage.
//!
//! Points live in `osm_amenity` next to the attributes. An R*Tree virtual
//! table, `osm_amenity_geometry`, indexes them for bbox lookups. R*Tree
//! coordinates are 32-bit floats rounded outwards, so SQL only narrows the
//! candidates; [`Filter::matches`] decides inclusion on the exact values.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::debug;
use rusqlite::types::Value;
use rusqlite::{Connection, Row, params, params_from_iter};

use crate::errors::Result;
use crate::model::{Amenity, NewAmenity, Point};
use crate::query::Filter;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS osm_amenity (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    osm_id INTEGER NOT NULL,
    name TEXT NOT NULL DEFAULT '',
    amenity_type VARCHAR(30) NOT NULL,
    lon REAL NOT NULL,
    lat REAL NOT NULL
);
CREATE INDEX IF NOT EXISTS osm_amenity_amenity_type ON osm_amenity (amenity_type);
CREATE VIRTUAL TABLE IF NOT EXISTS osm_amenity_geometry USING rtree(
    id,
    min_lon, max_lon,
    min_lat, max_lat
);
";

const SELECT_COLUMNS: &str = "a.id, a.osm_id, a.name, a.amenity_type, a.lon, a.lat";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open the database at `path`, creating the schema if it is missing.
    pub fn open(path: &Path) -> Result<Self> {
        debug!("Opening amenity store at {}", path.display());
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    // A panic while holding the lock leaves the connection itself intact.
    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// All amenities matching `filter`, ordered by id.
    pub fn list(&self, filter: &Filter) -> Result<Vec<Amenity>> {
        self.select(None, filter)
    }

    /// The amenity with `id`, if it exists and matches `filter`.
    pub fn get(&self, id: i64, filter: &Filter) -> Result<Option<Amenity>> {
        Ok(self.select(Some(id), filter)?.into_iter().next())
    }

    pub fn count(&self) -> Result<u64> {
        let count: i64 = self
            .lock()
            .query_row("SELECT COUNT(*) FROM osm_amenity", [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    /// Insert a record and its index entry in one transaction.
    ///
    /// Not reachable over HTTP; used by loaders that populate the database.
    pub fn insert(&self, amenity: &NewAmenity) -> Result<Amenity> {
        amenity.validate()?;

        let mut conn = self.lock();
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO osm_amenity (osm_id, name, amenity_type, lon, lat) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                amenity.osm_id,
                amenity.name,
                amenity.amenity_type,
                amenity.geometry.lon,
                amenity.geometry.lat,
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.execute(
            "INSERT INTO osm_amenity_geometry (id, min_lon, max_lon, min_lat, max_lat) VALUES (?1, ?2, ?2, ?3, ?3)",
            params![id, amenity.geometry.lon, amenity.geometry.lat],
        )?;
        tx.commit()?;

        Ok(Amenity {
            id,
            osm_id: amenity.osm_id,
            name: amenity.name.clone(),
            amenity_type: amenity.amenity_type.clone(),
            geometry: amenity.geometry,
        })
    }

    fn select(&self, id: Option<i64>, filter: &Filter) -> Result<Vec<Amenity>> {
        let mut sql = format!("SELECT {SELECT_COLUMNS} FROM ");
        let mut clauses: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(bbox) = filter.bbox {
            sql.push_str("osm_amenity_geometry g JOIN osm_amenity a ON a.id = g.id");
            clauses.push("g.max_lon >= ? AND g.min_lon <= ? AND g.max_lat >= ? AND g.min_lat <= ?");
            values.extend([
                Value::Real(bbox.min_lon),
                Value::Real(bbox.max_lon),
                Value::Real(bbox.min_lat),
                Value::Real(bbox.max_lat),
            ]);
        } else {
            sql.push_str("osm_amenity a");
        }

        if let Some(id) = id {
            clauses.push("a.id = ?");
            values.push(Value::Integer(id));
        }
        if let Some(name) = &filter.name {
            clauses.push("a.name = ?");
            values.push(Value::Text(name.clone()));
        }
        if let Some(amenity_type) = &filter.amenity_type {
            clauses.push("a.amenity_type = ?");
            values.push(Value::Text(amenity_type.clone()));
        }

        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY a.id");

        let conn = self.lock();
        let mut stmt = conn.prepare_cached(&sql)?;
        let mut amenities = Vec::new();
        for amenity in stmt.query_map(params_from_iter(values), amenity_from_row)? {
            let amenity = amenity?;
            if filter.matches(&amenity) {
                amenities.push(amenity);
            }
        }
        Ok(amenities)
    }
}

fn amenity_from_row(row: &Row<'_>) -> rusqlite::Result<Amenity> {
    Ok(Amenity {
        id: row.get(0)?,
        osm_id: row.get(1)?,
        name: row.get(2)?,
        amenity_type: row.get(3)?,
        geometry: Point {
            lon: row.get(4)?,
            lat: row.get(5)?,
        },
    })
}
