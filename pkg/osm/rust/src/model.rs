// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use crate::errors::{Error, Result};

/// WGS84 longitude/latitude.
pub const SRID_WGS84: u32 = 4326;

/// Upper bound on `amenity_type` length, in characters.
pub const AMENITY_TYPE_MAX_LEN: usize = 30;

/// A point in SRID 4326, longitude first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub lon: f64,
    pub lat: f64,
}

impl Point {
    pub fn new(lon: f64, lat: f64) -> Result<Self> {
        if !lon.is_finite() || !lat.is_finite() {
            return Err(Error::InvalidAmenity {
                reason: format!("non-finite coordinates ({lon}, {lat})"),
            });
        }
        if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
            return Err(Error::InvalidAmenity {
                reason: format!("coordinates ({lon}, {lat}) outside WGS84 bounds"),
            });
        }
        Ok(Self { lon, lat })
    }
}

/// A stored amenity.
#[derive(Debug, Clone, PartialEq)]
pub struct Amenity {
    pub id: i64,
    pub osm_id: i64,
    /// Empty when the source had no name.
    pub name: String,
    pub amenity_type: String,
    pub geometry: Point,
}

/// An amenity that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAmenity {
    pub osm_id: i64,
    pub name: String,
    pub amenity_type: String,
    pub geometry: Point,
}

impl NewAmenity {
    pub fn validate(&self) -> Result<()> {
        if self.amenity_type.is_empty() {
            return Err(Error::InvalidAmenity {
                reason: "amenity_type is required".to_string(),
            });
        }
        let len = self.amenity_type.chars().count();
        if len > AMENITY_TYPE_MAX_LEN {
            return Err(Error::InvalidAmenity {
                reason: format!(
                    "amenity_type is {len} characters, limit is {AMENITY_TYPE_MAX_LEN}"
                ),
            });
        }
        // Re-run the bounds check, the fields are public.
        Point::new(self.geometry.lon, self.geometry.lat)?;
        Ok(())
    }
}
