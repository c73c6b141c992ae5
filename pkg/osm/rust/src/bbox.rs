// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Axis-aligned bounding boxes in longitude/latitude space.
//!
//! Inclusion is overlap-inclusive: a point on any edge or corner of the box
//! is inside it. Both axes use closed intervals.

use std::str::FromStr;

use crate::errors::Error;
use crate::model::Point;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BBox {
    /// Build a box from two corners, in any order.
    pub fn from_corners(lon_a: f64, lat_a: f64, lon_b: f64, lat_b: f64) -> Self {
        Self {
            min_lon: lon_a.min(lon_b),
            min_lat: lat_a.min(lat_b),
            max_lon: lon_a.max(lon_b),
            max_lat: lat_a.max(lat_b),
        }
    }

    pub fn contains(&self, point: &Point) -> bool {
        (self.min_lon..=self.max_lon).contains(&point.lon)
            && (self.min_lat..=self.max_lat).contains(&point.lat)
    }
}

impl FromStr for BBox {
    type Err = Error;

    /// Parse `minLon,minLat,maxLon,maxLat`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidBBox {
            value: value.to_string(),
        };

        let mut coords = [0.0_f64; 4];
        let mut parts = value.split(',');
        for slot in coords.iter_mut() {
            let part = parts.next().ok_or_else(invalid)?;
            let number: f64 = part.trim().parse().map_err(|_| invalid())?;
            if !number.is_finite() {
                return Err(invalid());
            }
            *slot = number;
        }
        if parts.next().is_some() {
            return Err(invalid());
        }

        let [min_lon, min_lat, max_lon, max_lat] = coords;
        Ok(Self::from_corners(min_lon, min_lat, max_lon, max_lat))
    }
}
