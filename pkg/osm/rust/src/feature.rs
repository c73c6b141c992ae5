// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! GeoJSON rendering of amenities.
//!
//! Field order is part of the wire contract; serde keeps struct order.

use serde::{Deserialize, Serialize};

use crate::model::Amenity;

const FEATURE: &str = "Feature";
const FEATURE_COLLECTION: &str = "FeatureCollection";
const POINT: &str = "Point";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: String,
    /// `[lon, lat]`
    pub coordinates: [f64; 2],
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Properties {
    pub id: i64,
    pub osm_id: i64,
    pub name: String,
    pub amenity_type: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: String,
    pub geometry: Geometry,
    pub properties: Properties,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<Feature>,
}

impl From<&Amenity> for Feature {
    fn from(amenity: &Amenity) -> Self {
        Feature {
            kind: FEATURE.to_string(),
            geometry: Geometry {
                kind: POINT.to_string(),
                coordinates: [amenity.geometry.lon, amenity.geometry.lat],
            },
            properties: Properties {
                id: amenity.id,
                osm_id: amenity.osm_id,
                name: amenity.name.clone(),
                amenity_type: amenity.amenity_type.clone(),
            },
        }
    }
}

impl<'a> FromIterator<&'a Amenity> for FeatureCollection {
    fn from_iter<I: IntoIterator<Item = &'a Amenity>>(iter: I) -> Self {
        FeatureCollection {
            kind: FEATURE_COLLECTION.to_string(),
            features: iter.into_iter().map(Feature::from).collect(),
        }
    }
}
