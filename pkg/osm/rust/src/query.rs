// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::borrow::Cow;

use crate::bbox::BBox;
use crate::errors::Result;
use crate::model::Amenity;

pub const PARAM_NAME: &str = "name";
pub const PARAM_AMENITY_TYPE: &str = "amenity_type";
pub const PARAM_IN_BBOX: &str = "in_bbox";

/// Narrowing applied to every read. All present fields must match.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Filter {
    pub name: Option<String>,
    pub amenity_type: Option<String>,
    pub bbox: Option<BBox>,
}

impl Filter {
    /// Build a filter from a raw query string (without the leading `?`).
    ///
    /// Empty values disable their filter, unknown keys are ignored and the
    /// last occurrence of a repeated key wins.
    pub fn from_query(query: Option<&str>) -> Result<Self> {
        let mut name = None;
        let mut amenity_type = None;
        let mut in_bbox = None;

        for (key, value) in query.map(parse_pairs).unwrap_or_default() {
            let slot = match key.as_str() {
                PARAM_NAME => &mut name,
                PARAM_AMENITY_TYPE => &mut amenity_type,
                PARAM_IN_BBOX => &mut in_bbox,
                _ => continue,
            };
            *slot = Some(value);
        }

        let bbox = match in_bbox.filter(|v| !v.is_empty()) {
            Some(value) => Some(value.parse::<BBox>()?),
            None => None,
        };

        Ok(Filter {
            name: name.filter(|v| !v.is_empty()),
            amenity_type: amenity_type.filter(|v| !v.is_empty()),
            bbox,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.amenity_type.is_none() && self.bbox.is_none()
    }

    pub fn matches(&self, amenity: &Amenity) -> bool {
        self.name.as_ref().is_none_or(|n| *n == amenity.name)
            && self
                .amenity_type
                .as_ref()
                .is_none_or(|t| *t == amenity.amenity_type)
            && self.bbox.is_none_or(|b| b.contains(&amenity.geometry))
    }
}

/// Split an `application/x-www-form-urlencoded` string into decoded pairs.
fn parse_pairs(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    let spaced: Cow<str> = if raw.contains('+') {
        Cow::Owned(raw.replace('+', " "))
    } else {
        Cow::Borrowed(raw)
    };
    let bytes = urlencoding::decode_binary(spaced.as_bytes());
    String::from_utf8_lossy(&bytes).into_owned()
}
