// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

// Correctness
#![deny(clippy::indexing_slicing)]
#![deny(clippy::string_slice)]
#![deny(clippy::cast_possible_wrap)]
#![deny(clippy::undocumented_unsafe_blocks)]
// Panicking code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::unimplemented)]
#![deny(clippy::todo)]
// Debug code that shouldn't be in production
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]

pub mod bbox;
pub mod cli;
pub mod config;
mod errors;
pub mod feature;
pub mod model;
pub mod query;
pub mod server;
pub mod store;

// Re-export the public API
pub use bbox::BBox;
pub use errors::{Error, Result};
pub use feature::{Feature, FeatureCollection};
pub use model::{Amenity, NewAmenity, Point, SRID_WGS84};
pub use query::Filter;
pub use store::Store;
