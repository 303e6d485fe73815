// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Geometry over latitude/longitude coordinates.
//!
//! Pure functions, no I/O. The area computation is a great-circle-aware
//! approximation that is valid for polygons small relative to Earth's radius
//! and not crossing the antimeridian. Degenerate input (fewer than 3 vertices)
//! never panics: area is 0 and containment is false, so geofencing degrades to
//! "cannot verify" rather than crashing the reconciliation path.

use serde::{Deserialize, Serialize};

/// Earth mean radius used by the haversine distance, in meters.
const DISTANCE_EARTH_RADIUS_M: f64 = 6_371e3;

/// Earth mean radius used by the area approximation, in meters.
///
/// Kept as a separate constant from [`DISTANCE_EARTH_RADIUS_M`]; the two
/// values were chosen independently upstream, and unifying them would change
/// numeric outputs.
const AREA_EARTH_RADIUS_M: f64 = 6_371_000.0;

/// One acre in square meters.
const SQUARE_METERS_PER_ACRE: f64 = 4046.86;

/// A WGS84 latitude/longitude pair, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Approximate area of a polygon in square meters.
///
/// The ring-closing vertex is implicit: the last vertex connects back to the
/// first. Returns 0.0 for fewer than 3 vertices. Self-intersecting polygons
/// produce a numeric but not necessarily meaningful result.
pub fn polygon_area_square_meters(polygon: &[Coordinate]) -> f64 {
    if polygon.len() < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    for i in 0..polygon.len() {
        let j = (i + 1) % polygon.len();
        let lat1 = polygon[i].latitude.to_radians();
        let lat2 = polygon[j].latitude.to_radians();
        let lon1 = polygon[i].longitude.to_radians();
        let lon2 = polygon[j].longitude.to_radians();

        area += (lon2 - lon1) * (2.0 + lat1.sin() + lat2.sin());
    }

    (area * AREA_EARTH_RADIUS_M * AREA_EARTH_RADIUS_M / 2.0).abs()
}

/// Ray-casting containment test.
///
/// Latitude is treated as the "x" axis and longitude as "y" for the crossing
/// computation. Returns false for polygons with fewer than 3 vertices. Points
/// exactly on the boundary have implementation-defined inclusion (standard
/// ray-casting ambiguity).
pub fn is_point_in_polygon(point: Coordinate, polygon: &[Coordinate]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let x = point.latitude;
    let y = point.longitude;
    let mut inside = false;

    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let xi = polygon[i].latitude;
        let yi = polygon[i].longitude;
        let xj = polygon[j].latitude;
        let yj = polygon[j].longitude;

        let crosses = (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi;
        if crosses {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Haversine great-circle distance between two coordinates, in meters.
pub fn distance_meters(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let delta_phi = (b.latitude - a.latitude).to_radians();
    let delta_lambda = (b.longitude - a.longitude).to_radians();

    let h = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    DISTANCE_EARTH_RADIUS_M * c
}

/// Convert square meters to acres. Accepts any real input.
pub fn square_meters_to_acres(sq_meters: f64) -> f64 {
    sq_meters / SQUARE_METERS_PER_ACRE
}
