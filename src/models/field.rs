// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Field model with its polygonal boundary and cached derived area.

use crate::geometry::{self, Coordinate};
use serde::{Deserialize, Serialize};

/// A work field with its boundary polygon.
///
/// The cached area values are derived from the boundary and recomputed
/// whenever the boundary is edited; they are never mutated independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    /// Field ID (also used as document ID)
    pub field_id: String,
    /// Display name (e.g. "North Orchard")
    pub name: String,
    /// Supervisor who created the field
    pub supervisor_id: Option<String>,
    /// Boundary vertices; the ring-closing vertex is implicit
    pub boundary: Vec<Coordinate>,
    /// Cached boundary area in square meters (0 for degenerate boundaries)
    pub area_square_meters: f64,
    /// Cached boundary area in acres, for display
    pub area_acres: f64,
    /// When this field was created (ISO 8601)
    pub created_at: String,
}

impl Field {
    pub fn new(
        field_id: String,
        name: String,
        supervisor_id: Option<String>,
        boundary: Vec<Coordinate>,
        created_at: String,
    ) -> Self {
        let mut field = Self {
            field_id,
            name,
            supervisor_id,
            boundary: Vec::new(),
            area_square_meters: 0.0,
            area_acres: 0.0,
            created_at,
        };
        field.set_boundary(boundary);
        field
    }

    /// Replace the boundary and recompute the cached area.
    pub fn set_boundary(&mut self, boundary: Vec<Coordinate>) {
        self.boundary = boundary;
        self.area_square_meters = geometry::polygon_area_square_meters(&self.boundary);
        self.area_acres = geometry::square_meters_to_acres(self.area_square_meters);
    }

    /// Whether a location falls inside the field boundary.
    ///
    /// Degenerate boundaries (fewer than 3 vertices) contain nothing.
    pub fn contains(&self, location: Coordinate) -> bool {
        geometry::is_point_in_polygon(location, &self.boundary)
    }
}
