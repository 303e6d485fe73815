// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Field-boundary loading and lookup service.

use crate::db::FieldStore;
use crate::error::Result;
use crate::geometry::Coordinate;
use crate::models::Field;
use std::fs;
use std::path::Path;

/// Service for loading field boundaries and answering containment queries.
#[derive(Default, Clone)]
pub struct BoundaryService {
    fields: Vec<Field>,
}

impl BoundaryService {
    /// Load field boundaries from a GeoJSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> std::result::Result<Self, BoundaryError> {
        let json_data =
            fs::read_to_string(path.as_ref()).map_err(|e| BoundaryError::IoError(e.to_string()))?;
        Self::load_from_json(&json_data)
    }

    /// Load field boundaries from a GeoJSON string.
    ///
    /// Expects a FeatureCollection of Polygon features with `field_id` and
    /// `name` properties. Only the exterior ring is used; holes are ignored.
    pub fn load_from_json(json_data: &str) -> std::result::Result<Self, BoundaryError> {
        let geojson: geojson::GeoJson = json_data
            .parse()
            .map_err(|e: geojson::Error| BoundaryError::ParseError(e.to_string()))?;

        let mut fields = Vec::new();

        if let geojson::GeoJson::FeatureCollection(collection) = geojson {
            for feature in collection.features {
                let name = feature
                    .property("name")
                    .and_then(|v| v.as_str())
                    .unwrap_or("Unknown")
                    .to_string();

                let field_id = feature
                    .property("field_id")
                    .and_then(|v| v.as_str())
                    .unwrap_or(&name)
                    .to_string();

                let supervisor_id = feature
                    .property("supervisor_id")
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string());

                let created_at = feature
                    .property("created_at")
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| crate::time_utils::format_utc_rfc3339(chrono::Utc::now()));

                if let Some(geom) = feature.geometry {
                    let boundary = Self::convert_geometry(geom.value)?;
                    fields.push(Field::new(field_id, name, supervisor_id, boundary, created_at));
                }
            }
        }

        tracing::info!(count = fields.len(), "Loaded field boundaries");
        Ok(Self { fields })
    }

    /// Convert GeoJSON geometry to a boundary ring.
    fn convert_geometry(
        value: geojson::Value,
    ) -> std::result::Result<Vec<Coordinate>, BoundaryError> {
        let geojson::Value::Polygon(rings) = value else {
            return Err(BoundaryError::UnsupportedGeometry);
        };

        let exterior = rings.first().ok_or(BoundaryError::UnsupportedGeometry)?;

        // GeoJSON positions are [lon, lat] with an explicit closing vertex;
        // our rings keep the closing vertex implicit.
        let mut boundary = Vec::with_capacity(exterior.len());
        for position in exterior {
            if position.len() < 2 {
                return Err(BoundaryError::UnsupportedGeometry);
            }
            boundary.push(Coordinate::new(position[1], position[0]));
        }
        if boundary.len() > 1 && boundary.first() == boundary.last() {
            boundary.pop();
        }

        Ok(boundary)
    }

    /// Get the list of fields.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Look up a field by id.
    pub fn field(&self, field_id: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.field_id == field_id)
    }

    /// Find all fields whose boundary contains a given location.
    pub fn fields_containing(&self, location: Coordinate) -> Vec<String> {
        self.fields
            .iter()
            .filter(|f| f.contains(location))
            .map(|f| f.field_id.clone())
            .collect()
    }
}

impl FieldStore for BoundaryService {
    async fn field_boundary(&self, field_id: &str) -> Result<Option<Vec<Coordinate>>> {
        Ok(self.field(field_id).map(|f| f.boundary.clone()))
    }
}

/// Errors from boundary operations.
#[derive(Debug, thiserror::Error)]
pub enum BoundaryError {
    #[error("Failed to read file: {0}")]
    IoError(String),

    #[error("Failed to parse GeoJSON: {0}")]
    ParseError(String),

    #[error("Unsupported geometry type (expected Polygon)")]
    UnsupportedGeometry,
}
