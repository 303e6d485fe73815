// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Boundary loading smoke tests against the shipped GeoJSON fixture.

use fieldtrace::db::FieldStore;
use fieldtrace::geometry::Coordinate;
use fieldtrace::services::{BoundaryError, BoundaryService};

/// Load the committed field boundaries for testing.
fn load_test_boundaries() -> BoundaryService {
    BoundaryService::load_from_file("data/field_boundaries.geojson")
        .expect("Failed to load field boundaries - is data/ committed?")
}

#[test]
fn test_boundary_service_loads() {
    let service = load_test_boundaries();
    assert_eq!(service.fields().len(), 3);

    let ids: Vec<&str> = service.fields().iter().map(|f| f.field_id.as_str()).collect();
    assert!(ids.contains(&"north-orchard"));
    assert!(ids.contains(&"river-strip"));
    assert!(ids.contains(&"south-block"));
}

#[test]
fn test_closing_vertex_dropped() {
    let service = load_test_boundaries();
    let field = service.field("north-orchard").unwrap();

    // Fixture ring has 5 positions with an explicit closing vertex
    assert_eq!(field.boundary.len(), 4);
    assert_ne!(field.boundary.first(), field.boundary.last());
}

#[test]
fn test_loaded_fields_have_cached_area() {
    let service = load_test_boundaries();
    for field in service.fields() {
        assert!(
            field.area_square_meters > 0.0,
            "field {} should have nonzero area",
            field.field_id
        );
        assert!(field.area_acres > 0.0);
    }
}

#[test]
fn test_north_orchard_area_plausible() {
    let service = load_test_boundaries();
    let field = service.field("north-orchard").unwrap();

    // ~356m x ~355m rectangle: expect roughly 12.6 hectares
    assert!(
        field.area_square_meters > 100_000.0 && field.area_square_meters < 160_000.0,
        "got {}",
        field.area_square_meters
    );
}

#[test]
fn test_fields_containing() {
    let service = load_test_boundaries();

    let inside_orchard = Coordinate::new(36.6016, -121.5980);
    assert_eq!(service.fields_containing(inside_orchard), vec!["north-orchard"]);

    let nowhere = Coordinate::new(40.75, -73.98);
    assert!(service.fields_containing(nowhere).is_empty());
}

#[tokio::test]
async fn test_field_store_lookup() {
    let service = load_test_boundaries();

    let boundary = service.field_boundary("river-strip").await.unwrap();
    assert_eq!(boundary.map(|b| b.len()), Some(4));

    let missing = service.field_boundary("no-such-field").await.unwrap();
    assert!(missing.is_none());
}

#[test]
fn test_unsupported_geometry_rejected() {
    let json = r#"{
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": { "field_id": "pt", "name": "Point Field" },
            "geometry": { "type": "Point", "coordinates": [-121.6, 36.6] }
        }]
    }"#;

    let result = BoundaryService::load_from_json(json);
    assert!(matches!(result, Err(BoundaryError::UnsupportedGeometry)));
}

#[test]
fn test_invalid_json_rejected() {
    assert!(matches!(
        BoundaryService::load_from_json("not geojson"),
        Err(BoundaryError::ParseError(_))
    ));
}

#[test]
fn test_missing_file_is_io_error() {
    assert!(matches!(
        BoundaryService::load_from_file("data/does_not_exist.geojson"),
        Err(BoundaryError::IoError(_))
    ));
}
