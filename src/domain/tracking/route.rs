//! GeoJSON line geometry for a recorded route.

use serde::Serialize;

use super::Waypoint;

#[derive(Serialize)]
struct LineString {
    #[serde(rename = "type")]
    kind: &'static str,
    coordinates: Vec<[f64; 2]>,
}

/// Builds a GeoJSON `LineString` from waypoints already ordered by time.
///
/// Coordinates are `[longitude, latitude]`. No waypoints yields an empty
/// coordinate list.
pub fn line_string_geojson(waypoints: &[Waypoint]) -> String {
    let geometry = LineString {
        kind: "LineString",
        coordinates: waypoints
            .iter()
            .map(|wp| [wp.longitude(), wp.latitude()])
            .collect(),
    };
    // Plain strings and floats cannot fail to serialize.
    serde_json::to_string(&geometry).unwrap_or_else(|_| EMPTY_LINE_STRING.to_string())
}

pub const EMPTY_LINE_STRING: &str = r#"{"type":"LineString","coordinates":[]}"#;
