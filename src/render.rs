//! Map output: a Leaflet HTML page and a GeoJSON feature collection.

use serde::Serialize;
use serde_json::{json, Value};

use crate::model::{Coordinate, Stop, StopKind};
use crate::polyline::Polyline;

const INITIAL_ZOOM: u8 = 7;
const STOP_COLOR: &str = "blue";
const DESTINATION_COLOR: &str = "green";
const ROUTE_COLOR: &str = "gray";
const LEAFLET_VERSION: &str = "1.9.4";

#[derive(Debug, Serialize)]
struct MapData<'a> {
    center: [f64; 2],
    zoom: u8,
    markers: Vec<Marker<'a>>,
    stop_line: Vec<[f64; 2]>,
    route_line: Vec<[f64; 2]>,
    stop_line_color: &'static str,
    route_line_color: &'static str,
}

#[derive(Debug, Serialize)]
struct Marker<'a> {
    position: [f64; 2],
    label: &'a str,
    color: &'static str,
}

fn lat_lon(coordinate: Coordinate) -> [f64; 2] {
    [coordinate.lat, coordinate.lon]
}

fn marker_color(stop: &Stop) -> &'static str {
    if stop.is_destination() {
        DESTINATION_COLOR
    } else {
        STOP_COLOR
    }
}

/// Renders a standalone HTML page with one marker per stop, a line through
/// the stops in order and the full route underneath.
///
/// `center` is usually the geocoded origin.
pub fn render_leaflet_html(center: Coordinate, stops: &[Stop], route: &Polyline) -> String {
    let data = MapData {
        center: lat_lon(center),
        zoom: INITIAL_ZOOM,
        markers: stops
            .iter()
            .map(|stop| Marker {
                position: lat_lon(stop.coordinate),
                label: &stop.label,
                color: marker_color(stop),
            })
            .collect(),
        stop_line: stops.iter().map(|stop| lat_lon(stop.coordinate)).collect(),
        route_line: route.points().iter().copied().map(lat_lon).collect(),
        stop_line_color: STOP_COLOR,
        route_line_color: ROUTE_COLOR,
    };
    // Only `</` can end the inline script early.
    let payload = serde_json::to_string(&data)
        .unwrap_or_else(|_| "null".to_string())
        .replace("</", "<\\/");

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>EV Trip Plan</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@{version}/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@{version}/dist/leaflet.js"></script>
<style>html, body, #map {{ height: 100%; margin: 0; }}</style>
</head>
<body>
<div id="map"></div>
<script>
const trip = {payload};
const map = L.map("map").setView(trip.center, trip.zoom);
L.tileLayer("https://{{s}}.tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png", {{
  attribution: "&copy; OpenStreetMap contributors"
}}).addTo(map);
if (trip.route_line.length > 1) {{
  L.polyline(trip.route_line, {{ color: trip.route_line_color, weight: 2, opacity: 0.5 }}).addTo(map);
}}
for (const marker of trip.markers) {{
  L.circleMarker(marker.position, {{ color: marker.color, fillColor: marker.color, fillOpacity: 0.9, radius: 8 }})
    .bindPopup(document.createTextNode(marker.label), {{ maxWidth: 300 }})
    .addTo(map);
}}
L.polyline(trip.stop_line, {{ color: trip.stop_line_color, weight: 3 }}).addTo(map);
</script>
</body>
</html>
"#,
        version = LEAFLET_VERSION,
        payload = payload,
    )
}

fn lon_lat(coordinate: Coordinate) -> [f64; 2] {
    [coordinate.lon, coordinate.lat]
}

fn kind_name(kind: StopKind) -> &'static str {
    match kind {
        StopKind::Start => "start",
        StopKind::Charger => "charger",
        StopKind::Destination => "destination",
    }
}

/// Builds a GeoJSON `FeatureCollection` with the route, the stop line and
/// one point per stop. GeoJSON positions are `[lon, lat]`.
pub fn render_geojson(stops: &[Stop], route: &Polyline) -> Value {
    let mut features = Vec::with_capacity(stops.len() + 2);

    features.push(json!({
        "type": "Feature",
        "geometry": {
            "type": "LineString",
            "coordinates": route.points().iter().copied().map(lon_lat).collect::<Vec<_>>(),
        },
        "properties": { "role": "route" },
    }));
    features.push(json!({
        "type": "Feature",
        "geometry": {
            "type": "LineString",
            "coordinates": stops.iter().map(|s| lon_lat(s.coordinate)).collect::<Vec<_>>(),
        },
        "properties": { "role": "stops" },
    }));

    for (order, stop) in stops.iter().enumerate() {
        features.push(json!({
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": lon_lat(stop.coordinate) },
            "properties": {
                "order": order + 1,
                "label": stop.label,
                "kind": kind_name(stop.kind),
                "distance_km": stop.distance_km,
                "marker_color": marker_color(stop),
            },
        }));
    }

    json!({ "type": "FeatureCollection", "features": features })
}
