//! Map draw-call sink (spec §4.7/§6 map output).
//!
//! Collects the same draw-call sequence the original tool handed to folium
//! — a delivery marker per stop, a colored polyline plus arrow decoration
//! per route segment, and an arrival-time marker per delivery — and renders
//! it as a single self-contained Leaflet HTML document (no server, no
//! external state) since there is no Rust folium equivalent to call into.

use std::path::Path;

use serde::Serialize;

use crate::error::RoutingResult;
use crate::geo::Coordinate;

/// Red, Green, Blue, Orange — the same four-color cycle the original used
/// for `vehicle_id % len(vehicle_colors)`.
const VEHICLE_COLORS: [&str; 4] = ["#FF0000", "#00FF00", "#0000FF", "#ff8000"];

pub fn color_for_vehicle(vehicle_id: usize) -> &'static str {
    VEHICLE_COLORS[vehicle_id % VEHICLE_COLORS.len()]
}

#[derive(Debug, Clone, Serialize)]
struct DeliveryMarker {
    lat: f64,
    lon: f64,
    tooltip: String,
}

#[derive(Debug, Clone, Serialize)]
struct RouteSegment {
    vehicle_id: usize,
    color: &'static str,
    path: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, Serialize)]
struct ArrivalMarker {
    lat: f64,
    lon: f64,
    color: &'static str,
    popup: String,
}

/// Accumulates one run's worth of map draw calls before rendering.
#[derive(Debug, Default)]
pub struct MapSink {
    depot: Option<[f64; 2]>,
    deliveries: Vec<DeliveryMarker>,
    segments: Vec<RouteSegment>,
    arrivals: Vec<ArrivalMarker>,
}

impl MapSink {
    pub fn new(depot: Coordinate) -> Self {
        Self {
            depot: Some([depot.lat, depot.lon]),
            ..Default::default()
        }
    }

    pub fn add_delivery_marker(&mut self, coord: Coordinate, tooltip: String) {
        self.deliveries.push(DeliveryMarker {
            lat: coord.lat,
            lon: coord.lon,
            tooltip,
        });
    }

    /// Adds a route polyline for `vehicle_id`, colored from the fixed
    /// four-entry palette.
    pub fn add_segment(&mut self, vehicle_id: usize, path: &[Coordinate]) {
        self.segments.push(RouteSegment {
            vehicle_id,
            color: color_for_vehicle(vehicle_id),
            path: path.iter().map(|c| [c.lat, c.lon]).collect(),
        });
    }

    pub fn add_arrival_marker(&mut self, vehicle_id: usize, coord: Coordinate, arrival_hhmm: String) {
        self.arrivals.push(ArrivalMarker {
            lat: coord.lat,
            lon: coord.lon,
            color: color_for_vehicle(vehicle_id),
            popup: format!("Arrival Time: {arrival_hhmm}"),
        });
    }

    pub fn render(&self) -> String {
        let center = self.depot.unwrap_or([0.0, 0.0]);
        let deliveries_json = serde_json::to_string(&self.deliveries).unwrap_or_default();
        let segments_json = serde_json::to_string(&self.segments).unwrap_or_default();
        let arrivals_json = serde_json::to_string(&self.arrivals).unwrap_or_default();

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8" />
  <title>Delivery routes</title>
  <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" />
  <style>
    html, body, #map {{ height: 100%; margin: 0; }}
  </style>
</head>
<body>
  <div id="map"></div>
  <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
  <script src="https://unpkg.com/leaflet-polylinedecorator@1.6.0/dist/leaflet.polylineDecorator.js"></script>
  <script>
    const map = L.map('map').setView([{lat}, {lon}], 12);
    L.tileLayer('https://{{s}}.tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png', {{
      attribution: '&copy; OpenStreetMap contributors'
    }}).addTo(map);

    const deliveries = {deliveries_json};
    for (const d of deliveries) {{
      L.marker([d.lat, d.lon]).bindTooltip(d.tooltip).addTo(map);
    }}

    const segments = {segments_json};
    for (const s of segments) {{
      const line = L.polyline(s.path, {{ color: s.color, weight: 5, opacity: 0.7 }}).addTo(map);
      L.polylineDecorator(line, {{
        patterns: [{{ offset: '50%', repeat: 0, symbol: L.Symbol.arrowHead({{
          pixelSize: 12, polygon: false, pathOptions: {{ color: s.color, fillOpacity: 1, weight: 2 }}
        }}) }}]
      }}).addTo(map);
    }}

    const arrivals = {arrivals_json};
    for (const a of arrivals) {{
      L.marker([a.lat, a.lon], {{
        icon: L.divIcon({{ className: 'arrival-flag', html: '&#9873;', iconSize: [16, 16] }})
      }}).bindPopup(a.popup).addTo(map);
    }}
  </script>
</body>
</html>
"#,
            lat = center[0],
            lon = center[1],
            deliveries_json = deliveries_json,
            segments_json = segments_json,
            arrivals_json = arrivals_json,
        )
    }

    pub async fn write_to_file(&self, path: &Path) -> RoutingResult<()> {
        tokio::fs::write(path, self.render()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vehicle_colors_cycle_through_four_entries() {
        assert_eq!(color_for_vehicle(0), "#FF0000");
        assert_eq!(color_for_vehicle(3), "#ff8000");
        assert_eq!(color_for_vehicle(4), "#FF0000");
    }

    #[test]
    fn render_embeds_all_draw_calls() {
        let mut sink = MapSink::new(Coordinate::new(49.44, 1.10));
        sink.add_delivery_marker(Coordinate::new(49.45, 1.11), "Acme (Tracking ID: PKG0001)".to_string());
        sink.add_segment(0, &[Coordinate::new(49.44, 1.10), Coordinate::new(49.45, 1.11)]);
        sink.add_arrival_marker(0, Coordinate::new(49.45, 1.11), "08:17".to_string());

        let html = sink.render();
        assert!(html.contains("PKG0001"));
        assert!(html.contains("#FF0000"));
        assert!(html.contains("Arrival Time: 08:17"));
        assert!(html.contains("leaflet.js"));
    }

    #[test]
    fn render_with_no_draw_calls_is_still_valid_document() {
        let sink = MapSink::new(Coordinate::new(0.0, 0.0));
        let html = sink.render();
        assert!(html.starts_with("<!DOCTYPE html>"));
    }

    #[tokio::test]
    async fn write_to_file_persists_the_rendered_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.html");

        let mut sink = MapSink::new(Coordinate::new(49.44, 1.10));
        sink.add_delivery_marker(Coordinate::new(49.45, 1.11), "Acme (Tracking ID: PKG0001)".to_string());

        sink.write_to_file(&path).await.unwrap();

        let written = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(written, sink.render());
        assert!(written.contains("PKG0001"));
    }
}
