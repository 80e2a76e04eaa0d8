//! Road-graph provider & edge annotator (spec §4.2).
//!
//! Fetches a drivable road graph for a region via Overpass, preferring the
//! named-places union; falls back to a bounding box centered on `center`
//! when the region resolver fails or returns nothing. Every edge is
//! annotated with `speed_kmh` and `travel_time_s` before the graph is
//! handed to the rest of the pipeline.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{RoutingError, RoutingResult};
use crate::geo::Coordinate;
use crate::overpass;
use crate::region;

const DRIVABLE_HIGHWAYS: &str =
    "motorway|trunk|primary|secondary|tertiary|residential|unclassified|service|living_street";

/// Half-width, in metres, of the fallback bounding-box graph.
const FALLBACK_BBOX_HALF_M: f64 = 5000.0;

#[derive(Debug, Clone)]
pub struct RoadNode {
    pub osm_id: i64,
    pub coord: Coordinate,
}

#[derive(Debug, Clone)]
pub struct RoadEdge {
    pub length_m: f64,
    pub speed_kmh: f64,
    pub travel_time_s: f64,
    pub highway_class: String,
    pub maxspeed_raw: Option<String>,
}

pub struct RoadGraph {
    pub graph: DiGraph<RoadNode, RoadEdge>,
    node_by_osm_id: HashMap<i64, NodeIndex>,
}

impl RoadGraph {
    fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_by_osm_id: HashMap::new(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn get_or_create_node(&mut self, osm_id: i64, coord: Coordinate) -> NodeIndex {
        if let Some(&idx) = self.node_by_osm_id.get(&osm_id) {
            return idx;
        }
        let idx = self.graph.add_node(RoadNode { osm_id, coord });
        self.node_by_osm_id.insert(osm_id, idx);
        idx
    }

    /// Acquires a graph for `center`: named-places union first, bounding
    /// box on any resolver/fetch failure. Fatal `GraphUnavailable` only if
    /// both paths fail.
    pub async fn load_graph(center: Coordinate, radius_km: f64) -> RoutingResult<Self> {
        match region::nearby_places(center, radius_km).await {
            Ok(places) if !places.is_empty() => {
                info!(count = places.len(), "resolved named places, fetching place-based graph");
                match Self::fetch_by_places(&places).await {
                    Ok(graph) => return Ok(graph),
                    Err(e) => {
                        warn!(error = %e, "place-based graph fetch failed, falling back to bounding box");
                    }
                }
            }
            Ok(_) => {
                info!("region resolver returned no places, falling back to bounding box");
            }
            Err(e) => {
                warn!(error = %e, "region lookup failed, falling back to bounding box");
            }
        }

        Self::fetch_by_bbox(center, FALLBACK_BBOX_HALF_M)
            .await
            .map_err(|e| RoutingError::GraphUnavailable(e.to_string()))
    }

    async fn fetch_by_places(names: &[String]) -> RoutingResult<Self> {
        let mut areas = String::new();
        let mut way_clauses = String::new();
        for (i, name) in names.iter().enumerate() {
            let escaped = name.replace('\\', "\\\\").replace('"', "\\\"");
            areas.push_str(&format!("area[\"name\"=\"{escaped}\"]->.a{i};\n"));
            way_clauses.push_str(&format!(
                "  way[\"highway\"~\"^({DRIVABLE_HIGHWAYS})$\"](area.a{i});\n"
            ));
        }
        let query = format!(
            "[out:json][timeout:180];\n{areas}(\n{way_clauses});\n(._;>;);\nout body;"
        );
        let raw = overpass::query_json(&query).await?;
        let osm: OverpassWayResponse = serde_json::from_value(raw)
            .map_err(|e| RoutingError::GraphUnavailable(e.to_string()))?;
        Self::build_from_osm(&osm)
    }

    async fn fetch_by_bbox(center: Coordinate, half_m: f64) -> RoutingResult<Self> {
        let dlat = half_m / 111_320.0;
        let dlon = half_m / (111_320.0 * center.lat.to_radians().cos().max(0.01));
        let (south, west, north, east) = (
            center.lat - dlat,
            center.lon - dlon,
            center.lat + dlat,
            center.lon + dlon,
        );
        let query = format!(
            "[out:json][timeout:180];\n\
             (\n\
             \x20 way[\"highway\"~\"^({DRIVABLE_HIGHWAYS})$\"]({south},{west},{north},{east});\n\
             );\n\
             (._;>;);\n\
             out body;"
        );
        let raw = overpass::query_json(&query).await?;
        let osm: OverpassWayResponse = serde_json::from_value(raw)
            .map_err(|e| RoutingError::GraphUnavailable(e.to_string()))?;
        Self::build_from_osm(&osm)
    }

    fn build_from_osm(osm: &OverpassWayResponse) -> RoutingResult<Self> {
        let mut graph = Self::new();

        let mut coords: HashMap<i64, Coordinate> = HashMap::new();
        for elem in &osm.elements {
            if elem.elem_type == "node" {
                if let (Some(lat), Some(lon)) = (elem.lat, elem.lon) {
                    coords.insert(elem.id, Coordinate::new(lat, lon));
                }
            }
        }

        let mut way_count = 0usize;
        let mut skipped_edges = 0usize;
        for elem in &osm.elements {
            if elem.elem_type != "way" {
                continue;
            }
            let Some(ref node_ids) = elem.nodes else {
                continue;
            };
            let highway = elem
                .tags
                .as_ref()
                .and_then(|t| t.highway.as_ref())
                .map(|v| v.first())
                .unwrap_or("residential")
                .to_string();
            let maxspeed_raw = elem
                .tags
                .as_ref()
                .and_then(|t| t.maxspeed.as_ref())
                .map(|v| v.first().to_string());
            let oneway = elem
                .tags
                .as_ref()
                .and_then(|t| t.oneway.as_deref())
                .unwrap_or("");
            let is_oneway = oneway == "yes" || oneway == "1";

            let speed_kmh = parse_speed(maxspeed_raw.as_deref(), &highway);
            let travel_time_per_m = 1.0 / (speed_kmh * 1000.0 / 3600.0);

            for pair in node_ids.windows(2) {
                let (Some(&a), Some(&b)) = (coords.get(&pair[0]), coords.get(&pair[1])) else {
                    skipped_edges += 1;
                    continue;
                };
                let idx_a = graph.get_or_create_node(pair[0], a);
                let idx_b = graph.get_or_create_node(pair[1], b);
                let length_m = crate::geo::haversine_distance_m(a, b);
                let edge = RoadEdge {
                    length_m,
                    speed_kmh,
                    travel_time_s: length_m * travel_time_per_m,
                    highway_class: highway.clone(),
                    maxspeed_raw: maxspeed_raw.clone(),
                };
                graph.graph.add_edge(idx_a, idx_b, edge.clone());
                if !is_oneway {
                    graph.graph.add_edge(idx_b, idx_a, edge);
                }
            }
            way_count += 1;
        }

        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            ways = way_count,
            skipped_edges,
            "built road graph from osm data"
        );

        if graph.node_count() == 0 {
            return Err(RoutingError::GraphUnavailable(
                "osm response contained no drivable ways".to_string(),
            ));
        }

        Ok(graph)
    }
}

/// Highway-class tag overrides a parsed numeric maxspeed; this is the
/// observed source behavior and is preserved rather than "fixed" (see
/// DESIGN.md).
fn parse_speed(maxspeed_raw: Option<&str>, highway_raw: &str) -> f64 {
    let Some(raw) = maxspeed_raw else {
        return 50.0;
    };
    let highway_lc = highway_raw.to_lowercase();
    if highway_lc.contains("motorway") {
        130.0
    } else if highway_lc.contains("trunk") {
        110.0
    } else if highway_lc.contains("primary") {
        90.0
    } else if highway_lc.contains("residential") {
        30.0
    } else {
        raw.trim()
            .parse::<f64>()
            .map(|v| v.min(130.0))
            .unwrap_or(50.0)
    }
}

#[derive(Debug, Deserialize)]
struct OverpassWayResponse {
    elements: Vec<OverpassWayElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassWayElement {
    #[serde(rename = "type")]
    elem_type: String,
    id: i64,
    lat: Option<f64>,
    lon: Option<f64>,
    nodes: Option<Vec<i64>>,
    tags: Option<OsmTags>,
}

#[derive(Debug, Deserialize)]
struct OsmTags {
    highway: Option<TagValue>,
    oneway: Option<String>,
    maxspeed: Option<TagValue>,
}

/// OSM tag values arrive as a scalar string or, for some extractors, a list
/// of strings; either way only the first element matters here.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TagValue {
    Single(String),
    Multiple(Vec<String>),
}

impl TagValue {
    fn first(&self) -> &str {
        match self {
            TagValue::Single(s) => s.as_str(),
            TagValue::Multiple(v) => v.first().map(String::as_str).unwrap_or(""),
        }
    }
}
