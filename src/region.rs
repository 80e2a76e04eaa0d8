//! Geo-region resolver (spec §4.1).
//!
//! Issues a single Overpass query for `place ∈ {city, town, village}` nodes
//! within `radius_km` of a center coordinate, then filters by exact
//! great-circle distance and extracts names.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::RoutingResult;
use crate::geo::{haversine_distance_m, Coordinate};
use crate::overpass;

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    lat: Option<f64>,
    lon: Option<f64>,
    tags: Option<OverpassTags>,
}

#[derive(Debug, Deserialize)]
struct OverpassTags {
    name: Option<String>,
}

/// Returns populated-place names within `radius_km` of `center`.
///
/// Empty (not an error) when the query succeeds but nothing matches or
/// matching elements lack a `name` tag. Network/parse/HTTP failures surface
/// as `RegionLookupFailed`; the caller (`graph::load_graph`) owns the
/// fallback policy.
pub async fn nearby_places(center: Coordinate, radius_km: f64) -> RoutingResult<Vec<String>> {
    let radius_m = radius_km * 1000.0;
    let query = format!(
        "[out:json][timeout:{timeout}];\n\
         (\n\
         \x20 node[\"place\"~\"^(city|town|village)$\"](around:{radius_m},{lat},{lon});\n\
         );\n\
         out body;",
        timeout = REQUEST_TIMEOUT_SECS,
        radius_m = radius_m,
        lat = center.lat,
        lon = center.lon,
    );

    debug!(%query, "sending overpass region query");

    let raw = overpass::query_json(&query).await?;
    let body: OverpassResponse = serde_json::from_value(raw)
        .map_err(|e| crate::error::RoutingError::RegionLookupFailed(e.to_string()))?;

    let mut names = Vec::new();
    for elem in body.elements {
        let (Some(lat), Some(lon)) = (elem.lat, elem.lon) else {
            continue;
        };
        let Some(name) = elem.tags.and_then(|t| t.name) else {
            continue;
        };
        let place = Coordinate::new(lat, lon);
        if haversine_distance_m(center, place) / 1000.0 <= radius_km {
            names.push(name);
        }
    }

    if names.is_empty() {
        warn!("no named places found within radius, caller will fall back to bounding box");
    }

    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_distance_filter_excludes_outliers() {
        let center = Coordinate::new(49.44, 1.10);
        let near = Coordinate::new(49.441, 1.101);
        let far = Coordinate::new(50.0, 2.0);
        assert!(haversine_distance_m(center, near) / 1000.0 <= 10.0);
        assert!(haversine_distance_m(center, far) / 1000.0 > 10.0);
    }
}
