//! Core geographic and delivery types (spec §3).

use serde::{Deserialize, Serialize};

/// A finite (lat, lon) pair. lat ∈ [-90, 90], lon ∈ [-180, 180].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Haversine distance between two points in meters.
pub fn haversine_distance_m(a: Coordinate, b: Coordinate) -> f64 {
    const EARTH_RADIUS_M: f64 = 6_371_000.0;

    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let sin_dlat = (dlat / 2.0).sin();
    let sin_dlon = (dlon / 2.0).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// A delivery: an opaque package label plus a destination coordinate.
///
/// `id` is the stable index assigned at load time (row order in the
/// spreadsheet); the depot always occupies index 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delivery {
    pub id: usize,
    pub label: String,
    pub coord: Coordinate,
}

impl Delivery {
    /// `"PKG{NNNN}"`, matching the tracking-id scheme in spec §6.
    pub fn tracking_id(&self) -> String {
        format!("PKG{:04}", self.id)
    }

    pub fn tooltip(&self) -> String {
        format!("{} (Tracking ID: {})", self.label, self.tracking_id())
    }
}

/// The fixed origin/terminus of every vehicle tour. Always stop index 0.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Depot {
    pub coord: Coordinate,
}

/// A delivery or the depot, snapped to a road-graph node.
#[derive(Debug, Clone, Copy)]
pub struct Stop {
    /// Index into the combined `[depot, delivery_1, ..., delivery_n]` list.
    pub stop_idx: usize,
    pub coord: Coordinate,
    pub node: petgraph::graph::NodeIndex,
}
