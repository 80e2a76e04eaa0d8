//! CLI configuration for a single pipeline run.

use std::path::PathBuf;

use clap::Parser;

use crate::geo::Coordinate;

#[derive(Debug, Parser)]
#[command(name = "depot-router", about = "Plan multi-vehicle delivery tours over a real road network")]
pub struct RunConfig {
    /// Path to the delivery spreadsheet (columns: Package ID, Address, lat, long).
    #[arg(long)]
    pub deliveries: PathBuf,

    /// Depot latitude.
    #[arg(long, allow_hyphen_values = true)]
    pub depot_lat: f64,

    /// Depot longitude.
    #[arg(long, allow_hyphen_values = true)]
    pub depot_lon: f64,

    /// Center latitude for graph/region acquisition.
    #[arg(long, allow_hyphen_values = true)]
    pub center_lat: f64,

    /// Center longitude for graph/region acquisition.
    #[arg(long, allow_hyphen_values = true)]
    pub center_lon: f64,

    /// Search radius in kilometres for region resolution and graph fetch.
    #[arg(long, default_value_t = 10.0)]
    pub radius_km: f64,

    /// Fleet size (number of vehicles).
    #[arg(long)]
    pub fleet_size: usize,

    /// Output path for the interactive HTML map.
    #[arg(long, default_value = "deliveries_map.html")]
    pub map_output: PathBuf,

    /// Seed for the fleet-partitioning k-means clustering (reproducibility).
    #[arg(long, default_value_t = 0)]
    pub cluster_seed: u64,

    /// Seed for per-stop service-time randomization (reproducibility).
    #[arg(long, default_value_t = 1)]
    pub service_time_seed: u64,
}

impl RunConfig {
    pub fn depot_coord(&self) -> Coordinate {
        Coordinate::new(self.depot_lat, self.depot_lon)
    }

    pub fn center_coord(&self) -> Coordinate {
        Coordinate::new(self.center_lat, self.center_lon)
    }
}
