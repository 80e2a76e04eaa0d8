//! Multi-vehicle parcel delivery tour planner over a real road network.
//!
//! Reads a delivery spreadsheet, acquires a drivable road graph for the
//! area from OpenStreetMap, partitions deliveries across a fleet, builds a
//! capacity-constrained tour per vehicle, reifies each tour into a timed
//! schedule against real road travel times, and reports the result to the
//! console plus an interactive HTML map.
//!
//! # Pipeline stages
//!
//! - [`input`]: spreadsheet loading
//! - [`region`] / [`graph`]: OSM region resolution and road graph fetch
//! - [`snap`]: nearest-road-node snapping
//! - [`matrix`]: dense travel-time matrix build
//! - [`partition`]: fleet clustering
//! - [`tour`]: capacity-constrained tour optimization
//! - [`schedule`]: per-vehicle schedule reification
//! - [`mapsink`] / [`console`]: reporting
//!
//! [`pipeline::run`] wires all of the above into one straight-line run.

pub mod config;
pub mod console;
pub mod error;
pub mod geo;
pub mod graph;
pub mod input;
pub mod mapsink;
pub mod matrix;
pub mod overpass;
pub mod partition;
pub mod pipeline;
pub mod region;
pub mod schedule;
pub mod snap;
pub mod tour;
