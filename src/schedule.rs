//! Schedule & path reifier (spec §4.7).
//!
//! Walks a tour's consecutive stop pairs, re-extracts the full road path for
//! each, accumulates distance/duration, and advances a wall-clock cursor
//! with a randomized per-stop service time. Segments with no path are
//! logged and skipped rather than aborting the vehicle's schedule.

use chrono::{NaiveDateTime, TimeDelta};
use ordered_float::OrderedFloat;
use petgraph::algo::astar;
use rand::Rng;
use tracing::warn;

use crate::geo::{Coordinate, Stop};
use crate::graph::RoadGraph;
use crate::tour::Tour;

#[derive(Debug, Clone)]
pub struct ReifiedSegment {
    pub from_stop: usize,
    pub to_stop: usize,
    pub node_path: Vec<Coordinate>,
    pub length_m: f64,
    pub duration_s: f64,
    pub depart: NaiveDateTime,
    pub arrive: NaiveDateTime,
    pub service_minutes: i64,
}

#[derive(Debug, Clone, Default)]
pub struct Schedule {
    pub segments: Vec<ReifiedSegment>,
}

impl Schedule {
    pub fn total_length_m(&self) -> f64 {
        self.segments.iter().map(|s| s.length_m).sum()
    }

    /// Driving duration plus service time, matching spec's vehicle-total
    /// definition (`sum(duration_s + 60*service_minutes)`).
    pub fn total_duration_s(&self) -> f64 {
        self.segments
            .iter()
            .map(|s| s.duration_s + 60.0 * s.service_minutes as f64)
            .sum()
    }
}

/// Reifies one vehicle's tour into a timed, road-accurate schedule.
/// `start_time` is the vehicle's 08:00 wall-clock departure. `rng` drives
/// the per-stop service time draw in `[2, 6]` minutes.
pub fn reify(
    graph: &RoadGraph,
    tour: &Tour,
    stops: &[Stop],
    start_time: NaiveDateTime,
    rng: &mut impl Rng,
) -> Schedule {
    let mut cursor = start_time;
    let mut segments = Vec::new();

    for pair in tour.stops.windows(2) {
        let (u, v) = (pair[0], pair[1]);
        let from_node = stops[u].node;
        let to_node = stops[v].node;

        let Some((cost, path)) = astar(
            &graph.graph,
            from_node,
            |n| n == to_node,
            |e| OrderedFloat(e.weight().travel_time_s),
            |_| OrderedFloat(0.0),
        ) else {
            warn!(from = u, to = v, "no path for segment, skipping");
            continue;
        };

        let duration_s = cost.0;
        let mut length_m = 0.0;
        let mut node_path = Vec::with_capacity(path.len());
        for window in path.windows(2) {
            if let Some(edge) = graph.graph.find_edge(window[0], window[1]) {
                length_m += graph.graph[edge].length_m;
            }
        }
        for &node in &path {
            node_path.push(graph.graph[node].coord);
        }

        let depart = cursor;
        let arrive = depart + TimeDelta::seconds(duration_s.round() as i64);
        let service_minutes = rng.gen_range(2..=6);
        cursor = arrive + TimeDelta::minutes(service_minutes);

        segments.push(ReifiedSegment {
            from_stop: u,
            to_stop: v,
            node_path,
            length_m,
            duration_s,
            depart,
            arrive,
            service_minutes,
        });
    }

    Schedule { segments }
}
