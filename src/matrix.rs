//! Travel-time matrix builder (spec §4.4).
//!
//! One Dijkstra run per stop, weighted by `travel_time_s`. `UNREACHABLE` is
//! the +∞ sentinel for pairs with no directed path — any finite value
//! exceeding the sum of all edge times would also satisfy the contract, but
//! an explicit sentinel makes "no path" observable without summing the
//! whole graph first.

use ordered_float::OrderedFloat;
use petgraph::algo::dijkstra;
use rayon::prelude::*;

use crate::geo::Stop;
use crate::graph::RoadGraph;

pub const UNREACHABLE: f64 = f64::INFINITY;

#[derive(Debug, Clone)]
pub struct TravelTimeMatrix {
    n: usize,
    values: Vec<f64>,
}

impl TravelTimeMatrix {
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.n + j]
    }

    pub fn n(&self) -> usize {
        self.n
    }

    fn set_row(&mut self, i: usize, row: Vec<f64>) {
        let start = i * self.n;
        self.values[start..start + self.n].copy_from_slice(&row);
    }
}

fn row_for(graph: &RoadGraph, stops: &[Stop], i: usize) -> Vec<f64> {
    let costs = dijkstra(&graph.graph, stops[i].node, None, |e| {
        OrderedFloat(e.weight().travel_time_s)
    });
    stops
        .iter()
        .enumerate()
        .map(|(j, stop)| {
            if i == j {
                0.0
            } else {
                costs.get(&stop.node).map(|c| c.0).unwrap_or(UNREACHABLE)
            }
        })
        .collect()
}

/// Sequential build: one Dijkstra per row, in stop order.
pub fn build_matrix(graph: &RoadGraph, stops: &[Stop]) -> TravelTimeMatrix {
    let n = stops.len();
    let mut m = TravelTimeMatrix {
        n,
        values: vec![0.0; n * n],
    };
    for i in 0..n {
        let row = row_for(graph, stops, i);
        m.set_row(i, row);
    }
    m
}

/// Parallel build: rows are independent single-source Dijkstra runs over a
/// read-only graph, so they may run concurrently without locking. Must
/// return identical finite values to `build_matrix`.
pub fn build_matrix_parallel(graph: &RoadGraph, stops: &[Stop]) -> TravelTimeMatrix {
    let n = stops.len();
    let rows: Vec<Vec<f64>> = (0..n).into_par_iter().map(|i| row_for(graph, stops, i)).collect();
    let mut m = TravelTimeMatrix {
        n,
        values: vec![0.0; n * n],
    };
    for (i, row) in rows.into_iter().enumerate() {
        m.set_row(i, row);
    }
    m
}

/// Test-only construction helper shared with `tour`'s and `schedule`'s unit
/// tests, which need hand-written matrices without a backing `RoadGraph`.
#[cfg(test)]
pub(crate) mod test_support {
    use super::TravelTimeMatrix;

    pub(crate) fn from_dense(n: usize, values: Vec<f64>) -> TravelTimeMatrix {
        assert_eq!(values.len(), n * n);
        TravelTimeMatrix { n, values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::test_support::line_graph_with_island;

    fn stops_from_graph(graph: &RoadGraph) -> Vec<Stop> {
        graph
            .graph
            .node_indices()
            .enumerate()
            .map(|(i, node)| Stop {
                stop_idx: i,
                coord: graph.graph[node].coord,
                node,
            })
            .collect()
    }

    #[test]
    fn matrix_shape_and_diagonal() {
        let graph = line_graph_with_island(4);
        let stops = stops_from_graph(&graph);
        let m = build_matrix(&graph, &stops);
        assert_eq!(m.n(), stops.len());
        for i in 0..m.n() {
            assert_eq!(m.get(i, i), 0.0);
        }
    }

    #[test]
    fn off_diagonal_entries_non_negative_or_infinite() {
        let graph = line_graph_with_island(4);
        let stops = stops_from_graph(&graph);
        let m = build_matrix(&graph, &stops);
        for i in 0..m.n() {
            for j in 0..m.n() {
                if i != j {
                    assert!(m.get(i, j) >= 0.0);
                }
            }
        }
    }

    #[test]
    fn island_node_is_unreachable() {
        let graph = line_graph_with_island(3);
        let stops = stops_from_graph(&graph);
        let island = stops.len() - 1;
        let m = build_matrix(&graph, &stops);
        assert_eq!(m.get(0, island), UNREACHABLE);
    }

    #[test]
    fn parallel_and_sequential_builds_agree() {
        let graph = line_graph_with_island(5);
        let stops = stops_from_graph(&graph);
        let seq = build_matrix(&graph, &stops);
        let par = build_matrix_parallel(&graph, &stops);
        for i in 0..seq.n() {
            for j in 0..seq.n() {
                assert_eq!(seq.get(i, j), par.get(i, j));
            }
        }
    }
}
