//! Fleet partitioner (spec §4.5): k-means over 2-D lat/lon-as-plane
//! coordinates, seeded for reproducibility.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::geo::Delivery;

const MAX_ITERATIONS: usize = 100;

/// Assigns each delivery to one of `k` clusters. Returns a vector the same
/// length as `deliveries`, `result[i]` = cluster index of `deliveries[i]`.
/// Deterministic given `seed`. If `k > deliveries.len()`, some cluster
/// indices in `0..k` simply never appear in the result — the caller (the
/// tour optimizer) skips empty clusters.
pub fn partition(deliveries: &[Delivery], k: usize, seed: u64) -> Vec<usize> {
    if deliveries.is_empty() || k == 0 {
        return vec![0; deliveries.len()];
    }
    if k >= deliveries.len() {
        // One delivery per cluster when there's no room to group; this is
        // still a valid partition and keeps downstream tours trivial.
        return (0..deliveries.len()).collect();
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let points: Vec<(f64, f64)> = deliveries.iter().map(|d| (d.coord.lat, d.coord.lon)).collect();

    let mut indices: Vec<usize> = (0..points.len()).collect();
    indices.shuffle(&mut rng);
    let mut centroids: Vec<(f64, f64)> = indices[..k].iter().map(|&i| points[i]).collect();

    let mut assignment = vec![0usize; points.len()];

    for _ in 0..MAX_ITERATIONS {
        let mut changed = false;
        for (i, &p) in points.iter().enumerate() {
            let nearest = nearest_centroid(p, &centroids);
            if assignment[i] != nearest {
                assignment[i] = nearest;
                changed = true;
            }
        }

        let mut sums = vec![(0.0f64, 0.0f64, 0usize); k];
        for (i, &p) in points.iter().enumerate() {
            let c = assignment[i];
            sums[c].0 += p.0;
            sums[c].1 += p.1;
            sums[c].2 += 1;
        }
        for (c, sum) in sums.iter().enumerate() {
            if sum.2 > 0 {
                centroids[c] = (sum.0 / sum.2 as f64, sum.1 / sum.2 as f64);
            }
        }

        if !changed {
            break;
        }
    }

    assignment
}

fn nearest_centroid(p: (f64, f64), centroids: &[(f64, f64)]) -> usize {
    centroids
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            let da = squared_dist(p, **a);
            let db = squared_dist(p, **b);
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(idx, _)| idx)
        .unwrap()
}

fn squared_dist(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dlat = a.0 - b.0;
    let dlon = a.1 - b.1;
    dlat * dlat + dlon * dlon
}
