//! Brute-force oracle and point-set generators for validation.
//!
//! - `brute_force_sizes`: tests all `C(n, 2)` pairs, no spatial index.
//! - `grid_subsets`: every non-empty subset of an `s × s` unit grid, the
//!   exhaustive small-`n` check.
//! - `uniform_points`/`clustered_points`: seeded clouds for randomized checks.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::registry::Registry;
use crate::types::{Point, Radius};

/// Component sizes, largest first, by testing every pair.
///
/// Negative or NaN `d` yields singletons (no pair satisfies `dist <= d`).
/// At `d == 0` only equal points connect, even when a tiny offset squares
/// to zero.
pub fn brute_force_sizes(points: &[Point], d: f64) -> Vec<usize> {
    let radius = Radius::new(d);
    let connects = |a: Point, b: Point| if d == 0.0 { a == b } else { radius.within(a, b) };
    let mut reg = Registry::singletons(points.len());
    if d >= 0.0 {
        for i in 0..points.len() {
            for j in (i + 1)..points.len() {
                if connects(points[i], points[j]) {
                    reg.union(i, j);
                }
            }
        }
    }
    reg.sorted_sizes()
}

/// All non-empty subsets of the `side × side` grid with unit spacing.
///
/// Subset `mask` holds cell `c` (x = `c % side`, y = `c / side`) when bit `c`
/// is set. Panics if `side * side > 24` (the enumeration would not finish).
pub fn grid_subsets(side: usize) -> impl Iterator<Item = Vec<Point>> {
    let cells = side * side;
    assert!(cells <= 24, "grid of {cells} cells is too large to enumerate");
    (1u32..(1u32 << cells)).map(move |mask| {
        (0..cells)
            .filter(|c| mask & (1 << c) != 0)
            .map(|c| Point::new((c % side) as f64, (c / side) as f64))
            .collect()
    })
}

/// `n` points uniform in `[0, extent)²`.
pub fn uniform_points(n: usize, extent: f64, seed: u64) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| Point::new(rng.gen::<f64>() * extent, rng.gen::<f64>() * extent))
        .collect()
}

/// `n` points around `centers` random centres in `[0, extent)²`, each point
/// jittered by up to `spread` per axis. Produces dense blobs plus gaps.
pub fn clustered_points(n: usize, centers: usize, extent: f64, spread: f64, seed: u64) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    let centers: Vec<Point> = (0..centers.max(1))
        .map(|_| Point::new(rng.gen::<f64>() * extent, rng.gen::<f64>() * extent))
        .collect();
    (0..n)
        .map(|_| {
            let c = centers[rng.gen_range(0..centers.len())];
            Point::new(
                c.x + rng.gen_range(-spread..=spread),
                c.y + rng.gen_range(-spread..=spread),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brute_force_scenarios() {
        let pts = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 3.0),
            Point::new(0.0, 3.2),
        ];
        assert_eq!(brute_force_sizes(&pts, 1.5), vec![2, 2]);
        assert_eq!(brute_force_sizes(&pts, -1.0), vec![1, 1, 1, 1]);
        assert!(brute_force_sizes(&[], 1.0).is_empty());
    }

    #[test]
    fn zero_distance_needs_equal_points() {
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(1e-200, 0.0),
            Point::new(-0.0, 0.0),
        ];
        assert_eq!(brute_force_sizes(&pts, 0.0), vec![2, 1]);
        assert_eq!(
            crate::cluster_sizes(&pts, 0.0, &crate::ClusterCfg::default()).unwrap(),
            vec![2, 1]
        );
        assert_eq!(brute_force_sizes(&pts, 1e-300), vec![3]);
    }

    #[test]
    fn grid_subset_count() {
        assert_eq!(grid_subsets(2).count(), 15);
        let full = grid_subsets(3).last().unwrap();
        assert_eq!(full.len(), 9);
    }

    #[test]
    fn seeded_clouds_are_reproducible() {
        assert_eq!(uniform_points(50, 1.0, 7), uniform_points(50, 1.0, 7));
        let c = clustered_points(200, 4, 10.0, 0.5, 3);
        assert_eq!(c.len(), 200);
        assert_eq!(c, clustered_points(200, 4, 10.0, 0.5, 3));
    }
}
