use super::*;
use crate::observe::NoopObserver;
use crate::validate::{brute_force_sizes, clustered_points, uniform_points};
use std::sync::atomic::{AtomicUsize, Ordering};

fn sorted(mut pts: Vec<Point>) -> Vec<Point> {
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts
}

fn sizes_with(pts: &[Point], d: f64, divisions: u32, fanout: usize, observer: &dyn Observer) -> SweepOutcome {
    let index = BandIndex::build(pts, d / f64::from(divisions));
    let ctx = SweepCtx {
        points: pts,
        index: &index,
        radius: Radius::new(d),
        reach: i64::from(divisions) + 1,
        bridge_fanout: fanout,
        observer,
    };
    run_sequential(ctx)
}

fn sizes(pts: &[Point], d: f64) -> Vec<usize> {
    sizes_with(pts, d, 1, 2, &NoopObserver).registry.sorted_sizes()
}

#[derive(Default)]
struct EdgeCount(AtomicUsize);

impl Observer for EdgeCount {
    fn edge(&self, _a: Point, _b: Point) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }
}

#[test]
fn concrete_scenarios() {
    let pts = sorted(vec![
        Point::new(0.0, 0.0),
        Point::new(1.0, 0.0),
        Point::new(0.0, 3.0),
        Point::new(0.0, 3.2),
    ]);
    assert_eq!(sizes(&pts, 1.5), vec![2, 2]);

    let chain = sorted(vec![
        Point::new(0.0, 0.0),
        Point::new(0.9, 0.0),
        Point::new(1.8, 0.0),
        Point::new(2.7, 0.0),
    ]);
    assert_eq!(sizes(&chain, 1.0), vec![4]);

    let exact = sorted(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)]);
    assert_eq!(sizes(&exact, 1.0), vec![2]);
    assert_eq!(sizes(&exact, 0.999_999), vec![1, 1]);
}

#[test]
fn vertical_chain_across_bands() {
    // Every hop crosses into the next band; only the window finds them.
    let pts: Vec<Point> = (0..30).map(|i| Point::new(0.0, i as f64 * 0.95)).collect();
    assert_eq!(sizes(&pts, 1.0), vec![30]);
    // Diagonal chain: x and y both move.
    let diag: Vec<Point> = (0..30)
        .map(|i| Point::new(i as f64 * 0.6, i as f64 * 0.75))
        .collect();
    assert_eq!(sizes(&diag, 1.0), vec![30]);
}

#[test]
fn empty_and_single() {
    let out = sizes_with(&[], 1.0, 1, 2, &NoopObserver);
    assert!(out.registry.sorted_sizes().is_empty());
    assert_eq!(out.unresolved, 0);
    assert_eq!(sizes(&[Point::new(5.0, -5.0)], 1.0), vec![1]);
}

#[test]
fn matches_brute_force_on_seeded_clouds() {
    for seed in 0..8 {
        let pts = sorted(uniform_points(300, 10.0, seed));
        for d in [0.25, 0.5, 0.8, 1.5] {
            assert_eq!(sizes(&pts, d), brute_force_sizes(&pts, d), "seed {seed} d {d}");
        }
        let blobs = sorted(clustered_points(300, 5, 10.0, 0.6, seed));
        for d in [0.1, 0.3, 0.7] {
            assert_eq!(sizes(&blobs, d), brute_force_sizes(&blobs, d), "blobs seed {seed} d {d}");
        }
    }
}

#[test]
fn divisions_and_fanout_do_not_change_sizes() {
    let pts = sorted(clustered_points(400, 6, 8.0, 0.8, 42));
    let d = 0.35;
    let expected = brute_force_sizes(&pts, d);
    for divisions in [1, 2, 3] {
        for fanout in [0, 1, 2, 8] {
            let got = sizes_with(&pts, d, divisions, fanout, &NoopObserver)
                .registry
                .sorted_sizes();
            assert_eq!(got, expected, "m {divisions} fanout {fanout}");
        }
    }
}

#[test]
fn every_point_resolved_once() {
    let pts = sorted(uniform_points(200, 5.0, 3));
    let index = BandIndex::build(&pts, 0.4);
    let ctx = SweepCtx {
        points: &pts,
        index: &index,
        radius: Radius::new(0.4),
        reach: 2,
        bridge_fanout: 2,
        observer: &NoopObserver,
    };
    let span = index.key_span().unwrap();
    let mut store = BandStates::for_keys(index.keys());
    let mut sweep = Sweep::new(ctx, span, 0, Slots::Identity, pts.len());
    assert_eq!(sweep.lifecycle(0), Lifecycle::Unseen);
    for key in index.keys() {
        sweep.drive_band(key, &mut store);
    }
    assert!((0..pts.len()).all(|id| sweep.lifecycle(id) == Lifecycle::Resolved));
    assert_eq!(sweep.registry().registered(), pts.len());
    let out = sweep.finish();
    assert_eq!(out.unresolved, 0);
    assert!(out.fusions.is_empty());

    // Every band ends fully classified.
    for key in index.keys() {
        let band = store.get(key).unwrap();
        assert_eq!(band.classified(), index.band(key).unwrap().len());
        assert_eq!(band.frontier, index.band(key).unwrap().len());
    }
}

#[test]
fn edge_events_equal_merges() {
    let pts = sorted(uniform_points(250, 6.0, 9));
    let counter = EdgeCount::default();
    let out = sizes_with(&pts, 0.5, 2, 3, &counter);
    let merges = pts.len() - out.registry.components();
    assert_eq!(counter.0.load(Ordering::Relaxed), merges);
}
