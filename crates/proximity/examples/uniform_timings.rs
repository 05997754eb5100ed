//! Stage timings over uniform clouds.
//!
//! Purpose
//! - Reproducible per-stage timings (prepare, index, sweep, reduce) for
//!   n in 1k..=10k uniform points and d in {0.1, 0.075, 0.05, 0.025}.
//! - Quick comparison of the sequential run against a 4-worker run without
//!   setting up criterion.
//!
//! Run: `cargo run --release -p proximity --example uniform_timings`

use std::collections::BTreeMap;
use std::time::Duration;

use parking_lot::Mutex;
use proximity::validate::uniform_points;
use proximity::{cluster_sizes_observed, ClusterCfg, Observer, Stage};

const DISTANCES: [f64; 4] = [0.1, 0.075, 0.05, 0.025];
const REPEATS: u32 = 5;

/// Sums stage time; `Sweep` from several workers counts as wall time of the slowest.
#[derive(Default)]
struct StageClock {
    totals: Mutex<BTreeMap<Stage, Duration>>,
    sweep_max: Mutex<Duration>,
}

impl Observer for StageClock {
    fn stage(&self, stage: Stage, elapsed: Duration) {
        if stage == Stage::Sweep {
            let mut max = self.sweep_max.lock();
            *max = (*max).max(elapsed);
        } else {
            *self.totals.lock().entry(stage).or_default() += elapsed;
        }
    }
}

impl StageClock {
    fn close_run(&self) {
        let sweep = std::mem::take(&mut *self.sweep_max.lock());
        *self.totals.lock().entry(Stage::Sweep).or_default() += sweep;
    }

    fn millis(&self, stage: Stage) -> f64 {
        self.totals
            .lock()
            .get(&stage)
            .map_or(0.0, |d| d.as_secs_f64() * 1e3 / f64::from(REPEATS))
    }
}

fn main() {
    println!(
        "{:>6} {:>6} {:>7} {:>9} {:>9} {:>9} {:>9} {:>6}",
        "n", "d", "workers", "prepare", "index", "sweep", "reduce", "comps"
    );
    for n in (1..=10).map(|k| k * 1_000) {
        let pts = uniform_points(n, 1.0, n as u64);
        for d in DISTANCES {
            for workers in [1, 4] {
                let cfg = ClusterCfg {
                    workers,
                    ..ClusterCfg::default()
                };
                let clock = StageClock::default();
                let mut components = 0;
                for _ in 0..REPEATS {
                    let sizes = cluster_sizes_observed(&pts, d, &cfg, &clock)
                        .expect("uniform points are finite");
                    clock.close_run();
                    components = sizes.len();
                }
                println!(
                    "{:>6} {:>6} {:>7} {:>9.3} {:>9.3} {:>9.3} {:>9.3} {:>6}",
                    n,
                    d,
                    workers,
                    clock.millis(Stage::Prepare),
                    clock.millis(Stage::Index),
                    clock.millis(Stage::Sweep),
                    clock.millis(Stage::Reduce),
                    components
                );
            }
        }
    }
}
