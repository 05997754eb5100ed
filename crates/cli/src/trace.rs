//! Run recorder: stage timings always, band/edge/fusion events on request.
//!
//! The recorded trace is plain JSON meant for external plotting; nothing here
//! draws anything.

use std::time::Duration;

use parking_lot::Mutex;
use proximity::{Observer, Point, Stage};
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
pub struct BandEvent {
    pub key: i64,
    pub y_lo: f64,
    pub y_hi: f64,
    pub count: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct FusionEvent {
    pub partition: usize,
    pub a: [f64; 2],
    pub b: [f64; 2],
}

#[derive(Clone, Debug, Serialize)]
pub struct StageTime {
    pub stage: &'static str,
    pub micros: u64,
}

/// Everything recorded for one instance.
#[derive(Clone, Debug, Default, Serialize)]
pub struct InstanceTrace {
    pub instance: String,
    pub distance: f64,
    pub points: usize,
    pub sizes: Vec<usize>,
    pub stages: Vec<StageTime>,
    pub bands: Vec<BandEvent>,
    pub edges: Vec<[[f64; 2]; 2]>,
    pub fusions: Vec<FusionEvent>,
}

impl InstanceTrace {
    /// Total time per stage in milliseconds (`Sweep` summed over workers).
    pub fn millis(&self, stage: Stage) -> f64 {
        self.stages
            .iter()
            .filter(|s| s.stage == stage.label())
            .map(|s| s.micros as f64 / 1e3)
            .sum()
    }
}

/// Observer collecting an [`InstanceTrace`].
pub struct Recorder {
    events: bool,
    trace: Mutex<InstanceTrace>,
}

impl Recorder {
    pub fn new(instance: String, distance: f64, points: usize, events: bool) -> Self {
        Self {
            events,
            trace: Mutex::new(InstanceTrace {
                instance,
                distance,
                points,
                ..InstanceTrace::default()
            }),
        }
    }

    pub fn finish(self, sizes: Vec<usize>) -> InstanceTrace {
        let mut trace = self.trace.into_inner();
        trace.sizes = sizes;
        trace
    }
}

fn xy(p: Point) -> [f64; 2] {
    [p.x, p.y]
}

impl Observer for Recorder {
    fn band(&self, key: i64, y_lo: f64, y_hi: f64, count: usize) {
        if self.events {
            self.trace.lock().bands.push(BandEvent {
                key,
                y_lo,
                y_hi,
                count,
            });
        }
    }

    fn edge(&self, a: Point, b: Point) {
        if self.events {
            self.trace.lock().edges.push([xy(a), xy(b)]);
        }
    }

    fn fusion(&self, partition: usize, a: Point, b: Point) {
        if self.events {
            self.trace.lock().fusions.push(FusionEvent {
                partition,
                a: xy(a),
                b: xy(b),
            });
        }
    }

    fn stage(&self, stage: Stage, elapsed: Duration) {
        self.trace.lock().stages.push(StageTime {
            stage: stage.label(),
            micros: u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proximity::{cluster_sizes_observed, ClusterCfg};

    #[test]
    fn records_events_only_when_asked() {
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(0.5, 0.0),
            Point::new(5.0, 5.0),
        ];
        let cfg = ClusterCfg::default();

        let rec = Recorder::new("tiny".into(), 1.0, pts.len(), true);
        let sizes = cluster_sizes_observed(&pts, 1.0, &cfg, &rec).unwrap();
        let trace = rec.finish(sizes);
        assert_eq!(trace.sizes, vec![2, 1]);
        assert_eq!(trace.edges.len(), 1);
        assert_eq!(trace.bands.iter().map(|b| b.count).sum::<usize>(), 3);
        assert!(trace.fusions.is_empty());
        assert_eq!(trace.stages.len(), 4);

        let rec = Recorder::new("tiny".into(), 1.0, pts.len(), false);
        let sizes = cluster_sizes_observed(&pts, 1.0, &cfg, &rec).unwrap();
        let trace = rec.finish(sizes);
        assert!(trace.edges.is_empty() && trace.bands.is_empty());
        assert_eq!(trace.stages.len(), 4);
        assert!(trace.millis(Stage::Sweep) >= 0.0);
    }

    #[test]
    fn serializes_to_json() {
        let rec = Recorder::new("x".into(), 0.5, 0, true);
        rec.edge(Point::new(0.0, 1.0), Point::new(1.0, 1.0));
        let value = serde_json::to_value(rec.finish(vec![])).unwrap();
        assert_eq!(value["edges"][0][1][0], 1.0);
        assert_eq!(value["instance"], "x");
    }
}
