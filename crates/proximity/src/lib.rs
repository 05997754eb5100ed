//! Component sizes of fixed-radius proximity graphs in the plane.
//!
//! Two points share an edge when their Euclidean distance is `<= d`; the
//! crate reports the sizes of the connected components, largest first.
//!
//! Pipeline
//! - `engine`: validate, sort by x, build the band index, pick a strategy.
//! - `band`: horizontal bands of height `d / m` plus x-window scanning.
//! - `sweep`: sequential clusterer (per-point state machine, union-find).
//! - `partition` + `reduce`: the same sweep over key ranges on worker
//!   threads, boundary handoffs, fusion requests, merge.
//!
//! Around it: `instance` (text format), `validate` (brute-force oracle and
//! generators), `observe` (optional event and timing hooks).

pub mod band;
pub mod engine;
pub mod error;
pub mod instance;
pub mod observe;
pub mod partition;
pub mod reduce;
pub mod registry;
pub mod sweep;
pub mod types;
pub mod validate;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use engine::{cluster_sizes, cluster_sizes_observed, Prepared};
pub use error::{Error, Result};
pub use instance::Instance;
pub use observe::{NoopObserver, Observer, Stage};
pub use types::{ClusterCfg, Point};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::engine::{cluster_sizes, cluster_sizes_observed, Prepared};
    pub use crate::instance::Instance;
    pub use crate::observe::{NoopObserver, Observer, Stage};
    pub use crate::partition::PartitionPlan;
    pub use crate::types::{ClusterCfg, Point};
    pub use crate::validate::{brute_force_sizes, clustered_points, grid_subsets, uniform_points};
}
