//! Per-instance result table (CSV or Parquet, picked by extension).

use std::fs::File;
use std::path::Path;

use anyhow::{bail, Context, Result};
use polars::prelude::*;
use proximity::Stage;

use crate::trace::InstanceTrace;

/// One row per instance: sizes summary plus stage timings in milliseconds.
pub fn frame(traces: &[InstanceTrace]) -> Result<DataFrame> {
    let count = |f: fn(&InstanceTrace) -> usize| -> Vec<u64> {
        traces.iter().map(|t| f(t) as u64).collect()
    };
    let millis = |stage: Stage| -> Vec<f64> { traces.iter().map(|t| t.millis(stage)).collect() };
    let instances: Vec<String> = traces.iter().map(|t| t.instance.clone()).collect();
    let distances: Vec<f64> = traces.iter().map(|t| t.distance).collect();
    let df = df!(
        "instance" => instances,
        "distance" => distances,
        "points" => count(|t| t.points),
        "components" => count(|t| t.sizes.len()),
        "largest" => count(|t| t.sizes.first().copied().unwrap_or(0)),
        "prepare_ms" => millis(Stage::Prepare),
        "index_ms" => millis(Stage::Index),
        "sweep_ms" => millis(Stage::Sweep),
        "reduce_ms" => millis(Stage::Reduce)
    )?;
    Ok(df)
}

pub fn write(path: &Path, traces: &[InstanceTrace]) -> Result<()> {
    let mut df = frame(traces)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if !matches!(ext, "csv" | "parquet") {
        bail!("unsupported table extension {ext:?} (use .csv or .parquet)");
    }
    let mut file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    if ext == "csv" {
        CsvWriter::new(&mut file).finish(&mut df)?;
    } else {
        ParquetWriter::new(file).finish(&mut df)?;
    }
    tracing::info!(path = %path.display(), rows = df.height(), "table written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn trace(name: &str, sizes: Vec<usize>) -> InstanceTrace {
        InstanceTrace {
            instance: name.into(),
            distance: 0.5,
            points: sizes.iter().sum(),
            sizes,
            ..InstanceTrace::default()
        }
    }

    #[test]
    fn one_row_per_instance() {
        let df = frame(&[trace("a", vec![3, 1]), trace("b", vec![])]).unwrap();
        assert_eq!(df.shape(), (2, 9));
    }

    #[test]
    fn writes_csv_and_rejects_unknown_extensions() {
        let dir = tempdir().unwrap();
        let csv = dir.path().join("out/results.csv");
        write(&csv, &[trace("a", vec![2, 2])]).unwrap();
        let text = std::fs::read_to_string(&csv).unwrap();
        assert!(text.starts_with("instance,distance,points,components,largest"));
        assert!(write(&dir.path().join("results.xlsx"), &[]).is_err());
    }
}
