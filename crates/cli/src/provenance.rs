use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::fs;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Metadata used to generate a provenance sidecar.
pub struct Payload {
    pub params: Value,
    pub inputs: Vec<String>,
}

impl Payload {
    pub fn new(params: Value) -> Self {
        Self {
            params,
            inputs: Vec::new(),
        }
    }

    pub fn with_inputs<I, S>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs.extend(inputs.into_iter().map(Into::into));
        self
    }
}

/// Provenance block without outputs: revision, crate version, params, inputs.
pub fn document(payload: &Payload) -> Value {
    json!({
        "code_rev": code_rev(),
        "version": proximity::VERSION,
        "params": payload.params,
        "inputs": payload.inputs,
    })
}

/// Write `<artifact stem>.provenance.json` next to `artifact`, recording the
/// git commit, callsite, params, inputs and the artifact itself.
#[track_caller]
pub fn write_sidecar<P: AsRef<Path>>(artifact: P, payload: Payload) -> Result<PathBuf> {
    let artifact = artifact.as_ref();
    let provenance_path = provenance_path(artifact);
    if let Some(parent) = provenance_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating provenance dir {}", parent.display()))?;
        }
    }

    let callsite = Location::caller();
    let mut doc = document(&payload);
    doc["callsite"] = json!({
        "file": callsite.file(),
        "line": callsite.line()
    });
    doc["outputs"] = json!([artifact.to_string_lossy()]);
    fs::write(&provenance_path, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", provenance_path.display()))?;
    Ok(provenance_path)
}

/// `run.json` -> `run.provenance.json`; an extensionless trace gets the
/// suffix appended.
fn provenance_path(artifact: &Path) -> PathBuf {
    artifact.with_extension("provenance.json")
}

/// Commit the binary reports, `None` outside a checkout.
///
/// A `GIT_COMMIT` set at build time wins over one set at run time, which wins
/// over asking git.
pub fn code_rev() -> Option<String> {
    let non_empty = |s: String| (!s.trim().is_empty()).then(|| s.trim().to_string());
    option_env!("GIT_COMMIT")
        .map(str::to_string)
        .and_then(non_empty)
        .or_else(|| std::env::var("GIT_COMMIT").ok().and_then(non_empty))
        .or_else(|| {
            let out = Command::new("git").args(["rev-parse", "HEAD"]).output().ok()?;
            out.status
                .success()
                .then(|| String::from_utf8(out.stdout).ok())
                .flatten()
                .and_then(non_empty)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn sidecar_sits_next_to_the_trace() {
        assert_eq!(
            provenance_path(Path::new("out/run.json")),
            Path::new("out/run.provenance.json")
        );
        assert_eq!(
            provenance_path(Path::new("out/run")),
            Path::new("out/run.provenance.json")
        );
    }

    #[test]
    fn write_sidecar_records_inputs_and_outputs() {
        let dir = tempdir().unwrap();
        let artifact = dir.path().join("trace.json");
        fs::write(&artifact, "{}").unwrap();
        let payload = Payload::new(json!({"workers": 4})).with_inputs(["a.txt", "b.txt"]);
        let prov_path = write_sidecar(&artifact, payload).unwrap();
        assert!(prov_path.exists());
        let parsed: Value = serde_json::from_slice(&fs::read(prov_path).unwrap()).unwrap();
        assert_eq!(parsed["outputs"][0], artifact.to_string_lossy().as_ref());
        assert_eq!(parsed["inputs"][1], "b.txt");
        assert_eq!(parsed["params"]["workers"], 4);
        assert_eq!(parsed["version"], proximity::VERSION);
    }
}
