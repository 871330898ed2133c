use onbeat_domain_eval::{AlignmentOutcome, TimingSummary};
use onbeat_domain_score::ReferenceSet;
use onbeat_ports::storage::{SessionSettingsDto, StorageError};
use serde::Serialize;
use std::fs;
use std::path::Path;

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Serialize)]
struct Manifest {
    app: &'static str,
    version: &'static str,
    files: Vec<&'static str>,
}

/// Writes one analysis as a folder of JSON files plus the text report.
///
/// `reference.json` is left out when no reference is loaded; the manifest lists
/// what was actually written.
pub fn export_analysis(
    dir: &Path,
    settings: &SessionSettingsDto,
    reference: Option<&ReferenceSet>,
    outcome: &AlignmentOutcome,
    report: &str,
) -> Result<(), StorageError> {
    fs::create_dir_all(dir).map_err(|e| StorageError::Io(e.to_string()))?;

    let summary = TimingSummary::from_analyzed(
        &outcome.analyzed,
        outcome.rejected.len(),
        settings.on_time_threshold_ms,
    );

    let mut files = vec!["settings.json"];
    put(dir, "settings.json", &to_json(settings)?)?;
    if let Some(reference) = reference {
        put(dir, "reference.json", &to_json(reference)?)?;
        files.push("reference.json");
    }
    put(dir, "analysis.json", &to_json(outcome)?)?;
    put(dir, "summary.json", &to_json(&summary)?)?;
    put(dir, "report.txt", report.as_bytes())?;
    files.extend(["analysis.json", "summary.json", "report.txt"]);

    let manifest = Manifest {
        app: "Onbeat",
        version: env!("CARGO_PKG_VERSION"),
        files,
    };
    put(dir, MANIFEST_FILE, &to_json(&manifest)?)
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, StorageError> {
    serde_json::to_vec_pretty(value).map_err(|e| StorageError::Serde(e.to_string()))
}

fn put(dir: &Path, name: &str, data: &[u8]) -> Result<(), StorageError> {
    fs::write(dir.join(name), data).map_err(|e| StorageError::Io(format!("{name}: {e}")))
}
