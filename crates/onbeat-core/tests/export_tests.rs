use onbeat_core::{export_analysis, MANIFEST_FILE};
use onbeat_domain_eval::{align, AlignmentConfig, AlignmentOutcome};
use onbeat_domain_score::{NoteEvent, ReferenceSet};
use onbeat_ports::storage::SessionSettingsDto;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::PathBuf;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("onbeat-export-{name}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

fn read_json(path: PathBuf) -> serde_json::Value {
    serde_json::from_slice(&fs::read(path).unwrap()).unwrap()
}

#[test]
fn export_writes_every_file_and_a_manifest() {
    let dir = scratch_dir("full");
    let reference =
        ReferenceSet::from_events(vec![NoteEvent::new(60, 0.0, 480.0, 960).unwrap()]).unwrap();
    let outcome = align(
        &reference,
        &[NoteEvent::onset(96.0, 960)],
        AlignmentConfig::default(),
    );

    export_analysis(
        &dir,
        &SessionSettingsDto::default(),
        Some(&reference),
        &outcome,
        "Analysis:\n",
    )
    .unwrap();

    let manifest = read_json(dir.join(MANIFEST_FILE));
    assert_eq!(manifest["app"], "Onbeat");
    assert_eq!(
        manifest["files"],
        serde_json::json!([
            "settings.json",
            "reference.json",
            "analysis.json",
            "summary.json",
            "report.txt"
        ])
    );
    let summary = read_json(dir.join("summary.json"));
    assert_eq!(summary["late"], 1);
    assert_eq!(
        fs::read_to_string(dir.join("report.txt")).unwrap(),
        "Analysis:\n"
    );
}

#[test]
fn export_without_reference_skips_reference_file() {
    let dir = scratch_dir("bare");
    export_analysis(
        &dir,
        &SessionSettingsDto::default(),
        None,
        &AlignmentOutcome::default(),
        "",
    )
    .unwrap();

    assert!(!dir.join("reference.json").exists());
    assert!(dir.join("analysis.json").exists());
    let manifest = read_json(dir.join(MANIFEST_FILE));
    assert_eq!(manifest["files"].as_array().unwrap().len(), 4);
}

#[test]
fn exported_reference_carries_the_derived_ranges() {
    let dir = scratch_dir("reference");
    let reference = ReferenceSet::from_events(vec![
        NoteEvent::new(64, 960.0, 1440.0, 960).unwrap(),
        NoteEvent::new(60, 0.0, 480.0, 960).unwrap(),
    ])
    .unwrap();

    export_analysis(
        &dir,
        &SessionSettingsDto::default(),
        Some(&reference),
        &AlignmentOutcome::default(),
        "",
    )
    .unwrap();

    let exported = read_json(dir.join("reference.json"));
    assert_eq!(exported["events"].as_array().unwrap().len(), 2);
    assert_eq!(exported["events"][0]["pitch"], 60);
    assert_eq!(exported["lowest_pitch"], 59);
    assert_eq!(exported["highest_pitch"], 65);
    assert_eq!(exported["total_beat_span"], 2.0);
    assert_eq!(exported["reordered"], true);
}
