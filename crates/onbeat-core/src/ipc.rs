use onbeat_domain_eval::TimingSummary;
use onbeat_ports::storage::SessionSettingsDto;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Command {
    LoadReference { path: PathBuf },
    ReloadReference,
    AnalyzeFile { path: PathBuf },
    AnalyzeNewest,
    Poll,
    ClearAnalysis,
    SetOnTimeThreshold { ms: f64 },
    SetSubdivisions { subdivisions: u32 },
    SetRecordStartMeasure { measure: f64 },
    SetRecordOffsetBeats { beats: f64 },
    SetMeasureRange { measure_start: f64, length: f64 },
    SetDisplayBeats { beat_start: f64, length: f64 },
    SetManualTempo { bpm: f64 },
    SetUseManualTempo { enabled: bool },
    SetOnsetThresholdDb { db: f32 },
    SetHitDistanceMs { ms: f64 },
    SetAnalyzeAudio { enabled: bool },
    SetSourceDirectory { path: Option<PathBuf> },
    SetWatchEnabled { enabled: bool },
    SetRhythmNames { enabled: bool },
    SetLockAnalyzed { enabled: bool },
    ExportAnalysis { dir: PathBuf },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Event {
    StatusChanged { message: String },
    ReferenceLoaded { count: usize, beat_span: f64 },
    AnalysisCompleted { summary: TimingSummary },
    AnalysisCleared,
    SettingsChanged { settings: SessionSettingsDto },
}
