use serde::{Deserialize, Serialize};

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_onset_threshold_db() -> f32 {
    -20.0
}

fn default_hit_distance_ms() -> f64 {
    100.0
}

fn default_on_time_threshold_ms() -> f64 {
    20.0
}

fn default_beat_subdivisions() -> u32 {
    4
}

fn default_manual_bpm() -> f64 {
    120.0
}

fn default_max_audio_seconds() -> f64 {
    600.0
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(String),
    #[error("serialization error: {0}")]
    Serde(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettingsDto {
    pub reference_path: Option<String>,
    pub source_directory: Option<String>,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    pub watch_enabled: bool,
    pub analyze_audio: bool,
    #[serde(default = "default_onset_threshold_db")]
    pub onset_threshold_db: f32,
    #[serde(default = "default_hit_distance_ms")]
    pub hit_distance_ms: f64,
    #[serde(default = "default_max_audio_seconds")]
    pub max_audio_seconds: f64,
    #[serde(default = "default_on_time_threshold_ms")]
    pub on_time_threshold_ms: f64,
    #[serde(default = "default_beat_subdivisions")]
    pub beat_subdivisions: u32,
    pub record_offset_beats: f64,
    pub display_beat_start: f64,
    pub display_beat_length: f64,
    #[serde(default = "default_manual_bpm")]
    pub manual_bpm: f64,
    pub use_manual_bpm: bool,
    pub rhythm_instrument_names: bool,
    pub lock_analyzed: bool,
}

impl Default for SessionSettingsDto {
    fn default() -> Self {
        Self {
            reference_path: None,
            source_directory: None,
            poll_interval_ms: default_poll_interval_ms(),
            watch_enabled: false,
            analyze_audio: false,
            onset_threshold_db: default_onset_threshold_db(),
            hit_distance_ms: default_hit_distance_ms(),
            max_audio_seconds: default_max_audio_seconds(),
            on_time_threshold_ms: default_on_time_threshold_ms(),
            beat_subdivisions: default_beat_subdivisions(),
            record_offset_beats: 0.0,
            display_beat_start: 0.0,
            display_beat_length: 0.0,
            manual_bpm: default_manual_bpm(),
            use_manual_bpm: false,
            rhythm_instrument_names: false,
            lock_analyzed: false,
        }
    }
}

pub trait StoragePort: Send + Sync {
    fn load_settings(&self) -> Result<SessionSettingsDto, StorageError>;
    fn save_settings(&self, s: &SessionSettingsDto) -> Result<(), StorageError>;
}
