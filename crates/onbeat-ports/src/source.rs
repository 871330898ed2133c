use crate::types::Tick;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// One note with its note-off already paired. Unpaired notes carry `end_tick == start_tick`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecodedNote {
    pub pitch: u8,
    pub start_tick: Tick,
    pub end_tick: Tick,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecodedNoteSequence {
    pub quarter_note_ticks: u32,
    pub notes: Vec<DecodedNote>,
}

/// Planar sample buffer. Only channel 0 is analysed.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedAudio {
    pub sample_rate_hz: u32,
    pub channels: Vec<Vec<f32>>,
}

impl DecodedAudio {
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn num_frames(&self) -> usize {
        self.channels.first().map(Vec::len).unwrap_or(0)
    }

    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate_hz == 0 {
            return 0.0;
        }
        self.num_frames() as f64 / self.sample_rate_hz as f64
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    Midi,
    Audio,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "mid" | "midi" => Some(SourceKind::Midi),
            "wav" | "wave" => Some(SourceKind::Audio),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub kind: SourceKind,
    pub size_bytes: u64,
    pub modified: Option<SystemTime>,
}

#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("io error: {0}")]
    Io(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
}

pub trait NoteSourcePort: Send + Sync {
    fn read_notes(&self, path: &Path) -> Result<DecodedNoteSequence, SourceError>;
}

pub trait AudioSourcePort: Send + Sync {
    fn read_audio(&self, path: &Path) -> Result<DecodedAudio, SourceError>;
}

pub trait SourceLocatorPort: Send + Sync {
    /// Newest file in `dir` whose kind is one of `kinds`, by modification time.
    ///
    /// `exclude` names a file that is never returned, however it is spelled; the next
    /// newest candidate is returned in its place.
    fn newest_source(
        &self,
        dir: &Path,
        kinds: &[SourceKind],
        exclude: Option<&Path>,
    ) -> Result<Option<SourceFile>, SourceError>;
}
