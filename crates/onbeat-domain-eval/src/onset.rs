use log::debug;
use onbeat_domain_score::{millis_to_ticks, NoteEvent};
use onbeat_ports::source::DecodedAudio;
use onbeat_ports::types::{Bpm, DEFAULT_QUARTER_NOTE_TICKS};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum OnsetError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OnsetConfig {
    pub threshold_db: f32,
    /// Minimum time between two onsets.
    pub hit_distance_ms: f64,
    pub bpm: Bpm,
    pub quarter_note_ticks: u32,
}

impl Default for OnsetConfig {
    fn default() -> Self {
        Self {
            threshold_db: -20.0,
            hit_distance_ms: 100.0,
            bpm: Bpm::default(),
            quarter_note_ticks: DEFAULT_QUARTER_NOTE_TICKS,
        }
    }
}

/// Threshold onset detector over a stream of mono samples.
///
/// Feed blocks in order with [`OnsetScanner::push_block`]; block boundaries do not
/// affect the result.
#[derive(Clone, Debug)]
pub struct OnsetScanner {
    cfg: OnsetConfig,
    sample_rate_hz: u32,
    hit_distance_samples: u64,
    samples_since_last_hit: u64,
    has_hit: bool,
    position: u64,
}

impl OnsetScanner {
    pub fn new(cfg: OnsetConfig, sample_rate_hz: u32) -> Result<Self, OnsetError> {
        if sample_rate_hz == 0 {
            return Err(OnsetError::InvalidInput("sample rate is zero".to_string()));
        }
        if cfg.quarter_note_ticks == 0 {
            return Err(OnsetError::InvalidInput("tick resolution is zero".to_string()));
        }
        if !cfg.hit_distance_ms.is_finite() || cfg.hit_distance_ms < 0.0 {
            return Err(OnsetError::InvalidInput(format!(
                "hit distance {} ms",
                cfg.hit_distance_ms
            )));
        }
        let hit_distance_samples =
            (sample_rate_hz as f64 * cfg.hit_distance_ms / 1000.0).round() as u64;
        Ok(Self {
            cfg,
            sample_rate_hz,
            hit_distance_samples,
            samples_since_last_hit: 0,
            has_hit: false,
            position: 0,
        })
    }

    pub fn hit_distance_samples(&self) -> u64 {
        self.hit_distance_samples
    }

    pub fn push_block(&mut self, samples: &[f32], out: &mut Vec<NoteEvent>) {
        for &sample in samples {
            let db = gain_to_db(sample);
            if db > self.cfg.threshold_db
                && (!self.has_hit || self.samples_since_last_hit > self.hit_distance_samples)
            {
                out.push(self.onset_at(self.position));
                self.samples_since_last_hit = 0;
                self.has_hit = true;
            }
            self.samples_since_last_hit = self.samples_since_last_hit.saturating_add(1);
            self.position += 1;
        }
    }

    fn onset_at(&self, sample_index: u64) -> NoteEvent {
        let ms = sample_index as f64 / self.sample_rate_hz as f64 * 1000.0;
        let tick = millis_to_ticks(ms, self.cfg.bpm, self.cfg.quarter_note_ticks);
        NoteEvent::onset(tick, self.cfg.quarter_note_ticks)
    }
}

/// Scans channel 0 of `audio` in one pass.
pub fn detect_onsets(audio: &DecodedAudio, cfg: OnsetConfig) -> Result<Vec<NoteEvent>, OnsetError> {
    let Some(samples) = audio.channels.first() else {
        return Err(OnsetError::InvalidInput("audio has no channels".to_string()));
    };
    let mut scanner = OnsetScanner::new(cfg, audio.sample_rate_hz)?;
    let mut onsets = Vec::new();
    scanner.push_block(samples, &mut onsets);
    debug!(
        "detected {} onsets in {} samples at {} Hz",
        onsets.len(),
        samples.len(),
        audio.sample_rate_hz
    );
    Ok(onsets)
}

/// Silence maps to negative infinity.
pub fn gain_to_db(sample: f32) -> f32 {
    20.0 * sample.abs().log10()
}
