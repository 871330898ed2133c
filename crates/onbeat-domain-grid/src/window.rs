use onbeat_domain_score::{measures_to_beats, ReferenceSet};
use onbeat_ports::types::{Bpm, Millis, TimeSignature};
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum DisplayError {
    #[error("on-time threshold must be a non-negative number, got {0}")]
    Threshold(f64),
    #[error("beat subdivisions must be at least 1")]
    Subdivisions,
    #[error("beat position must be a finite number, got {0}")]
    BeatPosition(f64),
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BeatRange {
    pub start: f64,
    pub end: f64,
}

impl BeatRange {
    pub fn len(&self) -> f64 {
        self.end - self.start
    }

    pub fn is_valid(&self) -> bool {
        self.start >= 0.0 && self.start < self.end
    }
}

/// Which part of the timeline is drawn, plus the analysis knobs that affect drawing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DisplayWindow {
    beat_start: f64,
    beat_end: f64,
    record_offset_beats: f64,
    beat_subdivisions: u32,
    on_time_threshold_ms: Millis,
    bpm: Bpm,
}

impl Default for DisplayWindow {
    fn default() -> Self {
        Self {
            beat_start: 0.0,
            beat_end: 0.0,
            record_offset_beats: 0.0,
            beat_subdivisions: 4,
            on_time_threshold_ms: 20.0,
            bpm: Bpm::default(),
        }
    }
}

impl DisplayWindow {
    pub fn beat_start(&self) -> f64 {
        self.beat_start
    }

    pub fn beat_end(&self) -> f64 {
        self.beat_end
    }

    pub fn beat_range(&self) -> BeatRange {
        BeatRange {
            start: self.beat_start,
            end: self.beat_end,
        }
    }

    pub fn record_offset_beats(&self) -> f64 {
        self.record_offset_beats
    }

    pub fn beat_subdivisions(&self) -> u32 {
        self.beat_subdivisions
    }

    pub fn on_time_threshold_ms(&self) -> Millis {
        self.on_time_threshold_ms
    }

    pub fn bpm(&self) -> Bpm {
        self.bpm
    }

    /// Accepts any range; an invalid one makes the next projection fall back to the reference span.
    pub fn set_beat_range(&mut self, start: f64, end: f64) -> Result<(), DisplayError> {
        finite(start)?;
        finite(end)?;
        self.beat_start = start;
        self.beat_end = end;
        Ok(())
    }

    pub fn set_measure_range(
        &mut self,
        measure_start: f64,
        length: f64,
        time_signature: TimeSignature,
    ) -> Result<(), DisplayError> {
        self.set_beat_range(
            measures_to_beats(measure_start, time_signature),
            measures_to_beats(measure_start + length, time_signature),
        )
    }

    pub fn set_record_offset_beats(&mut self, beats: f64) -> Result<(), DisplayError> {
        self.record_offset_beats = finite(beats)?;
        Ok(())
    }

    pub fn set_record_start_measure(
        &mut self,
        measure: f64,
        time_signature: TimeSignature,
    ) -> Result<(), DisplayError> {
        self.set_record_offset_beats(measures_to_beats(measure, time_signature))
    }

    pub fn set_beat_subdivisions(&mut self, subdivisions: u32) -> Result<(), DisplayError> {
        if subdivisions == 0 {
            return Err(DisplayError::Subdivisions);
        }
        self.beat_subdivisions = subdivisions;
        Ok(())
    }

    pub fn set_on_time_threshold_ms(&mut self, ms: Millis) -> Result<(), DisplayError> {
        if !ms.is_finite() || ms < 0.0 {
            return Err(DisplayError::Threshold(ms));
        }
        self.on_time_threshold_ms = ms;
        Ok(())
    }

    pub fn set_bpm(&mut self, bpm: Bpm) {
        self.bpm = bpm;
    }

    /// Returns the range to draw. An invalid explicit range is replaced by
    /// `[0, total_beat_span)` of the reference and kept for later calls.
    pub fn resolve_range(&mut self, reference: &ReferenceSet) -> BeatRange {
        let explicit = self.beat_range();
        if explicit.is_valid() {
            return explicit;
        }
        self.beat_start = 0.0;
        self.beat_end = reference.total_beat_span().max(1.0);
        self.beat_range()
    }
}

fn finite(value: f64) -> Result<f64, DisplayError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DisplayError::BeatPosition(value))
    }
}
