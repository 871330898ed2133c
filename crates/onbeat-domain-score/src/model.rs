use crate::time_base::{ticks_to_beats, ticks_to_millis};
use onbeat_ports::source::DecodedNote;
use onbeat_ports::types::{Bpm, Millis, Tick};
use serde::{Deserialize, Serialize};

/// Fixed pitch given to audio onsets; the detector marks time, not pitch.
pub const ONSET_PITCH: u8 = 60;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum EventError {
    #[error("pitch {0} is outside 0..=127")]
    PitchOutOfRange(u8),
    #[error("tick resolution is zero")]
    ZeroResolution,
    #[error("tick position is not finite")]
    NonFiniteTick,
    #[error("note ends at {end} before it starts at {start}")]
    EndBeforeStart { start: Tick, end: Tick },
}

/// A performed or reference note. Ticks are expressed in `quarter_note_ticks` per beat.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    pub pitch: u8,
    pub tick_start: Tick,
    pub tick_end: Tick,
    pub quarter_note_ticks: u32,
}

impl NoteEvent {
    pub fn new(
        pitch: u8,
        tick_start: Tick,
        tick_end: Tick,
        quarter_note_ticks: u32,
    ) -> Result<Self, EventError> {
        let event = Self {
            pitch,
            tick_start,
            tick_end,
            quarter_note_ticks,
        };
        event.validate()?;
        Ok(event)
    }

    pub fn from_decoded(note: &DecodedNote, quarter_note_ticks: u32) -> Result<Self, EventError> {
        Self::new(note.pitch, note.start_tick, note.end_tick, quarter_note_ticks)
    }

    /// Zero-length marker at `tick`, pitched at [`ONSET_PITCH`].
    pub fn onset(tick: Tick, quarter_note_ticks: u32) -> Self {
        Self {
            pitch: ONSET_PITCH,
            tick_start: tick,
            tick_end: tick,
            quarter_note_ticks,
        }
    }

    pub fn validate(&self) -> Result<(), EventError> {
        if self.pitch > 127 {
            return Err(EventError::PitchOutOfRange(self.pitch));
        }
        if self.quarter_note_ticks == 0 {
            return Err(EventError::ZeroResolution);
        }
        if !self.tick_start.is_finite() || !self.tick_end.is_finite() {
            return Err(EventError::NonFiniteTick);
        }
        if self.tick_end < self.tick_start {
            return Err(EventError::EndBeforeStart {
                start: self.tick_start,
                end: self.tick_end,
            });
        }
        Ok(())
    }

    pub fn start_beat(&self) -> f64 {
        ticks_to_beats(self.tick_start, self.quarter_note_ticks)
    }

    pub fn end_beat(&self) -> f64 {
        ticks_to_beats(self.tick_end, self.quarter_note_ticks)
    }

    pub fn start_millis(&self, bpm: Bpm) -> Millis {
        ticks_to_millis(self.tick_start, bpm, self.quarter_note_ticks)
    }

    /// Same event moved later by `beats`, in this event's own resolution.
    pub fn shifted_by_beats(&self, beats: f64) -> Self {
        let delta = beats * self.quarter_note_ticks as f64;
        Self {
            tick_start: self.tick_start + delta,
            tick_end: self.tick_end + delta,
            ..*self
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Alignment {
    pub reference_index: usize,
    /// Positive is late, negative is early.
    pub deviation_ms: Millis,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedEvent {
    /// As performed, before the record offset is applied.
    pub event: NoteEvent,
    pub alignment: Alignment,
}
