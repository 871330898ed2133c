//! Conversions between ticks, milliseconds and beats.
//!
//! `quarter_note_ticks` must be non-zero; callers validate resolutions before converting.

use onbeat_ports::types::{Bpm, Millis, Tick, TimeSignature};

/// Rounded to the nearest millisecond.
pub fn ticks_to_millis(tick: Tick, bpm: Bpm, quarter_note_ticks: u32) -> Millis {
    let beat_position = tick / quarter_note_ticks as f64;
    let seconds = beat_position * 60.0 / bpm.get();
    (seconds * 1000.0).round()
}

/// Exact inverse of [`ticks_to_millis`] without the rounding step.
pub fn millis_to_ticks(ms: Millis, bpm: Bpm, quarter_note_ticks: u32) -> Tick {
    let seconds = ms / 1000.0;
    let beat_position = seconds * bpm.get() / 60.0;
    beat_position * quarter_note_ticks as f64
}

pub fn beats_to_ticks(beats: f64, quarter_note_ticks: u32) -> Tick {
    beats * quarter_note_ticks as f64
}

pub fn ticks_to_beats(tick: Tick, quarter_note_ticks: u32) -> f64 {
    tick / quarter_note_ticks as f64
}

pub fn measures_to_beats(measures: f64, time_signature: TimeSignature) -> f64 {
    measures * time_signature.numerator() as f64
}
