use crate::model::{EventError, NoteEvent};
use log::{debug, warn};
use onbeat_ports::source::DecodedNoteSequence;
use serde::Serialize;
use std::cmp::Ordering;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ReferenceError {
    #[error("reference source contains no notes")]
    EmptyInput,
    #[error("reference note {index} is invalid: {source}")]
    InvalidEvent { index: usize, source: EventError },
}

/// The quantized target performance. Always holds at least one event.
///
/// Only [`ReferenceSet::build`] and [`ReferenceSet::from_events`] create one; it is
/// serialized for export but never read back.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReferenceSet {
    events: Vec<NoteEvent>,
    lowest_pitch: i16,
    highest_pitch: i16,
    total_beat_span: f64,
    reordered: bool,
}

impl ReferenceSet {
    pub fn build(sequence: &DecodedNoteSequence) -> Result<Self, ReferenceError> {
        let events = sequence
            .notes
            .iter()
            .enumerate()
            .map(|(index, note)| {
                NoteEvent::from_decoded(note, sequence.quarter_note_ticks)
                    .map_err(|source| ReferenceError::InvalidEvent { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_events(events)
    }

    pub fn from_events(mut events: Vec<NoteEvent>) -> Result<Self, ReferenceError> {
        if events.is_empty() {
            return Err(ReferenceError::EmptyInput);
        }
        for (index, event) in events.iter().enumerate() {
            event
                .validate()
                .map_err(|source| ReferenceError::InvalidEvent { index, source })?;
        }

        let reordered = !is_time_ordered(&events);
        if reordered {
            warn!("reference events were not time-ordered; sorting by start beat");
            events.sort_by(|a, b| {
                a.start_beat()
                    .partial_cmp(&b.start_beat())
                    .unwrap_or(Ordering::Equal)
            });
        }

        let first = events[0].pitch;
        let mut lowest = first;
        let mut highest = first;
        let mut last_beat = 0.0f64;
        for event in &events[1..] {
            lowest = lowest.min(event.pitch);
            highest = highest.max(event.pitch);
        }
        for event in &events {
            last_beat = last_beat.max(event.end_beat());
        }

        let set = Self {
            lowest_pitch: lowest as i16 - 1,
            highest_pitch: highest as i16 + 1,
            total_beat_span: last_beat.ceil(),
            reordered,
            events,
        };
        debug!(
            "reference set built: {} events, pitches {}..={}, {} beats",
            set.events.len(),
            set.lowest_pitch,
            set.highest_pitch,
            set.total_beat_span
        );
        Ok(set)
    }

    pub fn events(&self) -> &[NoteEvent] {
        &self.events
    }

    pub fn get(&self, index: usize) -> Option<&NoteEvent> {
        self.events.get(index)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Never true for a built set.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// One semitone below the lowest reference pitch.
    pub fn lowest_pitch(&self) -> i16 {
        self.lowest_pitch
    }

    /// One semitone above the highest reference pitch.
    pub fn highest_pitch(&self) -> i16 {
        self.highest_pitch
    }

    pub fn pitch_span(&self) -> i16 {
        self.highest_pitch - self.lowest_pitch + 1
    }

    pub fn total_beat_span(&self) -> f64 {
        self.total_beat_span
    }

    pub fn was_reordered(&self) -> bool {
        self.reordered
    }
}

fn is_time_ordered(events: &[NoteEvent]) -> bool {
    events
        .windows(2)
        .all(|pair| pair[0].start_beat() <= pair[1].start_beat())
}
