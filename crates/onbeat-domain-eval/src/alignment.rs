use log::{debug, warn};
use onbeat_domain_score::{
    ticks_to_millis, Alignment, AnalyzedEvent, EventError, NoteEvent, ReferenceSet,
};
use onbeat_ports::types::{Bpm, Millis};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AlignmentConfig {
    pub bpm: Bpm,
    /// Beats added to every performed event before matching.
    pub record_offset_beats: f64,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            bpm: Bpm::default(),
            record_offset_beats: 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RejectedEvent {
    /// Position in the performed input.
    pub index: usize,
    pub reason: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignmentOutcome {
    pub analyzed: Vec<AnalyzedEvent>,
    pub rejected: Vec<RejectedEvent>,
}

/// Matches every performed event to the reference event closest in time.
///
/// Distances are compared in milliseconds, each side converted with its own
/// resolution. Ties keep the lowest reference index.
pub fn align(
    reference: &ReferenceSet,
    performed: &[NoteEvent],
    cfg: AlignmentConfig,
) -> AlignmentOutcome {
    let reference_ms: Vec<Millis> = reference
        .events()
        .iter()
        .map(|event| event.start_millis(cfg.bpm))
        .collect();

    let mut outcome = AlignmentOutcome::default();
    for (index, event) in performed.iter().enumerate() {
        match align_one(&reference_ms, event, cfg) {
            Ok(alignment) => outcome.analyzed.push(AnalyzedEvent {
                event: *event,
                alignment,
            }),
            Err(err) => {
                warn!("performed event {index} excluded: {err}");
                outcome.rejected.push(RejectedEvent {
                    index,
                    reason: err.to_string(),
                });
            }
        }
    }

    debug!(
        "aligned {} events against {} references ({} rejected)",
        outcome.analyzed.len(),
        reference_ms.len(),
        outcome.rejected.len()
    );
    outcome
}

fn align_one(
    reference_ms: &[Millis],
    event: &NoteEvent,
    cfg: AlignmentConfig,
) -> Result<Alignment, EventError> {
    event.validate()?;
    let adjusted_tick =
        event.tick_start + cfg.record_offset_beats * event.quarter_note_ticks as f64;
    if !adjusted_tick.is_finite() {
        return Err(EventError::NonFiniteTick);
    }
    let performed_ms = ticks_to_millis(adjusted_tick, cfg.bpm, event.quarter_note_ticks);

    let mut best_index = 0;
    let mut best_distance = (performed_ms - reference_ms[0]).abs();
    for (index, &ms) in reference_ms.iter().enumerate().skip(1) {
        let distance = (performed_ms - ms).abs();
        if distance < best_distance {
            best_distance = distance;
            best_index = index;
        }
    }

    Ok(Alignment {
        reference_index: best_index,
        deviation_ms: performed_ms - reference_ms[best_index],
    })
}
