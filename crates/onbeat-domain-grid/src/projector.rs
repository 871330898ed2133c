use crate::window::{BeatRange, DisplayWindow};
use onbeat_domain_eval::{classify, Timing};
use onbeat_domain_score::{AnalyzedEvent, NoteEvent, ReferenceSet};
use onbeat_ports::types::TimeSignature;
use serde::{Deserialize, Serialize};

pub const REFERENCE_MARKER_WIDTH: f32 = 2.0;
pub const PERFORMED_MARKER_WIDTH: f32 = 4.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSize {
    pub width: f32,
    pub height: f32,
    /// Split evenly between the left and right edges.
    pub horizontal_padding: f32,
}

impl SurfaceSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            horizontal_padding: 100.0,
        }
    }

    pub fn drawable_width(&self) -> f32 {
        (self.width - self.horizontal_padding).max(0.0)
    }

    pub fn left_margin(&self) -> f32 {
        self.horizontal_padding / 2.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineWeight {
    Measure,
    Beat,
    HalfBeat,
    Subdivision,
}

impl LineWeight {
    pub fn thickness(self) -> f32 {
        match self {
            LineWeight::Measure => 3.0,
            LineWeight::Beat => 2.0,
            LineWeight::HalfBeat => 1.0,
            LineWeight::Subdivision => 0.5,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridLine {
    pub index: u32,
    pub x: f32,
    pub weight: LineWeight,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerKind {
    Reference,
    Performed(Timing),
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoteMarker {
    pub kind: MarkerKind,
    pub pitch: u8,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridScene {
    pub range: BeatRange,
    pub lines: Vec<GridLine>,
    pub markers: Vec<NoteMarker>,
}

/// Resolves the window's range against the reference, then projects.
pub fn project(
    window: &mut DisplayWindow,
    reference: &ReferenceSet,
    analyzed: &[AnalyzedEvent],
    time_signature: TimeSignature,
    surface: SurfaceSize,
) -> GridScene {
    let range = window.resolve_range(reference);
    project_range(window, range, reference, analyzed, time_signature, surface)
}

/// Pure projection for an already resolved `range`.
pub fn project_range(
    window: &DisplayWindow,
    range: BeatRange,
    reference: &ReferenceSet,
    analyzed: &[AnalyzedEvent],
    time_signature: TimeSignature,
    surface: SurfaceSize,
) -> GridScene {
    let mut scene = GridScene {
        range,
        lines: Vec::new(),
        markers: Vec::new(),
    };
    if !range.is_valid() {
        return scene;
    }

    let layout = Layout {
        range,
        surface,
        note_height: surface.height / reference.pitch_span().max(1) as f32,
        highest_pitch: reference.highest_pitch(),
    };

    scene.lines = grid_lines(&layout, window.beat_subdivisions(), time_signature);

    for event in reference.events() {
        let marker = layout.marker(event, MarkerKind::Reference, REFERENCE_MARKER_WIDTH);
        scene.markers.extend(marker);
    }

    for analyzed_event in analyzed {
        let shifted = analyzed_event
            .event
            .shifted_by_beats(window.record_offset_beats());
        let timing = classify(
            analyzed_event.alignment.deviation_ms,
            window.on_time_threshold_ms(),
        );
        if let Some(marker) = layout.marker(
            &shifted,
            MarkerKind::Performed(timing),
            PERFORMED_MARKER_WIDTH,
        ) {
            scene.markers.push(marker);
        }
    }

    scene
}

struct Layout {
    range: BeatRange,
    surface: SurfaceSize,
    note_height: f32,
    highest_pitch: i16,
}

impl Layout {
    fn x_for_relative_beat(&self, relative_beat: f64) -> f32 {
        (relative_beat / self.range.len()) as f32 * self.surface.drawable_width()
            + self.surface.left_margin()
    }

    fn marker(&self, event: &NoteEvent, kind: MarkerKind, width: f32) -> Option<NoteMarker> {
        if event.quarter_note_ticks == 0 {
            return None;
        }
        let relative_beat = event.start_beat() - self.range.start;
        // Culled, not clamped.
        if !(0.0..self.range.len()).contains(&relative_beat) {
            return None;
        }
        Some(NoteMarker {
            kind,
            pitch: event.pitch,
            x: self.x_for_relative_beat(relative_beat),
            y: (self.highest_pitch - event.pitch as i16) as f32 * self.note_height,
            width,
            height: self.note_height,
        })
    }
}

fn grid_lines(
    layout: &Layout,
    subdivisions: u32,
    time_signature: TimeSignature,
) -> Vec<GridLine> {
    let subdivisions = subdivisions.max(1);
    let per_measure = time_signature.numerator() * subdivisions;
    let count = (layout.range.len() * subdivisions as f64).floor() as u32;

    (0..=count)
        .map(|i| {
            let weight = if i % per_measure == 0 {
                LineWeight::Measure
            } else if i % subdivisions == 0 {
                LineWeight::Beat
            } else if subdivisions % 2 == 0 && i % (subdivisions / 2) == 0 {
                LineWeight::HalfBeat
            } else {
                LineWeight::Subdivision
            };
            let beat = i as f64 / subdivisions as f64;
            GridLine {
                index: i,
                x: layout.x_for_relative_beat(beat),
                weight,
            }
        })
        .collect()
}
