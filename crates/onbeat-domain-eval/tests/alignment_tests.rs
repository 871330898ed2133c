use onbeat_domain_eval::{align, AlignmentConfig};
use onbeat_domain_score::{NoteEvent, ReferenceSet};
use onbeat_ports::types::Bpm;
use pretty_assertions::assert_eq;

fn reference_at(ticks: &[f64]) -> ReferenceSet {
    let events = ticks
        .iter()
        .map(|&t| NoteEvent::new(60, t, t, 960).unwrap())
        .collect();
    ReferenceSet::from_events(events).unwrap()
}

fn performed(tick: f64) -> NoteEvent {
    NoteEvent::onset(tick, 960)
}

fn cfg(offset: f64) -> AlignmentConfig {
    AlignmentConfig {
        bpm: Bpm::new(120.0).unwrap(),
        record_offset_beats: offset,
    }
}

#[test]
fn slightly_early_note_matches_nearest_reference() {
    let reference = reference_at(&[0.0, 960.0, 1920.0]);
    let outcome = align(&reference, &[performed(950.0)], cfg(0.0));

    assert!(outcome.rejected.is_empty());
    let alignment = outcome.analyzed[0].alignment;
    assert_eq!(alignment.reference_index, 1);
    assert_eq!(alignment.deviation_ms, -5.0);
}

#[test]
fn late_note_has_positive_deviation() {
    let reference = reference_at(&[0.0, 960.0, 1920.0]);
    let outcome = align(&reference, &[performed(1968.0)], cfg(0.0));
    assert_eq!(outcome.analyzed[0].alignment.reference_index, 2);
    assert_eq!(outcome.analyzed[0].alignment.deviation_ms, 25.0);
}

#[test]
fn equidistant_note_matches_lower_index() {
    let reference = reference_at(&[0.0, 960.0, 1920.0]);
    let outcome = align(&reference, &[performed(480.0), performed(1440.0)], cfg(0.0));

    assert_eq!(outcome.analyzed[0].alignment.reference_index, 0);
    assert_eq!(outcome.analyzed[0].alignment.deviation_ms, 250.0);
    assert_eq!(outcome.analyzed[1].alignment.reference_index, 1);
}

#[test]
fn simultaneous_references_keep_first_encountered() {
    let reference = ReferenceSet::from_events(vec![
        NoteEvent::new(36, 960.0, 960.0, 960).unwrap(),
        NoteEvent::new(42, 960.0, 960.0, 960).unwrap(),
    ])
    .unwrap();
    let outcome = align(&reference, &[performed(970.0)], cfg(0.0));
    assert_eq!(outcome.analyzed[0].alignment.reference_index, 0);
}

#[test]
fn record_offset_shifts_performance() {
    let reference = reference_at(&[0.0, 3840.0, 4800.0]);
    // Recording started at beat 4, so the performed beat 0 is reference beat 4.
    let outcome = align(&reference, &[performed(10.0)], cfg(4.0));
    assert_eq!(outcome.analyzed[0].alignment.reference_index, 1);
    assert_eq!(outcome.analyzed[0].alignment.deviation_ms, 5.0);
    assert_eq!(outcome.analyzed[0].event.tick_start, 10.0);
}

#[test]
fn different_resolutions_compare_in_milliseconds() {
    let reference = reference_at(&[0.0, 960.0]);
    let outcome = align(&reference, &[NoteEvent::onset(484.0, 480)], cfg(0.0));
    let alignment = outcome.analyzed[0].alignment;
    assert_eq!(alignment.reference_index, 1);
    // 484 / 480 * 500 = 504.17 -> 504
    assert_eq!(alignment.deviation_ms, 4.0);
}

#[test]
fn zero_resolution_event_is_excluded() {
    let reference = reference_at(&[0.0, 960.0]);
    let bad = NoteEvent {
        pitch: 60,
        tick_start: 10.0,
        tick_end: 10.0,
        quarter_note_ticks: 0,
    };
    let outcome = align(&reference, &[performed(0.0), bad, performed(960.0)], cfg(0.0));

    assert_eq!(outcome.analyzed.len(), 2);
    assert_eq!(outcome.rejected.len(), 1);
    assert_eq!(outcome.rejected[0].index, 1);
}

#[test]
fn performed_order_does_not_change_matches() {
    let reference = reference_at(&[0.0, 960.0, 1920.0]);
    let forward = align(&reference, &[performed(100.0), performed(1900.0)], cfg(0.0));
    let backward = align(&reference, &[performed(1900.0), performed(100.0)], cfg(0.0));
    assert_eq!(forward.analyzed[0].alignment, backward.analyzed[1].alignment);
    assert_eq!(forward.analyzed[1].alignment, backward.analyzed[0].alignment);
}
