use midly::num::{u28, u4, u7};
use midly::{
    Format, Fps, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind,
};
use onbeat_domain_score::{decode_midi_bytes, ReferenceSet};
use onbeat_ports::source::DecodedNote;
use pretty_assertions::assert_eq;

fn build_midi(tracks: Vec<Vec<TrackEvent<'static>>>) -> Vec<u8> {
    let format = if tracks.len() > 1 {
        Format::Parallel
    } else {
        Format::SingleTrack
    };
    let smf = Smf {
        header: Header {
            format,
            timing: Timing::Metrical(480.into()),
        },
        tracks,
    };
    let mut data = Vec::new();
    smf.write(&mut data).expect("midi write should succeed");
    data
}

fn on(delta: u32, key: u8) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(delta),
        kind: TrackEventKind::Midi {
            channel: u4::new(0),
            message: MidiMessage::NoteOn {
                key: u7::new(key),
                vel: u7::new(100),
            },
        },
    }
}

fn off(delta: u32, key: u8) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(delta),
        kind: TrackEventKind::Midi {
            channel: u4::new(0),
            message: MidiMessage::NoteOff {
                key: u7::new(key),
                vel: u7::new(64),
            },
        },
    }
}

fn end() -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    }
}

fn decoded(pitch: u8, start: f64, end: f64) -> DecodedNote {
    DecodedNote {
        pitch,
        start_tick: start,
        end_tick: end,
    }
}

#[test]
fn pairs_note_on_with_note_off() {
    let midi = build_midi(vec![vec![on(0, 60), off(240, 60), on(240, 62), off(480, 62), end()]]);
    let seq = decode_midi_bytes(&midi).expect("decode should succeed");

    assert_eq!(seq.quarter_note_ticks, 480);
    assert_eq!(
        seq.notes,
        vec![decoded(60, 0.0, 240.0), decoded(62, 480.0, 960.0)]
    );
}

#[test]
fn zero_velocity_note_on_closes_the_note() {
    let zero_vel = TrackEvent {
        delta: u28::new(120),
        kind: TrackEventKind::Midi {
            channel: u4::new(0),
            message: MidiMessage::NoteOn {
                key: u7::new(64),
                vel: u7::new(0),
            },
        },
    };
    let midi = build_midi(vec![vec![on(0, 64), zero_vel, end()]]);
    let seq = decode_midi_bytes(&midi).unwrap();
    assert_eq!(seq.notes, vec![decoded(64, 0.0, 120.0)]);
}

#[test]
fn unpaired_note_has_zero_length() {
    let midi = build_midi(vec![vec![on(100, 36), end()]]);
    let seq = decode_midi_bytes(&midi).unwrap();
    assert_eq!(seq.notes, vec![decoded(36, 100.0, 100.0)]);
}

#[test]
fn retriggered_key_closes_previous_note() {
    let midi = build_midi(vec![vec![on(0, 60), on(480, 60), off(480, 60), end()]]);
    let seq = decode_midi_bytes(&midi).unwrap();
    assert_eq!(
        seq.notes,
        vec![decoded(60, 0.0, 480.0), decoded(60, 480.0, 960.0)]
    );
}

#[test]
fn tracks_are_merged_in_time_order() {
    let midi = build_midi(vec![
        vec![on(480, 60), off(10, 60), end()],
        vec![on(0, 38), off(10, 38), on(950, 42), off(10, 42), end()],
    ]);
    let seq = decode_midi_bytes(&midi).unwrap();
    let starts: Vec<(u8, f64)> = seq.notes.iter().map(|n| (n.pitch, n.start_tick)).collect();
    assert_eq!(starts, vec![(38, 0.0), (60, 480.0), (42, 960.0)]);

    let set = ReferenceSet::build(&seq).unwrap();
    assert!(!set.was_reordered());
}

#[test]
fn garbage_bytes_fail_to_parse() {
    assert!(decode_midi_bytes(b"not a midi file").is_err());
}

#[test]
fn timecode_second_reads_as_one_quarter_note() {
    let smf = Smf {
        header: Header {
            format: Format::SingleTrack,
            timing: Timing::Timecode(Fps::Fps25, 40),
        },
        tracks: vec![vec![on(1000, 38), off(500, 38), end()]],
    };
    let mut midi = Vec::new();
    smf.write(&mut midi).expect("midi write should succeed");

    let seq = decode_midi_bytes(&midi).expect("decode should succeed");

    assert_eq!(seq.quarter_note_ticks, 1000);
    assert_eq!(seq.notes, vec![decoded(38, 1000.0, 1500.0)]);
}
