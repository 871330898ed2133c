use log::debug;
use midly::{Fps, MidiMessage, Smf, Timing, TrackEventKind};
use onbeat_ports::source::{DecodedNote, DecodedNoteSequence};
use onbeat_ports::types::Tick;
use std::collections::HashMap;

#[derive(thiserror::Error, Debug)]
pub enum MidiImportError {
    #[error("parse error: {0}")]
    Parse(String),
}

/// Decodes a standard MIDI file into paired notes, all tracks merged.
pub fn decode_midi_bytes(data: &[u8]) -> Result<DecodedNoteSequence, MidiImportError> {
    let smf = Smf::parse(data).map_err(|e| MidiImportError::Parse(e.to_string()))?;
    let quarter_note_ticks = match smf.header.timing {
        Timing::Metrical(ticks) => ticks.as_int() as u32,
        Timing::Timecode(fps, ticks_per_frame) => timecode_ticks_per_second(fps, ticks_per_frame),
    };

    let mut notes: Vec<DecodedNote> = Vec::new();
    for track in &smf.tracks {
        let mut pairing = NotePairing::default();
        let mut tick: u64 = 0;
        for event in track {
            tick += event.delta.as_int() as u64;
            let TrackEventKind::Midi { channel, message } = &event.kind else {
                continue;
            };
            let channel = channel.as_int();
            match message {
                MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                    pairing.note_on(channel, key.as_int(), tick, &mut notes);
                }
                MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                    pairing.note_off(channel, key.as_int(), tick, &mut notes);
                }
                _ => {}
            }
        }
        pairing.close_dangling(&mut notes);
    }

    notes.sort_by(|a, b| {
        a.start_tick
            .total_cmp(&b.start_tick)
            .then_with(|| a.pitch.cmp(&b.pitch))
    });
    debug!(
        "decoded {} notes from {} tracks at {} ticks per quarter",
        notes.len(),
        smf.tracks.len(),
        quarter_note_ticks
    );

    Ok(DecodedNoteSequence {
        quarter_note_ticks,
        notes,
    })
}

#[derive(Default)]
struct NotePairing {
    open: HashMap<(u8, u8), u64>,
}

impl NotePairing {
    fn note_on(&mut self, channel: u8, note: u8, tick: u64, out: &mut Vec<DecodedNote>) {
        // A retriggered key ends the note that is still sounding.
        if let Some(start) = self.open.insert((channel, note), tick) {
            out.push(decoded(note, start, tick));
        }
    }

    fn note_off(&mut self, channel: u8, note: u8, tick: u64, out: &mut Vec<DecodedNote>) {
        if let Some(start) = self.open.remove(&(channel, note)) {
            out.push(decoded(note, start, tick));
        }
    }

    fn close_dangling(&mut self, out: &mut Vec<DecodedNote>) {
        for ((_, note), start) in self.open.drain() {
            out.push(decoded(note, start, start));
        }
    }
}

fn decoded(pitch: u8, start: u64, end: u64) -> DecodedNote {
    DecodedNote {
        pitch,
        start_tick: start as Tick,
        end_tick: end as Tick,
    }
}

// Timecode ticks are wall-clock time. One second is read as one quarter note, so the
// decoded beat positions equal real time only at 60 bpm.
fn timecode_ticks_per_second(fps: Fps, ticks_per_frame: u8) -> u32 {
    let ticks_per_frame = ticks_per_frame.max(1) as u32;
    let frames = match fps {
        Fps::Fps24 => 24,
        Fps::Fps25 => 25,
        Fps::Fps29 | Fps::Fps30 => 30,
    };
    frames * ticks_per_frame
}
