const SHARP_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

// General MIDI percussion key map, keys 35..=81.
const PERCUSSION_NAMES: [&str; 47] = [
    "Acoustic Bass Drum",
    "Bass Drum 1",
    "Side Stick",
    "Acoustic Snare",
    "Hand Clap",
    "Electric Snare",
    "Low Floor Tom",
    "Closed Hi-Hat",
    "High Floor Tom",
    "Pedal Hi-Hat",
    "Low Tom",
    "Open Hi-Hat",
    "Low-Mid Tom",
    "Hi-Mid Tom",
    "Crash Cymbal 1",
    "High Tom",
    "Ride Cymbal 1",
    "Chinese Cymbal",
    "Ride Bell",
    "Tambourine",
    "Splash Cymbal",
    "Cowbell",
    "Crash Cymbal 2",
    "Vibraslap",
    "Ride Cymbal 2",
    "Hi Bongo",
    "Low Bongo",
    "Mute Hi Conga",
    "Open Hi Conga",
    "Low Conga",
    "High Timbale",
    "Low Timbale",
    "High Agogo",
    "Low Agogo",
    "Cabasa",
    "Maracas",
    "Short Whistle",
    "Long Whistle",
    "Short Guiro",
    "Long Guiro",
    "Claves",
    "Hi Wood Block",
    "Low Wood Block",
    "Mute Cuica",
    "Open Cuica",
    "Mute Triangle",
    "Open Triangle",
];

const FIRST_PERCUSSION_KEY: u8 = 35;

/// Pitch name with sharps, middle C (60) is `C4`.
pub fn note_name(pitch: u8) -> String {
    let octave = pitch as i32 / 12 - 1;
    format!("{}{}", SHARP_NAMES[pitch as usize % 12], octave)
}

pub fn percussion_name(pitch: u8) -> Option<&'static str> {
    let idx = pitch.checked_sub(FIRST_PERCUSSION_KEY)? as usize;
    PERCUSSION_NAMES.get(idx).copied()
}

pub fn display_name(pitch: u8, rhythm_instrument: bool) -> String {
    if rhythm_instrument {
        if let Some(name) = percussion_name(pitch) {
            return name.to_string();
        }
    }
    note_name(pitch)
}
