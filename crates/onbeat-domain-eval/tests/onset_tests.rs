use onbeat_domain_eval::{detect_onsets, gain_to_db, OnsetConfig, OnsetError, OnsetScanner};
use onbeat_domain_score::ONSET_PITCH;
use onbeat_ports::source::DecodedAudio;
use onbeat_ports::types::Bpm;
use pretty_assertions::assert_eq;

const SAMPLE_RATE: u32 = 1000;

fn cfg(hit_distance_ms: f64) -> OnsetConfig {
    OnsetConfig {
        threshold_db: -20.0,
        hit_distance_ms,
        bpm: Bpm::new(120.0).unwrap(),
        quarter_note_ticks: 960,
    }
}

fn signal_with_peaks(len: usize, peaks: &[usize]) -> DecodedAudio {
    let mut samples = vec![0.0f32; len];
    for &p in peaks {
        samples[p] = 0.8;
        samples[p + 1] = -0.5;
    }
    DecodedAudio {
        sample_rate_hz: SAMPLE_RATE,
        channels: vec![samples],
    }
}

#[test]
fn peaks_closer_than_hit_distance_register_once() {
    let audio = signal_with_peaks(2000, &[100, 150]);
    let onsets = detect_onsets(&audio, cfg(100.0)).unwrap();
    assert_eq!(onsets.len(), 1);
}

#[test]
fn peaks_further_than_hit_distance_register_twice() {
    let audio = signal_with_peaks(2000, &[100, 400]);
    let onsets = detect_onsets(&audio, cfg(100.0)).unwrap();
    assert_eq!(onsets.len(), 2);
}

#[test]
fn onset_tick_follows_sample_time() {
    // Sample 500 at 1 kHz is 500 ms, one beat at 120 bpm.
    let audio = signal_with_peaks(2000, &[500]);
    let onsets = detect_onsets(&audio, cfg(100.0)).unwrap();

    assert_eq!(onsets.len(), 1);
    assert_eq!(onsets[0].tick_start, 960.0);
    assert_eq!(onsets[0].tick_end, onsets[0].tick_start);
    assert_eq!(onsets[0].pitch, ONSET_PITCH);
    assert_eq!(onsets[0].quarter_note_ticks, 960);
}

#[test]
fn first_qualifying_sample_always_registers() {
    let audio = signal_with_peaks(10, &[0]);
    let onsets = detect_onsets(&audio, cfg(1000.0)).unwrap();
    assert_eq!(onsets.len(), 1);
    assert_eq!(onsets[0].tick_start, 0.0);
}

fn single_sample_clicks(len: usize, clicks: &[usize]) -> DecodedAudio {
    let mut samples = vec![0.0f32; len];
    for &c in clicks {
        samples[c] = 1.0;
    }
    DecodedAudio {
        sample_rate_hz: SAMPLE_RATE,
        channels: vec![samples],
    }
}

#[test]
fn hit_distance_boundary_is_exclusive() {
    // 100 ms at 1 kHz is 100 samples; a hit exactly 100 samples later is suppressed.
    let exact = detect_onsets(&single_sample_clicks(1000, &[10, 110]), cfg(100.0)).unwrap();
    assert_eq!(exact.len(), 1);
    let past = detect_onsets(&single_sample_clicks(1000, &[10, 111]), cfg(100.0)).unwrap();
    assert_eq!(past.len(), 2);
}

#[test]
fn silence_produces_nothing() {
    let audio = DecodedAudio {
        sample_rate_hz: SAMPLE_RATE,
        channels: vec![vec![0.0; 5000]],
    };
    assert!(detect_onsets(&audio, cfg(50.0)).unwrap().is_empty());
    assert_eq!(gain_to_db(0.0), f32::NEG_INFINITY);
}

#[test]
fn only_channel_zero_is_scanned() {
    let mut audio = signal_with_peaks(1000, &[100]);
    audio.channels.push({
        let mut loud = vec![0.0f32; 1000];
        loud[700] = 1.0;
        loud
    });
    let onsets = detect_onsets(&audio, cfg(50.0)).unwrap();
    assert_eq!(onsets.len(), 1);
}

#[test]
fn chunked_scan_matches_single_pass() {
    let audio = signal_with_peaks(3000, &[5, 60, 240, 245, 900, 1999, 2100]);
    let whole = detect_onsets(&audio, cfg(100.0)).unwrap();

    let mut scanner = OnsetScanner::new(cfg(100.0), SAMPLE_RATE).unwrap();
    let mut chunked = Vec::new();
    for block in audio.channels[0].chunks(64) {
        scanner.push_block(block, &mut chunked);
    }
    assert_eq!(whole, chunked);
}

#[test]
fn missing_channels_or_rate_are_invalid_input() {
    let no_channels = DecodedAudio {
        sample_rate_hz: SAMPLE_RATE,
        channels: Vec::new(),
    };
    assert!(matches!(
        detect_onsets(&no_channels, cfg(10.0)),
        Err(OnsetError::InvalidInput(_))
    ));

    let no_rate = DecodedAudio {
        sample_rate_hz: 0,
        channels: vec![vec![1.0]],
    };
    assert!(matches!(
        detect_onsets(&no_rate, cfg(10.0)),
        Err(OnsetError::InvalidInput(_))
    ));
}
