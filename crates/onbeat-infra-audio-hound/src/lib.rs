use hound::{SampleFormat, WavReader};
use log::debug;
use onbeat_ports::source::{AudioSourcePort, DecodedAudio, SourceError};
use std::io::Read;
use std::path::Path;

/// Decodes PCM and float WAV files.
#[derive(Clone, Copy, Debug, Default)]
pub struct HoundAudioSource;

impl AudioSourcePort for HoundAudioSource {
    fn read_audio(&self, path: &Path) -> Result<DecodedAudio, SourceError> {
        let reader = WavReader::open(path).map_err(source_error)?;
        let audio = decode_wav(reader)?;
        debug!(
            "read '{}': {} channels, {} frames at {} Hz",
            path.display(),
            audio.num_channels(),
            audio.num_frames(),
            audio.sample_rate_hz
        );
        Ok(audio)
    }
}

/// Reads every sample, scales integer formats to [-1, 1) and splits the
/// interleaved stream into one buffer per channel.
pub fn decode_wav<R: Read>(mut reader: WavReader<R>) -> Result<DecodedAudio, SourceError> {
    let spec = reader.spec();
    let channel_count = usize::from(spec.channels);
    if channel_count == 0 {
        return Err(SourceError::UnsupportedFormat(
            "wav header declares no channels".to_string(),
        ));
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(source_error)?,
        SampleFormat::Int => {
            let full_scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / full_scale))
                .collect::<Result<_, _>>()
                .map_err(source_error)?
        }
    };

    let frames = interleaved.len() / channel_count;
    let mut channels = vec![Vec::with_capacity(frames); channel_count];
    for frame in interleaved.chunks_exact(channel_count) {
        for (channel, sample) in channels.iter_mut().zip(frame) {
            channel.push(*sample);
        }
    }

    Ok(DecodedAudio {
        sample_rate_hz: spec.sample_rate,
        channels,
    })
}

fn source_error(err: hound::Error) -> SourceError {
    match err {
        hound::Error::IoError(e) => SourceError::Io(e.to_string()),
        hound::Error::Unsupported => {
            SourceError::UnsupportedFormat("unsupported wav encoding".to_string())
        }
        other => SourceError::Decode(other.to_string()),
    }
}
