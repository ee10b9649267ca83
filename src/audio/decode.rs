use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::{AnalysisError, InputError};

/// Mono PCM at the file's native sample rate.
#[derive(Clone, Debug)]
pub struct AudioData {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioData {
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Decode `path` to mono samples, keeping at most `max_duration` seconds.
pub fn decode_audio(path: &Path, max_duration: Option<f64>) -> Result<AudioData, AnalysisError> {
    decode_inner(path, max_duration).map_err(|source| AnalysisError::InputUnavailable {
        path: path.to_path_buf(),
        source,
    })
}

fn decode_inner(path: &Path, max_duration: Option<f64>) -> Result<AudioData, InputError> {
    let file = std::fs::File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(InputError::NoTrack)?;

    let track_id = track.id;
    let channels = track.codec_params.channels.map_or(1, |c| c.count()).max(1);
    let sample_rate = track
        .codec_params
        .sample_rate
        .filter(|&sr| sr > 0)
        .ok_or(InputError::UnknownSampleRate)?;

    let limit = max_duration.map(|secs| (secs.max(0.0) * sample_rate as f64).round() as usize);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())?;

    let mut all_samples: Vec<f32> = Vec::new();

    loop {
        if limit.is_some_and(|max| all_samples.len() >= max) {
            break;
        }

        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(msg)) => {
                log::debug!("Skipping undecodable packet: {}", msg);
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let spec = *decoded.spec();
        let num_frames = decoded.frames();

        let mut sample_buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);

        let samples = sample_buf.samples();

        // Downmix to mono
        if channels == 1 {
            all_samples.extend_from_slice(samples);
        } else {
            all_samples.extend(
                samples
                    .chunks(channels)
                    .map(|frame| frame.iter().sum::<f32>() / channels as f32),
            );
        }
    }

    if let Some(max) = limit {
        all_samples.truncate(max);
    }

    if all_samples.is_empty() {
        return Err(InputError::Empty);
    }

    let audio = AudioData {
        samples: all_samples,
        sample_rate,
    };

    log::info!(
        "Decoded audio: {} samples, {}Hz, {:.1}s",
        audio.samples.len(),
        audio.sample_rate,
        audio.duration()
    );

    Ok(audio)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_wav(name: &str, channels: u16, sample_rate: u32, frames: &[Vec<f32>]) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "introflux-{}-{}.wav",
            std::process::id(),
            name
        ));
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for frame in frames {
            for &s in frame {
                writer.write_sample(s).unwrap();
            }
        }
        writer.finalize().unwrap();
        path
    }

    #[test]
    fn decodes_mono_wav() {
        let frames: Vec<Vec<f32>> = (0..4000).map(|i| vec![(i % 100) as f32 / 200.0]).collect();
        let path = write_wav("mono", 1, 8000, &frames);

        let audio = decode_audio(&path, None).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(audio.sample_rate, 8000);
        assert_eq!(audio.samples.len(), 4000);
        assert!((audio.samples[10] - 0.05).abs() < 1e-6);
        assert!((audio.duration() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn downmixes_stereo_by_averaging() {
        let frames: Vec<Vec<f32>> = (0..1000).map(|_| vec![0.5, -0.1]).collect();
        let path = write_wav("stereo", 2, 8000, &frames);

        let audio = decode_audio(&path, None).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(audio.samples.len(), 1000);
        assert!(audio.samples.iter().all(|&s| (s - 0.2).abs() < 1e-6));
    }

    #[test]
    fn respects_max_duration() {
        let frames: Vec<Vec<f32>> = (0..16000).map(|_| vec![0.25]).collect();
        let path = write_wav("limited", 1, 8000, &frames);

        let audio = decode_audio(&path, Some(0.5)).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(audio.samples.len(), 4000);
    }

    #[test]
    fn missing_file_is_input_unavailable() {
        let path = std::env::temp_dir().join("introflux-does-not-exist.wav");
        let err = decode_audio(&path, None).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InputUnavailable {
                source: InputError::Io(_),
                ..
            }
        ));
    }

    #[test]
    fn garbage_file_is_input_unavailable() {
        let path = std::env::temp_dir().join(format!("introflux-{}-junk.wav", std::process::id()));
        std::fs::write(&path, b"definitely not audio data").unwrap();

        let err = decode_audio(&path, None).unwrap_err();
        std::fs::remove_file(&path).ok();

        assert!(matches!(err, AnalysisError::InputUnavailable { .. }));
    }
}
