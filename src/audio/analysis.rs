use serde::Serialize;

use super::decode::AudioData;
use super::detect::detect_change;
use super::features::AnalysisReport;
use super::flux::spectral_flux;
use super::smoothing::moving_average;
use super::spectrogram::compute_spectrogram;
use crate::error::{AnalysisError, Result};

pub const DEFAULT_N_FFT: usize = 2048;
pub const DEFAULT_HOP_LENGTH: usize = 512;
pub const DEFAULT_FREQ_CUTOFF: f64 = 1000.0;
pub const DEFAULT_SMOOTHING_WINDOW: usize = 5;
pub const DEFAULT_ALPHA: f64 = 2.0;

/// Numeric knobs for one analysis pass.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalysisParams {
    /// Transform window size in samples
    pub n_fft: usize,
    /// Samples between consecutive frames
    pub hop_length: usize,
    /// Highest retained frequency in Hz (inclusive)
    pub freq_cutoff: f64,
    /// Causal moving-average length in frames
    pub smoothing_window: usize,
    /// Standard deviations above the mean required to flag a change
    pub alpha: f64,
    /// Zero-pad so frames are centred on their hop position
    pub center: bool,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            n_fft: DEFAULT_N_FFT,
            hop_length: DEFAULT_HOP_LENGTH,
            freq_cutoff: DEFAULT_FREQ_CUTOFF,
            smoothing_window: DEFAULT_SMOOTHING_WINDOW,
            alpha: DEFAULT_ALPHA,
            center: true,
        }
    }
}

impl AnalysisParams {
    pub fn validate(&self) -> Result<()> {
        if self.n_fft == 0 {
            return Err(AnalysisError::invalid("n_fft", "must be greater than zero"));
        }
        if self.hop_length == 0 {
            return Err(AnalysisError::invalid("hop_length", "must be greater than zero"));
        }
        if self.smoothing_window == 0 {
            return Err(AnalysisError::invalid("smoothing_window", "must be at least 1"));
        }
        if !self.freq_cutoff.is_finite() || self.freq_cutoff < 0.0 {
            return Err(AnalysisError::invalid(
                "freq_cutoff",
                format!("must be a non-negative frequency, got {}", self.freq_cutoff),
            ));
        }
        if !self.alpha.is_finite() {
            return Err(AnalysisError::invalid(
                "alpha",
                format!("must be finite, got {}", self.alpha),
            ));
        }
        Ok(())
    }
}

/// Run the full pipeline: spectrogram, flux, smoothing, threshold.
pub fn analyze(audio: &AudioData, params: &AnalysisParams) -> Result<AnalysisReport> {
    params.validate()?;
    if audio.sample_rate == 0 {
        return Err(AnalysisError::invalid("sample_rate", "must be greater than zero"));
    }

    let nyquist = audio.sample_rate as f64 / 2.0;
    if params.freq_cutoff > nyquist {
        log::warn!(
            "Cutoff {:.1}Hz is above Nyquist ({:.1}Hz); using all bins",
            params.freq_cutoff,
            nyquist
        );
    }

    log::info!(
        "Spectrogram: n_fft={}, hop={}, cutoff={:.1}Hz",
        params.n_fft,
        params.hop_length,
        params.freq_cutoff
    );
    let spectrogram = compute_spectrogram(
        &audio.samples,
        audio.sample_rate,
        params.n_fft,
        params.hop_length,
        params.freq_cutoff,
        params.center,
    )?;

    log::info!(
        "Spectral flux over {} frames x {} bins (up to {:.1}Hz)...",
        spectrogram.frame_count(),
        spectrogram.bin_count(),
        spectrogram.bin_frequency(spectrogram.bin_count() - 1)
    );
    let flux = spectral_flux(&spectrogram);

    log::info!("Smoothing (window={})...", params.smoothing_window);
    let smoothed_flux = moving_average(&flux, params.smoothing_window)?;

    let detection = detect_change(
        &smoothed_flux,
        params.hop_length,
        audio.sample_rate,
        params.alpha,
    );

    match detection.change {
        Some(change) => log::info!(
            "Change at frame {} ({:.2}s), threshold={:.4}",
            change.frame,
            change.time,
            detection.threshold
        ),
        None => log::info!("No frame above threshold {:.4}", detection.threshold),
    }

    Ok(AnalysisReport {
        sample_rate: audio.sample_rate,
        hop_length: params.hop_length,
        frame_count: spectrogram.frame_count(),
        bin_count: spectrogram.bin_count(),
        smoothed_flux,
        detection,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn silence_then_tone(sample_rate: u32, silent_secs: f64, tone_secs: f64) -> AudioData {
        let silent = (silent_secs * sample_rate as f64) as usize;
        let loud = (tone_secs * sample_rate as f64) as usize;
        let mut samples = vec![0.0f32; silent];
        samples.extend((0..loud).map(|i| {
            let t = i as f64 / sample_rate as f64;
            (0.8 * (2.0 * std::f64::consts::PI * 440.0 * t).sin()) as f32
        }));
        AudioData {
            samples,
            sample_rate,
        }
    }

    #[test]
    fn detects_onset_after_silence() {
        let audio = silence_then_tone(22050, 3.0, 3.0);
        let report = analyze(&audio, &AnalysisParams::default()).unwrap();

        assert_eq!(report.frame_count, 1 + audio.samples.len() / DEFAULT_HOP_LENGTH);
        assert_eq!(report.smoothed_flux.len(), report.frame_count);
        assert_eq!(report.bin_count, 93);

        let time = report.change_time().expect("transition should be detected");
        // Centred frames start seeing the tone half a window early
        let window_secs = DEFAULT_N_FFT as f64 / 22050.0;
        assert!(
            (time - 3.0).abs() <= window_secs,
            "detected {:.3}s, expected ~3.0s",
            time
        );
    }

    #[test]
    fn reported_time_is_frame_times_hop_over_rate() {
        let audio = silence_then_tone(16000, 1.0, 1.0);
        let params = AnalysisParams {
            n_fft: 512,
            hop_length: 128,
            ..AnalysisParams::default()
        };
        let report = analyze(&audio, &params).unwrap();
        let change = report.detection.change.unwrap();
        assert!((change.time - change.frame as f64 * 128.0 / 16000.0).abs() < 1e-12);
        assert_eq!(report.frame_time(change.frame), change.time);
    }

    #[test]
    fn silence_has_no_change() {
        let audio = AudioData {
            samples: vec![0.0; 22050 * 2],
            sample_rate: 22050,
        };
        let report = analyze(&audio, &AnalysisParams::default()).unwrap();
        assert!(report.smoothed_flux.iter().all(|&f| f == 0.0));
        assert!(report.detection.change.is_none());
    }

    #[test]
    fn zero_cutoff_still_analyses_one_bin() {
        let audio = silence_then_tone(8000, 0.5, 0.5);
        let params = AnalysisParams {
            freq_cutoff: 0.0,
            ..AnalysisParams::default()
        };
        let report = analyze(&audio, &params).unwrap();
        assert_eq!(report.bin_count, 1);
    }

    #[test]
    fn rejects_invalid_parameters_before_computing() {
        let audio = AudioData {
            samples: vec![0.0; 100],
            sample_rate: 8000,
        };
        let cases = [
            (AnalysisParams { n_fft: 0, ..Default::default() }, "n_fft"),
            (AnalysisParams { hop_length: 0, ..Default::default() }, "hop_length"),
            (AnalysisParams { smoothing_window: 0, ..Default::default() }, "smoothing_window"),
            (AnalysisParams { freq_cutoff: -1.0, ..Default::default() }, "freq_cutoff"),
            (AnalysisParams { alpha: f64::NAN, ..Default::default() }, "alpha"),
        ];
        for (params, expected) in cases {
            match analyze(&audio, &params) {
                Err(AnalysisError::InvalidParameter { name, .. }) => assert_eq!(name, expected),
                other => panic!("expected InvalidParameter({}), got {:?}", expected, other),
            }
        }
    }

    #[test]
    fn zero_sample_rate_is_rejected() {
        let audio = AudioData {
            samples: vec![0.0; 100],
            sample_rate: 0,
        };
        assert!(matches!(
            analyze(&audio, &AnalysisParams::default()),
            Err(AnalysisError::InvalidParameter { name: "sample_rate", .. })
        ));
    }
}
