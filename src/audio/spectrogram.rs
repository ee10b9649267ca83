use rayon::prelude::*;
use rustfft::{num_complex::Complex, FftPlanner};

use super::features::Spectrogram;
use crate::error::{AnalysisError, Result};

/// Short-time magnitude spectrum of `samples`, keeping only bins at or below
/// `freq_cutoff` Hz.
///
/// Frames are `n_fft` samples long and start every `hop_length` samples. With
/// `center` set the signal is zero-padded by `n_fft / 2` on both sides so that
/// frame `t` is centred on sample `t * hop_length`.
pub fn compute_spectrogram(
    samples: &[f32],
    sample_rate: u32,
    n_fft: usize,
    hop_length: usize,
    freq_cutoff: f64,
    center: bool,
) -> Result<Spectrogram> {
    if n_fft == 0 {
        return Err(AnalysisError::invalid("n_fft", "must be greater than zero"));
    }
    if hop_length == 0 {
        return Err(AnalysisError::invalid("hop_length", "must be greater than zero"));
    }
    if sample_rate == 0 {
        return Err(AnalysisError::invalid("sample_rate", "must be greater than zero"));
    }
    if !freq_cutoff.is_finite() || freq_cutoff < 0.0 {
        return Err(AnalysisError::invalid(
            "freq_cutoff",
            format!("must be a non-negative frequency, got {}", freq_cutoff),
        ));
    }

    let pad = if center { n_fft / 2 } else { 0 };
    let padded_len = samples.len() + 2 * pad;
    if !center && samples.len() < n_fft {
        return Err(AnalysisError::SignalTooShort {
            samples: samples.len(),
            n_fft,
        });
    }
    let frame_count = 1 + padded_len.saturating_sub(n_fft) / hop_length;
    let bin_count = retained_bin_count(n_fft, sample_rate, freq_cutoff);

    log::debug!(
        "STFT: {} frames, n_fft={}, hop={}, keeping {}/{} bins (<= {:.1}Hz)",
        frame_count,
        n_fft,
        hop_length,
        bin_count,
        n_fft / 2 + 1,
        freq_cutoff
    );

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(n_fft);
    let window = hann_window(n_fft);
    let scratch_len = fft.get_inplace_scratch_len();

    let frames: Vec<Vec<f32>> = (0..frame_count)
        .into_par_iter()
        .map_init(
            || {
                (
                    vec![Complex::new(0.0f32, 0.0); n_fft],
                    vec![Complex::new(0.0f32, 0.0); scratch_len],
                )
            },
            |(buffer, scratch), frame_idx| {
                let start = frame_idx * hop_length;
                for (i, slot) in buffer.iter_mut().enumerate() {
                    // Index into the (virtually) padded signal
                    let sample = (start + i)
                        .checked_sub(pad)
                        .and_then(|idx| samples.get(idx))
                        .copied()
                        .unwrap_or(0.0);
                    *slot = Complex::new(sample * window[i], 0.0);
                }
                fft.process_with_scratch(buffer, scratch);
                buffer[..bin_count].iter().map(|c| c.norm()).collect()
            },
        )
        .collect();

    Ok(Spectrogram::from_frames(frames, bin_count, sample_rate, n_fft))
}

/// Number of real-transform bins whose center frequency is `<= freq_cutoff`.
///
/// Bin `k` sits at `k * sample_rate / n_fft`. A cutoff above Nyquist keeps all
/// `n_fft / 2 + 1` bins; a cutoff of zero keeps only the DC bin.
pub fn retained_bin_count(n_fft: usize, sample_rate: u32, freq_cutoff: f64) -> usize {
    let max_bin = n_fft / 2;
    let bin_freq = |k: usize| k as f64 * sample_rate as f64 / n_fft as f64;

    let estimate = (freq_cutoff.max(0.0) * n_fft as f64 / sample_rate as f64).floor();
    let mut k = if estimate >= max_bin as f64 {
        max_bin
    } else {
        estimate as usize
    };
    // Correct rounding in the estimate against the exact bin frequencies
    while k < max_bin && bin_freq(k + 1) <= freq_cutoff {
        k += 1;
    }
    while k > 0 && bin_freq(k) > freq_cutoff {
        k -= 1;
    }

    k + 1
}

/// Periodic Hann window, the usual choice for STFT analysis.
fn hann_window(size: usize) -> Vec<f32> {
    if size == 1 {
        return vec![1.0];
    }
    (0..size)
        .map(|i| {
            let phase = 2.0 * std::f64::consts::PI * i as f64 / size as f64;
            (0.5 - 0.5 * phase.cos()) as f32
        })
        .collect()
}
