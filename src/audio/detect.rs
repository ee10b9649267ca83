use super::features::{frame_to_time, ChangePoint, Detection};

/// Find the first frame whose smoothed flux rises strictly above
/// `mean + alpha * std_dev` of the whole sequence.
///
/// The statistics cover every frame, including those after the reported one,
/// so this only works on a complete buffer.
pub fn detect_change(
    smoothed_flux: &[f64],
    hop_length: usize,
    sample_rate: u32,
    alpha: f64,
) -> Detection {
    if smoothed_flux.is_empty() {
        return Detection {
            mean: 0.0,
            std_dev: 0.0,
            threshold: 0.0,
            change: None,
        };
    }

    let (mean, std_dev) = mean_and_std(smoothed_flux);
    let threshold = mean + alpha * std_dev;

    let change = smoothed_flux
        .iter()
        .position(|&value| value > threshold)
        .map(|frame| ChangePoint {
            frame,
            time: frame_to_time(frame, hop_length, sample_rate),
        });

    log::debug!(
        "Threshold: mean={:.4}, std={:.4}, alpha={:.2} -> {:.4}",
        mean,
        std_dev,
        alpha,
        threshold
    );

    Detection {
        mean,
        std_dev,
        threshold,
        change,
    }
}

/// Arithmetic mean and population standard deviation.
fn mean_and_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}
