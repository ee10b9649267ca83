use crate::error::{AnalysisError, Result};

/// Causal moving average: each output is the mean of the last `window`
/// inputs up to and including the current one. Early frames average over
/// whatever history exists.
pub fn moving_average(values: &[f64], window: usize) -> Result<Vec<f64>> {
    if window == 0 {
        return Err(AnalysisError::invalid(
            "smoothing_window",
            "must be at least 1",
        ));
    }

    let smoothed = (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let span = &values[start..=i];
            span.iter().sum::<f64>() / span.len() as f64
        })
        .collect();

    Ok(smoothed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_of_one_is_identity() {
        let values = vec![0.1, 3.7, 0.0, 12.25, 1e-9, 5.5];
        assert_eq!(moving_average(&values, 1).unwrap(), values);
    }

    #[test]
    fn preserves_length() {
        let values: Vec<f64> = (0..37).map(|i| i as f64).collect();
        for window in [1, 2, 5, 36, 37, 100] {
            assert_eq!(moving_average(&values, window).unwrap().len(), values.len());
        }
    }

    #[test]
    fn early_frames_use_partial_window() {
        let smoothed = moving_average(&[2.0, 4.0, 6.0, 8.0], 3).unwrap();
        assert_eq!(smoothed, vec![2.0, 3.0, 4.0, 6.0]);
    }

    #[test]
    fn isolated_spike_spreads_forward_only() {
        let m = 10.0;
        let window = 4;
        let mut values = vec![0.0; 12];
        values[6] = m;

        let smoothed = moving_average(&values, window).unwrap();
        for (i, &v) in smoothed.iter().enumerate() {
            if (6..6 + window).contains(&i) {
                assert!((v - m / window as f64).abs() < 1e-12);
                assert!(v <= m);
            } else {
                assert_eq!(v, 0.0, "frame {} should not see the spike", i);
            }
        }
    }

    #[test]
    fn zero_window_is_rejected() {
        assert!(matches!(
            moving_average(&[1.0], 0),
            Err(AnalysisError::InvalidParameter {
                name: "smoothing_window",
                ..
            })
        ));
    }

    #[test]
    fn empty_input() {
        assert!(moving_average(&[], 5).unwrap().is_empty());
    }
}
