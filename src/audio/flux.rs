use super::features::Spectrogram;

/// Spectral flux per frame: the L1 distance between each frame's magnitudes
/// and the previous frame's. Frame 0 has no predecessor and is always 0.
///
/// Both rising and falling energy count, so a track dropping out registers as
/// strongly as one coming in.
pub fn spectral_flux(spectrogram: &Spectrogram) -> Vec<f64> {
    let frames = spectrogram.frames();
    let mut flux = vec![0.0f64; frames.len()];

    for i in 1..frames.len() {
        flux[i] = frames[i]
            .iter()
            .zip(frames[i - 1].iter())
            .map(|(&cur, &prev)| (cur as f64 - prev as f64).abs())
            .sum();
    }

    flux
}
