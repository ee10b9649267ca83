use serde::Serialize;

/// Band-limited magnitude spectrogram, stored frame-major.
#[derive(Clone, Debug)]
pub struct Spectrogram {
    /// One magnitude vector per time frame, `bin_count` entries each (linear scale)
    frames: Vec<Vec<f32>>,
    bin_count: usize,
    pub sample_rate: u32,
    pub n_fft: usize,
}

impl Spectrogram {
    /// Wrap precomputed magnitudes. Every frame must hold `bin_count` values.
    pub fn from_frames(
        frames: Vec<Vec<f32>>,
        bin_count: usize,
        sample_rate: u32,
        n_fft: usize,
    ) -> Self {
        debug_assert!(frames.iter().all(|f| f.len() == bin_count));
        Self {
            frames,
            bin_count,
            sample_rate,
            n_fft,
        }
    }

    pub fn frames(&self) -> &[Vec<f32>] {
        &self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn bin_count(&self) -> usize {
        self.bin_count
    }

    /// Center frequency of retained bin `k` in Hz.
    pub fn bin_frequency(&self, k: usize) -> f64 {
        k as f64 * self.sample_rate as f64 / self.n_fft as f64
    }
}

/// First frame whose smoothed flux exceeded the threshold.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ChangePoint {
    pub frame: usize,
    /// Seconds from the start of the analysed buffer
    pub time: f64,
}

/// Threshold statistics and the outcome of the scan.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Detection {
    pub mean: f64,
    pub std_dev: f64,
    pub threshold: f64,
    /// `None` means no frame rose above the threshold
    pub change: Option<ChangePoint>,
}

/// Everything the pipeline hands back to its caller.
#[derive(Clone, Debug, Serialize)]
pub struct AnalysisReport {
    pub sample_rate: u32,
    pub hop_length: usize,
    pub frame_count: usize,
    pub bin_count: usize,
    pub smoothed_flux: Vec<f64>,
    pub detection: Detection,
}

impl AnalysisReport {
    pub fn change_time(&self) -> Option<f64> {
        self.detection.change.map(|c| c.time)
    }

    pub fn frame_time(&self, frame: usize) -> f64 {
        frame_to_time(frame, self.hop_length, self.sample_rate)
    }
}

/// `frame * hop_length / sample_rate`, in seconds.
pub fn frame_to_time(frame: usize, hop_length: usize, sample_rate: u32) -> f64 {
    frame as f64 * hop_length as f64 / sample_rate as f64
}
