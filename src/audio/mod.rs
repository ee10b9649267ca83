pub mod analysis;
pub mod decode;
pub mod detect;
pub mod features;
pub mod flux;
pub mod smoothing;
pub mod spectrogram;
