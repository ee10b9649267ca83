use std::path::PathBuf;
use thiserror::Error;

/// Why the decoder could not produce a sample buffer.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("cannot open file: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported or corrupt audio: {0}")]
    Codec(#[from] symphonia::core::errors::Error),
    #[error("no audio tracks found")]
    NoTrack,
    #[error("unknown sample rate")]
    UnknownSampleRate,
    #[error("decoded stream contains no samples")]
    Empty,
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("audio input unavailable ({}): {source}", .path.display())]
    InputUnavailable {
        path: PathBuf,
        #[source]
        source: InputError,
    },

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("signal has {samples} samples, fewer than one {n_fft}-sample frame")]
    SignalTooShort { samples: usize, n_fft: usize },
}

impl AnalysisError {
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = AnalysisError> = std::result::Result<T, E>;
