//! Wavelet-domain audio denoising (VisuShrink / universal-threshold soft
//! shrinkage) with a chunked streaming pipeline and a noise-profile
//! extraction variant.

pub mod denoise;
pub mod shrink;
pub mod signal;
pub mod utils;
pub mod wav;
pub mod wavelet;

use thiserror::Error;

/// Errors surfaced by the denoising pipeline and its audio I/O.
///
/// A degraded decomposition (chunk too short for the requested level) is
/// deliberately not represented here: it is reported as a warning-level
/// diagnostic and processing continues.
#[derive(Error, Debug)]
pub enum DenoiseError {
    #[error("input not found: {0}")]
    InputNotFound(String),

    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("audio stream has no channels")]
    UnsupportedChannelLayout,

    #[error("wav error: {0}")]
    Wav(#[from] hound::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
const _EPSILON: f64 = 1e-12;
