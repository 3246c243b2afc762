//! Noise estimation and coefficient shrinkage for VisuShrink denoising.
//!
//! The noise level is estimated from the finest detail band with the median
//! absolute deviation, and the universal threshold of Donoho & Johnstone
//! (`sigma * sqrt(2 ln N)`) drives elementwise soft thresholding.

use crate::wavelet::WaveletDecomposition;

/// 75th percentile of the standard normal distribution. Dividing the MAD by
/// this constant makes it a consistent estimator of the standard deviation
/// for Gaussian noise.
const MAD_TO_SIGMA: f64 = 0.6744897501960817;

fn median(values: &mut Vec<f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) / 2.0
    }
}

/// Median absolute deviation: a robust estimator of spread.
/// Returns 0.0 for an empty slice.
pub fn mad(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let med = median(&mut values.to_vec());
    let mut deviations: Vec<f64> = values.iter().map(|v| (v - med).abs()).collect();
    median(&mut deviations)
}

/// Estimate the universal (VisuShrink) threshold from the finest-level
/// detail coefficients and the number of samples in the processing unit.
///
/// `sigma = mad / 0.6745` (MAD normalized to sigma), then
/// `threshold = sigma * sqrt(2 ln sample_count)`.
///
/// With `sample_count <= 1` the logarithm degenerates, so the threshold is
/// defined as 0.0 (no shrinkage). Pure and deterministic.
pub fn universal_threshold(finest_details: &[f64], sample_count: usize) -> f64 {
    if sample_count <= 1 {
        return 0.0;
    }
    let sigma = mad(finest_details) / MAD_TO_SIGMA;
    sigma * (2.0 * (sample_count as f64).ln()).sqrt()
}

/// Elementwise soft thresholding:
/// `out[i] = sign(c[i]) * max(|c[i]| - threshold, 0)`.
///
/// The output has the same length as the input, and every element is either
/// zero or keeps the sign of its input.
pub fn soft_threshold(coeffs: &[f64], threshold: f64) -> Vec<f64> {
    coeffs
        .iter()
        .map(|&c| c.signum() * (c.abs() - threshold).max(0.0))
        .collect()
}

/// Apply one threshold to every detail level of a decomposition, finest to
/// coarsest. The approximation band is never thresholded.
pub fn shrink_details(decomp: &mut WaveletDecomposition, threshold: f64) {
    for detail in &mut decomp.details {
        *detail = soft_threshold(detail, threshold);
    }
}
