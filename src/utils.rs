//! Mixing helpers and signal-quality metrics.

/// Mix clean signal with noise, scaling noise by `noise_level`.
pub fn add_noise(signal: &[f64], noise: &[f64], noise_level: f64) -> Vec<f64> {
    signal
        .iter()
        .zip(noise.iter())
        .map(|(s, n)| s + n * noise_level)
        .collect()
}

/// Scale a signal so its peak magnitude equals `amplitude`.
/// A silent signal is returned unchanged.
pub fn peak_normalize(signal: &[f64], amplitude: f64) -> Vec<f64> {
    let peak = signal.iter().fold(0.0_f64, |max, &s| max.max(s.abs()));
    if peak == 0.0 {
        return signal.to_vec();
    }
    signal.iter().map(|s| s / peak * amplitude).collect()
}

/// Computes the mean squared error (MSE) between two signals.
pub fn mean_square_error(signal1: &[f64], signal2: &[f64]) -> f64 {
    signal1
        .iter()
        .zip(signal2.iter())
        .map(|(s1, s2)| (s1 - s2) * (s1 - s2))
        .sum::<f64>()
        / signal1.len() as f64
}

/// Compute the linear signal-to-noise ratio between a clean reference and a
/// processed signal: SNR = P_clean / P_residual, residual = clean - processed.
///
/// If the inputs have different lengths, both are cut to the shorter one.
pub fn sig_to_noise_ratio(clean: &[f64], processed: &[f64]) -> f64 {
    let len = clean.len().min(processed.len());
    let clean = &clean[..len];
    let processed = &processed[..len];

    let pow_signal = clean.iter().map(|&x| x * x).sum::<f64>();
    let pow_error = clean
        .iter()
        .zip(processed.iter())
        .map(|(&d, &pd)| (d - pd).powi(2))
        .sum::<f64>();
    if pow_error == 0.0 {
        return f64::INFINITY;
    }
    pow_signal / pow_error
}

/// SNR in decibels: 10 * log10(linear SNR).
fn sig_to_noise_ratio_db(clean: &[f64], processed: &[f64]) -> f64 {
    let snr = sig_to_noise_ratio(clean, processed);
    10.0 * snr.log10()
}

/// Improvement in SNR (dB) from a noisy input to a processed output,
/// relative to a clean reference.
pub fn snr_improvement_db(clean: &[f64], noisy: &[f64], processed: &[f64]) -> f64 {
    let snr_in = sig_to_noise_ratio_db(clean, noisy);
    let snr_out = sig_to_noise_ratio_db(clean, processed);
    snr_out - snr_in
}

/// Linear improvement in SNR (ratio) from a noisy input to a processed output.
pub fn snr_improvement(clean: &[f64], noisy: &[f64], processed: &[f64]) -> f64 {
    let snr_in = sig_to_noise_ratio(clean, noisy);
    let snr_out = sig_to_noise_ratio(clean, processed);
    if snr_in == 0.0 {
        return f64::INFINITY;
    }
    snr_out / snr_in
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::_EPSILON;
    use float_cmp::approx_eq;

    #[test]
    fn test_add_noise_scales() {
        let mixed = add_noise(&[1.0, 2.0], &[0.5, -0.5], 2.0);
        assert_eq!(mixed, vec![2.0, 1.0]);
    }

    #[test]
    fn test_peak_normalize() {
        let out = peak_normalize(&[0.5, -2.0, 1.0], 0.8);
        assert!(approx_eq!(f64, out[1], -0.8, epsilon = _EPSILON));
        let silent = peak_normalize(&[0.0, 0.0], 0.8);
        assert_eq!(silent, vec![0.0, 0.0]);
    }

    #[test]
    fn test_snr_identical_signals_is_infinite() {
        let sig = vec![0.3, -0.7, 0.2];
        assert!(sig_to_noise_ratio(&sig, &sig).is_infinite());
    }

    #[test]
    fn test_mse_known_value() {
        let mse = mean_square_error(&[1.0, 2.0, 3.0], &[1.0, 0.0, 3.0]);
        assert!(approx_eq!(f64, mse, 4.0 / 3.0, epsilon = _EPSILON));
    }
}
