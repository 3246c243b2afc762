//! Synthetic signal generation for demos, mixing and tests.

use rand::{distributions::Uniform, thread_rng, Rng};
use rand_distr::{Distribution, Normal};
use std::f64::consts::PI;

/// Signal types
#[derive(Clone, Copy, Debug)]
pub enum SignalType {
    WhiteNoise,      // Uniform white noise in [-1, 1]
    Gaussian(f64),   // Additive white Gaussian noise, peak-scaled to the given amplitude
    Sinusoidal(f64), // Sinusoidal signal with given frequency (Hz)
    Chirp(f64, f64), // Linear chirp from f1 to f2
}

/// Generates uniform white noise
fn generate_white_noise(len: usize) -> Vec<f64> {
    let mut rng = thread_rng();
    let uniform = Uniform::from(-1.0..1.0);
    (0..len).map(|_| rng.sample(uniform)).collect()
}

/// Generates standard-normal noise scaled so its peak equals `amplitude`
fn generate_gaussian_noise(len: usize, amplitude: f64) -> Vec<f64> {
    let mut rng = thread_rng();
    let normal = Normal::new(0.0, 1.0).unwrap();
    let raw: Vec<f64> = (0..len).map(|_| normal.sample(&mut rng)).collect();
    let peak = raw.iter().fold(0.0_f64, |max, &s| max.max(s.abs()));
    if peak == 0.0 {
        return raw;
    }
    raw.into_iter().map(|s| s / peak * amplitude).collect()
}

/// Generates a sinusoidal signal at the given frequency
fn generate_sinusoidal(len: usize, frequency: f64, sr: f64) -> Vec<f64> {
    (0..len)
        .map(|i| {
            let t = i as f64 / sr;
            (2.0 * PI * frequency * t).sin()
        })
        .collect()
}

/// Generates a linear chirp from f1 to f2 over the signal duration
fn generate_chirp(len: usize, f1: f64, f2: f64, sr: f64) -> Vec<f64> {
    let duration = len as f64 / sr;
    let k = (f2 - f1) / duration;

    (0..len)
        .map(|i| {
            let t = i as f64 / sr;
            (2.0 * PI * (f1 * t + 0.5 * k * t * t)).sin()
        })
        .collect()
}

/// Generates a signal vector of given length and type.
pub fn generate_signal(len: usize, sig_type: SignalType, sample_rate: f64) -> Vec<f64> {
    match sig_type {
        SignalType::WhiteNoise => generate_white_noise(len),
        SignalType::Gaussian(amplitude) => generate_gaussian_noise(len, amplitude),
        SignalType::Sinusoidal(freq) => generate_sinusoidal(len, freq, sample_rate),
        SignalType::Chirp(f1, f2) => generate_chirp(len, f1, f2, sample_rate),
    }
}
