//! Chunked VisuShrink denoising pipeline and noise-profile extraction.
//!
//! The input is walked in bounded-size chunks; every chunk of every channel
//! is decomposed, thresholded and reconstructed independently, so memory
//! stays proportional to one chunk per channel rather than to the whole
//! signal. Chunks share no state: each threshold is estimated from that
//! chunk's own finest detail coefficients.

use log::warn;

use crate::shrink::{shrink_details, soft_threshold, universal_threshold};
use crate::wav::{Signal, WavBlockReader, WavBlockWriter};
use crate::wavelet::Wavelet;
use crate::DenoiseError;

/// Default wavelet for all denoising entry points.
pub const DEFAULT_WAVELET: Wavelet = Wavelet::Db4;
/// Default decomposition depth.
pub const DEFAULT_LEVEL: usize = 2;
/// Default chunk size as a fraction of the total signal length.
pub const DEFAULT_CHUNK_FRACTION: f64 = 0.10;

/// Truncate or zero-pad `samples` to exactly `len` samples.
///
/// The periodized inverse transform of an odd-length chunk comes back one
/// sample long; the policy generalizes to any mismatch: excess is cut,
/// shortfall is padded with trailing zeros.
fn fit_length(mut samples: Vec<f64>, len: usize) -> Vec<f64> {
    samples.truncate(len);
    samples.resize(len, 0.0);
    samples
}

/// Denoise one chunk of one channel: decompose, estimate the universal
/// threshold from the finest detail band, soft-threshold every detail level,
/// reconstruct, and restore the input length.
fn shrink_chunk(samples: &[f64], wavelet: Wavelet, level: usize) -> Vec<f64> {
    let mut decomp = wavelet.decompose(samples, level);
    let Some(finest) = decomp.details.first() else {
        // Too short to decompose at all; pass through unchanged.
        return samples.to_vec();
    };
    let threshold = universal_threshold(finest, samples.len());
    shrink_details(&mut decomp, threshold);
    fit_length(wavelet.reconstruct(&decomp), samples.len())
}

/// Reconstruct only the removed component of one channel: per detail level
/// the difference between the original and its soft-thresholded version,
/// with the approximation zeroed so no low-frequency content leaks into the
/// profile.
fn noise_chunk(samples: &[f64], wavelet: Wavelet, level: usize) -> Vec<f64> {
    let mut decomp = wavelet.decompose(samples, level);
    let Some(finest) = decomp.details.first() else {
        return vec![0.0; samples.len()];
    };
    let threshold = universal_threshold(finest, samples.len());
    for detail in &mut decomp.details {
        let kept = soft_threshold(detail, threshold);
        for (d, k) in detail.iter_mut().zip(kept) {
            *d -= k;
        }
    }
    decomp.approx.iter_mut().for_each(|a| *a = 0.0);
    fit_length(wavelet.reconstruct(&decomp), samples.len())
}

/// Warn once per chunk when the requested depth exceeds what the chunk
/// length supports. Degraded-but-plausible output is preferred over aborting
/// a batch run, so this is a diagnostic rather than an error.
fn check_chunk_depth(chunk_len: usize, wavelet: Wavelet, level: usize) {
    if level > wavelet.max_level(chunk_len) {
        warn!(
            "chunk of {} samples is short for a level-{} {} decomposition; \
             boundary effects may degrade this chunk",
            chunk_len, level, wavelet
        );
    }
}

/// Chunk size in frames for a signal of `total_frames` samples per channel.
/// A fraction small enough to floor to zero means the whole signal is one
/// chunk.
fn chunk_frames(total_frames: usize, chunk_fraction: f64) -> usize {
    let chunk = (total_frames as f64 * chunk_fraction).floor() as usize;
    if chunk == 0 {
        total_frames.max(1)
    } else {
        chunk
    }
}

/// Denoise an in-memory signal.
///
/// The output has the same sample rate, channel count and per-channel length
/// as the input. Fails with [`DenoiseError::UnsupportedChannelLayout`] when
/// the signal has no channels.
pub fn denoise(
    input: &Signal,
    wavelet: Wavelet,
    level: usize,
    chunk_fraction: f64,
) -> Result<Signal, DenoiseError> {
    if input.channels.is_empty() {
        return Err(DenoiseError::UnsupportedChannelLayout);
    }
    let frames = input.frames();
    let chunk = chunk_frames(frames, chunk_fraction);
    let mut output: Vec<Vec<f64>> = input
        .channels
        .iter()
        .map(|ch| Vec::with_capacity(ch.len()))
        .collect();

    let mut start = 0;
    while start < frames {
        let end = (start + chunk).min(frames);
        check_chunk_depth(end - start, wavelet, level);
        for (channel, out) in input.channels.iter().zip(&mut output) {
            out.extend(shrink_chunk(&channel[start..end], wavelet, level));
        }
        start = end;
    }

    Ok(Signal {
        channels: output,
        sample_rate: input.sample_rate,
    })
}

/// Denoise a WAV file block by block, writing the result incrementally.
///
/// Only one chunk per channel is resident at a time, so arbitrarily large
/// files are processed in bounded memory. The output is 16-bit PCM at the
/// input's sample rate and channel count.
pub fn denoise_file(
    input: &str,
    output: &str,
    wavelet: Wavelet,
    level: usize,
    chunk_fraction: f64,
) -> Result<(), DenoiseError> {
    let mut reader = WavBlockReader::open(input)?;
    let chunk = chunk_frames(reader.frames() as usize, chunk_fraction);
    let mut writer = WavBlockWriter::create(output, reader.channels(), reader.sample_rate())?;

    while let Some(block) = reader.read_block(chunk)? {
        let frames = block[0].len();
        check_chunk_depth(frames, wavelet, level);
        let cleaned: Vec<Vec<f64>> = block
            .iter()
            .map(|channel| shrink_chunk(channel, wavelet, level))
            .collect();
        writer.write_block(&cleaned)?;
    }

    writer.finalize()
}

/// Extract the noise-component estimate from a noise-only recording.
///
/// Unlike [`denoise`] this runs over the entire signal in one pass (the
/// profile path assumes a short sample), and reconstructs what the shrinkage
/// would have *removed* rather than what it keeps. The result has the same
/// length, channel count and sample rate as the input.
pub fn extract_noise_profile(
    input: &Signal,
    wavelet: Wavelet,
    level: usize,
) -> Result<Signal, DenoiseError> {
    if input.channels.is_empty() {
        return Err(DenoiseError::UnsupportedChannelLayout);
    }
    check_chunk_depth(input.frames(), wavelet, level);
    let channels = input
        .channels
        .iter()
        .map(|channel| noise_chunk(channel, wavelet, level))
        .collect();
    Ok(Signal {
        channels,
        sample_rate: input.sample_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::{generate_signal, SignalType};
    use crate::utils::mean_square_error;
    use float_cmp::approx_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal};

    fn gaussian_noise(len: usize, sigma: f64, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let normal = Normal::new(0.0, sigma).unwrap();
        (0..len).map(|_| normal.sample(&mut rng)).collect()
    }

    #[test]
    fn test_length_and_channels_preserved() {
        let frames = 1000;
        let channels: Vec<Vec<f64>> = (0..3)
            .map(|c| generate_signal(frames, SignalType::Sinusoidal(100.0 * (c + 1) as f64), 8000.0))
            .collect();
        let input = Signal {
            channels,
            sample_rate: 8000,
        };
        for chunk_fraction in [0.07, 0.10, 0.33, 1.0] {
            let out = denoise(&input, Wavelet::Db4, 2, chunk_fraction).unwrap();
            assert_eq!(out.num_channels(), 3);
            assert_eq!(out.sample_rate, 8000);
            for channel in &out.channels {
                assert_eq!(channel.len(), frames);
            }
        }
    }

    #[test]
    fn test_single_chunk_equivalence() {
        let samples = generate_signal(512, SignalType::Chirp(100.0, 2000.0), 8000.0);
        let input = Signal::mono(samples.clone(), 8000);
        let out = denoise(&input, Wavelet::Db4, 2, 1.0).unwrap();
        let direct = shrink_chunk(&samples, Wavelet::Db4, 2);
        assert_eq!(out.channels[0], direct);
    }

    #[test]
    fn test_zero_channels_rejected() {
        let empty = Signal {
            channels: vec![],
            sample_rate: 44100,
        };
        assert!(matches!(
            denoise(&empty, Wavelet::Db4, 2, 0.1),
            Err(DenoiseError::UnsupportedChannelLayout)
        ));
        assert!(matches!(
            extract_noise_profile(&empty, Wavelet::Db4, 2),
            Err(DenoiseError::UnsupportedChannelLayout)
        ));
    }

    #[test]
    fn test_sine_with_gaussian_noise_gets_cleaner() {
        // 1 second at 16 kHz: 440 Hz sine plus seeded Gaussian noise.
        let clean = generate_signal(16000, SignalType::Sinusoidal(440.0), 16000.0);
        let noise = gaussian_noise(16000, 0.1, 7);
        let noisy: Vec<f64> = clean.iter().zip(&noise).map(|(c, n)| c + n).collect();
        let input = Signal::mono(noisy.clone(), 16000);

        let out = denoise(&input, DEFAULT_WAVELET, DEFAULT_LEVEL, DEFAULT_CHUNK_FRACTION).unwrap();
        assert_eq!(out.channels[0].len(), 16000);

        let mse_in = mean_square_error(&clean, &noisy);
        let mse_out = mean_square_error(&clean, &out.channels[0]);
        assert!(
            mse_out < mse_in,
            "residual did not drop: in={} out={}",
            mse_in,
            mse_out
        );
    }

    #[test]
    fn test_short_signal_does_not_crash() {
        // Far too short for a level-2 db4 decomposition; the pipeline warns
        // and still returns a signal of the original length.
        let input = Signal::mono(vec![0.1, -0.2, 0.3, 0.0, 0.5, -0.1, 0.2, 0.4, -0.3, 0.1], 8000);
        let out = denoise(&input, Wavelet::Db4, 2, 0.10).unwrap();
        assert_eq!(out.channels[0].len(), 10);
    }

    #[test]
    fn test_empty_signal_passes_through() {
        let input = Signal::mono(vec![], 8000);
        let out = denoise(&input, Wavelet::Db4, 2, 0.10).unwrap();
        assert!(out.channels[0].is_empty());
    }

    #[test]
    fn test_denoised_plus_profile_restores_original() {
        // The kept and removed coefficient components are complementary, and
        // the inverse transform is linear; on an even-length single chunk
        // (exact reconstruction, approximation shared) the denoised signal
        // plus the noise profile is the original signal.
        let samples = gaussian_noise(128, 0.5, 21);
        let input = Signal::mono(samples.clone(), 8000);
        let denoised = denoise(&input, Wavelet::Db4, 2, 1.0).unwrap();
        let profile = extract_noise_profile(&input, Wavelet::Db4, 2).unwrap();
        for ((d, p), original) in denoised.channels[0]
            .iter()
            .zip(&profile.channels[0])
            .zip(&samples)
        {
            assert!(approx_eq!(f64, d + p, *original, epsilon = 1e-6));
        }
    }

    #[test]
    fn test_noise_profile_of_constant_signal_is_silent() {
        // A constant has no detail energy, the MAD is zero and nothing is
        // removed; the profile must also drop the approximation.
        let input = Signal::mono(vec![0.25; 256], 8000);
        let profile = extract_noise_profile(&input, Wavelet::Db4, 2).unwrap();
        for p in &profile.channels[0] {
            assert!(approx_eq!(f64, *p, 0.0, epsilon = 1e-9));
        }
    }

    #[test]
    fn test_noise_profile_reports_removed_energy() {
        let samples = gaussian_noise(2048, 0.2, 3);
        let input = Signal::mono(samples, 16000);
        let profile = extract_noise_profile(&input, Wavelet::Db4, 2).unwrap();
        assert_eq!(profile.channels[0].len(), 2048);
        let energy: f64 = profile.channels[0].iter().map(|p| p * p).sum();
        assert!(energy > 0.0, "noise-only input should yield a nonzero profile");
    }

    #[test]
    fn test_denoise_file_streams_and_preserves_shape() {
        use crate::wav::{read_wav, write_wav};

        // 1234 frames with chunk fraction 0.10: ten chunks of 123 frames
        // plus a partial final chunk of 4.
        let frames = 1234;
        let input = Signal {
            channels: vec![
                generate_signal(frames, SignalType::Sinusoidal(440.0), 8000.0),
                generate_signal(frames, SignalType::Chirp(100.0, 900.0), 8000.0),
            ],
            sample_rate: 8000,
        };
        let in_path = std::env::temp_dir()
            .join("wavelet_denoise_stream_in.wav")
            .to_str()
            .unwrap()
            .to_string();
        let out_path = std::env::temp_dir()
            .join("wavelet_denoise_stream_out.wav")
            .to_str()
            .unwrap()
            .to_string();
        write_wav(&in_path, &input).unwrap();

        denoise_file(&in_path, &out_path, Wavelet::Db4, 2, 0.10).unwrap();

        let out = read_wav(&out_path).unwrap();
        assert_eq!(out.num_channels(), 2);
        assert_eq!(out.sample_rate, 8000);
        assert_eq!(out.frames(), frames);
        for channel in &out.channels {
            assert_eq!(channel.len(), frames);
        }

        // Block streaming must match the in-memory pipeline over the same
        // quantized input, up to the output quantization step.
        let expected = denoise(&read_wav(&in_path).unwrap(), Wavelet::Db4, 2, 0.10).unwrap();
        for (o, e) in out
            .channels
            .iter()
            .flatten()
            .zip(expected.channels.iter().flatten())
        {
            assert!((o - e).abs() < 1e-3, "{} vs {}", o, e);
        }

        std::fs::remove_file(&in_path).ok();
        std::fs::remove_file(&out_path).ok();
    }

    #[test]
    fn test_chunk_frames_policy() {
        assert_eq!(chunk_frames(1000, 0.10), 100);
        assert_eq!(chunk_frames(1000, 1.0), 1000);
        // fraction small enough to floor to zero: whole signal in one chunk
        assert_eq!(chunk_frames(5, 0.10), 5);
        assert_eq!(chunk_frames(0, 0.10), 1);
    }
}
