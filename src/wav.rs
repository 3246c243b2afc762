//! WAV reading and writing over `hound`, in whole-file and block form.
//!
//! Samples are exchanged as `f64` in [-1.0, 1.0], one `Vec` per channel.
//! Input may be 16/24/32-bit integer PCM or 32-bit float at any sample rate;
//! output is always 16-bit integer PCM with samples clamped (never
//! renormalized, so the denoiser cannot rescale program material).

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind};

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::DenoiseError;

const SAMPLE_MAX: f64 = 32767.0;

/// A multi-channel audio signal with its sample rate.
///
/// Channels are stored deinterleaved and are expected to share one length
/// (the frame count). Channels are processed independently everywhere and
/// recombined in their original order.
#[derive(Clone, Debug)]
pub struct Signal {
    pub channels: Vec<Vec<f64>>,
    pub sample_rate: u32,
}

impl Signal {
    pub fn mono(samples: Vec<f64>, sample_rate: u32) -> Self {
        Signal {
            channels: vec![samples],
            sample_rate,
        }
    }

    /// Samples per channel.
    pub fn frames(&self) -> usize {
        self.channels.first().map_or(0, |ch| ch.len())
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }
}

/// Incremental WAV reader yielding deinterleaved blocks of frames.
pub struct WavBlockReader {
    reader: WavReader<BufReader<File>>,
    spec: WavSpec,
}

impl WavBlockReader {
    /// Open `path` and validate that its format is supported.
    pub fn open(path: &str) -> Result<Self, DenoiseError> {
        let reader = WavReader::open(path).map_err(|e| match e {
            hound::Error::IoError(ref io) if io.kind() == ErrorKind::NotFound => {
                DenoiseError::InputNotFound(path.to_string())
            }
            other => DenoiseError::Wav(other),
        })?;
        let spec = reader.spec();
        if spec.channels == 0 {
            return Err(DenoiseError::UnsupportedChannelLayout);
        }
        match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Int, 16) | (SampleFormat::Int, 24) | (SampleFormat::Int, 32) => {}
            (SampleFormat::Float, 32) => {}
            (format, bits) => {
                return Err(DenoiseError::UnsupportedFormat(format!(
                    "{:?} with {} bits per sample",
                    format, bits
                )));
            }
        }
        Ok(WavBlockReader { reader, spec })
    }

    /// Total frames in the file.
    pub fn frames(&self) -> u32 {
        self.reader.duration()
    }

    pub fn channels(&self) -> u16 {
        self.spec.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.spec.sample_rate
    }

    /// Read up to `frames` frames, deinterleaved into one `Vec` per channel.
    /// The final block may be shorter; `None` once the file is exhausted.
    pub fn read_block(&mut self, frames: usize) -> Result<Option<Vec<Vec<f64>>>, DenoiseError> {
        let num_channels = self.spec.channels as usize;
        let want = frames * num_channels;
        let mut block: Vec<Vec<f64>> = vec![Vec::with_capacity(frames); num_channels];
        let mut taken = 0usize;

        match self.spec.sample_format {
            SampleFormat::Int => {
                let max = ((1u32 << (self.spec.bits_per_sample - 1)) - 1) as f64;
                let mut samples = self.reader.samples::<i32>();
                while taken < want {
                    match samples.next() {
                        Some(sample) => {
                            block[taken % num_channels].push(sample? as f64 / max);
                            taken += 1;
                        }
                        None => break,
                    }
                }
            }
            SampleFormat::Float => {
                let mut samples = self.reader.samples::<f32>();
                while taken < want {
                    match samples.next() {
                        Some(sample) => {
                            block[taken % num_channels].push(sample? as f64);
                            taken += 1;
                        }
                        None => break,
                    }
                }
            }
        }

        // A malformed data chunk can end mid-frame; keep complete frames
        // only so every channel comes back with the same length.
        let frames_read = taken / num_channels;
        if frames_read == 0 {
            return Ok(None);
        }
        if taken % num_channels != 0 {
            for channel in &mut block {
                channel.truncate(frames_read);
            }
        }
        Ok(Some(block))
    }
}

/// Incremental 16-bit PCM WAV writer taking deinterleaved blocks.
pub struct WavBlockWriter {
    writer: WavWriter<BufWriter<File>>,
}

impl WavBlockWriter {
    pub fn create(path: &str, channels: u16, sample_rate: u32) -> Result<Self, DenoiseError> {
        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let writer = WavWriter::create(path, spec)?;
        Ok(WavBlockWriter { writer })
    }

    /// Interleave and append one block. Samples are clamped to [-1.0, 1.0]
    /// before quantization.
    pub fn write_block(&mut self, block: &[Vec<f64>]) -> Result<(), DenoiseError> {
        let frames = block.first().map_or(0, |ch| ch.len());
        for i in 0..frames {
            for channel in block {
                let sample = (channel[i].clamp(-1.0, 1.0) * SAMPLE_MAX) as i16;
                self.writer.write_sample(sample)?;
            }
        }
        Ok(())
    }

    pub fn finalize(self) -> Result<(), DenoiseError> {
        self.writer.finalize()?;
        Ok(())
    }
}

/// Read an entire WAV file into a [`Signal`].
pub fn read_wav(path: &str) -> Result<Signal, DenoiseError> {
    let mut reader = WavBlockReader::open(path)?;
    let frames = reader.frames() as usize;
    let sample_rate = reader.sample_rate();
    let num_channels = reader.channels() as usize;
    let channels = match reader.read_block(frames.max(1))? {
        Some(block) => block,
        None => vec![Vec::new(); num_channels],
    };
    Ok(Signal {
        channels,
        sample_rate,
    })
}

/// Write a [`Signal`] as a 16-bit PCM WAV file.
pub fn write_wav(path: &str, signal: &Signal) -> Result<(), DenoiseError> {
    if signal.channels.is_empty() {
        return Err(DenoiseError::UnsupportedChannelLayout);
    }
    let mut writer = WavBlockWriter::create(path, signal.channels.len() as u16, signal.sample_rate)?;
    writer.write_block(&signal.channels)?;
    writer.finalize()
}
