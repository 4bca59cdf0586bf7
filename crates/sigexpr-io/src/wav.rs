//! WAV file reading and writing.

use crate::{Error, Result};
use hound::{SampleFormat, WavReader, WavWriter};
use std::io::BufReader;
use std::path::Path;

/// WAV audio encoding format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavFormat {
    /// Linear PCM (integer samples).
    Pcm,
    /// IEEE 754 floating-point samples.
    IeeeFloat,
}

/// WAV file metadata extracted without loading sample data.
#[derive(Debug, Clone)]
pub struct WavInfo {
    /// Number of audio channels.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample.
    pub bits_per_sample: u16,
    /// Total number of sample frames (samples per channel).
    pub num_frames: u64,
    /// Duration in seconds.
    pub duration_secs: f64,
    /// Audio encoding format.
    pub format: WavFormat,
}

/// Read WAV metadata without loading sample data.
pub fn read_wav_info<P: AsRef<Path>>(path: P) -> Result<WavInfo> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let num_frames = u64::from(reader.duration());
    let duration_secs = num_frames as f64 / f64::from(spec.sample_rate);

    let format = match spec.sample_format {
        SampleFormat::Float => WavFormat::IeeeFloat,
        SampleFormat::Int => WavFormat::Pcm,
    };

    Ok(WavInfo {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        num_frames,
        duration_secs,
        format,
    })
}

/// WAV file specification.
///
/// 32-bit files are written as float, every other depth as integer PCM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Number of audio channels.
    pub channels: u16,
    /// Sample rate in Hz (e.g., 44100, 48000).
    pub sample_rate: u32,
    /// Bit depth per sample (8, 16, 24, or 32).
    pub bits_per_sample: u16,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            channels: 1,
            sample_rate: 48000,
            bits_per_sample: 32,
        }
    }
}

impl From<hound::WavSpec> for WavSpec {
    fn from(spec: hound::WavSpec) -> Self {
        Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
        }
    }
}

impl From<WavSpec> for hound::WavSpec {
    fn from(spec: WavSpec) -> Self {
        hound::WavSpec {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            sample_format: if spec.bits_per_sample == 32 {
                SampleFormat::Float
            } else {
                SampleFormat::Int
            },
        }
    }
}

fn int_scale(bits: u16) -> f64 {
    f64::from(1u32 << (bits - 1))
}

fn check_write_depth(bits: u16) -> Result<()> {
    match bits {
        8 | 16 | 24 | 32 => Ok(()),
        other => Err(Error::UnsupportedFormat(format!("{other}-bit output"))),
    }
}

fn read_interleaved(reader: WavReader<BufReader<std::fs::File>>) -> Result<Vec<f64>> {
    let spec = reader.spec();
    let samples = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = int_scale(spec.bits_per_sample);
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| f64::from(v) / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };
    Ok(samples)
}

/// Read a WAV file as one sample vector per channel, scaled to [-1, 1).
///
/// Channel `n` of the file becomes element `n` of the result, ready to be
/// bound to variable `v<n>`.
///
/// # Example
/// ```ignore
/// let (channels, spec) = read_wav_channels("input.wav")?;
/// println!("{} channels of {} samples", channels.len(), channels[0].len());
/// ```
pub fn read_wav_channels<P: AsRef<Path>>(path: P) -> Result<(Vec<Vec<f64>>, WavSpec)> {
    let path = path.as_ref();
    let reader = WavReader::open(path)?;
    let spec = WavSpec::from(reader.spec());
    let channel_count = usize::from(spec.channels);
    let interleaved = read_interleaved(reader)?;

    let frames = interleaved.len() / channel_count.max(1);
    let mut channels: Vec<Vec<f64>> = (0..channel_count)
        .map(|_| Vec::with_capacity(frames))
        .collect();
    for frame in interleaved.chunks_exact(channel_count.max(1)) {
        for (channel, &sample) in channels.iter_mut().zip(frame) {
            channel.push(sample);
        }
    }

    tracing::debug!(
        path = %path.display(),
        channels = channel_count,
        frames,
        sample_rate = spec.sample_rate,
        "read wav"
    );
    Ok((channels, spec))
}

/// Write mono samples to a WAV file. `spec.channels` is ignored.
///
/// # Example
/// ```ignore
/// let samples = vec![0.0; 48000]; // 1 second of silence
/// let spec = WavSpec { sample_rate: 48000, ..Default::default() };
/// write_wav("output.wav", &samples, spec)?;
/// ```
pub fn write_wav<P: AsRef<Path>>(path: P, samples: &[f64], spec: WavSpec) -> Result<()> {
    write_wav_channels(path, &[samples], spec)
}

/// Write one slice per channel to an interleaved WAV file.
///
/// The channel count comes from `channels.len()`, overriding `spec.channels`.
/// All channels must have the same length.
pub fn write_wav_channels<P: AsRef<Path>>(
    path: P,
    channels: &[&[f64]],
    spec: WavSpec,
) -> Result<()> {
    check_write_depth(spec.bits_per_sample)?;
    let frames = channels.first().map_or(0, |c| c.len());
    if let Some(bad) = channels.iter().find(|c| c.len() != frames) {
        return Err(Error::ChannelLength {
            expected: frames,
            found: bad.len(),
        });
    }
    let channel_count = u16::try_from(channels.len())
        .map_err(|_| Error::UnsupportedFormat(format!("{} channels", channels.len())))?;

    let spec = WavSpec {
        channels: channel_count.max(1),
        ..spec
    };
    let mut writer = WavWriter::create(path, hound::WavSpec::from(spec))?;

    if spec.bits_per_sample == 32 {
        for frame in 0..frames {
            for channel in channels {
                writer.write_sample(channel[frame] as f32)?;
            }
        }
    } else {
        let max_val = int_scale(spec.bits_per_sample);
        for frame in 0..frames {
            for channel in channels {
                // NaN casts to 0.
                let int_sample = (channel[frame] * max_val).clamp(-max_val, max_val - 1.0) as i32;
                writer.write_sample(int_sample)?;
            }
        }
    }

    writer.finalize()?;
    Ok(())
}
