use std::fmt;

use crate::error::ResampleError;

/// A single audio sample (16-bit signed PCM).
pub type Sample = i16;

/// Allocates a vector of `len` copies of `value`, reporting failure instead of
/// aborting.
pub(crate) fn try_alloc<T: Clone>(len: usize, value: T) -> Result<Vec<T>, ResampleError> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| ResampleError::Allocation { requested: len })?;
    v.resize(len, value);
    Ok(v)
}

/// Buffer holding audio samples in interleaved format.
///
/// For mono audio, samples are stored sequentially: `[s0, s1, s2, ...]`
/// For multi-channel audio, frames are interleaved: `[c0_0, c1_0, c0_1, c1_1, ...]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBuffer {
    /// Raw interleaved sample data.
    pub data: Vec<Sample>,
    /// Number of channels (at least 1).
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl AudioBuffer {
    /// Create a new audio buffer.
    ///
    /// # Errors
    /// Returns `ResampleError::InvalidFormat` if `channels` is 0 or the data
    /// length is not a whole number of frames, and
    /// `ResampleError::InvalidRate` if `sample_rate` is 0.
    pub fn new(data: Vec<Sample>, channels: u16, sample_rate: u32) -> Result<Self, ResampleError> {
        if channels == 0 {
            return Err(ResampleError::InvalidFormat(
                "channel count must be at least 1".to_string(),
            ));
        }
        if sample_rate == 0 {
            return Err(ResampleError::InvalidRate(
                "invalid: sample rate must be positive".to_string(),
            ));
        }
        if data.len() % channels as usize != 0 {
            return Err(ResampleError::InvalidFormat(format!(
                "{} samples is not a whole number of {}-channel frames",
                data.len(),
                channels
            )));
        }
        Ok(Self {
            data,
            channels,
            sample_rate,
        })
    }

    /// Create a mono buffer.
    pub fn from_mono(data: Vec<Sample>, sample_rate: u32) -> Result<Self, ResampleError> {
        Self::new(data, 1, sample_rate)
    }

    /// Number of frames in the buffer (total samples / channels).
    pub fn num_frames(&self) -> usize {
        self.data.len() / self.channels.max(1) as usize
    }

    /// Duration of the audio in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.num_frames() as f64 / self.sample_rate as f64
    }

    /// Returns true if the buffer contains no samples.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterates one channel's samples without copying.
    ///
    /// Yields nothing if `channel` is out of range.
    pub fn channel_iter(&self, channel: u16) -> impl Iterator<Item = Sample> + '_ {
        let stride = self.channels.max(1) as usize;
        let skip = if channel < self.channels {
            channel as usize
        } else {
            self.data.len()
        };
        self.data.iter().skip(skip).step_by(stride).copied()
    }

    /// Get a single channel's data as a new vector.
    pub fn channel(&self, channel: u16) -> Vec<Sample> {
        self.channel_iter(channel).collect()
    }

    /// Format metadata of this buffer.
    pub fn info(&self) -> AudioInfo {
        AudioInfo {
            sample_rate: self.sample_rate,
            channels: self.channels,
            frames: self.num_frames() as u64,
        }
    }
}

/// Format metadata of an audio source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioInfo {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
    /// Frames per channel.
    pub frames: u64,
}

impl fmt::Display for AudioInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} frames, {} Hz, {} ch",
            self.frames, self.sample_rate, self.channels
        )
    }
}

/// How an accumulated sample outside the 16-bit range is narrowed.
///
/// Both policies truncate toward zero; they differ only for values that do
/// not fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    /// Clamp to `i16::MIN..=i16::MAX`.
    #[default]
    Saturate,
    /// Truncate to a 32-bit integer and keep the low 16 bits (two's
    /// complement wraparound).
    Wrap,
}

impl Overflow {
    /// Narrows an accumulated value to a sample.
    #[inline]
    pub fn narrow(self, value: f64) -> Sample {
        match self {
            // `as` from float truncates toward zero and saturates.
            Overflow::Saturate => value as Sample,
            Overflow::Wrap => (value as i32) as Sample,
        }
    }
}

/// Parameters of one sample-rate conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ResampleParams {
    /// Input sample rate in Hz (`Fs`).
    pub source_rate: u32,
    /// Output sample rate in Hz (`Fsp`).
    pub target_rate: u32,
    /// Narrowing policy for out-of-range output values.
    pub overflow: Overflow,
    /// Worker threads for the output loop; 0 picks the available parallelism.
    pub threads: usize,
}

impl ResampleParams {
    /// Create parameters for converting `source_rate` to `target_rate`.
    ///
    /// # Errors
    /// Returns `ResampleError::InvalidRate` if either rate is 0.
    pub fn new(source_rate: u32, target_rate: u32) -> Result<Self, ResampleError> {
        if source_rate == 0 {
            return Err(ResampleError::InvalidRate(
                "invalid: source rate must be positive".to_string(),
            ));
        }
        if target_rate == 0 {
            return Err(ResampleError::InvalidRate(
                "invalid: target rate must be positive".to_string(),
            ));
        }
        Ok(Self {
            source_rate,
            target_rate,
            overflow: Overflow::default(),
            threads: 1,
        })
    }

    /// Set the narrowing policy.
    pub fn with_overflow(mut self, overflow: Overflow) -> Self {
        self.overflow = overflow;
        self
    }

    /// Set the worker thread count (0 = available parallelism).
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Conversion factor `rho = Fsp / Fs`.
    #[inline]
    pub fn ratio(&self) -> f64 {
        self.target_rate as f64 / self.source_rate as f64
    }

    /// Output length for `frames` input frames: `floor(frames * Fsp / Fs)`.
    #[inline]
    pub fn output_len(&self, frames: usize) -> usize {
        let len = frames as u128 * self.target_rate as u128 / self.source_rate as u128;
        len as usize
    }

    /// Zero-padding frames added to each end of the input for a kernel with
    /// `zero_crossings` zero-crossings per side.
    ///
    /// `ceil(N_z * Fs / Fsp)` when downsampling, `N_z` otherwise.
    #[inline]
    pub fn padding_for(&self, zero_crossings: usize) -> usize {
        if self.target_rate < self.source_rate {
            let num = zero_crossings as u64 * self.source_rate as u64;
            let den = self.target_rate as u64;
            num.div_ceil(den) as usize
        } else {
            zero_crossings
        }
    }
}

impl fmt::Display for ResampleParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Hz -> {} Hz (ratio {:.6}, {:?} narrowing, {} threads)",
            self.source_rate,
            self.target_rate,
            self.ratio(),
            self.overflow,
            self.threads
        )
    }
}
