#![forbid(unsafe_code)]
//! Bandlimited sample-rate conversion for 16-bit PCM audio.
//!
//! `bandlimit` converts audio from one sample rate to any other by evaluating
//! a Kaiser-windowed sinc interpolant at the output instants. The filter is a
//! precomputed table covering five zero-crossings at 512 phases each, with
//! linear interpolation between phases. When downsampling, the input is
//! zero-padded so that every tap stays inside the buffer.
//!
//! # Quick Start
//!
//! ```
//! use bandlimit::ResampleParams;
//!
//! // 1 second of 1 kHz sine at 48 kHz
//! let input: Vec<i16> = (0..48000)
//!     .map(|i| (16000.0 * (2.0 * std::f64::consts::PI * 1000.0 * i as f64 / 48000.0).sin()) as i16)
//!     .collect();
//!
//! let params = ResampleParams::new(48000, 16000).unwrap();
//! let output = bandlimit::resample(&input, &params).unwrap();
//! assert_eq!(output.len(), 16000);
//! ```
//!
//! # Files
//!
//! [`resample_file`] reads any supported input (WAV natively, other
//! containers through symphonia), converts channel 0 and writes a mono
//! 16-bit WAV:
//!
//! ```no_run
//! let info = bandlimit::resample_file("in.flac", "out.wav", 22050).unwrap();
//! println!("{}", info);
//! ```

pub mod core;
pub mod error;
pub mod io;

use std::path::Path;

pub use crate::core::filter::FilterTable;
pub use crate::core::resample::Resampler;
pub use crate::core::types::{AudioBuffer, AudioInfo, Overflow, ResampleParams, Sample};
pub use error::ResampleError;

/// Resamples a mono signal from `params.source_rate` to `params.target_rate`.
///
/// The output holds exactly `floor(input.len() * target / source)` samples.
///
/// # Errors
///
/// Returns [`ResampleError::Allocation`] if a working buffer cannot be
/// reserved.
pub fn resample(input: &[Sample], params: &ResampleParams) -> Result<Vec<Sample>, ResampleError> {
    Resampler::new(params.clone())?.process(input)
}

/// Resamples channel 0 of an [`AudioBuffer`] and returns a mono buffer.
///
/// The source rate is taken from the buffer, overriding
/// `params.source_rate`. The remaining channels are ignored.
///
/// # Errors
///
/// Returns [`ResampleError::InvalidRate`] if the buffer's rate is 0, or
/// [`ResampleError::Allocation`] if a working buffer cannot be reserved.
///
/// # Example
///
/// ```
/// use bandlimit::{AudioBuffer, ResampleParams};
///
/// let buffer = AudioBuffer::new(vec![0i16; 2 * 44100], 2, 44100).unwrap();
/// let params = ResampleParams::new(44100, 48000).unwrap();
/// let output = bandlimit::resample_buffer(&buffer, &params).unwrap();
/// assert_eq!(output.channels, 1);
/// assert_eq!(output.sample_rate, 48000);
/// assert_eq!(output.num_frames(), 48000);
/// ```
pub fn resample_buffer(
    buffer: &AudioBuffer,
    params: &ResampleParams,
) -> Result<AudioBuffer, ResampleError> {
    let params = ResampleParams::new(buffer.sample_rate, params.target_rate)?
        .with_overflow(params.overflow)
        .with_threads(params.threads);
    let resampler = Resampler::new(params)?;
    let output = resampler.process_iter(buffer.num_frames(), buffer.channel_iter(0))?;
    AudioBuffer::from_mono(output, resampler.params().target_rate)
}

/// Converts the audio file at `input` to `target_rate` and writes the result
/// to `output` as mono 16-bit PCM WAV.
///
/// The output path is validated before the input is read. Returns the
/// metadata of the written file.
///
/// # Errors
///
/// Any [`ResampleError`]: an unreadable or malformed input, a zero rate, an
/// unsupported output container, or a failed write. A partially written
/// output file is removed.
pub fn resample_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    target_rate: u32,
) -> Result<AudioInfo, ResampleError> {
    resample_file_with(input, output, &ResampleParams::new(1, target_rate)?)
}

/// Like [`resample_file`], with explicit narrowing and threading settings.
///
/// `params.source_rate` is replaced by the rate of the input file.
pub fn resample_file_with(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    params: &ResampleParams,
) -> Result<AudioInfo, ResampleError> {
    let (input, output) = (input.as_ref(), output.as_ref());
    io::check_output_path(output)?;

    let source = io::read_audio_file(input)?;
    log::info!("read {}: {}", input.display(), source.info());

    let converted = resample_buffer(&source, params)?;
    io::write_audio_file(output, &converted)?;

    let info = converted.info();
    log::info!("wrote {}: {}", output.display(), info);
    Ok(info)
}
