//! Decoding of compressed and non-WAV containers through symphonia.

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CodecParameters, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::core::types::{AudioBuffer, AudioInfo, Sample};
use crate::error::ResampleError;

/// Opens `path` and returns the format reader plus the first decodable track.
fn open_track(path: &Path) -> Result<(Box<dyn FormatReader>, u32, CodecParameters), ResampleError> {
    let file = File::open(path)
        .map_err(|e| ResampleError::IoError(format!("{}: {}", path.display(), e)))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| {
            ResampleError::InvalidFormat(format!("{}: failed to probe format: {}", path.display(), e))
        })?;

    let format = probed.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| {
            ResampleError::InvalidFormat(format!("{}: no audio track found", path.display()))
        })?;
    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    Ok((format, track_id, codec_params))
}

/// Reads format metadata through symphonia.
///
/// `frames` is 0 when the container does not declare a length.
pub fn probe_file(path: &Path) -> Result<AudioInfo, ResampleError> {
    let (_, _, params) = open_track(path)?;
    let sample_rate = params.sample_rate.ok_or_else(|| {
        ResampleError::InvalidFormat(format!("{}: unknown sample rate", path.display()))
    })?;
    let channels = params.channels.map(|c| c.count() as u16).unwrap_or(1);
    Ok(AudioInfo {
        sample_rate,
        channels,
        frames: params.n_frames.unwrap_or(0),
    })
}

/// Decodes an entire file to interleaved 16-bit samples.
pub fn decode_file(path: &Path) -> Result<AudioBuffer, ResampleError> {
    let (mut format, track_id, codec_params) = open_track(path)?;

    let mut sample_rate = codec_params.sample_rate;
    let mut channels = codec_params.channels.map(|c| c.count() as u16);

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| {
            ResampleError::InvalidFormat(format!("{}: failed to create decoder: {}", path.display(), e))
        })?;

    let mut samples: Vec<Sample> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => {
                return Err(ResampleError::InvalidFormat(format!(
                    "{}: error reading packet: {}",
                    path.display(),
                    e
                )))
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(e)) => {
                log::warn!("{}: skipping undecodable packet: {}", path.display(), e);
                continue;
            }
            Err(e) => {
                return Err(ResampleError::InvalidFormat(format!(
                    "{}: decode error: {}",
                    path.display(),
                    e
                )))
            }
        };

        let spec = *decoded.spec();
        sample_rate = Some(spec.rate);
        channels = Some(spec.channels.count() as u16);

        let mut buf = SampleBuffer::<Sample>::new(decoded.capacity() as u64, spec);
        buf.copy_interleaved_ref(decoded);
        samples
            .try_reserve(buf.samples().len())
            .map_err(|_| ResampleError::Allocation {
                requested: samples.len() + buf.samples().len(),
            })?;
        samples.extend_from_slice(buf.samples());
    }

    let sample_rate = sample_rate.ok_or_else(|| {
        ResampleError::InvalidFormat(format!("{}: unknown sample rate", path.display()))
    })?;
    let channels = channels.unwrap_or(1);

    log::debug!(
        "decoded {}: {} samples, {} Hz, {} ch",
        path.display(),
        samples.len(),
        sample_rate,
        channels
    );

    AudioBuffer::new(samples, channels, sample_rate)
}
