use std::io::Write;
use std::ops::Range;
use std::path::Path;

use crate::core::types::{AudioBuffer, AudioInfo, Sample};
use crate::error::ResampleError;

/// WAV audio format codes.
const WAV_FORMAT_PCM: u16 = 1;
const WAV_FORMAT_IEEE_FLOAT: u16 = 3;
const WAV_FORMAT_EXTENSIBLE: u16 = 0xFFFE;

/// Smallest possible RIFF/WAVE file with a canonical header.
const MIN_WAV_LEN: usize = 44;

/// Returns true if `data` starts with a RIFF/WAVE header.
pub fn is_wav(data: &[u8]) -> bool {
    data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WAVE"
}

/// Sample encoding of a WAV data chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    Pcm(u16),
    Float(u16),
}

impl Encoding {
    fn bytes_per_sample(self) -> usize {
        match self {
            Encoding::Pcm(bits) | Encoding::Float(bits) => bits as usize / 8,
        }
    }
}

/// Parsed fmt chunk plus the location of the sample data.
#[derive(Debug, Clone)]
struct WavLayout {
    encoding: Encoding,
    channels: u16,
    sample_rate: u32,
    data: Range<usize>,
}

impl WavLayout {
    fn frame_bytes(&self) -> usize {
        self.encoding.bytes_per_sample() * self.channels as usize
    }

    fn frames(&self) -> usize {
        self.data.len() / self.frame_bytes()
    }
}

fn parse_layout(data: &[u8]) -> Result<WavLayout, ResampleError> {
    if data.len() < MIN_WAV_LEN {
        return Err(ResampleError::InvalidFormat(
            "WAV file too short".to_string(),
        ));
    }
    if &data[0..4] != b"RIFF" {
        return Err(ResampleError::InvalidFormat(
            "Missing RIFF header".to_string(),
        ));
    }
    if &data[8..12] != b"WAVE" {
        return Err(ResampleError::InvalidFormat(
            "Missing WAVE identifier".to_string(),
        ));
    }

    let mut cursor = 12;
    let mut fmt: Option<(u16, u16, u32, u16)> = None;
    let mut audio_data: Option<Range<usize>> = None;

    while cursor + 8 <= data.len() {
        let chunk_id = &data[cursor..cursor + 4];
        let chunk_size = read_u32_le(data, cursor + 4) as usize;
        cursor += 8;

        if chunk_id == b"fmt " {
            if chunk_size < 16 || cursor + 16 > data.len() {
                return Err(ResampleError::InvalidFormat(
                    "fmt chunk too short".to_string(),
                ));
            }
            let mut format_code = read_u16_le(data, cursor);
            let num_channels = read_u16_le(data, cursor + 2);
            let sample_rate = read_u32_le(data, cursor + 4);
            // skip byte rate (4 bytes) and block align (2 bytes)
            let bits_per_sample = read_u16_le(data, cursor + 14);

            if format_code == WAV_FORMAT_EXTENSIBLE {
                // Sub-format GUID starts 24 bytes in; its first two bytes
                // carry the plain format code.
                if chunk_size < 40 || cursor + 26 > data.len() {
                    return Err(ResampleError::InvalidFormat(
                        "extensible fmt chunk too short".to_string(),
                    ));
                }
                format_code = read_u16_le(data, cursor + 24);
            }
            fmt = Some((format_code, num_channels, sample_rate, bits_per_sample));
        } else if chunk_id == b"data" {
            // Use whatever data is available
            let end = cursor.saturating_add(chunk_size).min(data.len());
            audio_data = Some(cursor..end);
        }

        cursor = cursor.saturating_add(chunk_size);
        // WAV chunks are word-aligned
        if chunk_size % 2 != 0 {
            cursor = cursor.saturating_add(1);
        }
    }

    let (format_code, channels, sample_rate, bits) = fmt.ok_or_else(|| {
        ResampleError::InvalidFormat("No fmt chunk found".to_string())
    })?;
    let data_range = audio_data.ok_or_else(|| {
        ResampleError::InvalidFormat("No data chunk found".to_string())
    })?;

    if channels == 0 {
        return Err(ResampleError::InvalidFormat(
            "WAV declares zero channels".to_string(),
        ));
    }
    if sample_rate == 0 {
        return Err(ResampleError::InvalidFormat(
            "WAV declares a zero sample rate".to_string(),
        ));
    }

    let encoding = match (format_code, bits) {
        (WAV_FORMAT_PCM, 8 | 16 | 24 | 32) => Encoding::Pcm(bits),
        (WAV_FORMAT_IEEE_FLOAT, 32 | 64) => Encoding::Float(bits),
        (fmt, bits) => {
            return Err(ResampleError::InvalidFormat(format!(
                "Unsupported WAV format: code={}, bits={}",
                fmt, bits
            )))
        }
    };

    Ok(WavLayout {
        encoding,
        channels,
        sample_rate,
        data: data_range,
    })
}

/// Reads the format metadata of an in-memory WAV file without decoding it.
pub fn probe_wav(data: &[u8]) -> Result<AudioInfo, ResampleError> {
    let layout = parse_layout(data)?;
    Ok(AudioInfo {
        sample_rate: layout.sample_rate,
        channels: layout.channels,
        frames: layout.frames() as u64,
    })
}

/// Reads a WAV file from a byte slice, converting every sample to 16 bits.
///
/// 8-bit data is re-centred and shifted up, 24- and 32-bit data keep their
/// top 16 bits, and float data is scaled by 32767 and clipped. A trailing
/// partial frame is dropped.
pub fn read_wav(data: &[u8]) -> Result<AudioBuffer, ResampleError> {
    let layout = parse_layout(data)?;
    let frames = layout.frames();
    let width = layout.encoding.bytes_per_sample();
    let audio = &data[layout.data.start..layout.data.start + frames * layout.frame_bytes()];

    let mut samples: Vec<Sample> = Vec::new();
    samples
        .try_reserve_exact(frames * layout.channels as usize)
        .map_err(|_| ResampleError::Allocation {
            requested: frames * layout.channels as usize,
        })?;

    let convert: fn(&[u8]) -> Sample = match layout.encoding {
        Encoding::Pcm(8) => |b: &[u8]| ((b[0] as i16) - 128) << 8,
        Encoding::Pcm(16) => |b: &[u8]| i16::from_le_bytes([b[0], b[1]]),
        Encoding::Pcm(24) => |b: &[u8]| i16::from_le_bytes([b[1], b[2]]),
        Encoding::Pcm(_) => |b: &[u8]| i16::from_le_bytes([b[2], b[3]]),
        Encoding::Float(32) => |b: &[u8]| {
            float_to_sample(f32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f64)
        },
        Encoding::Float(_) => |b: &[u8]| {
            float_to_sample(f64::from_le_bytes([
                b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
            ]))
        },
    };
    samples.extend(audio.chunks_exact(width).map(convert));

    AudioBuffer::new(samples, layout.channels, layout.sample_rate)
}

#[inline]
fn float_to_sample(v: f64) -> Sample {
    // `as` saturates out-of-range values and maps NaN to 0.
    (v * 32767.0).round() as Sample
}

/// Reads a WAV file from disk.
pub fn read_wav_file(path: impl AsRef<Path>) -> Result<AudioBuffer, ResampleError> {
    let path = path.as_ref();
    let data = std::fs::read(path)
        .map_err(|e| ResampleError::IoError(format!("{}: {}", path.display(), e)))?;
    read_wav(&data)
}

/// Encodes an audio buffer as a 16-bit PCM WAV file.
///
/// # Errors
///
/// Returns [`ResampleError::InvalidFormat`] if the data does not fit the
/// 32-bit RIFF size fields.
pub fn write_wav_16bit(buffer: &AudioBuffer) -> Result<Vec<u8>, ResampleError> {
    let num_channels = buffer.channels;
    let bits_per_sample: u16 = 16;
    let block_align = num_channels as u32 * (bits_per_sample as u32 / 8);
    let byte_rate = buffer.sample_rate as u64 * block_align as u64;
    let data_size = buffer.data.len() as u64 * 2;
    let file_size = 36 + data_size;

    if file_size > u32::MAX as u64 || byte_rate > u32::MAX as u64 || block_align > u16::MAX as u32
    {
        return Err(ResampleError::InvalidFormat(format!(
            "{} samples at {} Hz x {} ch exceed the WAV size limits",
            buffer.data.len(),
            buffer.sample_rate,
            num_channels
        )));
    }

    let mut out = Vec::new();
    out.try_reserve_exact(file_size as usize + 8)
        .map_err(|_| ResampleError::Allocation {
            requested: file_size as usize + 8,
        })?;

    // RIFF header
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(file_size as u32).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    // fmt chunk
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    out.extend_from_slice(&WAV_FORMAT_PCM.to_le_bytes());
    out.extend_from_slice(&num_channels.to_le_bytes());
    out.extend_from_slice(&buffer.sample_rate.to_le_bytes());
    out.extend_from_slice(&(byte_rate as u32).to_le_bytes());
    out.extend_from_slice(&(block_align as u16).to_le_bytes());
    out.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk
    out.extend_from_slice(b"data");
    out.extend_from_slice(&(data_size as u32).to_le_bytes());

    for &sample in &buffer.data {
        out.extend_from_slice(&sample.to_le_bytes());
    }

    Ok(out)
}

/// Writes a WAV file to disk (16-bit PCM).
///
/// A partially written regular file is removed before the error is returned.
pub fn write_wav_file(path: impl AsRef<Path>, buffer: &AudioBuffer) -> Result<(), ResampleError> {
    let path = path.as_ref();
    let data = write_wav_16bit(buffer)?;
    let mut file = std::fs::File::create(path)
        .map_err(|e| ResampleError::IoError(format!("{}: {}", path.display(), e)))?;

    let written = file.write_all(&data).and_then(|()| file.flush());
    drop(file);
    discard_on_error(path, written)
}

/// Turns a failed write into an error, removing the partial file at `path`.
fn discard_on_error(path: &Path, written: std::io::Result<()>) -> Result<(), ResampleError> {
    let Err(e) = written else {
        return Ok(());
    };
    if path.is_file() {
        if let Err(rm) = std::fs::remove_file(path) {
            log::warn!("could not remove partial output {}: {}", path.display(), rm);
        }
    }
    Err(ResampleError::IoError(format!("{}: {}", path.display(), e)))
}

#[inline]
fn read_u16_le(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

#[inline]
fn read_u32_le(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}
