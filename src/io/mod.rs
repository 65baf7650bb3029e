//! Reading source files and writing converted output.
//!
//! RIFF/WAVE input is handled by the crate's own codec in [`wav`]; every other
//! container goes through symphonia in [`decode`]. Output is always 16-bit
//! PCM WAV.

pub mod decode;
pub mod wav;

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::core::types::{AudioBuffer, AudioInfo};
use crate::error::ResampleError;

/// Reads the first 12 bytes of `path` to decide whether it is a WAV file.
fn sniff_wav(path: &Path) -> Result<bool, ResampleError> {
    let mut file =
        File::open(path).map_err(|e| ResampleError::IoError(format!("{}: {}", path.display(), e)))?;
    let mut header = [0u8; 12];
    let mut filled = 0;
    while filled < header.len() {
        let n = file
            .read(&mut header[filled..])
            .map_err(|e| ResampleError::IoError(format!("{}: {}", path.display(), e)))?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(wav::is_wav(&header[..filled]))
}

/// Reads the format metadata of an audio file.
pub fn probe(path: impl AsRef<Path>) -> Result<AudioInfo, ResampleError> {
    let path = path.as_ref();
    if sniff_wav(path)? {
        let data = std::fs::read(path)
            .map_err(|e| ResampleError::IoError(format!("{}: {}", path.display(), e)))?;
        wav::probe_wav(&data)
    } else {
        decode::probe_file(path)
    }
}

/// Reads every frame of an audio file as interleaved 16-bit samples.
pub fn read_audio_file(path: impl AsRef<Path>) -> Result<AudioBuffer, ResampleError> {
    let path = path.as_ref();
    if sniff_wav(path)? {
        wav::read_wav_file(path)
    } else {
        decode::decode_file(path)
    }
}

/// Verifies that the container implied by `path` can be written.
///
/// Only WAV output is supported; the extension must be `.wav`
/// (case-insensitive).
pub fn check_output_path(path: impl AsRef<Path>) -> Result<(), ResampleError> {
    let path = path.as_ref();
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("wav") => Ok(()),
        Some(ext) => Err(ResampleError::InvalidFormat(format!(
            "{}: unsupported output container '.{}' (only .wav can be written)",
            path.display(),
            ext
        ))),
        None => Err(ResampleError::InvalidFormat(format!(
            "{}: output path has no extension (expected .wav)",
            path.display()
        ))),
    }
}

/// Writes `buffer` to `path` in the container implied by the path.
pub fn write_audio_file(path: impl AsRef<Path>, buffer: &AudioBuffer) -> Result<(), ResampleError> {
    let path = path.as_ref();
    check_output_path(path)?;
    wav::write_wav_file(path, buffer)
}
