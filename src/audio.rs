//! Turns a T2A response into an MP3 file on disk

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{error, info};

use crate::synthesizer::TtsResponse;

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("response has no 'data' field")]
    MissingData,
    #[error("response data has no 'audio' field")]
    MissingAudio,
    #[error("audio payload is not valid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("failed to write audio file: {0}")]
    Io(#[from] std::io::Error),
}

pub fn output_file_name(index: usize) -> String {
    format!("output_{}.mp3", index)
}

pub fn decode_audio(hex_audio: &str) -> Result<Vec<u8>, AudioError> {
    let bytes = hex::decode(hex_audio.trim())?;
    info!("Decoded audio payload: {} bytes", bytes.len());
    Ok(bytes)
}

/// Writes `output_<index>.mp3` into `output_dir`, replacing any previous
/// file of that name. `index` is 1-based.
pub fn save_audio(
    response: &TtsResponse,
    output_dir: &Path,
    index: usize,
) -> Result<PathBuf, AudioError> {
    let data = response.data.as_ref().ok_or_else(|| {
        error!("Response has no 'data' field");
        if let Some(base) = &response.base_resp {
            error!(
                "API status: {:?} {:?}",
                base.status_code, base.status_msg
            );
        }
        AudioError::MissingData
    })?;

    let hex_audio = data.audio.as_deref().ok_or_else(|| {
        error!("Response data has no 'audio' field");
        AudioError::MissingAudio
    })?;

    let bytes = decode_audio(hex_audio).map_err(|e| {
        let sample: String = hex_audio.chars().take(100).collect();
        error!("Hex decode failed: {} (payload starts with {:?})", e, sample);
        e
    })?;

    let path = output_dir.join(output_file_name(index));
    fs::write(&path, &bytes)?;
    info!("Saved audio file: {}", path.display());

    if let Some(extra) = &response.extra_info {
        let show = |key: &str| {
            extra
                .get(key)
                .map(|v| v.to_string())
                .unwrap_or_else(|| "N/A".to_string())
        };
        info!("Audio info:");
        info!("- length: {} ms", show("audio_length"));
        info!("- sample rate: {} Hz", show("audio_sample_rate"));
        info!("- size: {} bytes", show("audio_size"));
    }

    Ok(path)
}
