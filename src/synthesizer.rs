//! Synthesis module using MiniMax's T2A v2 API

use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::{
    Config, AUDIO_FORMAT, BITRATE, CHANNELS, SAMPLE_RATE, TTS_MODEL, VOICE_PITCH, VOICE_SPEED,
    VOICE_VOLUME,
};

const ERROR_BODY_PREVIEW: usize = 500;

#[derive(Error, Debug)]
pub enum SynthesisError {
    #[error("unauthorized: API key is invalid or expired")]
    Unauthorized,
    #[error("rate limited: API quota or credits exhausted")]
    RateLimited,
    #[error("forbidden: no access to this API")]
    Forbidden,
    #[error("bad request: check the text and parameters")]
    BadRequest,
    #[error("API returned HTTP {0}")]
    Status(u16),
    #[error("HTTP request failed: {0}")]
    Transport(String),
    #[error("unexpected response content type: {0}")]
    UnexpectedContentType(String),
    #[error("failed to parse response: {0}")]
    Parse(String),
}

impl SynthesisError {
    /// Errors that will repeat for every remaining line.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::RateLimited)
    }

    fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized,
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited,
            StatusCode::FORBIDDEN => Self::Forbidden,
            StatusCode::BAD_REQUEST => Self::BadRequest,
            other => Self::Status(other.as_u16()),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TtsRequest {
    pub model: String,
    pub text: String,
    pub stream: bool,
    pub voice_setting: VoiceSetting,
    pub audio_setting: AudioSetting,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VoiceSetting {
    pub voice_id: String,
    pub speed: f32,
    pub vol: f32,
    pub pitch: i32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AudioSetting {
    pub sample_rate: u32,
    pub bitrate: u32,
    pub format: String,
    pub channel: u16,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TtsResponse {
    #[serde(default)]
    pub data: Option<AudioData>,
    /// Display-only metadata (`audio_length`, `audio_sample_rate`,
    /// `audio_size`); kept as raw JSON so its shape never fails a line.
    #[serde(default)]
    pub extra_info: Option<serde_json::Value>,
    #[serde(default)]
    pub base_resp: Option<BaseResp>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AudioData {
    /// Hex-encoded audio bytes
    #[serde(default)]
    pub audio: Option<String>,
}

/// API status pair. Only logged, so both fields accept any JSON value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BaseResp {
    #[serde(default)]
    pub status_code: Option<serde_json::Value>,
    #[serde(default)]
    pub status_msg: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    base_resp: Option<BaseResp>,
}

/// Request body for one line of text. `text` must already be length-capped.
pub fn build_payload(text: &str, voice_id: &str) -> TtsRequest {
    TtsRequest {
        model: TTS_MODEL.to_string(),
        text: text.to_string(),
        stream: false,
        voice_setting: VoiceSetting {
            voice_id: voice_id.to_string(),
            speed: VOICE_SPEED,
            vol: VOICE_VOLUME,
            pitch: VOICE_PITCH,
        },
        audio_setting: AudioSetting {
            sample_rate: SAMPLE_RATE,
            bitrate: BITRATE,
            format: AUDIO_FORMAT.to_string(),
            channel: CHANNELS,
        },
    }
}

pub struct Synthesizer {
    client: reqwest::blocking::Client,
    url: String,
    api_key: String,
}

impl Synthesizer {
    /// Uses the client's default transport settings; no timeout override.
    pub fn new(config: &Config) -> Result<Self, SynthesisError> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| SynthesisError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Single POST, no retry. Non-200 statuses are classified into
    /// `SynthesisError` variants.
    pub fn send(&self, payload: &TtsRequest) -> Result<TtsResponse, SynthesisError> {
        info!("Sending API request...");
        debug!("Request URL: {}", self.url);
        if let Ok(pretty) = serde_json::to_string_pretty(payload) {
            debug!("Request payload: {}", pretty);
        }

        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .json(payload)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    error!("Timeout error: {}", e);
                } else if e.is_connect() {
                    error!("Connection error: {}", e);
                } else {
                    error!("Request error: {}", e);
                }
                SynthesisError::Transport(e.to_string())
            })?;

        let status = response.status();
        info!("Response status: {}", status);

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        if status != StatusCode::OK {
            let body = response.text().unwrap_or_else(|e| {
                error!("Failed to read error body: {}", e);
                String::new()
            });
            return Err(classify_error(status, &body));
        }

        let body = response.text().map_err(|e| {
            error!("Failed to read response body: {}", e);
            SynthesisError::Transport(e.to_string())
        })?;

        if !content_type.contains("application/json") {
            error!("Unexpected response format: {}", content_type);
            error!("Response body: {}...", preview(&body));
            return Err(SynthesisError::UnexpectedContentType(content_type));
        }

        serde_json::from_str::<TtsResponse>(&body).map_err(|e| {
            error!("JSON parse error: {}", e);
            error!("Response body: {}...", preview(&body));
            SynthesisError::Parse(e.to_string())
        })
    }
}

/// Logs whatever detail a non-200 body carries and maps the status to an
/// error kind. Only the caller decides whether the kind is fatal.
pub fn classify_error(status: StatusCode, body: &str) -> SynthesisError {
    error!("API error: status {}", status.as_u16());
    error!("Error body: {}...", preview(body));

    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(ApiErrorResponse {
            base_resp: Some(base),
        }) => {
            error!("Status code: {:?}", base.status_code);
            error!("Status message: {:?}", base.status_msg);
        }
        Ok(_) => {}
        Err(_) => error!("Error body is not JSON"),
    }

    let kind = SynthesisError::from_status(status);
    match &kind {
        SynthesisError::Unauthorized => error!("Authentication failed: API key is invalid or expired"),
        SynthesisError::RateLimited => error!("Usage limit reached: API call quota or credits exhausted"),
        SynthesisError::Forbidden => error!("Access denied: no permission for this API"),
        SynthesisError::BadRequest => {
            error!("Bad request: check the text and parameters");
            warn!("The text may contain special characters or unsupported symbols");
        }
        other => error!("Request failed: {}", other),
    }
    kind
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(ERROR_BODY_PREVIEW) {
        Some((cut, _)) => &body[..cut],
        None => body,
    }
}
