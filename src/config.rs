//! Configuration module for the MiniMax text-to-speech batch
//! Note: credentials come from the environment (optionally via a `.env` file).

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{info, warn};

pub const MINIMAX_API_HOST: &str = "https://api.minimaxi.chat";
pub const T2A_PATH: &str = "/v1/t2a_v2";
pub const TTS_MODEL: &str = "speech-02-turbo";

pub const GROUP_ID_VAR: &str = "MINIMAX_GROUP_ID";
pub const API_KEY_VAR: &str = "MINIMAX_API_KEY";

/// Longest text (in characters) sent in a single request
pub const MAX_TEXT_CHARS: usize = 5000;

/// Voice Configuration
pub const VOICE_SPEED: f32 = 1.0;
pub const VOICE_VOLUME: f32 = 1.0;
pub const VOICE_PITCH: i32 = 0;

/// Audio Configuration
pub const SAMPLE_RATE: u32 = 32000;
pub const BITRATE: u32 = 128000;
pub const AUDIO_FORMAT: &str = "mp3";
pub const CHANNELS: u16 = 1;

pub const DEFAULT_LANGUAGE: &str = "default";

const SPANISH_VOICE: &str = "moss_audio_800686e0-1cf0-11f0-8444-ae62a3be7263";
const KOREAN_VOICE: &str = "moss_audio_b96469dd-1c64-11f0-8444-ae62a3be7263";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("environment variables MINIMAX_GROUP_ID and MINIMAX_API_KEY must both be set")]
    MissingCredentials,
}

/// Language name → voice id table. Always carries a `default` entry.
#[derive(Clone, Debug)]
pub struct VoiceOptions {
    voices: BTreeMap<String, String>,
}

impl VoiceOptions {
    /// Case-insensitive lookup; unknown languages get the default voice.
    pub fn voice_for(&self, language: &str) -> &str {
        self.voices
            .get(&language.to_lowercase())
            .or_else(|| self.voices.get(DEFAULT_LANGUAGE))
            .map(String::as_str)
            .unwrap_or(SPANISH_VOICE)
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.voices.keys().map(String::as_str)
    }
}

impl Default for VoiceOptions {
    fn default() -> Self {
        let voices = [
            ("spanish", SPANISH_VOICE),
            ("korean", KOREAN_VOICE),
            (DEFAULT_LANGUAGE, SPANISH_VOICE),
        ]
        .into_iter()
        .map(|(lang, voice)| (lang.to_string(), voice.to_string()))
        .collect();
        Self { voices }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub api_key: String,
    pub group_id: String,
    pub base_url: String,
    pub voice_options: VoiceOptions,
}

impl Config {
    pub fn new(api_key: impl Into<String>, group_id: impl Into<String>, api_host: &str) -> Self {
        let group_id = group_id.into();
        let base_url = format!(
            "{}{}?GroupId={}",
            api_host.trim_end_matches('/'),
            T2A_PATH,
            group_id
        );
        Self {
            api_key: api_key.into(),
            group_id,
            base_url,
            voice_options: VoiceOptions::default(),
        }
    }

    /// Reads `.env` (if any) and then the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => info!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => warn!("Ignoring unreadable .env file: {}", e),
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        match (present(GROUP_ID_VAR), present(API_KEY_VAR)) {
            (Some(group_id), Some(api_key)) => Ok(Self::new(api_key, group_id, MINIMAX_API_HOST)),
            _ => Err(ConfigError::MissingCredentials),
        }
    }

    /// API key safe for logs: first and last five characters only.
    pub fn masked_api_key(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        if chars.len() > 10 {
            let head: String = chars[..5].iter().collect();
            let tail: String = chars[chars.len() - 5..].iter().collect();
            format!("{}...{}", head, tail)
        } else {
            "***".to_string()
        }
    }
}
