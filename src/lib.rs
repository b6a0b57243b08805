//! MiniMax TTS batch - one MP3 per line of input text

pub mod audio;
pub mod config;
pub mod input;
pub mod pipeline;
pub mod summary;
pub mod synthesizer;
pub mod workspace;

pub use config::Config;
pub use pipeline::{run, PipelineError, RunReport};
pub use workspace::Workspace;
