//! Batch driver: input lines → T2A requests → MP3 files → summary.

use std::collections::BTreeMap;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{error, info};

use crate::audio;
use crate::config::{Config, MAX_TEXT_CHARS};
use crate::input::{self, InputError};
use crate::summary::{self, SummaryError};
use crate::synthesizer::{self, SynthesisError, Synthesizer, TtsResponse};
use crate::workspace::Workspace;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("no input to process: {0}")]
    Input(#[from] InputError),
    #[error("batch aborted at line {line}: {source}")]
    Fatal {
        line: usize,
        #[source]
        source: SynthesisError,
    },
    #[error("failed to create HTTP client: {0}")]
    Client(#[source] SynthesisError),
    #[error(transparent)]
    Summary(#[from] SummaryError),
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub output_dir: PathBuf,
    pub summary_path: PathBuf,
    pub succeeded: usize,
    pub total: usize,
}

/// Processes every input line in order, one blocking request at a time.
/// `workspace` must already be prepared. Per-line failures are recorded and
/// skipped; 401/429 stop the batch before the summary is written.
pub fn run(
    config: &Config,
    workspace: &Workspace,
    language: &str,
) -> Result<RunReport, PipelineError> {
    let voice_id = config.voice_options.voice_for(language);
    info!("Language: {}", language);
    info!("Selected voice ID: {}", voice_id);

    let lines = input::read_lines(&workspace.input_file)?;

    info!("Preparing MiniMax TTS API requests...");
    info!("API key (masked): {}", config.masked_api_key());
    info!("API key length: {}", config.api_key.chars().count());

    let synthesizer = Synthesizer::new(config).map_err(PipelineError::Client)?;
    let total = lines.len();
    let mut processed: BTreeMap<usize, TtsResponse> = BTreeMap::new();

    for (i, text) in lines.iter().enumerate() {
        let index = i + 1;
        let text = input::truncate_text(text, MAX_TEXT_CHARS);
        info!("Processing line {}/{} (length: {})", index, total, text.chars().count());

        let payload = synthesizer::build_payload(text, voice_id);
        let response = match synthesizer.send(&payload) {
            Ok(response) => response,
            Err(e) if e.is_fatal() => {
                error!("Stopping batch: {}", e);
                return Err(PipelineError::Fatal {
                    line: index,
                    source: e,
                });
            }
            Err(e) => {
                info!("Line {} failed ({}); moving to the next line", index, e);
                continue;
            }
        };

        match audio::save_audio(&response, &workspace.output_dir, index) {
            Ok(_) => {
                processed.insert(index, response);
            }
            Err(e) => error!("Line {} produced no audio: {}", index, e),
        }
    }

    let summary_path = summary::save_summary(
        &workspace.output_dir,
        &lines,
        &processed,
        &workspace.started_at,
        language,
        voice_id,
    )?;

    info!("All lines processed");
    info!("Succeeded: {}/{}", processed.len(), total);
    info!("Output folder: {}", workspace.output_dir.display());
    info!("Summary file: {}", summary_path.display());

    Ok(RunReport {
        output_dir: workspace.output_dir.clone(),
        summary_path,
        succeeded: processed.len(),
        total,
    })
}
