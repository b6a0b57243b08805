//! minimax-tts - convert each line of data/input/input.txt into an MP3

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use minimax_tts::config::DEFAULT_LANGUAGE;
use minimax_tts::workspace::announce_output_dir;
use minimax_tts::{Config, Workspace};

const EXIT_FAILURE: u8 = 1;
const EXIT_INTERRUPTED: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "minimax-tts")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Convert each line of data/input/input.txt to speech with the MiniMax API")]
struct Args {
    /// Voice language (e.g. spanish, korean); unknown values use the default voice
    #[arg(default_value = DEFAULT_LANGUAGE)]
    language: String,

    /// Project root containing data/input and data/output
    #[arg(long, value_name = "DIR", default_value = ".")]
    root: PathBuf,
}

fn main() -> ExitCode {
    let started_at = Local::now();
    setup_tracing();
    let args = Args::parse();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start runtime: {}", e);
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    let code = runtime.block_on(async move {
        let batch = tokio::task::spawn_blocking(move || run_batch(args, started_at));

        tokio::select! {
            joined = batch => match joined {
                Ok(Ok(())) => ExitCode::SUCCESS,
                Ok(Err(e)) => {
                    error!("TTS batch failed: {:?}", e);
                    ExitCode::from(EXIT_FAILURE)
                }
                Err(e) => {
                    error!("TTS batch crashed: {}", e);
                    ExitCode::from(EXIT_FAILURE)
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted by user");
                ExitCode::from(EXIT_INTERRUPTED)
            }
        }
    });

    // The blocking batch may still be mid-request after an interrupt.
    runtime.shutdown_background();
    code
}

fn run_batch(args: Args, started_at: DateTime<Local>) -> Result<()> {
    info!("Starting TTS conversion");

    let config = Config::from_env().inspect_err(|_| {
        println!("MINIMAX_GROUP_ID and MINIMAX_API_KEY are required for TTS conversion.");
        println!("Set them in the environment or in a .env file.");
    })?;

    let workspace = Workspace::new(&args.root, started_at);
    workspace
        .prepare()
        .with_context(|| format!("failed to set up directories under {}", args.root.display()))?;
    workspace.announce_output_dir();

    info!("===== MiniMax TTS =====");
    info!("Reading text from {}", workspace.input_file.display());
    info!("Each line becomes its own audio file.");
    info!(
        "Available languages: {}",
        config.voice_options.languages().collect::<Vec<_>>().join(", ")
    );

    let language = args.language.to_lowercase();
    let report = minimax_tts::run(&config, &workspace, &language)?;

    info!(
        "Done: {}/{} lines, summary at {}",
        report.succeeded,
        report.total,
        report.summary_path.display()
    );
    announce_output_dir(&report.output_dir);
    Ok(())
}

fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
