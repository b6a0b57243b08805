//! Directory layout for one run: `data/input/input.txt` and a timestamped
//! folder under `data/output/`.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{error, info};

pub const DIR_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

#[derive(Debug, Clone)]
pub struct Workspace {
    pub root: PathBuf,
    pub started_at: DateTime<Local>,
    pub timestamp: String,
    pub output_base: PathBuf,
    pub output_dir: PathBuf,
    pub input_file: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>, started_at: DateTime<Local>) -> Self {
        let root = root.into();
        let timestamp = started_at.format(DIR_TIMESTAMP_FORMAT).to_string();
        let output_base = root.join("data").join("output");
        let output_dir = output_base.join(&timestamp);
        let input_file = root.join("data").join("input").join("input.txt");
        Self {
            root,
            started_at,
            timestamp,
            output_base,
            output_dir,
            input_file,
        }
    }

    /// Creates every directory the run needs, then checks the output
    /// directory is writable. A failed write check is only logged.
    pub fn prepare(&self) -> std::io::Result<()> {
        info!("Project root: {}", self.root.display());
        info!("Timestamp folder: {}", self.timestamp);

        fs::create_dir_all(&self.output_dir)?;
        if let Some(input_dir) = self.input_file.parent() {
            fs::create_dir_all(input_dir)?;
        }

        match probe_writable(&self.output_dir) {
            Ok(()) => info!("Output directory is writable"),
            Err(e) => error!("Write check failed for {}: {}", self.output_dir.display(), e),
        }

        info!("Output base: {}", self.output_base.display());
        info!("Output folder: {}", self.output_dir.display());
        info!("Input file: {}", self.input_file.display());
        Ok(())
    }

    pub fn announce_output_dir(&self) {
        announce_output_dir(&self.output_dir);
    }
}

/// Lines a calling script scans stdout for.
pub fn announce_output_dir(dir: &Path) {
    println!("출력 폴더: {}", dir.display());
    println!("OUTPUT_DIR={}", dir.display());
}

fn probe_writable(dir: &Path) -> std::io::Result<()> {
    let mut marker = tempfile::Builder::new().prefix(".test").tempfile_in(dir)?;
    marker.write_all(b"test")?;
    marker.close()
}
