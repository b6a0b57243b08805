//! Input reader: one phrase per non-blank line.

use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Error, Debug)]
pub enum InputError {
    #[error("input file {0} did not exist; an empty one was created")]
    Created(String),
    #[error("input file {0} has no non-blank lines")]
    Empty(String),
    #[error("failed to read input file: {0}")]
    Io(#[from] std::io::Error),
}

/// Loads trimmed, non-blank lines. A missing file is created empty and
/// reported as `InputError::Created`; existing content is never touched.
pub fn read_lines(path: &Path) -> Result<Vec<String>, InputError> {
    info!("Reading input file: {}", path.display());

    if !path.exists() {
        error!("{} does not exist", path.display());
        fs::File::create(path)?;
        println!("Created an empty input file. Add the text to convert, one line each, and run again.");
        return Err(InputError::Created(path.display().to_string()));
    }

    let content = fs::read_to_string(path)?;
    let lines: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    if lines.is_empty() {
        error!("{} is empty", path.display());
        println!("Add the text to convert to the input file and run again.");
        return Err(InputError::Empty(path.display().to_string()));
    }

    info!("Read {} line(s) from input", lines.len());
    Ok(lines)
}

/// Caps `text` at `max_chars` characters (not bytes).
pub fn truncate_text(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => {
            warn!(
                "Text is too long ({} chars); truncating to {}",
                text.chars().count(),
                max_chars
            );
            &text[..cut]
        }
        None => text,
    }
}
