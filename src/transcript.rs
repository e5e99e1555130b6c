//! Transcript input and preview statistics.

use crate::agent::AnalysisError;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

/// Average speaking pace used for the time estimate
const WORDS_PER_MINUTE: usize = 150;

/// Rough characters-per-token ratio for English text
const CHARS_PER_TOKEN: usize = 4;

/// Prefix of instruction lines in the editor template
const TEMPLATE_MARKER: &str = "#>";

const EDITOR_TEMPLATE: &str = "\
#> Paste your meeting transcript below, then save and close the editor.
#> Lines starting with #> are ignored.
#>
#> Example:
#> John: Good morning everyone, let's start with the project updates...
#> Sarah: The marketing campaign is on track for next Friday...
#>
#> Tip: include speaker names for better analysis.
";

/// A non-empty meeting transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    text: String,
}

impl Transcript {
    /// Accept a transcript, rejecting empty or whitespace-only text
    pub fn new(text: impl Into<String>) -> Result<Self, AnalysisError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(AnalysisError::EmptyTranscript);
        }
        Ok(Self { text })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn stats(&self) -> TranscriptStats {
        TranscriptStats::of(&self.text)
    }
}

/// Size of a transcript, shown before analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptStats {
    pub words: usize,
    pub characters: usize,
    pub estimated_minutes: usize,
}

impl TranscriptStats {
    pub fn of(text: &str) -> Self {
        let words = text.split_whitespace().count();
        Self {
            words,
            characters: text.chars().count(),
            estimated_minutes: words / WORDS_PER_MINUTE,
        }
    }

    /// Approximate prompt size in model tokens
    pub fn estimated_tokens(&self) -> usize {
        self.characters / CHARS_PER_TOKEN
    }

    /// Whether the transcript plus `reserved` reply tokens overflows a context window
    pub fn exceeds_context(&self, window_tokens: usize, reserved: usize) -> bool {
        self.estimated_tokens().saturating_add(reserved) > window_tokens
    }

    /// The one-line warning shown when the transcript overflows the window
    pub fn context_warning(&self, window_tokens: usize, reserved: usize) -> Option<String> {
        self.exceeds_context(window_tokens, reserved).then(|| {
            format!(
                "transcript is about {} tokens; with the reply budget it exceeds the model's {}-token context window and the analysis may be incomplete",
                self.estimated_tokens(),
                window_tokens
            )
        })
    }
}

/// Read transcript text from a file, or from stdin when the path is `-`
pub fn read_source(path: &Path) -> std::io::Result<String> {
    if path.as_os_str() == "-" {
        read_stdin()
    } else {
        std::fs::read_to_string(path)
    }
}

pub fn read_stdin() -> std::io::Result<String> {
    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text)?;
    Ok(text)
}

/// Open the user's editor on a template and return what they entered
pub fn read_from_editor() -> std::io::Result<String> {
    let edited = edit::edit(EDITOR_TEMPLATE)?;
    Ok(strip_template(&edited))
}

fn strip_template(text: &str) -> String {
    text.lines()
        .filter(|line| !line.starts_with(TEMPLATE_MARKER))
        .collect::<Vec<_>>()
        .join("\n")
}
