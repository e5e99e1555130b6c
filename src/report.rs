//! Plain-text and JSON exports of an analysis.

use crate::analysis::{AnalysisRecord, Section};
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Default file name of the plain-text report
pub const REPORT_FILE_NAME: &str = "meeting_analysis.txt";

/// Default file name of the JSON export
pub const JSON_FILE_NAME: &str = "meeting_analysis.json";

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize analysis: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to save export: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Render the analysis as a plain-text report
pub fn text_report(record: &AnalysisRecord) -> String {
    let mut out = String::from("MEETING ANALYSIS REPORT\n========================\n");
    for (section, items) in record.sections() {
        out.push('\n');
        out.push_str(report_heading(section));
        out.push_str(":\n");
        for item in items {
            out.push_str("• ");
            out.push_str(&item.to_string());
            out.push('\n');
        }
    }
    out
}

fn report_heading(section: Section) -> &'static str {
    match section {
        Section::ActionItems => "ACTION ITEMS",
        Section::Deadlines => "DEADLINES",
        Section::Decisions => "DECISIONS",
        Section::Participants => "PARTICIPANTS",
        Section::Summary => "SUMMARY",
    }
}

/// Render the analysis as pretty-printed JSON
pub fn json_report(record: &AnalysisRecord) -> Result<String, ReportError> {
    Ok(serde_json::to_string_pretty(record)?)
}

/// Write an export atomically: a temp file in the same directory is
/// renamed over the destination once fully written.
pub fn write_export(path: &Path, contents: &str) -> Result<(), ReportError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    file.persist(path)?;
    tracing::info!(path = %path.display(), bytes = contents.len(), "export written");
    Ok(())
}
