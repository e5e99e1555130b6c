//! Coloured terminal output for analyses.

use crate::agent::AnalysisError;
use crate::analysis::{AnalysisRecord, Item, Section};
use crate::storage::StoredAnalysis;
use crate::transcript::TranscriptStats;
use colored::Colorize;

fn section_icon(section: Section) -> &'static str {
    match section {
        Section::ActionItems => "📋",
        Section::Deadlines => "⏰",
        Section::Decisions => "✅",
        Section::Participants => "👥",
        Section::Summary => "📝",
    }
}

/// Label in front of each numbered entry
fn entry_label(section: Section, index: usize) -> String {
    match section {
        Section::ActionItems => format!("Task {index}:"),
        Section::Summary => format!("Key Point {index}:"),
        _ => format!("{index}."),
    }
}

/// Render every section of an analysis as terminal panels
pub fn render_record(record: &AnalysisRecord) -> String {
    let mut out = String::new();
    for (section, items) in record.sections() {
        out.push_str(&format!(
            "{} {}\n",
            section_icon(section),
            section.title().bold().cyan()
        ));
        if items.is_empty() {
            out.push_str(&format!("  {}\n", section.empty_message().dimmed()));
        } else if section == Section::Participants {
            let names: Vec<String> = items.iter().map(|item| format!("👤 {}", item.text.bold())).collect();
            out.push_str(&format!("  {}\n", names.join("   ")));
        } else {
            for (i, item) in items.iter().enumerate() {
                out.push_str(&render_item(section, i + 1, item));
            }
        }
        out.push('\n');
    }
    out
}

fn render_item(section: Section, index: usize, item: &Item) -> String {
    let mut out = format!("  {} {}\n", entry_label(section, index).bold(), item.text);
    for (label, value) in item.details() {
        out.push_str(&format!("      {} {}\n", format!("{label}:").dimmed(), value));
    }
    out
}

pub fn print_record(record: &AnalysisRecord) {
    println!("{}", "✅ Analysis Complete!".green().bold());
    println!();
    print!("{}", render_record(record));
}

/// Show an analysis failure; parse failures include the model's raw reply
pub fn print_error(err: &AnalysisError) {
    eprintln!("{} {}", "❌ Analysis Error:".red().bold(), err);
    if let Some(raw) = err.raw_response() {
        eprintln!();
        eprintln!("{}", "🔍 Debug Information (raw model reply):".yellow());
        eprintln!("{}", "─".repeat(40).dimmed());
        eprintln!("{raw}");
        eprintln!("{}", "─".repeat(40).dimmed());
    }
}

pub fn print_stats(stats: &TranscriptStats) {
    println!("{}", "📊 Transcript Stats".bold());
    println!("  Words:               {}", stats.words);
    println!("  Characters:          {}", stats.characters);
    println!("  Est. speaking time:  {} min", stats.estimated_minutes);
    println!("  Est. prompt tokens:  {}", stats.estimated_tokens());
}

/// One entry of `recap list`
pub fn print_listing(stored: &StoredAnalysis) {
    println!(
        "📄 {} ({})",
        stored.id.yellow(),
        stored.created_at.format("%Y-%m-%d %H:%M")
    );
    println!("   {}", stored.headline());
    println!(
        "   {} action items, {} decisions, {} participants\n",
        stored.record.action_items.len(),
        stored.record.decisions.len(),
        stored.record.participants.len()
    );
}
