//! Recap CLI - meeting transcript analysis
//!
//! The application logic is contained in lib.rs, and this file is responsible
//! for parsing arguments and handling top-level errors.

use anyhow::{bail, Context};
use clap::{CommandFactory, Parser, Subcommand};
use colored::Colorize;
use dialoguer::Confirm;
use recap::client::MAX_TOKENS;
use recap::report::{self, JSON_FILE_NAME, REPORT_FILE_NAME};
use recap::storage::StoredAnalysis;
use recap::transcript::{self, TranscriptStats};
use recap::{display, ui, AnalysisRecord, Analyzer, Config, ErrorRecord, Storage, Transcript};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "recap")]
#[command(author, version, about = "Turn meeting transcripts into actionable insights", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a meeting transcript (file, `-` for stdin, or your editor)
    #[command(alias = "analyse")]
    Analyze {
        /// Transcript file
        path: Option<PathBuf>,
        /// Print the analysis (or error record) as JSON
        #[arg(long)]
        json: bool,
        /// Write a plain-text report
        #[arg(long, value_name = "FILE", num_args = 0..=1, default_missing_value = REPORT_FILE_NAME)]
        report: Option<PathBuf>,
        /// Write a JSON export
        #[arg(long, value_name = "FILE", num_args = 0..=1, default_missing_value = JSON_FILE_NAME)]
        export_json: Option<PathBuf>,
        /// Do not keep the analysis in history
        #[arg(long)]
        no_save: bool,
        /// Open the result in the full-screen viewer
        #[arg(long)]
        view: bool,
        /// Overwrite export files without asking
        #[arg(short, long)]
        yes: bool,
    },
    /// Get a brief 2-3 sentence summary of a transcript
    Summary {
        /// Transcript file
        path: Option<PathBuf>,
    },
    /// Show transcript statistics without calling the model
    Stats {
        /// Transcript file
        path: Option<PathBuf>,
    },
    /// List stored analyses
    List,
    /// Show a stored analysis
    Show {
        /// Analysis id or unique prefix
        id: String,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Open a stored analysis in the full-screen viewer
    View {
        /// Analysis id or unique prefix
        id: String,
    },
    /// Export a stored analysis (both formats when no flag is given)
    Export {
        /// Analysis id or unique prefix
        id: String,
        /// Write a plain-text report
        #[arg(long, value_name = "FILE", num_args = 0..=1, default_missing_value = REPORT_FILE_NAME)]
        report: Option<PathBuf>,
        /// Write a JSON export
        #[arg(long, value_name = "FILE", num_args = 0..=1, default_missing_value = JSON_FILE_NAME)]
        json: Option<PathBuf>,
        /// Overwrite export files without asking
        #[arg(short, long)]
        yes: bool,
    },
    /// Delete a stored analysis
    Delete {
        /// Analysis id or unique prefix
        id: String,
    },
    /// Print the JSON schema of an analysis record
    Schema,
    /// Generate shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Analyze {
            path,
            json,
            report,
            export_json,
            no_save,
            view,
            yes,
        }) => {
            // Resolve the API key before asking for any input
            let config = Config::load()?;
            let analyzer = Analyzer::from_config(&config)?;

            let text = read_transcript(path.as_deref())?;
            let stats = TranscriptStats::of(&text);
            warn_if_oversized(&stats, &config);

            if !json {
                eprintln!("🔍 Analyzing {} words...", stats.words);
            }

            let record = match analyzer.analyze(&text).await {
                Ok(record) => record,
                Err(err) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&ErrorRecord::from(&err))?);
                    } else {
                        display::print_error(&err);
                    }
                    std::process::exit(1);
                }
            };

            let stored = if no_save {
                None
            } else {
                let storage = Storage::open(&config.storage.path)?;
                Some(storage.store(&text, &record)?)
            };

            if json {
                println!("{}", report::json_report(&record)?);
            } else {
                display::print_record(&record);
                if let Some(stored) = &stored {
                    println!("{} {}", "💾 Saved as".dimmed(), stored.id.yellow());
                }
            }

            export(
                &record,
                report.as_deref(),
                export_json.as_deref(),
                yes,
                &mut std::io::stderr(),
            )?;

            if view {
                ui::run(ui::App::new("Meeting Analysis", record))?;
            }
        }
        Some(Commands::Summary { path }) => {
            let config = Config::load()?;
            let analyzer = Analyzer::from_config(&config)?;
            let text = read_transcript(path.as_deref())?;

            match analyzer.summarize(&text).await {
                Ok(summary) => println!("{summary}"),
                Err(err) => {
                    display::print_error(&err);
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::Stats { path }) => {
            let text = read_transcript(path.as_deref())?;
            let transcript = Transcript::new(text)?;
            let stats = transcript.stats();
            display::print_stats(&stats);

            let config = Config::load()?;
            warn_if_oversized(&stats, &config);
        }
        Some(Commands::List) => {
            let config = Config::load()?;
            let storage = Storage::open(&config.storage.path)?;
            let analyses = storage.list_all()?;

            if analyses.is_empty() {
                println!("No stored analyses found.");
            } else {
                println!("Stored analyses ({}):\n", analyses.len());
                for stored in &analyses {
                    display::print_listing(stored);
                }
            }
        }
        Some(Commands::Show { id, json }) => {
            let stored = load_stored(&id)?;
            if json {
                println!("{}", report::json_report(&stored.record)?);
            } else {
                println!(
                    "📄 {} ({}, {} words)\n",
                    stored.id.yellow(),
                    stored.created_at.format("%Y-%m-%d %H:%M"),
                    stored.stats.words
                );
                print!("{}", display::render_record(&stored.record));
            }
        }
        Some(Commands::View { id }) => {
            let stored = load_stored(&id)?;
            let title = format!(
                "Meeting Analysis {} ({})",
                stored.id,
                stored.created_at.format("%Y-%m-%d %H:%M")
            );
            ui::run(ui::App::new(title, stored.record))?;
        }
        Some(Commands::Export {
            id,
            report,
            json,
            yes,
        }) => {
            let stored = load_stored(&id)?;
            if report.is_none() && json.is_none() {
                export(
                    &stored.record,
                    Some(Path::new(REPORT_FILE_NAME)),
                    Some(Path::new(JSON_FILE_NAME)),
                    yes,
                    &mut std::io::stderr(),
                )?;
            } else {
                export(
                    &stored.record,
                    report.as_deref(),
                    json.as_deref(),
                    yes,
                    &mut std::io::stderr(),
                )?;
            }
        }
        Some(Commands::Delete { id }) => {
            let config = Config::load()?;
            let storage = Storage::open(&config.storage.path)?;
            let deleted = storage.delete(&id)?;
            println!("Deleted analysis {}", deleted.id.yellow());
        }
        Some(Commands::Schema) => {
            let schema = schemars::schema_for!(AnalysisRecord);
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "recap", &mut std::io::stdout());
        }
        None => {
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

/// Log to stderr; `RECAP_LOG` takes precedence over `-v`
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "recap=info",
        _ => "recap=debug",
    };
    let filter = EnvFilter::try_from_env("RECAP_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Read the transcript from a path, piped stdin, or the user's editor
fn read_transcript(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) => transcript::read_source(path)
            .with_context(|| format!("failed to read transcript from {}", path.display())),
        None if atty::is(atty::Stream::Stdin) => {
            transcript::read_from_editor().context("failed to read transcript from editor")
        }
        None => transcript::read_stdin().context("failed to read transcript from stdin"),
    }
}

fn warn_if_oversized(stats: &TranscriptStats, config: &Config) {
    let window = config.agent.context_window_tokens;
    if let Some(warning) = stats.context_warning(window, MAX_TOKENS as usize) {
        eprintln!("{} {}", "⚠️  Warning:".yellow().bold(), warning);
    }
}

fn load_stored(id: &str) -> anyhow::Result<StoredAnalysis> {
    let config = Config::load()?;
    let storage = Storage::open(&config.storage.path)?;
    Ok(storage.find(id)?)
}

/// Write the requested exports, asking before overwriting.
///
/// Status lines go to `status` so stdout stays clean for `--json`.
fn export(
    record: &AnalysisRecord,
    report_path: Option<&Path>,
    json_path: Option<&Path>,
    yes: bool,
    status: &mut impl Write,
) -> anyhow::Result<()> {
    if let Some(path) = report_path {
        write_file(path, &report::text_report(record), yes, status)?;
    }
    if let Some(path) = json_path {
        write_file(path, &report::json_report(record)?, yes, status)?;
    }
    Ok(())
}

fn write_file(path: &Path, contents: &str, yes: bool, status: &mut impl Write) -> anyhow::Result<()> {
    if path.exists() && !yes {
        if !atty::is(atty::Stream::Stdin) {
            bail!("{} already exists (use --yes to overwrite)", path.display());
        }
        let overwrite = Confirm::new()
            .with_prompt(format!("{} already exists. Overwrite?", path.display()))
            .default(false)
            .interact()?;
        if !overwrite {
            writeln!(status, "Skipped {}", path.display())?;
            return Ok(());
        }
    }
    report::write_export(path, contents)?;
    writeln!(status, "{} {}", "📄 Exported".green(), path.display())?;
    Ok(())
}
