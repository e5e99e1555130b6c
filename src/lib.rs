//! # Recap
//!
//! Turn meeting transcripts into action items, deadlines, decisions,
//! participants and a short summary using a hosted LLM.
//!
//! ## Features
//!
//! - **One canonical record**: whatever shape the model replies in, the result is normalized
//!   into an `AnalysisRecord` of `Item`s
//! - **Tolerant parsing**: code fences and chatter are stripped; unusable replies come back
//!   as an error carrying the raw text
//! - **Provider choice**: Groq and OpenAI over chat completions, Gemini via rstructor
//! - **History and exports**: sled-backed history, plain-text and JSON reports

pub mod agent;
pub mod analysis;
pub mod client;
pub mod config;
pub mod display;
pub mod parse;
pub mod prompt;
pub mod report;
pub mod storage;
pub mod transcript;
pub mod ui;

pub use agent::{AnalysisError, Analyzer, ErrorRecord};
pub use analysis::{AnalysisRecord, Item, Section};
pub use config::Config;
pub use storage::Storage;
pub use transcript::Transcript;
