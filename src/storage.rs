//! Sled-based storage for past analyses.

use crate::analysis::AnalysisRecord;
use crate::transcript::TranscriptStats;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;
use thiserror::Error;

/// Shortest id prefix accepted by [`Storage::find`]
const MIN_PREFIX_LEN: usize = 4;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("database error: {0}")]
    DbError(#[from] sled::Error),
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("analysis not found: {0}")]
    NotFound(String),
    #[error("id prefix {0} matches more than one analysis")]
    Ambiguous(String),
}

/// A stored analysis with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredAnalysis {
    /// Hash of the transcript text
    pub id: String,
    /// When the analysis was created
    pub created_at: DateTime<Utc>,
    /// Size of the analysed transcript
    pub stats: TranscriptStats,
    /// The analysis itself
    pub record: AnalysisRecord,
}

impl StoredAnalysis {
    /// Create a new stored analysis
    pub fn new(id: String, stats: TranscriptStats, record: AnalysisRecord) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            stats,
            record,
        }
    }

    /// First summary point, for one-line listings
    pub fn headline(&self) -> &str {
        self.record
            .summary
            .first()
            .map(|item| item.text.as_str())
            .unwrap_or("(no summary)")
    }
}

/// Sled-based storage for meeting analyses.
///
/// Analyses are keyed by transcript hash, so analysing the same transcript
/// again replaces the earlier result.
pub struct Storage {
    db: sled::Db,
}

impl Storage {
    /// Open or create storage at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// Store an analysis of a transcript, returning its id
    pub fn store(&self, transcript: &str, record: &AnalysisRecord) -> Result<StoredAnalysis, StorageError> {
        let id = Self::hash_transcript(transcript);
        let stored = StoredAnalysis::new(id.clone(), TranscriptStats::of(transcript), record.clone());
        let value = serde_json::to_vec(&stored)?;
        self.db.insert(id.as_bytes(), value)?;
        self.db.flush()?;
        tracing::debug!(%id, "analysis stored");
        Ok(stored)
    }

    /// Retrieve an analysis by exact id
    pub fn get(&self, id: &str) -> Result<Option<StoredAnalysis>, StorageError> {
        match self.db.get(id.as_bytes())? {
            Some(data) => {
                let stored: StoredAnalysis = serde_json::from_slice(&data)?;
                Ok(Some(stored))
            }
            None => Ok(None),
        }
    }

    /// Retrieve an analysis by id or unique id prefix
    pub fn find(&self, prefix: &str) -> Result<StoredAnalysis, StorageError> {
        if let Some(stored) = self.get(prefix)? {
            return Ok(stored);
        }
        if prefix.len() < MIN_PREFIX_LEN {
            return Err(StorageError::NotFound(prefix.to_string()));
        }

        let mut matches = self.db.scan_prefix(prefix.as_bytes());
        let first = match matches.next() {
            Some(entry) => entry?,
            None => return Err(StorageError::NotFound(prefix.to_string())),
        };
        if matches.next().is_some() {
            return Err(StorageError::Ambiguous(prefix.to_string()));
        }
        Ok(serde_json::from_slice(&first.1)?)
    }

    /// List all stored analyses
    pub fn list_all(&self) -> Result<Vec<StoredAnalysis>, StorageError> {
        let mut results = Vec::new();
        for item in self.db.iter() {
            let (_key, value) = item?;
            let stored: StoredAnalysis = serde_json::from_slice(&value)?;
            results.push(stored);
        }
        // Sort by created_at descending (newest first)
        results.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(results)
    }

    /// Delete an analysis by id or unique prefix
    pub fn delete(&self, prefix: &str) -> Result<StoredAnalysis, StorageError> {
        let stored = self.find(prefix)?;
        self.db.remove(stored.id.as_bytes())?;
        self.db.flush()?;
        Ok(stored)
    }

    /// Get the number of stored analyses
    pub fn count(&self) -> usize {
        self.db.len()
    }

    /// First 8 bytes of the SHA-256 of the trimmed transcript, as hex
    fn hash_transcript(transcript: &str) -> String {
        let digest = Sha256::digest(transcript.trim().as_bytes());
        digest
            .iter()
            .take(8)
            .map(|byte| format!("{byte:02x}"))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Item;

    fn record(point: &str) -> AnalysisRecord {
        AnalysisRecord {
            summary: vec![Item::new(point)],
            ..AnalysisRecord::default()
        }
    }

    #[test]
    fn store_then_find_by_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();

        let stored = storage.store("Ann: hello", &record("Greeting")).unwrap();
        assert_eq!(stored.id.len(), 16);
        assert_eq!(stored.stats.words, 2);

        let found = storage.find(&stored.id[..6]).unwrap();
        assert_eq!(found.record, record("Greeting"));
        assert_eq!(found.headline(), "Greeting");
        assert!(storage.get(&stored.id).unwrap().is_some());
    }

    #[test]
    fn transcript_ids_are_stable_sha256_prefixes() {
        assert_eq!(Storage::hash_transcript("Ann: hello"), "0ba2c4b3a405ced7");
        assert_eq!(Storage::hash_transcript("  Ann: hello\n"), "0ba2c4b3a405ced7");
    }

    #[test]
    fn same_transcript_replaces_entry() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();

        let first = storage.store("Ann: hello", &record("First")).unwrap();
        let second = storage.store("Ann: hello\n", &record("Second")).unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(storage.count(), 1);
        assert_eq!(storage.find(&first.id).unwrap().headline(), "Second");
    }

    #[test]
    fn list_is_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();

        storage.store("one", &record("One")).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        storage.store("two", &record("Two")).unwrap();

        let listed: Vec<_> = storage
            .list_all()
            .unwrap()
            .iter()
            .map(|s| s.headline().to_string())
            .collect();
        assert_eq!(listed, ["Two", "One"]);
    }

    #[test]
    fn short_or_unknown_prefix_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();
        storage.store("one", &record("One")).unwrap();

        assert!(matches!(storage.find("ab"), Err(StorageError::NotFound(_))));
        assert!(matches!(storage.find("zzzzzz"), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn delete_removes_entry() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();
        let stored = storage.store("one", &record("One")).unwrap();

        let deleted = storage.delete(&stored.id).unwrap();
        assert_eq!(deleted.id, stored.id);
        assert_eq!(storage.count(), 0);
        assert!(storage.get(&stored.id).unwrap().is_none());
    }

    #[test]
    fn empty_summary_has_placeholder_headline() {
        let stored = StoredAnalysis::new(
            "id".to_string(),
            TranscriptStats::of("x"),
            AnalysisRecord::default(),
        );
        assert_eq!(stored.headline(), "(no summary)");
    }
}
