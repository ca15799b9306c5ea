use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Advisory record for a capture source that could not contribute edges.
///
/// A failed source degrades the run (fewer observations) but never aborts
/// it; the full list of failures is surfaced to the caller once ingestion
/// completes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceFailure {
    pub source: PathBuf,
    pub error: String,
}

impl SourceFailure {
    pub fn new(source: impl Into<PathBuf>, error: impl ToString) -> Self {
        SourceFailure {
            source: source.into(),
            error: error.to_string(),
        }
    }
}

impl fmt::Display for SourceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source.display(), self.error)
    }
}
