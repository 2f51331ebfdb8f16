//! Durable artifacts for proofrank
//!
//! Everything the pipeline persists goes through this module: the weighted
//! graph, the subset list and checkpoint rankings as JSON (`json`), and the
//! numbered text reports (`plain`).

pub mod json;
pub mod plain;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ArtifactError, Result};

pub use self::json::{read_artifact, write_artifact};
pub use self::plain::{ReportKind, filter_ranking, write_report};

/// Titles of the pages carrying the subset section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsetArtifact {
    #[serde(rename = "Theorems")]
    pub titles: Vec<String>,
}

/// Reads the raw corpus dump.
pub fn read_corpus(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| ArtifactError::from_read(path.to_path_buf(), e))
}
