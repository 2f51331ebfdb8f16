//! Mapping importance vectors back to titles.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::matrix::IndexAssignment;

/// Titles ordered by descending importance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    pub ranks: Vec<(String, f64)>,
}

impl Ranking {
    /// Zips the vector with the index layout and sorts it.
    ///
    /// Equal values are ordered by title so that reruns produce identical
    /// artifacts.
    pub fn from_vector(vector: &Array1<f64>, index: &IndexAssignment) -> Self {
        let mut ranks: Vec<(String, f64)> = index
            .titles()
            .iter()
            .zip(vector.iter())
            .map(|(title, &value)| (title.clone(), value))
            .collect();
        ranks.sort_by(by_value_then_title);
        Self { ranks }
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.ranks.iter().map(|(title, _)| title.as_str())
    }
}

fn by_value_then_title(a: &(String, f64), b: &(String, f64)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}

/// File name of the ranking artifact for checkpoint `sequence`.
pub fn checkpoint_file_name(prefix: &str, sequence: usize) -> String {
    format!("{prefix}{sequence}.json")
}

/// Parses the sequence number back out of a checkpoint artifact name.
pub fn checkpoint_sequence(prefix: &str, file_name: &str) -> Option<usize> {
    file_name
        .strip_prefix(prefix)?
        .strip_suffix(".json")?
        .parse()
        .ok()
}

/// Finds the highest-numbered checkpoint artifact in `dir`.
pub fn latest_checkpoint(dir: &Path, prefix: &str) -> std::io::Result<Option<(usize, PathBuf)>> {
    let mut latest: Option<(usize, PathBuf)> = None;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(sequence) = name.to_str().and_then(|n| checkpoint_sequence(prefix, n)) else {
            continue;
        };
        if latest.as_ref().is_none_or(|(best, _)| sequence > *best) {
            latest = Some((sequence, entry.path()));
        }
    }
    Ok(latest)
}

/// Removes every checkpoint artifact in `dir`, returning how many were
/// deleted. A missing directory holds no checkpoints.
pub fn clear_checkpoints(dir: &Path, prefix: &str) -> std::io::Result<usize> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };
    let mut removed = 0;
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        if name
            .to_str()
            .and_then(|n| checkpoint_sequence(prefix, n))
            .is_some()
        {
            std::fs::remove_file(entry.path())?;
            removed += 1;
        }
    }
    Ok(removed)
}
