use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::graph::{Markup, SectionFilter};
use crate::core::solver::SolverConfig;

/// Default configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "proofrank.toml";

/// Main configuration for proofrank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankConfig {
    /// Path to the raw corpus dump
    pub corpus: PathBuf,
    /// Directory receiving every artifact
    pub output_dir: PathBuf,
    /// File name of the weighted graph artifact
    pub graph_file: String,
    /// File name of the subset artifact
    pub subset_file: String,
    /// Prefix of checkpoint ranking artifacts (`{prefix}{n}.json`)
    pub checkpoint_prefix: String,
    /// Share of mass that follows links each iteration
    pub damping: f64,
    /// Convergence threshold on the step norm
    pub tolerance: f64,
    /// Safety bound on solver iterations
    pub max_iterations: usize,
    /// Persist a checkpoint every this many iterations
    pub checkpoint_interval: usize,
    /// Section names that qualify a page and scope its links
    pub sections: Vec<String>,
    /// Section name whose pages are listed in the subset artifact
    pub subset_section: String,
    /// Dump delimiters
    pub markup: Markup,
    /// Enable debug logging
    pub verbose: bool,
}

impl RankConfig {
    /// Validates the configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.damping > 0.0 && self.damping < 1.0) {
            anyhow::bail!("Damping factor must lie in (0, 1): {}", self.damping);
        }
        if !(self.tolerance > 0.0) {
            anyhow::bail!("Tolerance must be positive: {}", self.tolerance);
        }
        if self.max_iterations == 0 {
            anyhow::bail!("max_iterations must be at least 1");
        }
        if self.checkpoint_interval == 0 {
            anyhow::bail!("checkpoint_interval must be at least 1");
        }
        if self.sections.is_empty() {
            anyhow::bail!("At least one recognized section is required");
        }
        let m = &self.markup;
        if m.page.is_empty() || m.title.is_empty() || m.section.is_empty() || m.link.is_empty() {
            anyhow::bail!("Markup delimiters must not be empty");
        }
        Ok(())
    }

    /// Loads configuration from a TOML file. Returns `None` if the file does not exist.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Option<Self>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read config: {:?}", path));
            }
        };
        let config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {:?}", path))?;
        Ok(Some(config))
    }

    pub fn solver(&self) -> SolverConfig {
        SolverConfig {
            damping: self.damping,
            tolerance: self.tolerance,
            max_iterations: self.max_iterations,
            checkpoint_interval: self.checkpoint_interval,
        }
    }

    pub fn section_filter(&self) -> SectionFilter {
        SectionFilter::new(self.sections.iter().cloned(), &self.subset_section)
    }

    pub fn graph_path(&self) -> PathBuf {
        self.output_dir.join(&self.graph_file)
    }

    pub fn subset_path(&self) -> PathBuf {
        self.output_dir.join(&self.subset_file)
    }

    pub fn checkpoint_path(&self, sequence: usize) -> PathBuf {
        self.output_dir.join(crate::core::ranking::checkpoint_file_name(
            &self.checkpoint_prefix,
            sequence,
        ))
    }
}

impl Default for RankConfig {
    fn default() -> Self {
        let solver = SolverConfig::default();
        Self {
            corpus: PathBuf::from("latest.xml"),
            output_dir: PathBuf::from("."),
            graph_file: "weighted_graph.json".to_string(),
            subset_file: "propositions.json".to_string(),
            checkpoint_prefix: "ranks".to_string(),
            damping: solver.damping,
            tolerance: solver.tolerance,
            max_iterations: solver.max_iterations,
            checkpoint_interval: solver.checkpoint_interval,
            sections: vec![
                "Theorem".to_string(),
                "Definition".to_string(),
                "Proof".to_string(),
            ],
            subset_section: "Theorem".to_string(),
            markup: Markup::default(),
            verbose: false,
        }
    }
}
