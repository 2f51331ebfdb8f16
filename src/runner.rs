use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::RankConfig;
use crate::core::graph::{CorpusGraph, WeightedGraph, build_graph};
use crate::core::matrix::materialize;
use crate::core::ranking::{Ranking, clear_checkpoints, latest_checkpoint};
use crate::core::solver::PowerIteration;
use crate::format::{
    ReportKind, SubsetArtifact, filter_ranking, read_artifact, read_corpus, write_artifact,
    write_report,
};

/// What `extract` persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractSummary {
    pub nodes: usize,
    pub edges: usize,
    pub subset: usize,
}

/// What `rank` persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct RankSummary {
    /// Paths of the checkpoint rankings, in emission order
    pub checkpoints: Vec<PathBuf>,
    /// Iterations performed before the solver stopped or was stopped
    pub iterations: usize,
    /// Whether the last persisted checkpoint is the converged state
    pub converged: bool,
}

fn ensure_output_dir(config: &RankConfig) -> Result<()> {
    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", config.output_dir))
}

/// Builds the weighted reference graph from the corpus and persists it
/// together with the subset list.
pub fn extract(config: &RankConfig) -> Result<ExtractSummary> {
    let corpus = read_corpus(&config.corpus)
        .with_context(|| format!("Failed to load corpus: {:?}", config.corpus))?;
    tracing::info!(bytes = corpus.len(), path = ?config.corpus, "corpus loaded");

    let CorpusGraph { graph, subset } =
        build_graph(&corpus, &config.markup, &config.section_filter());
    let weighted = graph.weighted();
    let edges = weighted.edges.values().map(|targets| targets.len()).sum();

    ensure_output_dir(config)?;
    write_artifact(&config.graph_path(), &weighted)?;
    let subset_count = subset.len();
    write_artifact(&config.subset_path(), &SubsetArtifact { titles: subset })?;

    let summary = ExtractSummary {
        nodes: weighted.node_count(),
        edges,
        subset: subset_count,
    };
    tracing::info!(
        nodes = summary.nodes,
        edges = summary.edges,
        subset = summary.subset,
        "graph extracted"
    );
    Ok(summary)
}

fn solver_progress(config: &RankConfig) -> Result<ProgressBar> {
    if config.verbose {
        // Per-step debug logs already cover progress.
        return Ok(ProgressBar::hidden());
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(ProgressStyle::with_template("{spinner} {elapsed} {msg}")?);
    bar.enable_steady_tick(Duration::from_millis(120));
    Ok(bar)
}

/// Solves the persisted graph, writing a ranking per checkpoint.
///
/// Checkpoint artifacts left by an earlier run are removed first, so the
/// output directory only ever holds rankings of the current graph.
/// `max_checkpoints` stops pulling from the solver after that many
/// checkpoints; everything written up to that point stays valid.
pub fn rank(config: &RankConfig, max_checkpoints: Option<usize>) -> Result<RankSummary> {
    let graph: WeightedGraph = read_artifact(&config.graph_path())
        .context("Failed to load weighted graph; run `extract` first")?;

    let materialized = materialize(&graph);
    tracing::info!(n = materialized.index.len(), "solving");

    ensure_output_dir(config)?;
    let stale = clear_checkpoints(&config.output_dir, &config.checkpoint_prefix)
        .with_context(|| format!("Failed to clear old checkpoints in {:?}", config.output_dir))?;
    if stale > 0 {
        tracing::debug!(removed = stale, "cleared previous checkpoints");
    }
    let progress = solver_progress(config)?;

    let mut solver = PowerIteration::new(&materialized.matrix, config.solver());
    let mut summary = RankSummary {
        checkpoints: Vec::new(),
        iterations: 0,
        converged: false,
    };

    for checkpoint in solver.by_ref().take(max_checkpoints.unwrap_or(usize::MAX)) {
        progress.set_message(format!(
            "i = {}: error = {:e}",
            checkpoint.iteration, checkpoint.norm
        ));

        let ranking = Ranking::from_vector(&checkpoint.vector, &materialized.index);
        let path = config.checkpoint_path(checkpoint.sequence);
        write_artifact(&path, &ranking)?;

        summary.checkpoints.push(path);
        summary.converged = checkpoint.converged;
    }
    summary.iterations = solver.iterations();
    progress.finish_and_clear();

    if summary.converged {
        tracing::info!(iterations = summary.iterations, "converged");
    } else {
        tracing::warn!(
            iterations = summary.iterations,
            checkpoints = summary.checkpoints.len(),
            "stopped before convergence"
        );
    }
    Ok(summary)
}

/// Writes the numbered reports for checkpoint `sequence`, or for the latest
/// checkpoint found in the output directory.
pub fn report(config: &RankConfig, sequence: Option<usize>) -> Result<Vec<PathBuf>> {
    let path = match sequence {
        Some(n) => config.checkpoint_path(n),
        None => {
            latest_checkpoint(&config.output_dir, &config.checkpoint_prefix)
                .with_context(|| format!("Failed to list {:?}", config.output_dir))?
                .map(|(_, path)| path)
                .with_context(|| {
                    format!("No checkpoint rankings in {:?}; run `rank` first", config.output_dir)
                })?
        }
    };
    let ranking: Ranking = read_artifact(&path)?;
    tracing::info!(path = ?path, entries = ranking.len(), "ranking loaded");

    let subset = match read_artifact::<SubsetArtifact>(&config.subset_path()) {
        Ok(subset) => Some(subset),
        Err(e) if e.is_not_found() => {
            tracing::warn!("{}; skipping subset report", e);
            None
        }
        Err(e) => return Err(e.into()),
    };
    let members: HashSet<&str> = subset
        .iter()
        .flat_map(|s| s.titles.iter().map(String::as_str))
        .collect();

    let mut written = Vec::new();
    for kind in ReportKind::ALL {
        if kind == ReportKind::Subset && subset.is_none() {
            continue;
        }
        let out_path = config.output_dir.join(kind.file_name());
        let titles = filter_ranking(&ranking, kind, &members);

        let file = File::create(&out_path)
            .with_context(|| format!("Failed to create report: {:?}", out_path))?;
        let mut writer = BufWriter::new(file);
        write_report(&mut writer, &titles)?;
        writer.flush()?;

        tracing::info!(path = ?out_path, entries = titles.len(), "report written");
        written.push(out_path);
    }
    Ok(written)
}

/// Runs extraction, ranking and reporting back to back.
pub fn run(config: &RankConfig) -> Result<()> {
    extract(config)?;
    let summary = rank(config, None)?;
    report(config, summary.checkpoints.len().checked_sub(1))?;
    Ok(())
}
