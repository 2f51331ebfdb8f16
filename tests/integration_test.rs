use proofrank::core::ranking::Ranking;
use proofrank::format::{SubsetArtifact, read_artifact};
use proofrank::{RankConfig, WeightedGraph, extract, rank, report, run};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const CORPUS: &str = r#"<mediawiki>
<page>
<title>Pythagoras's Theorem</title>
<text>
== Theorem ==
For a [[Definition:Right Triangle|right triangle]] the squares add up.
== Proof ==
Follows from [[Euclid's Lemma]] and [[Definition:Right Triangle]].
== Sources ==
[[Some Book]]
</text>
</page>
<page>
<title>Definition:Right Triangle</title>
<text>
== Definition ==
A triangle with a right angle, see [[Pythagoras's Theorem]].
</text>
</page>
<page>
<title>Euclid's Lemma</title>
<text>
== Theorem ==
If a prime divides a product then [[Definition:Prime Number|it]] divides a factor.
== Proof ==
Uses [[Euclid's Lemma]] itself and [[Definition:Prime Number]].
</text>
</page>
<page>
<title>Definition:Prime Number</title>
<text>
== Definition ==
No outgoing links here.
</text>
</page>
<page>
<title>Some Book</title>
<text>
== Publication Data ==
[[Pythagoras's Theorem]]
</text>
</page>
<page>
<title>Truncated
"#;

fn config_in(root: &Path) -> anyhow::Result<RankConfig> {
    let corpus = root.join("latest.xml");
    fs::write(&corpus, CORPUS)?;
    Ok(RankConfig {
        corpus,
        output_dir: root.join("out"),
        ..RankConfig::default()
    })
}

#[test]
fn test_extract_artifacts() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let config = config_in(temp_dir.path())?;

    let summary = extract(&config)?;
    assert_eq!(summary.nodes, 4);
    assert_eq!(summary.subset, 2);

    let graph: WeightedGraph = read_artifact(&config.graph_path())?;
    assert!(!graph.edges.contains_key("Some Book"));
    assert!(graph.edges["Definition:Prime Number"].is_empty());

    let pythagoras = &graph.edges["Pythagoras's Theorem"];
    assert!((pythagoras["Definition:Right Triangle"] - 2.0 / 3.0).abs() < 1e-12);
    assert!((pythagoras["Euclid's Lemma"] - 1.0 / 3.0).abs() < 1e-12);

    // Self-reference dropped, only the definition link remains.
    let lemma = &graph.edges["Euclid's Lemma"];
    assert_eq!(lemma.len(), 1);
    assert_eq!(lemma["Definition:Prime Number"], 1.0);

    let subset: SubsetArtifact = read_artifact(&config.subset_path())?;
    assert_eq!(
        subset.titles,
        vec!["Pythagoras's Theorem".to_string(), "Euclid's Lemma".to_string()]
    );
    Ok(())
}

#[test]
fn test_full_pipeline() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let config = config_in(temp_dir.path())?;

    run(&config)?;

    let out = &config.output_dir;
    assert!(out.join("weighted_graph.json").exists());
    assert!(out.join("propositions.json").exists());
    assert!(out.join("ranks0.json").exists());

    let all = fs::read_to_string(out.join("all_ranks.txt"))?;
    assert_eq!(all.lines().count(), 4);
    assert!(all.starts_with("1. "));

    let definitions = fs::read_to_string(out.join("definition_ranks.txt"))?;
    assert!(definitions.contains("Right Triangle"));
    assert!(!definitions.contains("Definition:"));

    let theorems = fs::read_to_string(out.join("theorem_ranks.txt"))?;
    assert_eq!(theorems, "1. Pythagoras's Theorem\n");

    let propositions = fs::read_to_string(out.join("proposition_ranks.txt"))?;
    assert_eq!(propositions.lines().count(), 2);
    Ok(())
}

#[test]
fn test_rank_checkpoints_and_early_stop() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let config = config_in(temp_dir.path())?;
    extract(&config)?;

    let full = rank(&config, None)?;
    assert!(full.converged);
    assert!(!full.checkpoints.is_empty());
    for (seq, path) in full.checkpoints.iter().enumerate() {
        assert_eq!(path, &config.checkpoint_path(seq));
    }

    let last: Ranking = read_artifact(full.checkpoints.last().unwrap())?;
    assert_eq!(last.len(), 4);
    assert!(last.ranks.windows(2).all(|w| w[0].1 >= w[1].1));
    // The theorem/definition cycle keeps the most mass; the dangling
    // definition still outranks the lemma that is its only source.
    assert_eq!(last.ranks[0].0, "Pythagoras's Theorem");
    let position = |title: &str| last.titles().position(|t| t == title).unwrap();
    assert!(position("Definition:Prime Number") < position("Euclid's Lemma"));

    let other = TempDir::new()?;
    let partial_config = RankConfig {
        output_dir: other.path().to_path_buf(),
        ..config.clone()
    };
    fs::copy(config.graph_path(), partial_config.graph_path())?;
    let partial = rank(&partial_config, Some(1))?;
    assert_eq!(partial.checkpoints.len(), 1);
    assert!(!partial.converged);
    Ok(())
}

#[test]
fn test_rerun_is_identical() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let config = config_in(temp_dir.path())?;

    run(&config)?;
    let graph_first = fs::read_to_string(config.graph_path())?;
    let ranks_first = fs::read_to_string(config.checkpoint_path(0))?;

    run(&config)?;
    assert_eq!(graph_first, fs::read_to_string(config.graph_path())?);
    assert_eq!(ranks_first, fs::read_to_string(config.checkpoint_path(0))?);
    Ok(())
}

#[test]
fn test_missing_inputs_are_errors() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let config = RankConfig {
        corpus: temp_dir.path().join("absent.xml"),
        output_dir: temp_dir.path().join("out"),
        ..RankConfig::default()
    };

    assert!(extract(&config).is_err());
    assert!(rank(&config, None).is_err());
    assert!(report(&config, None).is_err());
    Ok(())
}

#[test]
fn test_report_without_subset_artifact() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let config = config_in(temp_dir.path())?;
    extract(&config)?;
    rank(&config, None)?;
    fs::remove_file(config.subset_path())?;

    let written = report(&config, Some(0))?;
    assert_eq!(written.len(), 4);
    assert!(!config.output_dir.join("proposition_ranks.txt").exists());
    Ok(())
}

#[test]
fn test_rerank_replaces_previous_checkpoints() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let config = config_in(temp_dir.path())?;
    extract(&config)?;
    let first = rank(&config, None)?;
    assert!(first.checkpoints.len() > 2);

    let corpus = temp_dir.path().join("smaller.xml");
    fs::write(
        &corpus,
        "<page><title>A</title>\n== Theorem ==\n[[C]]</page>\n\
         <page><title>B</title>\n== Theorem ==\n[[C]]</page>\n\
         <page><title>C</title>\n== Definition ==\nNothing.</page>\n",
    )?;
    let smaller = RankConfig {
        corpus,
        max_iterations: 3,
        ..config.clone()
    };
    extract(&smaller)?;
    let second = rank(&smaller, None)?;
    assert_eq!(second.checkpoints.len(), 2);
    assert!(!second.converged);
    assert!(!smaller.checkpoint_path(2).exists());

    report(&smaller, None)?;
    let latest: Ranking = read_artifact(second.checkpoints.last().unwrap())?;
    assert_eq!(latest.ranks[0].0, "C");
    let expected: String = latest
        .titles()
        .enumerate()
        .map(|(i, title)| format!("{}. {}\n", i + 1, title))
        .collect();
    assert_eq!(
        fs::read_to_string(smaller.output_dir.join("all_ranks.txt"))?,
        expected
    );
    Ok(())
}
