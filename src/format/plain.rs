//! Numbered plain text reports for proofrank

use std::collections::HashSet;
use std::io::Write;

use anyhow::Result;

use crate::core::ranking::Ranking;

const DEFINITION_PREFIX: &str = "Definition:";

/// The filtered views written from one checkpoint ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Every ranked title
    All,
    /// Titles mentioning neither "Definition" nor "Axiom"
    NonDefinition,
    /// Non-definition titles mentioning "Theorem"
    Theorem,
    /// Titles containing "Definition:", shown without the prefix
    Definition,
    /// Titles listed in the subset artifact
    Subset,
}

impl ReportKind {
    pub const ALL: [ReportKind; 5] = [
        ReportKind::All,
        ReportKind::NonDefinition,
        ReportKind::Theorem,
        ReportKind::Definition,
        ReportKind::Subset,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            ReportKind::All => "all_ranks.txt",
            ReportKind::NonDefinition => "nondef_ranks.txt",
            ReportKind::Theorem => "theorem_ranks.txt",
            ReportKind::Definition => "definition_ranks.txt",
            ReportKind::Subset => "proposition_ranks.txt",
        }
    }
}

fn is_non_definition(title: &str) -> bool {
    !title.contains("Definition") && !title.contains("Axiom")
}

/// Applies the report filter, keeping ranking order.
pub fn filter_ranking<'r>(
    ranking: &'r Ranking,
    kind: ReportKind,
    subset: &HashSet<&str>,
) -> Vec<&'r str> {
    let titles = ranking.titles();
    match kind {
        ReportKind::All => titles.collect(),
        ReportKind::NonDefinition => titles.filter(|t| is_non_definition(t)).collect(),
        ReportKind::Theorem => titles
            .filter(|t| is_non_definition(t) && t.contains("Theorem"))
            .collect(),
        ReportKind::Definition => titles
            .filter_map(|t| {
                t.find(DEFINITION_PREFIX)
                    .map(|at| &t[at + DEFINITION_PREFIX.len()..])
            })
            .collect(),
        ReportKind::Subset => titles.filter(|t| subset.contains(t)).collect(),
    }
}

/// Writes one `{n}. {title}` line per entry, numbered from 1.
pub fn write_report(output: &mut dyn Write, titles: &[&str]) -> Result<()> {
    for (i, title) in titles.iter().enumerate() {
        writeln!(output, "{}. {}", i + 1, title)?;
    }
    Ok(())
}
