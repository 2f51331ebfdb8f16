//! Reference graph extraction from raw corpus markup.
//!
//! A page joins the graph when it carries at least one recognized section.
//! Links are only collected from inside recognized sections, and only kept
//! when they point at another page of the graph.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use super::blocks::tag_blocks;

/// An open/close delimiter pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagPair {
    pub open: String,
    pub close: String,
}

impl TagPair {
    pub fn new(open: &str, close: &str) -> Self {
        Self {
            open: open.to_string(),
            close: close.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty() || self.close.is_empty()
    }
}

/// Delimiters of the raw dump format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Markup {
    pub page: TagPair,
    pub title: TagPair,
    pub section: TagPair,
    pub link: TagPair,
    /// Separates a link target from its display text.
    pub display_separator: char,
}

impl Default for Markup {
    fn default() -> Self {
        Self {
            page: TagPair::new("<page>", "</page>"),
            title: TagPair::new("<title>", "</title>"),
            section: TagPair::new("== ", " =="),
            link: TagPair::new("[[", "]]"),
            display_separator: '|',
        }
    }
}

/// Which section names qualify a page, and which one marks the subset list.
#[derive(Debug, Clone)]
pub struct SectionFilter {
    pub recognized: BTreeSet<String>,
    pub subset: String,
}

impl SectionFilter {
    pub fn new<I, S>(recognized: I, subset: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            recognized: recognized.into_iter().map(Into::into).collect(),
            subset: subset.to_string(),
        }
    }

    pub fn is_recognized(&self, name: &str) -> bool {
        self.recognized.contains(name)
    }
}

impl Default for SectionFilter {
    fn default() -> Self {
        Self::new(["Theorem", "Definition", "Proof"], "Theorem")
    }
}

/// A single page block, borrowed from the dump.
#[derive(Debug, Clone)]
pub struct Document<'a> {
    pub title: &'a str,
    /// Sections in first-appearance order. A repeated heading keeps its
    /// position but takes the body of its last occurrence.
    pub sections: Vec<(&'a str, &'a str)>,
}

impl<'a> Document<'a> {
    /// Parses one page block. Returns `None` when the block has no title.
    pub fn parse(page: &'a str, markup: &'a Markup) -> Option<Self> {
        let title = tag_blocks(page, &markup.title.open, &markup.title.close)
            .next()?
            .inner;

        let mut sections: Vec<(&'a str, &'a str)> = Vec::new();
        for block in tag_blocks(page, &markup.section.open, &markup.section.close) {
            match sections.iter_mut().find(|(name, _)| *name == block.inner) {
                Some(existing) => existing.1 = block.trailing,
                None => sections.push((block.inner, block.trailing)),
            }
        }

        Some(Self { title, sections })
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.sections.iter().any(|(n, _)| *n == name)
    }

    pub fn qualifies(&self, filter: &SectionFilter) -> bool {
        self.sections.iter().any(|(n, _)| filter.is_recognized(n))
    }

    /// Bodies of the recognized sections, in section order.
    pub fn recognized_sections<'f>(
        &'f self,
        filter: &'f SectionFilter,
    ) -> impl Iterator<Item = &'a str> + 'f {
        self.sections
            .iter()
            .filter(|(name, _)| filter.is_recognized(name))
            .map(|(_, body)| *body)
    }
}

/// Strips the display text from a link, keeping only the target.
pub fn link_target(link: &str, separator: char) -> &str {
    match link.split_once(separator) {
        Some((target, _)) => target,
        None => link,
    }
}

/// Unweighted adjacency: page title to the ordered list of referenced titles.
/// Duplicate references are kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceGraph {
    pub links: BTreeMap<String, Vec<String>>,
}

impl ReferenceGraph {
    pub fn node_count(&self) -> usize {
        self.links.len()
    }

    pub fn contains(&self, title: &str) -> bool {
        self.links.contains_key(title)
    }

    /// Spreads each page's unit out-weight across its references.
    ///
    /// A page with `k` references gives `1/k` per reference, so a target
    /// referenced twice gets `2/k`. A page with no references maps to an
    /// empty map.
    pub fn weighted(&self) -> WeightedGraph {
        let edges = self
            .links
            .iter()
            .map(|(source, targets)| {
                let mut weights: BTreeMap<String, f64> = BTreeMap::new();
                let share = 1.0 / targets.len() as f64;
                for target in targets {
                    *weights.entry(target.clone()).or_insert(0.0) += share;
                }
                (source.clone(), weights)
            })
            .collect();
        WeightedGraph { edges }
    }
}

/// Weighted adjacency: source title to target title to share of out-weight.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightedGraph {
    pub edges: BTreeMap<String, BTreeMap<String, f64>>,
}

impl WeightedGraph {
    pub fn node_count(&self) -> usize {
        self.edges.len()
    }

    pub fn out_weight(&self, source: &str) -> f64 {
        self.edges
            .get(source)
            .map(|targets| targets.values().sum())
            .unwrap_or(0.0)
    }
}

/// Output of graph extraction.
#[derive(Debug, Clone, Default)]
pub struct CorpusGraph {
    pub graph: ReferenceGraph,
    /// Titles of qualifying pages carrying the subset section, in dump order.
    pub subset: Vec<String>,
}

/// Builds the reference graph from a raw dump.
///
/// Two passes: the first registers every qualifying page, the second
/// collects links, which can only be filtered once the node set is known.
pub fn build_graph(corpus: &str, markup: &Markup, filter: &SectionFilter) -> CorpusGraph {
    let documents: Vec<Document<'_>> = tag_blocks(corpus, &markup.page.open, &markup.page.close)
        .filter_map(|page| {
            let doc = Document::parse(page.inner, markup);
            if doc.is_none() {
                tracing::debug!("skipping page block without a title");
            }
            doc
        })
        .filter(|doc| doc.qualifies(filter))
        .collect();

    let mut nodes: BTreeSet<&str> = BTreeSet::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut subset = Vec::new();
    for doc in &documents {
        nodes.insert(doc.title);
        if doc.has_section(&filter.subset) && seen.insert(doc.title) {
            subset.push(doc.title.to_string());
        }
    }

    let mut links: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for doc in &documents {
        let references: Vec<String> = doc
            .recognized_sections(filter)
            .flat_map(|body| tag_blocks(body, &markup.link.open, &markup.link.close))
            .map(|link| link_target(link.inner, markup.display_separator))
            .filter(|target| *target != doc.title && nodes.contains(target))
            .map(String::from)
            .collect();
        // A title repeated in the dump keeps the references of its last page.
        links.insert(doc.title.to_string(), references);
    }

    tracing::debug!(
        pages = documents.len(),
        nodes = links.len(),
        subset = subset.len(),
        "built reference graph"
    );

    CorpusGraph {
        graph: ReferenceGraph { links },
        subset,
    }
}
