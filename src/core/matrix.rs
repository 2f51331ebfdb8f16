//! Dense transition matrix construction.

use std::collections::{BTreeSet, HashMap};

use ndarray::{Array2, Axis};

use super::graph::WeightedGraph;

/// Bijection between titles and the dense range `0..n`, ordered by title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexAssignment {
    titles: Vec<String>,
    positions: HashMap<String, usize>,
}

impl IndexAssignment {
    /// Assigns indices in sorted title order. Duplicates collapse.
    pub fn from_titles<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sorted: BTreeSet<String> = titles.into_iter().map(Into::into).collect();
        let titles: Vec<String> = sorted.into_iter().collect();
        let positions = titles
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();
        Self { titles, positions }
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    pub fn index_of(&self, title: &str) -> Option<usize> {
        self.positions.get(title).copied()
    }

    pub fn title_of(&self, index: usize) -> Option<&str> {
        self.titles.get(index).map(String::as_str)
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }
}

/// Transition matrix plus the index layout it was built with.
#[derive(Debug, Clone)]
pub struct Materialized {
    /// Entry `(i, j)` is the weight of the edge from document `j` to document `i`.
    pub matrix: Array2<f64>,
    pub index: IndexAssignment,
}

/// Lays the weighted graph out as a column-oriented transition matrix.
///
/// Every title that appears as a source or as a target gets a row and a
/// column. Columns with a non-zero sum are rescaled to sum to one; all-zero
/// columns (dangling documents) stay zero and their mass is not redistributed.
pub fn materialize(graph: &WeightedGraph) -> Materialized {
    let index = IndexAssignment::from_titles(
        graph
            .edges
            .iter()
            .flat_map(|(source, targets)| std::iter::once(source).chain(targets.keys())),
    );

    let n = index.len();
    let mut matrix = Array2::<f64>::zeros((n, n));

    for (source, targets) in &graph.edges {
        let Some(col) = index.index_of(source) else {
            continue;
        };
        for (target, &weight) in targets {
            if let Some(row) = index.index_of(target) {
                matrix[[row, col]] = weight;
            }
        }
    }

    normalize_columns(&mut matrix);

    tracing::debug!(n, "materialized transition matrix");
    Materialized { matrix, index }
}

fn normalize_columns(matrix: &mut Array2<f64>) {
    let sums = matrix.sum_axis(Axis(0));
    for (mut column, &sum) in matrix.columns_mut().into_iter().zip(sums.iter()) {
        if sum != 0.0 {
            column.mapv_inplace(|x| x / sum);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn graph(edges: &[(&str, &[(&str, f64)])]) -> WeightedGraph {
        WeightedGraph {
            edges: edges
                .iter()
                .map(|(source, targets)| {
                    let targets: BTreeMap<String, f64> =
                        targets.iter().map(|(t, w)| (t.to_string(), *w)).collect();
                    (source.to_string(), targets)
                })
                .collect(),
        }
    }

    fn column_sum(m: &Materialized, title: &str) -> f64 {
        let j = m.index.index_of(title).unwrap();
        m.matrix.column(j).sum()
    }

    #[test]
    fn test_index_assignment_is_sorted_bijection() {
        let index = IndexAssignment::from_titles(["b", "c", "a", "b"]);

        assert_eq!(index.len(), 3);
        assert_eq!(index.titles(), &["a", "b", "c"]);
        for (i, title) in index.titles().iter().enumerate() {
            assert_eq!(index.index_of(title), Some(i));
            assert_eq!(index.title_of(i), Some(title.as_str()));
        }
        assert_eq!(index.index_of("missing"), None);
        assert_eq!(index.title_of(3), None);
    }

    #[test]
    fn test_transposed_orientation() {
        let m = materialize(&graph(&[
            ("A", &[("B", 1.0)]),
            ("B", &[("A", 0.5), ("C", 0.5)]),
            ("C", &[]),
        ]));

        let (a, b, c) = (
            m.index.index_of("A").unwrap(),
            m.index.index_of("B").unwrap(),
            m.index.index_of("C").unwrap(),
        );
        assert_eq!(m.matrix[[b, a]], 1.0);
        assert_eq!(m.matrix[[a, b]], 0.5);
        assert_eq!(m.matrix[[c, b]], 0.5);
        assert_eq!(m.matrix[[a, a]], 0.0);
        assert_eq!(column_sum(&m, "C"), 0.0);
    }

    #[test]
    fn test_columns_sum_to_one_or_zero() {
        let m = materialize(&graph(&[
            ("A", &[("B", 0.25), ("C", 0.75)]),
            ("B", &[("C", 1.0)]),
            ("C", &[]),
            ("D", &[("A", 1.0 / 3.0), ("B", 1.0 / 3.0), ("C", 1.0 / 3.0)]),
        ]));

        for column in m.matrix.columns() {
            let sum = column.sum();
            assert!(sum == 0.0 || (sum - 1.0).abs() < 1e-12, "column sum {sum}");
        }
    }

    #[test]
    fn test_unnormalized_weights_are_rescaled() {
        let m = materialize(&graph(&[("A", &[("B", 2.0), ("C", 6.0)]), ("B", &[])]));

        let (a, c) = (m.index.index_of("A").unwrap(), m.index.index_of("C").unwrap());
        assert!((m.matrix[[c, a]] - 0.75).abs() < 1e-12);
        assert!((column_sum(&m, "A") - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_targets_without_source_entry_get_an_index() {
        let m = materialize(&graph(&[("A", &[("Z", 1.0)])]));

        assert_eq!(m.index.len(), 2);
        assert_eq!(m.matrix.dim(), (2, 2));
        assert_eq!(column_sum(&m, "Z"), 0.0);
    }

    #[test]
    fn test_empty_graph() {
        let m = materialize(&WeightedGraph::default());
        assert!(m.index.is_empty());
        assert_eq!(m.matrix.dim(), (0, 0));
    }

    #[test]
    fn test_layout_is_reproducible() {
        let g = graph(&[("B", &[("A", 1.0)]), ("A", &[("B", 1.0)])]);
        let first = materialize(&g);
        let second = materialize(&g);

        assert_eq!(first.index, second.index);
        assert_eq!(first.matrix, second.matrix);
    }
}
