//! Core module for proofrank
//!
//! Leaf-first: tag block extraction, graph building, matrix materialization,
//! power iteration, and ranking.

pub mod blocks;
pub mod graph;
pub mod matrix;
pub mod ranking;
pub mod solver;

pub use blocks::{Block, TagBlocks, tag_blocks};
pub use graph::{CorpusGraph, Markup, ReferenceGraph, SectionFilter, WeightedGraph, build_graph};
pub use matrix::{IndexAssignment, Materialized, materialize};
pub use ranking::Ranking;
pub use solver::{Checkpoint, PowerIteration, SolverConfig, solve};
