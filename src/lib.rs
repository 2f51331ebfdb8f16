pub mod config;
pub mod core;
pub mod error;
pub mod format;
pub mod runner;

// Re-export key items for convenience
pub use config::RankConfig;
pub use self::core::{
    Checkpoint, CorpusGraph, IndexAssignment, PowerIteration, Ranking, WeightedGraph, build_graph,
    materialize,
};
pub use error::ArtifactError;
pub use runner::{extract, rank, report, run};
