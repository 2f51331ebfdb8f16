//! Damped power iteration with periodic checkpoints.
//!
//! Each step computes `v = d * (M . w) + (1 - d)`, adding the same
//! teleportation mass to every entry regardless of in-degree. Iteration stops
//! once `|w - v|` (Euclidean) falls below the tolerance, or when the
//! iteration bound is reached.

use ndarray::{Array1, Array2};

/// Solver tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Share of mass that follows links each step, in `(0, 1)`.
    pub damping: f64,
    /// Convergence threshold on the Euclidean step norm.
    pub tolerance: f64,
    /// Hard bound on the number of steps.
    pub max_iterations: usize,
    /// Emit a checkpoint on every iteration that is a multiple of this.
    pub checkpoint_interval: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            tolerance: 1e-10,
            max_iterations: 10_000,
            checkpoint_interval: 5,
        }
    }
}

/// A snapshot of the importance vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Checkpoint {
    /// Position of this checkpoint in the emitted sequence, starting at 0.
    pub sequence: usize,
    /// Iteration that produced `vector`, starting at 0.
    pub iteration: usize,
    /// Step norm `|w - v|` at that iteration.
    pub norm: f64,
    pub vector: Array1<f64>,
    /// Set on the last checkpoint when the norm fell below tolerance.
    pub converged: bool,
}

/// Lazy checkpoint stream of a power iteration run.
///
/// Pulling drives the computation. The last item is always the terminal
/// state; `converged` tells whether it was reached through the tolerance or
/// through the iteration bound. Dropping the iterator early leaves already
/// emitted checkpoints valid.
pub struct PowerIteration<'a> {
    matrix: &'a Array2<f64>,
    config: SolverConfig,
    current: Array1<f64>,
    iteration: usize,
    sequence: usize,
    finished: bool,
}

impl<'a> PowerIteration<'a> {
    pub fn new(matrix: &'a Array2<f64>, config: SolverConfig) -> Self {
        let n = matrix.ncols();
        let current = Array1::from_elem(n, 1.0 / n.max(1) as f64);
        Self {
            matrix,
            config,
            current,
            iteration: 0,
            sequence: 0,
            // A zero bound would never produce a terminal checkpoint.
            finished: config.max_iterations == 0,
        }
    }

    /// Number of iterations performed so far.
    pub fn iterations(&self) -> usize {
        self.iteration
    }

    fn step(&self) -> Array1<f64> {
        let d = self.config.damping;
        self.matrix.dot(&self.current) * d + (1.0 - d)
    }

    fn checkpoint(&mut self, iteration: usize, norm: f64, converged: bool) -> Checkpoint {
        let checkpoint = Checkpoint {
            sequence: self.sequence,
            iteration,
            norm,
            vector: self.current.clone(),
            converged,
        };
        self.sequence += 1;
        checkpoint
    }
}

impl Iterator for PowerIteration<'_> {
    type Item = Checkpoint;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            let next = self.step();
            let norm = euclidean_distance(&self.current, &next);
            let iteration = self.iteration;
            self.iteration += 1;
            self.current = next;

            tracing::debug!(iteration, norm, "power iteration step");

            let converged = norm < self.config.tolerance;
            if converged || self.iteration >= self.config.max_iterations {
                self.finished = true;
                if !converged {
                    tracing::warn!(
                        iterations = self.iteration,
                        norm,
                        "iteration bound reached before convergence"
                    );
                }
                return Some(self.checkpoint(iteration, norm, converged));
            }

            if iteration % self.config.checkpoint_interval.max(1) == 0 {
                return Some(self.checkpoint(iteration, norm, false));
            }
        }
        None
    }
}

/// Runs the solver to completion and returns the terminal checkpoint.
pub fn solve(matrix: &Array2<f64>, config: SolverConfig) -> Option<Checkpoint> {
    PowerIteration::new(matrix, config).last()
}

fn euclidean_distance(a: &Array1<f64>, b: &Array1<f64>) -> f64 {
    (a - b).mapv(|x| x * x).sum().sqrt()
}
