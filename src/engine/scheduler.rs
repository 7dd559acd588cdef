//! Batch scheduler and convergence tracking for the propagation run.

use std::time::{Duration, Instant};

use rand::prelude::*;
use rayon::prelude::*;

use super::worker;
use crate::error::{Error, Result};
use crate::graph::Graph;

/// Externally observable outcome of one pass.
#[derive(Debug, Clone)]
pub struct PassStats {
    /// 1-based pass number.
    pub pass: usize,
    /// Nodes whose label changed during the pass.
    pub changed_nodes: usize,
    /// Batches containing at least one change. Coarser than `changed_nodes`;
    /// both hit zero on the same pass, which is what convergence tests.
    pub changed_batches: usize,
    /// Wall time of the pass.
    pub elapsed: Duration,
}

/// Outcome of a whole propagation run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Passes executed.
    pub passes: usize,
    /// Whether a full pass produced zero changes. Only false when a
    /// `max_passes` cap stopped the run first.
    pub converged: bool,
}

/// Convergence tracker: `Converged` is terminal.
enum Convergence {
    Running,
    Converged,
}

/// Parallel label propagation over a [`Graph`].
///
/// Drives passes until convergence. Each pass reshuffles the node processing
/// order, slices it into consecutive batches of exactly `threads` slots (the
/// final batch padded with sentinels), and runs each batch as one fork-join on
/// a fixed worker pool: batch `k + 1` never starts before every slot of batch
/// `k` has returned. Within a batch the slot assignment is a bijection, so no
/// two workers ever write the same node's label; neighbor reads race only
/// inside the batch and only against atomic cells.
#[derive(Debug, Clone)]
pub struct Propagation {
    /// Worker pool size; also the batch width.
    threads: usize,
    /// Random seed for the per-pass shuffle.
    seed: Option<u64>,
    /// Optional pass cap; `None` runs to convergence.
    max_passes: Option<usize>,
}

impl Propagation {
    /// Create a propagation run with default settings.
    pub fn new() -> Self {
        Self {
            threads: std::thread::available_parallelism().map_or(1, |p| p.get()),
            seed: None,
            max_passes: None,
        }
    }

    /// Set the worker pool size (batch width).
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Set the shuffle seed for reproducible processing order.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Cap the number of passes. The baseline has no cap; the sole
    /// termination condition is a pass with zero changes.
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = Some(max_passes);
        self
    }

    /// Run to convergence, discarding per-pass stats.
    pub fn run(&self, graph: &Graph) -> Result<RunSummary> {
        self.run_with_observer(graph, |_: &PassStats| {})
    }

    /// Run to convergence, reporting each completed pass to `observer`.
    pub fn run_with_observer(
        &self,
        graph: &Graph,
        mut observer: impl FnMut(&PassStats),
    ) -> Result<RunSummary> {
        if self.threads == 0 {
            return Err(Error::InvalidParameter {
                name: "threads",
                message: "worker pool needs at least one slot",
            });
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .build()
            .map_err(|_| Error::InvalidParameter {
                name: "threads",
                message: "could not build the worker pool",
            })?;

        let mut rng: Box<dyn RngCore> = match self.seed {
            Some(s) => Box::new(StdRng::seed_from_u64(s)),
            None => Box::new(rand::rng()),
        };

        // The reserved placeholder 0 has no edges and never enters the
        // schedule; only real ids are processed.
        let mut order: Vec<u32> = (1..=graph.num_nodes()).collect();

        let mut state = Convergence::Running;
        let mut passes = 0;
        while let Convergence::Running = state {
            if self.max_passes == Some(passes) {
                return Ok(RunSummary {
                    passes,
                    converged: false,
                });
            }

            order.shuffle(&mut rng);
            passes += 1;
            let stats = run_pass(graph, &pool, self.threads, &order, passes)?;
            if stats.changed_batches == 0 {
                state = Convergence::Converged;
            }
            observer(&stats);
        }

        Ok(RunSummary {
            passes,
            converged: true,
        })
    }
}

impl Default for Propagation {
    fn default() -> Self {
        Self::new()
    }
}

/// One full sweep of `order`, in consecutive fork-join batches of `width`.
///
/// A worker failure in any slot aborts the batch and the pass; no partial
/// results are salvaged.
pub(crate) fn run_pass(
    graph: &Graph,
    pool: &rayon::ThreadPool,
    width: usize,
    order: &[u32],
    pass: usize,
) -> Result<PassStats> {
    let start = Instant::now();
    let mut changed_nodes = 0;
    let mut changed_batches = 0;

    for batch in order.chunks(width) {
        let slots = pad_batch(batch, width);
        // Hard barrier: install() returns only once all slots have.
        let results: Vec<Result<bool>> = pool.install(|| {
            slots
                .par_iter()
                .map(|&slot| worker::process(graph, slot))
                .collect()
        });

        let mut batch_changed = false;
        for result in results {
            if result? {
                changed_nodes += 1;
                batch_changed = true;
            }
        }
        if batch_changed {
            changed_batches += 1;
        }
    }

    Ok(PassStats {
        pass,
        changed_nodes,
        changed_batches,
        elapsed: start.elapsed(),
    })
}

/// Pad a batch to exactly `width` slots with the "no node assigned" sentinel.
pub(crate) fn pad_batch(batch: &[u32], width: usize) -> Vec<Option<u32>> {
    let mut slots: Vec<Option<u32>> = batch.iter().copied().map(Some).collect();
    slots.resize(width, None);
    slots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool_of(width: usize) -> rayon::ThreadPool {
        rayon::ThreadPoolBuilder::new()
            .num_threads(width)
            .build()
            .unwrap()
    }

    /// Deterministic single-worker run: chain 1-2-3 drains to label 1, pair
    /// 4-5 to label 4, node 0 untouched.
    #[test]
    fn test_single_worker_scenario() {
        let graph = Graph::build(5, &[(1, 2), (2, 3), (4, 5)]).unwrap();
        let pool = pool_of(1);
        // Descending order so the higher id of each pair is relabeled first.
        let order = [5, 4, 3, 2, 1];

        let mut pass = 0;
        loop {
            pass += 1;
            let stats = run_pass(&graph, &pool, 1, &order, pass).unwrap();
            if stats.changed_batches == 0 {
                break;
            }
            assert!(pass < 20, "did not converge");
        }

        assert_eq!(graph.labels(), vec![0, 1, 1, 1, 4, 4]);
    }

    #[test]
    fn test_batch_padding() {
        // num_nodes = 3 with pool width 4: one batch, exactly one sentinel.
        let slots = pad_batch(&[3, 1, 2], 4);
        assert_eq!(slots.len(), 4);
        assert_eq!(slots.iter().filter(|s| s.is_none()).count(), 1);
        assert_eq!(&slots[..3], &[Some(3), Some(1), Some(2)]);

        // Sentinel slots never alter the graph: a padded batch around an
        // isolated node leaves every label alone.
        let graph = Graph::build(3, &[(1, 2)]).unwrap();
        let pool = pool_of(4);
        let before = graph.labels();
        let stats = run_pass(&graph, &pool, 4, &[3], 1).unwrap();
        assert_eq!(stats.changed_nodes, 0);
        assert_eq!(stats.changed_batches, 0);
        assert_eq!(graph.labels(), before);
    }

    #[test]
    fn test_padded_final_batch_converges() {
        let graph = Graph::build(3, &[(1, 2), (2, 3)]).unwrap();
        let summary = Propagation::new()
            .with_threads(4)
            .with_seed(7)
            .run(&graph)
            .unwrap();
        assert!(summary.converged);
        // One connected component: all real nodes share a label drawn from it.
        let labels = graph.labels();
        assert_eq!(labels[1], labels[2]);
        assert_eq!(labels[2], labels[3]);
        assert!((1..=3).contains(&labels[1]));
        assert_eq!(labels[0], 0);
    }

    /// Once a pass reports zero changes, a further pass also reports zero.
    #[test]
    fn test_convergence_idempotent() {
        let graph = Graph::build(5, &[(1, 2), (2, 3), (4, 5)]).unwrap();
        Propagation::new().with_threads(2).with_seed(42).run(&graph).unwrap();

        let pool = pool_of(2);
        let order = [1, 2, 3, 4, 5];
        let stats = run_pass(&graph, &pool, 2, &order, 1).unwrap();
        assert_eq!(stats.changed_nodes, 0);
        assert_eq!(stats.changed_batches, 0);
    }

    /// Every final label was some node's initial id within the same
    /// component; labels are never invented.
    #[test]
    fn test_label_provenance() {
        let graph = Graph::build(6, &[(1, 2), (2, 3), (3, 1), (4, 5), (5, 6), (6, 4)]).unwrap();
        Propagation::new().with_threads(3).with_seed(9).run(&graph).unwrap();

        let labels = graph.labels();
        for id in 1..=3u32 {
            assert!((1..=3).contains(&labels[id as usize]));
        }
        for id in 4..=6u32 {
            assert!((4..=6).contains(&labels[id as usize]));
        }
    }

    /// Two disconnected triangles each settle on a single shared label.
    #[test]
    fn test_parallel_two_triangles() {
        let graph = Graph::build(6, &[(1, 2), (2, 3), (3, 1), (4, 5), (5, 6), (6, 4)]).unwrap();
        let summary = Propagation::new().with_threads(4).with_seed(3).run(&graph).unwrap();
        assert!(summary.converged);

        let labels = graph.labels();
        assert_eq!(labels[1], labels[2]);
        assert_eq!(labels[2], labels[3]);
        assert_eq!(labels[4], labels[5]);
        assert_eq!(labels[5], labels[6]);
        assert_ne!(labels[1], labels[4]);
    }

    #[test]
    fn test_worker_failure_aborts_pass() {
        let graph = Graph::build(3, &[(1, 2)]).unwrap();
        let pool = pool_of(2);
        let err = run_pass(&graph, &pool, 2, &[1, 99], 1).unwrap_err();
        match err {
            Error::WorkerFailure { node } => assert_eq!(node, 99),
            other => panic!("expected WorkerFailure, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_threads_rejected() {
        let graph = Graph::build(2, &[(1, 2)]).unwrap();
        let err = Propagation::new().with_threads(0).run(&graph).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { name: "threads", .. }));
    }

    #[test]
    fn test_pass_cap_stops_before_convergence() {
        let graph = Graph::build(2, &[(1, 2)]).unwrap();
        // Pass 1 always changes one of the pair, so a cap of 1 cannot see a
        // zero-change pass.
        let summary = Propagation::new()
            .with_threads(1)
            .with_seed(1)
            .with_max_passes(1)
            .run(&graph)
            .unwrap();
        assert_eq!(summary.passes, 1);
        assert!(!summary.converged);
    }

    #[test]
    fn test_empty_graph_converges_immediately() {
        let graph = Graph::build(0, &[]).unwrap();
        let mut seen = Vec::new();
        let summary = Propagation::new()
            .with_threads(2)
            .run_with_observer(&graph, |stats: &PassStats| seen.push(stats.changed_nodes))
            .unwrap();
        assert!(summary.converged);
        assert_eq!(summary.passes, 1);
        assert_eq!(seen, vec![0]);
    }

    #[test]
    fn test_observer_sees_every_pass() {
        let graph = Graph::build(4, &[(1, 2), (3, 4)]).unwrap();
        let mut passes = Vec::new();
        let summary = Propagation::new()
            .with_threads(2)
            .with_seed(5)
            .run_with_observer(&graph, |stats: &PassStats| passes.push(stats.pass))
            .unwrap();
        assert_eq!(passes.len(), summary.passes);
        assert_eq!(passes.last().copied(), Some(summary.passes));
        // The converging pass reports no changes.
        assert!(summary.converged);
    }
}
