//! Concurrent label propagation iteration engine.
//!
//! Community detection by label propagation ([Raghavan et al. 2007](https://arxiv.org/abs/0709.2938)):
//! every node starts as its own singleton community and repeatedly adopts the
//! most common label among its neighbors; communities are wherever that
//! process stabilizes. O(E) per pass and typically only a handful of passes.
//!
//! ## Scheduling model
//!
//! This is the **asynchronous** variant run under a fixed-width batch
//! schedule. Each pass shuffles the node processing order, slices it into
//! consecutive batches of `P` slots (`P` = worker pool size; the last batch
//! padded with sentinels), and runs every batch as one synchronous fork-join:
//! all `P` workers finish before the next batch starts. Workers read neighbor
//! labels live, so a read may observe a same-batch update — that is what
//! makes the asynchronous variant converge faster than double-buffered
//! updates, and the per-batch barrier bounds every such race to one batch.
//!
//! A pass that changes no label at all terminates the run.
//!
//! ```no_run
//! use parlabel::{Graph, Propagation};
//!
//! # fn main() -> parlabel::Result<()> {
//! let graph = Graph::build(5, &[(1, 2), (2, 3), (4, 5)])?;
//! let summary = Propagation::new().with_threads(8).run(&graph)?;
//! assert!(summary.converged);
//! # Ok(())
//! # }
//! ```

mod scheduler;
mod worker;

pub use scheduler::{PassStats, Propagation, RunSummary};
