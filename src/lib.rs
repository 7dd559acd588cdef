//! # parlabel
//!
//! Community detection in large undirected graphs by parallel label
//! propagation: a single offline batch computation over a graph held fixed in
//! memory for the run's duration.
//!
//! The crate splits into the graph store ([`Graph`]: dense node table, CSR
//! adjacency, atomic label cells), the concurrent iteration engine
//! ([`Propagation`]: shuffled batch schedule, fork-join worker pool,
//! convergence on a zero-change pass), dense relabeling ([`renumber`]), and
//! the edge-list / membership file formats ([`io`]).

pub mod engine;
/// Error types used across `parlabel`.
pub mod error;
pub mod graph;
pub mod io;
pub mod renumber;

pub use engine::{PassStats, Propagation, RunSummary};
pub use error::{Error, Result};
pub use graph::Graph;
