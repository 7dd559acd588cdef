//! Graph store: a fixed node table with CSR adjacency and atomic label cells.
//!
//! The table is dense over `0..=num_nodes`; index 0 is a reserved placeholder
//! with no edges so that external 1-based ids index the table directly.
//! Adjacency is immutable after [`Graph::build`]; only labels change afterwards.
//!
//! Labels live in one [`AtomicU32`] cell per node. During a propagation batch
//! the label array is shared by all worker threads with no locks: each worker
//! writes only its own assigned node, but may read a neighbor's cell while
//! another worker in the same batch overwrites it. The atomic cell makes that
//! race yield the old or the new value, never a torn one. All label accesses
//! are `Relaxed`; the scheduler's per-batch barrier is the only ordering.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::error::{Error, Result};

/// Undirected graph with dense node ids and mutable per-node community labels.
#[derive(Debug)]
pub struct Graph {
    /// CSR offsets: neighbors of node `i` are `edges[offsets[i]..offsets[i + 1]]`.
    offsets: Vec<usize>,
    /// Flat neighbor array.
    edges: Vec<u32>,
    /// Current community claim of each node.
    labels: Vec<AtomicU32>,
}

impl Graph {
    /// Build the node table from an undirected edge list.
    ///
    /// Allocates `num_nodes + 1` nodes (the reserved placeholder plus ids
    /// `1..=num_nodes`), each starting in its own singleton community
    /// (`label == id`), then inserts every edge symmetrically. Edges are kept
    /// as given: duplicates and self-loops are not filtered.
    ///
    /// Returns [`Error::Range`] if an edge references an id beyond `num_nodes`.
    pub fn build(num_nodes: u32, edges: &[(u32, u32)]) -> Result<Self> {
        let table = num_nodes as usize + 1;

        // Two-pass CSR construction: count degrees, then fill.
        let mut degrees = vec![0usize; table];
        for &(a, b) in edges {
            if a > num_nodes {
                return Err(Error::Range { id: a, max: num_nodes });
            }
            if b > num_nodes {
                return Err(Error::Range { id: b, max: num_nodes });
            }
            degrees[a as usize] += 1;
            degrees[b as usize] += 1;
        }

        let mut offsets = vec![0usize; table + 1];
        for i in 0..table {
            offsets[i + 1] = offsets[i] + degrees[i];
        }

        let mut flat = vec![0u32; offsets[table]];
        let mut cursor: Vec<usize> = offsets[..table].to_vec();
        for &(a, b) in edges {
            flat[cursor[a as usize]] = b;
            cursor[a as usize] += 1;
            flat[cursor[b as usize]] = a;
            cursor[b as usize] += 1;
        }

        let labels = (0..table as u32).map(AtomicU32::new).collect();

        Ok(Self {
            offsets,
            edges: flat,
            labels,
        })
    }

    /// Largest real node id (the table holds `num_nodes + 1` entries).
    pub fn num_nodes(&self) -> u32 {
        self.labels.len() as u32 - 1
    }

    /// Current label of `id` (relaxed atomic load).
    pub fn label(&self, id: u32) -> u32 {
        self.labels[id as usize].load(Ordering::Relaxed)
    }

    /// Overwrite the label of `id` (relaxed atomic store).
    ///
    /// No synchronization of its own; the scheduler guarantees that within a
    /// batch each node id is assigned to at most one worker slot.
    pub fn set_label(&self, id: u32, label: u32) {
        self.labels[id as usize].store(label, Ordering::Relaxed);
    }

    /// Neighbor ids of `id`.
    pub fn neighbors(&self, id: u32) -> &[u32] {
        let i = id as usize;
        &self.edges[self.offsets[i]..self.offsets[i + 1]]
    }

    /// Snapshot of all labels, indexed by node id.
    pub fn labels(&self) -> Vec<u32> {
        self.labels
            .iter()
            .map(|cell| cell.load(Ordering::Relaxed))
            .collect()
    }

    /// Override labels from `(id, label)` pairs, e.g. a loaded membership file.
    ///
    /// Returns [`Error::Range`] if a pair names an id outside the table.
    pub fn seed_labels(&self, pairs: impl IntoIterator<Item = (u32, u32)>) -> Result<()> {
        let max = self.num_nodes();
        for (id, label) in pairs {
            if id > max {
                return Err(Error::Range { id, max });
            }
            self.set_label(id, label);
        }
        Ok(())
    }
}
