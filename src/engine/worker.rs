//! Label decision worker: relabels a single node from live neighbor state.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::graph::Graph;

/// Process one worker slot for the current batch.
///
/// `None` is the sentinel padding a partial final batch: no reads, no writes,
/// reports unchanged. For a real id, reads the current labels of all neighbors
/// (live loads against shared state; racing with same-batch writers is
/// intentional), adopts the most common one, and reports whether the node's
/// label actually changed. A node with no neighbors keeps its label.
///
/// At most one label mutation per call, confined to the assigned node.
pub(crate) fn process(graph: &Graph, slot: Option<u32>) -> Result<bool> {
    let Some(id) = slot else {
        return Ok(false);
    };
    if id > graph.num_nodes() {
        return Err(Error::WorkerFailure { node: id });
    }

    let neighbors = graph.neighbors(id);
    if neighbors.is_empty() {
        return Ok(false);
    }

    let mut counts: HashMap<u32, usize> = HashMap::with_capacity(neighbors.len());
    for &neighbor in neighbors {
        *counts.entry(graph.label(neighbor)).or_insert(0) += 1;
    }

    let current = graph.label(id);
    let winner = decide_label(&counts, current);
    if winner != current {
        graph.set_label(id, winner);
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Label with the highest multiplicity in `counts`.
///
/// Ties are broken toward the **smallest label value**. This is a fixed,
/// documented rule: any total order works for convergence, but the choice must
/// not depend on map iteration order.
fn decide_label(counts: &HashMap<u32, usize>, current: u32) -> u32 {
    let mut best = current;
    let mut best_count = 0usize;
    for (&label, &count) in counts {
        match count.cmp(&best_count) {
            Ordering::Greater => {
                best = label;
                best_count = count;
            }
            Ordering::Equal => {
                if label < best {
                    best = label;
                }
            }
            Ordering::Less => {}
        }
    }
    best
}
