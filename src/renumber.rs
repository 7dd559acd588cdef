//! Dense renumbering of converged labels.

use std::collections::HashMap;

/// Map raw labels to dense community ids `1..=K`.
///
/// Ids are assigned in order of first appearance while scanning the label
/// array from node 0 upward. Returns the dense labels and the community
/// count `K`. Pure post-processing; not part of the iteration core.
pub fn dense_labels(labels: &[u32]) -> (Vec<u32>, usize) {
    let mut assigned: HashMap<u32, u32> = HashMap::new();
    let mut next = 0u32;
    let dense = labels
        .iter()
        .map(|&raw| {
            *assigned.entry(raw).or_insert_with(|| {
                next += 1;
                next
            })
        })
        .collect();
    (dense, next as usize)
}
