//! Set-to-set reachability.
//!
//! Answers whether a directed path exists from *any* node of a source set to
//! *any* node of a target set. The check works on an augmented copy of the
//! graph: a synthetic super-source is wired to every source node and every
//! target node is wired to a synthetic super-sink, reducing the question to a
//! single path query between the two synthetic endpoints.
//!
//! The synthetic endpoints are fresh `NodeIndex` values that never enter the
//! name index, so they cannot collide with any domain variable.

use petgraph::algo::has_path_connecting;

use super::CausalGraph;
use crate::error::AbstractionResult;

/// Whether a directed path exists between two node sets.
///
/// Returns `false` for an empty source or target set.
///
/// # Errors
///
/// Returns [`crate::error::AbstractionError::UnknownNode`] if any named node
/// is not in the graph.
///
/// # Complexity
///
/// O(V + E): one graph copy plus one path query.
pub fn path_between_sets(
    graph: &CausalGraph,
    sources: &[String],
    targets: &[String],
) -> AbstractionResult<bool> {
    if sources.is_empty() || targets.is_empty() {
        return Ok(false);
    }

    // Resolve names before cloning so bad input fails without the copy.
    let source_indices = sources
        .iter()
        .map(|s| graph.node_index(s))
        .collect::<AbstractionResult<Vec<_>>>()?;
    let target_indices = targets
        .iter()
        .map(|t| graph.node_index(t))
        .collect::<AbstractionResult<Vec<_>>>()?;

    let mut augmented = graph.petgraph().clone();
    let super_source = augmented.add_node(());
    let super_sink = augmented.add_node(());

    for s in source_indices {
        augmented.add_edge(super_source, s, ());
    }
    for t in target_indices {
        augmented.add_edge(t, super_sink, ());
    }

    Ok(has_path_connecting(&augmented, super_source, super_sink, None))
}
