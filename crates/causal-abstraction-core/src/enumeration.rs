//! Enumeration of admissible intervention-set pairs (the J-set).
//!
//! The commuting-diagram check runs over a set of (sources, targets) pairs.
//! Which pairs are worth checking is a strategy decision, expressed through
//! the [`SetEnumeration`] trait. A pair is only meaningful where the
//! abstraction could be hiding or inventing causal structure relative to the
//! base model, which is what the default [`LegitimateSets`] strategy encodes.
//!
//! # Cost
//!
//! [`LegitimateSets`] enumerates ordered pairs of disjoint non-empty subsets
//! of the high-level variables: O(4^n) candidate pairs for n variables, each
//! requiring up to two reachability queries. This enumeration is the dominant
//! cost of the whole system; keep high-level models small or supply an
//! explicit J-set.

use tracing::{debug, warn};

use crate::error::{AbstractionError, AbstractionResult};
use crate::graph::reachability::path_between_sets;
use crate::graph::CausalGraph;
use crate::types::{AbstractionMap, InterventionSetPair};

/// A strategy producing the ordered sequence of admissible pairs to test.
pub trait SetEnumeration: Send + Sync {
    /// Enumerate admissible pairs over the high-level variables.
    fn enumerate(
        &self,
        low: &CausalGraph,
        high: &CausalGraph,
        map: &AbstractionMap,
    ) -> AbstractionResult<Vec<InterventionSetPair>>;

    /// Strategy name, for diagnostics.
    fn name(&self) -> &'static str;
}

/// Ordered singleton pairs `(s, t)` with a directed path `s -> t` in the
/// high-level graph.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectedPathPairs;

impl SetEnumeration for DirectedPathPairs {
    fn enumerate(
        &self,
        _low: &CausalGraph,
        high: &CausalGraph,
        _map: &AbstractionMap,
    ) -> AbstractionResult<Vec<InterventionSetPair>> {
        let mut pairs = Vec::new();
        for s in high.node_names() {
            for t in high.node_names() {
                if s != t && high.has_directed_path(s, t)? {
                    pairs.push(InterventionSetPair::singleton(s.clone(), t.clone())?);
                }
            }
        }
        Ok(pairs)
    }

    fn name(&self) -> &'static str {
        "directed-path-pairs"
    }
}

/// Every ordered singleton pair of distinct high-level variables, no filter.
///
/// An upper bound on any singleton strategy; used for exhaustive checks on
/// small models.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllPairs;

impl SetEnumeration for AllPairs {
    fn enumerate(
        &self,
        _low: &CausalGraph,
        high: &CausalGraph,
        _map: &AbstractionMap,
    ) -> AbstractionResult<Vec<InterventionSetPair>> {
        let mut pairs = Vec::new();
        for s in high.node_names() {
            for t in high.node_names() {
                if s != t {
                    pairs.push(InterventionSetPair::singleton(s.clone(), t.clone())?);
                }
            }
        }
        Ok(pairs)
    }

    fn name(&self) -> &'static str {
        "all-pairs"
    }
}

/// Singleton pairs admitted on a high-level path or, failing that, a path
/// between the low-level preimages.
///
/// Low-level targets derive from the high-level *target* node. An earlier
/// formulation derived them from the source node; that variant tests
/// reachability of a set from itself and admits pairs spuriously, so it is
/// not reproduced here.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectedPathPairsCrossLevel;

impl SetEnumeration for DirectedPathPairsCrossLevel {
    fn enumerate(
        &self,
        low: &CausalGraph,
        high: &CausalGraph,
        map: &AbstractionMap,
    ) -> AbstractionResult<Vec<InterventionSetPair>> {
        let mut pairs = Vec::new();
        for s in high.node_names() {
            for t in high.node_names() {
                if s == t {
                    continue;
                }
                let admitted = if high.has_directed_path(s, t)? {
                    true
                } else {
                    let low_sources = map.invert(std::slice::from_ref(s))?;
                    let low_targets = map.invert(std::slice::from_ref(t))?;
                    path_between_sets(low, &low_sources, &low_targets)?
                };
                if admitted {
                    pairs.push(InterventionSetPair::singleton(s.clone(), t.clone())?);
                }
            }
        }
        Ok(pairs)
    }

    fn name(&self) -> &'static str {
        "directed-path-pairs-cross-level"
    }
}

/// The default strategy: ordered pairs of disjoint non-empty subsets of the
/// high-level variables, admitted on a high-level set-to-set path or, when no
/// such path exists, a path between the corresponding low-level preimage
/// sets.
///
/// See the module docs for the O(4^n) cost.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegitimateSets;

/// Above this many high-level variables the power-set enumeration gets
/// noticeably expensive; warn rather than fail.
const WARN_NODE_COUNT: usize = 12;

impl SetEnumeration for LegitimateSets {
    fn enumerate(
        &self,
        low: &CausalGraph,
        high: &CausalGraph,
        map: &AbstractionMap,
    ) -> AbstractionResult<Vec<InterventionSetPair>> {
        let n = high.node_count();
        if n >= usize::BITS as usize {
            return Err(AbstractionError::InvalidModel(format!(
                "power-set enumeration over {} variables exceeds the subset mask width",
                n
            )));
        }
        if n > WARN_NODE_COUNT {
            warn!(
                nodes = n,
                "legitimate-sets enumeration is O(4^n); this will be slow"
            );
        }

        let subsets = non_empty_subsets(high.node_names());
        let mut pairs = Vec::new();

        for sources in &subsets {
            for targets in &subsets {
                if sources.iter().any(|s| targets.contains(s)) {
                    continue;
                }
                let admitted = if path_between_sets(high, sources, targets)? {
                    true
                } else {
                    let low_sources = map.invert(sources)?;
                    let low_targets = map.invert(targets)?;
                    path_between_sets(low, &low_sources, &low_targets)?
                };
                if admitted {
                    pairs.push(InterventionSetPair::new(sources.clone(), targets.clone())?);
                }
            }
        }

        debug!(
            admitted = pairs.len(),
            candidates = subsets.len() * subsets.len(),
            "legitimate-sets enumeration complete"
        );
        Ok(pairs)
    }

    fn name(&self) -> &'static str {
        "legitimate-sets"
    }
}

/// All non-empty subsets of `names`, ordered by ascending cardinality and
/// then lexicographically by variable position.
fn non_empty_subsets(names: &[String]) -> Vec<Vec<String>> {
    let n = names.len();
    let mut index_sets: Vec<Vec<usize>> = (1u64..(1u64 << n))
        .map(|mask| (0..n).filter(|i| mask & (1 << i) != 0).collect())
        .collect();
    index_sets.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    index_sets
        .into_iter()
        .map(|indices| indices.into_iter().map(|i| names[i].clone()).collect())
        .collect()
}
