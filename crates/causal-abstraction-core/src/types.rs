//! Core data types: the abstraction map and intervention set pairs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{AbstractionError, AbstractionResult};

/// Total many-to-one map from low-level variables to high-level variables.
///
/// Declaration order of the low-level variables is preserved and significant:
/// [`AbstractionMap::invert`] returns preimages grouped per requested
/// high-level node, each group in declaration order. That grouping is what
/// keeps the mixed-radix composite index of an inverted set aligned with a
/// tensor composition of per-node alpha matrices taken in the same high-level
/// node order. The two must agree or diagram comparisons silently multiply
/// mismatched configurations.
///
/// # Example
///
/// ```
/// use causal_abstraction_core::types::AbstractionMap;
///
/// let map = AbstractionMap::new([("a1", "X"), ("a2", "X"), ("b", "Y")]).unwrap();
/// assert_eq!(map.image("a2"), Some("X"));
/// assert_eq!(map.preimage("X"), vec!["a1", "a2"]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbstractionMap {
    /// (low, high) pairs in declaration order.
    forward: Vec<(String, String)>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl AbstractionMap {
    /// Build a map from `(low, high)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`AbstractionError::DuplicateNode`] if a low-level variable is
    /// mapped twice; the map must be a function.
    pub fn new<I, S, T>(pairs: I) -> AbstractionResult<Self>
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        let mut forward = Vec::new();
        let mut index = HashMap::new();
        for (low, high) in pairs {
            let low = low.into();
            let high = high.into();
            if index.insert(low.clone(), forward.len()).is_some() {
                return Err(AbstractionError::DuplicateNode(low));
            }
            forward.push((low, high));
        }
        Ok(Self { forward, index })
    }

    /// The high-level image of a low-level variable.
    pub fn image(&self, low: &str) -> Option<&str> {
        self.index
            .get(low)
            .map(|&i| self.forward[i].1.as_str())
    }

    /// All low-level variables mapping to `high`, in declaration order.
    pub fn preimage(&self, high: &str) -> Vec<&str> {
        self.forward
            .iter()
            .filter(|(_, h)| h == high)
            .map(|(l, _)| l.as_str())
            .collect()
    }

    /// Low-level variables in declaration order.
    pub fn low_nodes(&self) -> impl Iterator<Item = &str> {
        self.forward.iter().map(|(l, _)| l.as_str())
    }

    /// Preimage of a set of high-level variables.
    ///
    /// The result concatenates per-node preimages in the order the high-level
    /// nodes are given, each block in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`AbstractionError::EmptyPreimage`] if any requested node has
    /// no preimage: an invalid abstraction map, surfaced immediately rather
    /// than skipped.
    pub fn invert(&self, high_nodes: &[String]) -> AbstractionResult<Vec<String>> {
        let mut low = Vec::new();
        for high in high_nodes {
            let block = self.preimage(high);
            if block.is_empty() {
                return Err(AbstractionError::EmptyPreimage { node: high.clone() });
            }
            low.extend(block.into_iter().map(String::from));
        }
        Ok(low)
    }

    /// Rebuild the lookup index after deserialization.
    pub fn reindex(&mut self) {
        self.index = self
            .forward
            .iter()
            .enumerate()
            .map(|(i, (l, _))| (l.clone(), i))
            .collect();
    }
}

/// An ordered pair of same-level intervention sets: `do(sources)` applied,
/// `targets` observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterventionSetPair {
    sources: Vec<String>,
    targets: Vec<String>,
}

impl InterventionSetPair {
    /// Create a pair, enforcing non-empty disjoint sets.
    pub fn new(sources: Vec<String>, targets: Vec<String>) -> AbstractionResult<Self> {
        if sources.is_empty() || targets.is_empty() {
            return Err(AbstractionError::InvalidPair(
                "source and target sets must be non-empty".to_string(),
            ));
        }
        if sources.iter().any(|s| targets.contains(s)) {
            return Err(AbstractionError::InvalidPair(format!(
                "sources {:?} and targets {:?} overlap",
                sources, targets
            )));
        }
        Ok(Self { sources, targets })
    }

    /// Singleton convenience constructor.
    pub fn singleton(source: impl Into<String>, target: impl Into<String>) -> AbstractionResult<Self> {
        Self::new(vec![source.into()], vec![target.into()])
    }

    /// Intervened variables.
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Observed variables.
    pub fn targets(&self) -> &[String] {
        &self.targets
    }
}

impl std::fmt::Display for InterventionSetPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} -> {:?}", self.sources, self.targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map() -> AbstractionMap {
        AbstractionMap::new([("a1", "X"), ("b1", "Y"), ("a2", "X"), ("b2", "Y")]).unwrap()
    }

    #[test]
    fn test_image_and_preimage() {
        let m = map();
        assert_eq!(m.image("a1"), Some("X"));
        assert_eq!(m.image("missing"), None);
        assert_eq!(m.preimage("Y"), vec!["b1", "b2"]);
    }

    #[test]
    fn test_invert_groups_by_requested_order() {
        let m = map();
        let low = m.invert(&["Y".to_string(), "X".to_string()]).unwrap();
        // Y block first (request order), declaration order within each block.
        assert_eq!(low, vec!["b1", "b2", "a1", "a2"]);
    }

    #[test]
    fn test_invert_empty_preimage_is_fatal() {
        let m = map();
        let err = m.invert(&["Z".to_string()]).unwrap_err();
        assert!(matches!(err, AbstractionError::EmptyPreimage { .. }));
    }

    #[test]
    fn test_duplicate_low_node_rejected() {
        let m = AbstractionMap::new([("a", "X"), ("a", "Y")]);
        assert!(matches!(m, Err(AbstractionError::DuplicateNode(_))));
    }

    #[test]
    fn test_pair_invariants() {
        assert!(InterventionSetPair::new(vec![], vec!["Y".into()]).is_err());
        assert!(InterventionSetPair::new(vec!["X".into()], vec!["X".into()]).is_err());
        let pair = InterventionSetPair::singleton("X", "Y").unwrap();
        assert_eq!(pair.sources(), &["X".to_string()]);
        assert_eq!(pair.targets(), &["Y".to_string()]);
    }
}
