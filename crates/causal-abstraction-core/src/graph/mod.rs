//! Causal graph structure.
//!
//! [`CausalGraph`] is a directed acyclic graph of named variables, each with
//! a finite cardinality. It is the structural half of a causal model; the
//! conditional probability tables live with the inference collaborator (see
//! [`crate::stubs`] for the tabular reference implementation).
//!
//! Variables keep their declaration order. That order is load-bearing: every
//! mixed-radix composite index built over a set of variables follows it, and
//! all matrices entering a tensor composition must agree on it.

pub mod reachability;

use std::collections::HashMap;

use petgraph::algo::{has_path_connecting, is_cyclic_directed};
use petgraph::graph::{DiGraph, NodeIndex};

use crate::error::{AbstractionError, AbstractionResult};

/// A directed graph of finite-cardinality variables.
#[derive(Debug, Clone, Default)]
pub struct CausalGraph {
    graph: DiGraph<(), ()>,
    names: Vec<String>,
    cardinalities: Vec<usize>,
    index: HashMap<String, NodeIndex>,
    /// Which graph this is, used in error messages ("low-level"/"high-level").
    label: &'static str,
}

impl CausalGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self {
            label: "causal",
            ..Self::default()
        }
    }

    /// Create an empty graph with a label used in error messages.
    pub fn with_label(label: &'static str) -> Self {
        Self {
            label,
            ..Self::default()
        }
    }

    /// Add a variable with the given cardinality.
    ///
    /// # Errors
    ///
    /// Returns [`AbstractionError::DuplicateNode`] if the name is taken, or
    /// [`AbstractionError::InvalidModel`] if the cardinality is zero.
    pub fn add_variable(&mut self, name: impl Into<String>, cardinality: usize) -> AbstractionResult<()> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(AbstractionError::DuplicateNode(name));
        }
        if cardinality == 0 {
            return Err(AbstractionError::InvalidModel(format!(
                "variable '{}' has cardinality 0",
                name
            )));
        }
        let idx = self.graph.add_node(());
        self.index.insert(name.clone(), idx);
        self.names.push(name);
        self.cardinalities.push(cardinality);
        Ok(())
    }

    /// Add a directed edge from `parent` to `child`.
    pub fn add_edge(&mut self, parent: &str, child: &str) -> AbstractionResult<()> {
        let p = self.node_index(parent)?;
        let c = self.node_index(child)?;
        self.graph.add_edge(p, c, ());
        Ok(())
    }

    /// Number of variables.
    pub fn node_count(&self) -> usize {
        self.names.len()
    }

    /// Variable names in declaration order.
    pub fn node_names(&self) -> &[String] {
        &self.names
    }

    /// Whether the graph contains a variable with this name.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Cardinality of a variable.
    pub fn cardinality(&self, name: &str) -> AbstractionResult<usize> {
        let idx = self.node_index(name)?;
        Ok(self.cardinalities[idx.index()])
    }

    /// Product of cardinalities over a list of variables.
    ///
    /// This is the length of the mixed-radix composite index over those
    /// variables, in the given order.
    pub fn joint_cardinality(&self, names: &[String]) -> AbstractionResult<usize> {
        let mut product = 1usize;
        for name in names {
            product *= self.cardinality(name)?;
        }
        Ok(product)
    }

    /// Parents of a variable, in declaration order.
    pub fn parents(&self, name: &str) -> AbstractionResult<Vec<String>> {
        let idx = self.node_index(name)?;
        let mut parents: Vec<usize> = self
            .graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .map(|n| n.index())
            .collect();
        parents.sort_unstable();
        Ok(parents.iter().map(|&i| self.names[i].clone()).collect())
    }

    /// Whether a directed path exists from `source` to `target`.
    ///
    /// A node is considered to reach itself (zero-length path), matching the
    /// usual graph-library convention.
    pub fn has_directed_path(&self, source: &str, target: &str) -> AbstractionResult<bool> {
        let s = self.node_index(source)?;
        let t = self.node_index(target)?;
        Ok(has_path_connecting(&self.graph, s, t, None))
    }

    /// Remove every edge pointing into `name`.
    ///
    /// Used by do-interventions to sever a variable from its causal parents.
    pub fn sever_parents(&mut self, name: &str) -> AbstractionResult<()> {
        let idx = self.node_index(name)?;
        // remove_edge swap-invalidates edge indices, so take them one at a time.
        while let Some(edge) = self
            .graph
            .edges_directed(idx, petgraph::Direction::Incoming)
            .map(|e| petgraph::visit::EdgeRef::id(&e))
            .next()
        {
            self.graph.remove_edge(edge);
        }
        Ok(())
    }

    /// Validate structural well-formedness.
    ///
    /// # Errors
    ///
    /// Returns [`AbstractionError::GraphCycle`] if the graph has a directed
    /// cycle. Cardinalities are validated at insertion time.
    pub fn validate(&self) -> AbstractionResult<()> {
        if is_cyclic_directed(&self.graph) {
            return Err(AbstractionError::GraphCycle);
        }
        Ok(())
    }

    /// Borrow the underlying petgraph structure.
    pub(crate) fn petgraph(&self) -> &DiGraph<(), ()> {
        &self.graph
    }

    pub(crate) fn node_index(&self, name: &str) -> AbstractionResult<NodeIndex> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| AbstractionError::UnknownNode {
                name: name.to_string(),
                graph: self.label,
            })
    }
}

/// Build a graph from `(name, cardinality)` variables and `(parent, child)` edges.
///
/// Convenience constructor used heavily in tests.
pub fn build_graph(
    label: &'static str,
    variables: &[(&str, usize)],
    edges: &[(&str, &str)],
) -> AbstractionResult<CausalGraph> {
    let mut graph = CausalGraph::with_label(label);
    for (name, card) in variables {
        graph.add_variable(*name, *card)?;
    }
    for (parent, child) in edges {
        graph.add_edge(parent, child)?;
    }
    graph.validate()?;
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> CausalGraph {
        build_graph("low-level", &[("A", 2), ("B", 3), ("C", 2)], &[("A", "B"), ("B", "C")])
            .unwrap()
    }

    #[test]
    fn test_declaration_order_preserved() {
        let g = chain();
        assert_eq!(g.node_names(), &["A", "B", "C"]);
        assert_eq!(g.cardinality("B").unwrap(), 3);
        assert_eq!(g.joint_cardinality(&["A".into(), "B".into()]).unwrap(), 6);
    }

    #[test]
    fn test_directed_path() {
        let g = chain();
        assert!(g.has_directed_path("A", "C").unwrap());
        assert!(!g.has_directed_path("C", "A").unwrap());
    }

    #[test]
    fn test_duplicate_variable_rejected() {
        let mut g = CausalGraph::new();
        g.add_variable("A", 2).unwrap();
        assert!(matches!(
            g.add_variable("A", 2),
            Err(AbstractionError::DuplicateNode(_))
        ));
    }

    #[test]
    fn test_zero_cardinality_rejected() {
        let mut g = CausalGraph::new();
        assert!(g.add_variable("A", 0).is_err());
    }

    #[test]
    fn test_cycle_detected() {
        let g = build_graph("low-level", &[("A", 2), ("B", 2)], &[("A", "B"), ("B", "A")]);
        assert!(matches!(g, Err(AbstractionError::GraphCycle)));
    }

    #[test]
    fn test_unknown_node_error_names_graph() {
        let g = chain();
        let err = g.cardinality("Z").unwrap_err();
        assert!(err.to_string().contains("low-level"));
    }

    #[test]
    fn test_sever_parents() {
        let mut g = chain();
        g.sever_parents("B").unwrap();
        assert!(!g.has_directed_path("A", "B").unwrap());
        // Downstream structure is untouched.
        assert!(g.has_directed_path("B", "C").unwrap());
    }

    #[test]
    fn test_parents_in_declaration_order() {
        let g = build_graph(
            "low-level",
            &[("A", 2), ("B", 2), ("C", 2)],
            &[("B", "C"), ("A", "C")],
        )
        .unwrap();
        assert_eq!(g.parents("C").unwrap(), vec!["A".to_string(), "B".to_string()]);
    }
}
