//! Tabular causal model with exact enumeration inference.

use std::collections::HashMap;

use nalgebra::{DMatrix, DVector};

use crate::error::{AbstractionError, AbstractionResult};
use crate::graph::CausalGraph;

/// Conditional probability table of one variable.
///
/// Rows index the variable's values; columns index parent configurations as
/// a mixed-radix composite over `parents` in order, first parent most
/// significant. Each column sums to 1.
#[derive(Debug, Clone)]
pub struct Cpt {
    /// Parent variables, in the order the column composite runs over.
    pub parents: Vec<String>,
    /// Column-stochastic table, shape `(cardinality, prod parent cardinalities)`.
    pub table: DMatrix<f64>,
}

/// A causal model over a [`CausalGraph`] with one CPT per variable.
///
/// Inference is exact by full-joint enumeration, so query cost is exponential
/// in the variable count; this is the reference collaborator for small
/// models, not a production inference engine.
#[derive(Debug, Clone)]
pub struct TabularCausalModel {
    graph: CausalGraph,
    cpts: HashMap<String, Cpt>,
}

const STOCHASTIC_TOLERANCE: f64 = 1e-6;

impl TabularCausalModel {
    /// Model over the given graph, initially without CPTs.
    pub fn new(graph: CausalGraph) -> Self {
        Self {
            graph,
            cpts: HashMap::new(),
        }
    }

    /// Structure of the model.
    pub fn graph(&self) -> &CausalGraph {
        &self.graph
    }

    /// Attach the CPT for `node`.
    ///
    /// # Errors
    ///
    /// Rejects unknown nodes, tables whose shape does not match the node and
    /// parent cardinalities, and columns that do not sum to 1.
    pub fn set_cpt(
        &mut self,
        node: &str,
        parents: Vec<String>,
        table: DMatrix<f64>,
    ) -> AbstractionResult<()> {
        let card = self.graph.cardinality(node)?;
        let parent_card = self.graph.joint_cardinality(&parents)?;
        if table.shape() != (card, parent_card) {
            return Err(AbstractionError::ShapeMismatch {
                context: "conditional probability table",
                expected_rows: card,
                expected_cols: parent_card,
                actual_rows: table.nrows(),
                actual_cols: table.ncols(),
            });
        }
        for j in 0..table.ncols() {
            let sum: f64 = table.column(j).sum();
            if (sum - 1.0).abs() > STOCHASTIC_TOLERANCE {
                return Err(AbstractionError::InvalidDistribution {
                    context: "conditional probability table",
                    reason: format!("column {} of '{}' sums to {}", j, node, sum),
                });
            }
        }
        self.cpts.insert(node.to_string(), Cpt { parents, table });
        Ok(())
    }

    /// Check structural well-formedness: acyclic graph, a CPT for every
    /// variable, and CPT parents agreeing with the graph edges.
    pub fn validate(&self) -> AbstractionResult<()> {
        self.graph.validate()?;
        for node in self.graph.node_names() {
            let cpt = self.cpts.get(node).ok_or_else(|| {
                AbstractionError::InvalidModel(format!("variable '{}' has no CPT", node))
            })?;
            let mut declared: Vec<&str> = cpt.parents.iter().map(String::as_str).collect();
            declared.sort_unstable();
            let structural = self.graph.parents(node)?;
            let mut structural: Vec<&str> = structural.iter().map(String::as_str).collect();
            structural.sort_unstable();
            if declared != structural {
                return Err(AbstractionError::InvalidModel(format!(
                    "CPT parents of '{}' are {:?} but the graph says {:?}",
                    node, declared, structural
                )));
            }
        }
        Ok(())
    }

    /// The mutilated model `do(nodes)`: each listed variable is severed from
    /// its parents and given a uniform exogenous prior.
    ///
    /// The prior never influences downstream mechanism queries (queries
    /// condition on the intervened values); it only needs full support.
    pub fn do_intervention(&self, nodes: &[String]) -> AbstractionResult<Self> {
        let mut intervened = self.clone();
        for node in nodes {
            let card = intervened.graph.cardinality(node)?;
            intervened.graph.sever_parents(node)?;
            intervened.cpts.insert(
                node.clone(),
                Cpt {
                    parents: Vec::new(),
                    table: DMatrix::from_element(card, 1, 1.0 / card as f64),
                },
            );
        }
        Ok(intervened)
    }

    /// Full joint distribution, indexed by the mixed-radix composite over
    /// `order` (a permutation of all variables, first most significant).
    pub fn joint(&self, order: &[String]) -> AbstractionResult<DVector<f64>> {
        if order.len() != self.graph.node_count() {
            return Err(AbstractionError::InvalidModel(format!(
                "joint ordering lists {} of {} variables",
                order.len(),
                self.graph.node_count()
            )));
        }
        let order_cards = self.card_vector(order)?;
        let order_pos = self.positions(order)?;

        let mut joint = DVector::zeros(order_cards.iter().product::<usize>().max(1));
        self.for_each_assignment(|assignment, p| {
            let values: Vec<usize> = order_pos.iter().map(|&i| assignment[i]).collect();
            joint[encode(&values, &order_cards)] += p;
        })?;
        Ok(joint)
    }

    /// Conditional distribution `P(targets | sources)` as a column-stochastic
    /// matrix in the shared mixed-radix convention.
    ///
    /// Run against a model mutilated by [`Self::do_intervention`] on the same
    /// sources, this is the mechanism `P(targets | do(sources))`.
    /// Zero-probability source configurations leave an all-zero column.
    pub fn query(
        &self,
        targets: &[String],
        sources: &[String],
    ) -> AbstractionResult<DMatrix<f64>> {
        let target_cards = self.card_vector(targets)?;
        let source_cards = self.card_vector(sources)?;
        let target_pos = self.positions(targets)?;
        let source_pos = self.positions(sources)?;

        let n_rows = target_cards.iter().product::<usize>().max(1);
        let n_cols = source_cards.iter().product::<usize>().max(1);
        let mut table = DMatrix::zeros(n_rows, n_cols);

        self.for_each_assignment(|assignment, p| {
            let t: Vec<usize> = target_pos.iter().map(|&i| assignment[i]).collect();
            let s: Vec<usize> = source_pos.iter().map(|&i| assignment[i]).collect();
            table[(encode(&t, &target_cards), encode(&s, &source_cards))] += p;
        })?;

        for j in 0..n_cols {
            let sum: f64 = table.column(j).sum();
            if sum > 0.0 {
                for i in 0..n_rows {
                    table[(i, j)] /= sum;
                }
            }
        }
        Ok(table)
    }

    /// Visit every full assignment with its joint probability.
    ///
    /// Assignments are indexed by graph declaration order.
    fn for_each_assignment<F>(&self, mut visit: F) -> AbstractionResult<()>
    where
        F: FnMut(&[usize], f64),
    {
        self.validate()?;
        let names = self.graph.node_names().to_vec();
        let cards = self.card_vector(&names)?;
        let position: HashMap<&str, usize> = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.as_str(), i))
            .collect();

        let total: usize = cards.iter().product::<usize>().max(1);
        let mut assignment = vec![0usize; names.len()];
        for idx in 0..total {
            decode(idx, &cards, &mut assignment);
            let mut p = 1.0;
            for (i, name) in names.iter().enumerate() {
                let cpt = &self.cpts[name];
                let parent_values: Vec<usize> = cpt
                    .parents
                    .iter()
                    .map(|parent| assignment[position[parent.as_str()]])
                    .collect();
                let parent_cards: Vec<usize> = cpt
                    .parents
                    .iter()
                    .map(|parent| self.graph.cardinality(parent))
                    .collect::<AbstractionResult<_>>()?;
                p *= cpt.table[(assignment[i], encode(&parent_values, &parent_cards))];
                if p == 0.0 {
                    break;
                }
            }
            visit(&assignment, p);
        }
        Ok(())
    }

    fn card_vector(&self, names: &[String]) -> AbstractionResult<Vec<usize>> {
        names.iter().map(|n| self.graph.cardinality(n)).collect()
    }

    fn positions(&self, names: &[String]) -> AbstractionResult<Vec<usize>> {
        let all = self.graph.node_names();
        names
            .iter()
            .map(|n| {
                all.iter().position(|m| m == n).ok_or_else(|| {
                    AbstractionError::UnknownNode {
                        name: n.clone(),
                        graph: "causal",
                    }
                })
            })
            .collect()
    }
}

/// Mixed-radix encode, first variable most significant.
fn encode(values: &[usize], cards: &[usize]) -> usize {
    values
        .iter()
        .zip(cards)
        .fold(0, |acc, (&v, &c)| acc * c + v)
}

/// Mixed-radix decode, inverse of [`encode`].
fn decode(mut index: usize, cards: &[usize], out: &mut [usize]) {
    for i in (0..cards.len()).rev() {
        out[i] = index % cards[i];
        index /= cards[i];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_graph;
    use approx::assert_relative_eq;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    /// a -> b with P(a) = (0.6, 0.4) and P(b|a) columns (0.3,0.4,0.3), (0.2,0.2,0.6).
    fn chain() -> TabularCausalModel {
        let graph = build_graph("low-level", &[("a", 2), ("b", 3)], &[("a", "b")]).unwrap();
        let mut model = TabularCausalModel::new(graph);
        model
            .set_cpt("a", vec![], DMatrix::from_column_slice(2, 1, &[0.6, 0.4]))
            .unwrap();
        model
            .set_cpt(
                "b",
                names(&["a"]),
                DMatrix::from_columns(&[
                    DVector::from_column_slice(&[0.3, 0.4, 0.3]),
                    DVector::from_column_slice(&[0.2, 0.2, 0.6]),
                ]),
            )
            .unwrap();
        model
    }

    #[test]
    fn test_mixed_radix_round_trip() {
        let cards = [2, 3, 2];
        let mut out = [0usize; 3];
        for idx in 0..12 {
            decode(idx, &cards, &mut out);
            assert_eq!(encode(&out, &cards), idx);
        }
        // First variable most significant.
        decode(11, &cards, &mut out);
        assert_eq!(out, [1, 2, 1]);
    }

    #[test]
    fn test_cpt_shape_and_stochasticity_enforced() {
        let graph = build_graph("low-level", &[("a", 2)], &[]).unwrap();
        let mut model = TabularCausalModel::new(graph);
        assert!(model
            .set_cpt("a", vec![], DMatrix::from_column_slice(3, 1, &[0.3, 0.3, 0.4]))
            .is_err());
        assert!(model
            .set_cpt("a", vec![], DMatrix::from_column_slice(2, 1, &[0.6, 0.6]))
            .is_err());
    }

    #[test]
    fn test_validate_catches_missing_cpt() {
        let graph = build_graph("low-level", &[("a", 2), ("b", 2)], &[("a", "b")]).unwrap();
        let mut model = TabularCausalModel::new(graph);
        model
            .set_cpt("a", vec![], DMatrix::from_column_slice(2, 1, &[0.5, 0.5]))
            .unwrap();
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_joint_sums_to_one() {
        let model = chain();
        let joint = model.joint(&names(&["a", "b"])).unwrap();
        assert_eq!(joint.len(), 6);
        assert_relative_eq!(joint.sum(), 1.0, epsilon = 1e-12);
        // P(a=0, b=1) = 0.6 * 0.4
        assert_relative_eq!(joint[1], 0.24, epsilon = 1e-12);
    }

    #[test]
    fn test_joint_respects_ordering() {
        let model = chain();
        let ab = model.joint(&names(&["a", "b"])).unwrap();
        let ba = model.joint(&names(&["b", "a"])).unwrap();
        // P(b=0, a=1) in (b,a) order sits at index 0*2 + 1.
        assert_relative_eq!(ba[1], ab[3], epsilon = 1e-12);
    }

    #[test]
    fn test_query_recovers_cpt() {
        let model = chain();
        let mechanism = model.query(&names(&["b"]), &names(&["a"])).unwrap();
        assert_eq!(mechanism.shape(), (3, 2));
        assert_relative_eq!(mechanism[(1, 0)], 0.4, epsilon = 1e-12);
        assert_relative_eq!(mechanism[(2, 1)], 0.6, epsilon = 1e-12);
    }

    #[test]
    fn test_do_intervention_severs_and_uniformizes() {
        let model = chain();
        let intervened = model.do_intervention(&names(&["b"])).unwrap();
        // b no longer listens to a: P(a | b) is just P(a).
        let back = intervened.query(&names(&["a"]), &names(&["b"])).unwrap();
        for j in 0..back.ncols() {
            assert_relative_eq!(back[(0, j)], 0.6, epsilon = 1e-12);
            assert_relative_eq!(back[(1, j)], 0.4, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_do_then_query_is_the_mechanism() {
        let model = chain();
        let mechanism = model
            .do_intervention(&names(&["a"]))
            .unwrap()
            .query(&names(&["b"]), &names(&["a"]))
            .unwrap();
        // For a root source, do(a) leaves the mechanism equal to the CPT.
        assert_relative_eq!(mechanism[(0, 0)], 0.3, epsilon = 1e-12);
        assert_relative_eq!(mechanism[(2, 1)], 0.6, epsilon = 1e-12);
    }
}
