//! Tabular implementation of the [`Abstraction`] collaborator.

use std::collections::HashMap;

use nalgebra::{DMatrix, DVector};

use crate::abstraction::Abstraction;
use crate::error::{AbstractionError, AbstractionResult};
use crate::graph::CausalGraph;
use crate::types::AbstractionMap;

use super::TabularCausalModel;

const STOCHASTIC_TOLERANCE: f64 = 1e-6;

/// A fully-specified abstraction: both tabular models, the variable map, and
/// one alpha matrix per high-level variable.
///
/// Construction validates everything the evaluators rely on: both models are
/// well-formed, the map is total over the low-level variables and lands in
/// the high-level graph, every high-level variable has a non-empty preimage,
/// and every alpha has the shape and column-stochasticity the composite
/// index convention requires.
pub struct TabularAbstraction {
    low: TabularCausalModel,
    high: TabularCausalModel,
    map: AbstractionMap,
    alphas: HashMap<String, DMatrix<f64>>,
}

impl TabularAbstraction {
    /// Build and validate an abstraction.
    pub fn new(
        low: TabularCausalModel,
        high: TabularCausalModel,
        map: AbstractionMap,
        alphas: HashMap<String, DMatrix<f64>>,
    ) -> AbstractionResult<Self> {
        low.validate()?;
        high.validate()?;

        // The map must be total on the low level and land in the high level.
        for node in low.graph().node_names() {
            match map.image(node) {
                None => {
                    return Err(AbstractionError::InvalidModel(format!(
                        "low-level variable '{}' is not mapped",
                        node
                    )))
                }
                Some(high_node) if !high.graph().contains(high_node) => {
                    return Err(AbstractionError::UnknownNode {
                        name: high_node.to_string(),
                        graph: "high-level",
                    })
                }
                Some(_) => {}
            }
        }
        for low_node in map.low_nodes() {
            if !low.graph().contains(low_node) {
                return Err(AbstractionError::UnknownNode {
                    name: low_node.to_string(),
                    graph: "low-level",
                });
            }
        }

        // Every high-level variable needs a preimage and a matching alpha.
        for node in high.graph().node_names() {
            let preimage = map.invert(std::slice::from_ref(node))?;
            let alpha = alphas.get(node).ok_or_else(|| {
                AbstractionError::InvalidModel(format!("missing alpha for '{}'", node))
            })?;
            let rows = high.graph().cardinality(node)?;
            let cols = low.graph().joint_cardinality(&preimage)?;
            if alpha.shape() != (rows, cols) {
                return Err(AbstractionError::ShapeMismatch {
                    context: "alpha matrix",
                    expected_rows: rows,
                    expected_cols: cols,
                    actual_rows: alpha.nrows(),
                    actual_cols: alpha.ncols(),
                });
            }
            for j in 0..alpha.ncols() {
                let sum: f64 = alpha.column(j).sum();
                if (sum - 1.0).abs() > STOCHASTIC_TOLERANCE {
                    return Err(AbstractionError::InvalidDistribution {
                        context: "alpha matrix",
                        reason: format!("column {} of alpha('{}') sums to {}", j, node, sum),
                    });
                }
            }
        }

        Ok(Self {
            low,
            high,
            map,
            alphas,
        })
    }

    /// The low-level model.
    pub fn low_model(&self) -> &TabularCausalModel {
        &self.low
    }

    /// The high-level model.
    pub fn high_model(&self) -> &TabularCausalModel {
        &self.high
    }
}

impl Abstraction for TabularAbstraction {
    fn low_graph(&self) -> &CausalGraph {
        self.low.graph()
    }

    fn high_graph(&self) -> &CausalGraph {
        self.high.graph()
    }

    fn abstraction_map(&self) -> &AbstractionMap {
        &self.map
    }

    fn alpha(&self, high_node: &str) -> AbstractionResult<&DMatrix<f64>> {
        self.alphas
            .get(high_node)
            .ok_or_else(|| AbstractionError::UnknownNode {
                name: high_node.to_string(),
                graph: "high-level",
            })
    }

    fn low_mechanism(
        &self,
        sources: &[String],
        targets: &[String],
    ) -> AbstractionResult<DMatrix<f64>> {
        self.low.do_intervention(sources)?.query(targets, sources)
    }

    fn high_mechanism(
        &self,
        sources: &[String],
        targets: &[String],
    ) -> AbstractionResult<DMatrix<f64>> {
        self.high.do_intervention(sources)?.query(targets, sources)
    }

    fn joint_distributions(&self) -> AbstractionResult<(DVector<f64>, DVector<f64>)> {
        let high_order = self.high.graph().node_names().to_vec();
        let low_order = self.map.invert(&high_order)?;
        let joint_low = self.low.joint(&low_order)?;
        let joint_high = self.high.joint(&high_order)?;
        Ok((joint_low, joint_high))
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

    fn low_model() -> TabularCausalModel {
        let graph = build_graph("low-level", &[("a", 2), ("b", 3)], &[("a", "b")]).unwrap();
        let mut model = TabularCausalModel::new(graph);
        model
            .set_cpt("a", vec![], DMatrix::from_column_slice(2, 1, &[0.5, 0.5]))
            .unwrap();
        model
            .set_cpt(
                "b",
                names(&["a"]),
                DMatrix::from_column_slice(3, 2, &[0.3, 0.4, 0.3, 0.2, 0.2, 0.6]),
            )
            .unwrap();
        model
    }

    fn high_model() -> TabularCausalModel {
        let graph = build_graph("high-level", &[("X", 2), ("Y", 2)], &[("X", "Y")]).unwrap();
        let mut model = TabularCausalModel::new(graph);
        model
            .set_cpt("X", vec![], DMatrix::from_column_slice(2, 1, &[0.5, 0.5]))
            .unwrap();
        model
            .set_cpt(
                "Y",
                names(&["X"]),
                DMatrix::from_column_slice(2, 2, &[0.7, 0.3, 0.4, 0.6]),
            )
            .unwrap();
        model
    }

    fn alphas() -> HashMap<String, DMatrix<f64>> {
        let mut alphas = HashMap::new();
        alphas.insert("X".to_string(), DMatrix::identity(2, 2));
        // b in {0,1} -> Y=0, b=2 -> Y=1.
        alphas.insert(
            "Y".to_string(),
            DMatrix::from_row_slice(2, 3, &[1.0, 1.0, 0.0, 0.0, 0.0, 1.0]),
        );
        alphas
    }

    #[test]
    fn test_valid_abstraction_constructs() {
        assert!(TabularAbstraction::new(
            low_model(),
            high_model(),
            AbstractionMap::new([("a", "X"), ("b", "Y")]).unwrap(),
            alphas()
        )
        .is_ok());
    }

    #[test]
    fn test_unmapped_low_variable_rejected() {
        let result = TabularAbstraction::new(
            low_model(),
            high_model(),
            AbstractionMap::new([("a", "X")]).unwrap(),
            alphas(),
        );
        assert!(matches!(result, Err(AbstractionError::InvalidModel(_))));
    }

    #[test]
    fn test_empty_preimage_rejected() {
        // Map both low variables onto X, leaving Y with no preimage.
        let result = TabularAbstraction::new(
            low_model(),
            high_model(),
            AbstractionMap::new([("a", "X"), ("b", "X")]).unwrap(),
            alphas(),
        );
        assert!(matches!(
            result,
            Err(AbstractionError::EmptyPreimage { .. })
                | Err(AbstractionError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_wrong_alpha_shape_rejected() {
        let mut bad = alphas();
        bad.insert("Y".to_string(), DMatrix::identity(2, 2));
        let result = TabularAbstraction::new(
            low_model(),
            high_model(),
            AbstractionMap::new([("a", "X"), ("b", "Y")]).unwrap(),
            bad,
        );
        assert!(matches!(result, Err(AbstractionError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_joint_distributions_ordering() {
        let abstraction = TabularAbstraction::new(
            low_model(),
            high_model(),
            AbstractionMap::new([("a", "X"), ("b", "Y")]).unwrap(),
            alphas(),
        )
        .unwrap();
        let (joint_low, joint_high) = abstraction.joint_distributions().unwrap();
        assert_eq!(joint_low.len(), 6);
        assert_eq!(joint_high.len(), 4);
        assert_relative_eq!(joint_low.sum(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(joint_high.sum(), 1.0, epsilon = 1e-12);
    }
}
