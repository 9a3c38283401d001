//! Tensor algebra for mechanism and alpha composition.
//!
//! # Index convention
//!
//! [`flat_tensor_product`] is the Kronecker product flattened to 2-D: the row
//! index of the result encodes `(i of X, k of Y)` in row-major composite
//! order (first factor most significant) and the column index encodes
//! `(j of X, l of Y)` likewise. Every matrix entering a composition, alphas
//! and mechanism matrices alike, must follow this one convention, or the
//! diagram comparison multiplies mismatched configurations without any shape
//! error to catch it.
//!
//! # Inversion strategies
//!
//! Stochastic matrices have no canonical inverse. Two approximations are
//! provided:
//!
//! - [`invert_max_entropy`]: transpose then column-normalize. Yields a valid
//!   stochastic matrix whenever every row of the input has nonzero sum, and
//!   fails otherwise.
//! - [`invert_pinv`]: Moore–Penrose pseudo-inverse. Algebraically optimal but
//!   may contain negative or non-normalized entries, so it is not in general
//!   a probability matrix.

use nalgebra::DMatrix;

use crate::error::{AbstractionError, AbstractionResult};

/// Singular-value cutoff for the pseudo-inverse.
const PINV_EPSILON: f64 = 1e-12;

/// Kronecker product of two matrices, flattened to a single 2-D matrix.
///
/// Result shape is `(rows(x) * rows(y), cols(x) * cols(y))` with
/// `result[(i * rows(y) + k, j * cols(y) + l)] = x[(i, j)] * y[(k, l)]`.
pub fn flat_tensor_product(x: &DMatrix<f64>, y: &DMatrix<f64>) -> DMatrix<f64> {
    x.kronecker(y)
}

/// Left-fold [`flat_tensor_product`] over an ordered sequence of matrices.
///
/// A single-element sequence returns that element unchanged. The fold is an
/// explicit loop, so long variable lists cannot hit a recursion limit.
///
/// # Errors
///
/// Returns [`AbstractionError::EmptyTensorList`] for an empty sequence; there
/// is no meaningful unit matrix for this composition.
pub fn tensorize_list(matrices: &[DMatrix<f64>]) -> AbstractionResult<DMatrix<f64>> {
    let (first, rest) = matrices
        .split_first()
        .ok_or(AbstractionError::EmptyTensorList)?;
    let mut product = first.clone();
    for m in rest {
        product = flat_tensor_product(&product, m);
    }
    Ok(product)
}

/// Maximum-entropy inversion: transpose, then normalize each column to sum 1.
///
/// # Errors
///
/// Returns [`AbstractionError::DegenerateNormalization`] if any column of the
/// transpose (any row of the input) sums to zero; normalizing it would
/// divide by zero. Callers must handle this or pre-validate the input.
pub fn invert_max_entropy(a: &DMatrix<f64>) -> AbstractionResult<DMatrix<f64>> {
    let mut inverse = a.transpose();
    for j in 0..inverse.ncols() {
        let sum: f64 = inverse.column(j).sum();
        if sum == 0.0 {
            return Err(AbstractionError::DegenerateNormalization { column: j });
        }
        for i in 0..inverse.nrows() {
            inverse[(i, j)] /= sum;
        }
    }
    Ok(inverse)
}

/// Moore–Penrose pseudo-inverse.
///
/// The result may contain negative or non-normalized entries; use it only as
/// an algebraic approximation, never where a probability matrix is required.
///
/// # Errors
///
/// Returns [`AbstractionError::PseudoInverse`] if the SVD fails to converge.
pub fn invert_pinv(a: &DMatrix<f64>) -> AbstractionResult<DMatrix<f64>> {
    a.clone()
        .pseudo_inverse(PINV_EPSILON)
        .map_err(AbstractionError::PseudoInverse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn mat(rows: usize, cols: usize, data: &[f64]) -> DMatrix<f64> {
        DMatrix::from_row_slice(rows, cols, data)
    }

    #[test]
    fn test_flat_tensor_product_shape_and_layout() {
        let x = mat(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let y = mat(2, 2, &[0.0, 1.0, 1.0, 0.0]);
        let z = flat_tensor_product(&x, &y);

        assert_eq!(z.shape(), (4, 6));
        // z[(i*2 + k, j*2 + l)] = x[(i,j)] * y[(k,l)]
        assert_relative_eq!(z[(0, 1)], x[(0, 0)] * y[(0, 1)]);
        assert_relative_eq!(z[(1, 0)], x[(0, 0)] * y[(1, 0)]);
        assert_relative_eq!(z[(2, 5)], x[(1, 2)] * y[(0, 1)]);
        assert_relative_eq!(z[(3, 4)], x[(1, 2)] * y[(1, 0)]);
    }

    #[test]
    fn test_tensorize_single_element_unchanged() {
        let x = mat(2, 2, &[0.5, 0.5, 0.5, 0.5]);
        let z = tensorize_list(std::slice::from_ref(&x)).unwrap();
        assert_eq!(z, x);
    }

    #[test]
    fn test_tensorize_empty_is_an_error() {
        assert!(matches!(
            tensorize_list(&[]),
            Err(AbstractionError::EmptyTensorList)
        ));
    }

    #[test]
    fn test_tensorize_is_order_sensitive() {
        let a = mat(1, 2, &[1.0, 0.0]);
        let b = mat(1, 2, &[0.0, 1.0]);
        let ab = tensorize_list(&[a.clone(), b.clone()]).unwrap();
        let ba = tensorize_list(&[b, a]).unwrap();
        assert_ne!(ab, ba);
    }

    #[test]
    fn test_tensorize_three_factors_associates_left() {
        let a = mat(2, 1, &[1.0, 2.0]);
        let b = mat(2, 1, &[3.0, 4.0]);
        let c = mat(2, 1, &[5.0, 6.0]);
        let abc = tensorize_list(&[a.clone(), b.clone(), c.clone()]).unwrap();
        let expected = flat_tensor_product(&flat_tensor_product(&a, &b), &c);
        assert_eq!(abc, expected);
    }

    #[test]
    fn test_invert_max_entropy_is_column_stochastic() {
        let a = mat(2, 3, &[0.9, 0.5, 0.0, 0.1, 0.5, 1.0]);
        let inv = invert_max_entropy(&a).unwrap();
        assert_eq!(inv.shape(), (3, 2));
        for j in 0..inv.ncols() {
            assert_relative_eq!(inv.column(j).sum(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_invert_max_entropy_zero_row_fails() {
        // Second row is all zero, so column 1 of the transpose cannot normalize.
        let a = mat(2, 2, &[1.0, 1.0, 0.0, 0.0]);
        assert!(matches!(
            invert_max_entropy(&a),
            Err(AbstractionError::DegenerateNormalization { column: 1 })
        ));
    }

    #[test]
    fn test_invert_max_entropy_not_an_involution() {
        let a = mat(2, 2, &[0.9, 0.2, 0.1, 0.8]);
        let twice = invert_max_entropy(&invert_max_entropy(&a).unwrap()).unwrap();
        assert!((&twice - &a).abs().max() > 1e-6);
    }

    #[test]
    fn test_invert_pinv_recovers_inverse_of_invertible() {
        let a = mat(2, 2, &[2.0, 0.0, 0.0, 4.0]);
        let pinv = invert_pinv(&a).unwrap();
        assert_relative_eq!(pinv[(0, 0)], 0.5, epsilon = 1e-9);
        assert_relative_eq!(pinv[(1, 1)], 0.25, epsilon = 1e-9);
    }

    #[test]
    fn test_invert_pinv_transposes_shape() {
        let a = mat(2, 4, &[0.5; 8]);
        let pinv = invert_pinv(&a).unwrap();
        assert_eq!(pinv.shape(), (4, 2));
    }
}
