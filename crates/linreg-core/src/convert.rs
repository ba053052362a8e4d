// =============================================================================
// ndarray ↔ nalgebra Conversion Utilities
// =============================================================================
//
// Data is stored in ndarray (design matrix, coefficients, Python interop) but
// the factorizations live in nalgebra. All crossings between the two go
// through here.
//
// =============================================================================

use ndarray::{Array1, Array2};
use nalgebra::{DMatrix, DVector};

/// Convert an ndarray Array2 to a nalgebra DMatrix.
///
/// Works for any memory layout; elements are copied by index.
#[inline]
pub fn to_dmatrix(a: &Array2<f64>) -> DMatrix<f64> {
    let (nrows, ncols) = a.dim();
    DMatrix::from_fn(nrows, ncols, |i, j| a[[i, j]])
}

/// Convert an ndarray Array1 to a nalgebra DVector.
#[inline]
pub fn to_dvector(v: &Array1<f64>) -> DVector<f64> {
    DVector::from_iterator(v.len(), v.iter().copied())
}

/// Convert a nalgebra DVector to an ndarray Array1.
#[inline]
pub fn to_array1(v: &DVector<f64>) -> Array1<f64> {
    v.iter().copied().collect()
}
