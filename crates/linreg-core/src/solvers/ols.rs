// =============================================================================
// OLS: Ordinary Least Squares
// =============================================================================

use std::fmt;
use std::str::FromStr;

use log::debug;
use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};

use crate::convert::{to_array1, to_dmatrix, to_dvector};
use crate::error::{LinRegError, Result};

// =============================================================================
// Configuration
// =============================================================================

/// Factorization used to solve the normal equations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolveMethod {
    /// Householder QR of X. Default.
    #[default]
    Qr,
    /// Cholesky of XᵗX.
    Cholesky,
}

impl SolveMethod {
    /// Parse "qr" or "cholesky" (case-insensitive).
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "qr" => Ok(SolveMethod::Qr),
            "cholesky" | "chol" => Ok(SolveMethod::Cholesky),
            other => Err(LinRegError::InvalidInput(format!(
                "unknown solve method '{}'. Use 'qr' or 'cholesky'.",
                other
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SolveMethod::Qr => "qr",
            SolveMethod::Cholesky => "cholesky",
        }
    }
}

impl FromStr for SolveMethod {
    type Err = LinRegError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

impl fmt::Display for SolveMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Configuration for the OLS solve.
#[derive(Debug, Clone)]
pub struct OlsConfig {
    /// Factorization to use.
    /// Default: QR
    pub method: SolveMethod,

    /// Threshold for declaring the design rank deficient.
    /// Columns of X are scaled to unit norm before factoring, so a pivot of R
    /// (or of L, squared) at or below this value means the column is (nearly)
    /// a combination of the ones before it, whatever its units.
    /// Default: 1e-10
    pub rank_tolerance: f64,
}

impl Default for OlsConfig {
    fn default() -> Self {
        Self {
            method: SolveMethod::Qr,
            rank_tolerance: 1e-10,
        }
    }
}

impl OlsConfig {
    pub fn with_method(method: SolveMethod) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }
}

// =============================================================================
// Result Structure
// =============================================================================

/// Output of a successful solve.
#[derive(Debug, Clone)]
pub struct OlsSolution {
    /// Coefficients A, intercept first when X has an intercept column.
    pub coefficients: Array1<f64>,
    /// Ratio of smallest to largest pivot of the triangular factor.
    /// Close to 0 means nearly collinear predictors.
    pub pivot_ratio: f64,
    /// Factorization that produced the solution.
    pub method: SolveMethod,
}

// =============================================================================
// Main Solve Function
// =============================================================================

/// Solve min ‖y - xa‖² for `a`.
///
/// # Arguments
/// * `x` - Design matrix (n × p), including the intercept column if wanted
/// * `y` - Response (n)
/// * `config` - Factorization and rank tolerance
///
/// # Errors
/// * `DimensionMismatch` - x and y disagree on n
/// * `InvalidInput` - empty inputs or a negative/non-finite tolerance
/// * `SingularMatrix` - n < p, rank-deficient x, or a non-finite solution
pub fn solve_ols(x: &Array2<f64>, y: &Array1<f64>, config: &OlsConfig) -> Result<OlsSolution> {
    let (n, p) = x.dim();

    if y.len() != n {
        return Err(LinRegError::DimensionMismatch(format!(
            "X has {} rows but y has {} elements",
            n,
            y.len()
        )));
    }
    if n == 0 || p == 0 {
        return Err(LinRegError::InvalidInput(format!(
            "cannot solve an empty system ({} x {})",
            n, p
        )));
    }
    if !config.rank_tolerance.is_finite() || config.rank_tolerance < 0.0 {
        return Err(LinRegError::InvalidInput(format!(
            "rank tolerance must be a non-negative number, got {}",
            config.rank_tolerance
        )));
    }
    if n < p {
        return Err(LinRegError::SingularMatrix(format!(
            "{} observations cannot determine {} coefficients",
            n, p
        )));
    }

    // Equilibrate: X = X_s D with unit-norm columns in X_s. The pivots of X_s
    // then measure collinearity only, and a = D⁻¹ a_s.
    let norms: Vec<f64> = x
        .columns()
        .into_iter()
        .map(|col| col.dot(&col).sqrt())
        .collect();
    if let Some(j) = norms.iter().position(|&nrm| !(nrm > 0.0) || !nrm.is_finite()) {
        return Err(LinRegError::SingularMatrix(format!(
            "column {} of the design matrix is all zeros",
            j
        )));
    }

    let mut x_nalg = to_dmatrix(x);
    for (j, &nrm) in norms.iter().enumerate() {
        x_nalg.column_mut(j).unscale_mut(nrm);
    }
    let y_nalg = to_dvector(y);

    let (scaled, pivot_ratio) = match config.method {
        SolveMethod::Qr => solve_qr(x_nalg, &y_nalg, config.rank_tolerance)?,
        SolveMethod::Cholesky => solve_cholesky(&x_nalg, &y_nalg, config.rank_tolerance)?,
    };
    let coefficients = DVector::from_iterator(
        p,
        scaled.iter().zip(norms.iter()).map(|(a, nrm)| a / nrm),
    );

    if coefficients.iter().any(|c| !c.is_finite()) {
        return Err(LinRegError::SingularMatrix(
            "solution contains non-finite coefficients".to_string(),
        ));
    }

    debug!(
        "solved {} x {} least squares with {} (pivot ratio {:.3e})",
        n, p, config.method, pivot_ratio
    );

    Ok(OlsSolution {
        coefficients: to_array1(&coefficients),
        pivot_ratio,
        method: config.method,
    })
}

/// X = QR, then R a = Qᵗy. `x` must already have unit-norm columns.
fn solve_qr(x: DMatrix<f64>, y: &DVector<f64>, tol: f64) -> Result<(DVector<f64>, f64)> {
    let qr = x.qr();
    let r = qr.r();
    let pivot_ratio = check_pivots(&r.diagonal(), tol, "R")?;

    let qty = qr.q().transpose() * y;
    let a = r.solve_upper_triangular(&qty).ok_or_else(|| {
        LinRegError::SingularMatrix("back substitution on R failed".to_string())
    })?;
    Ok((a, pivot_ratio))
}

/// XᵗX = LLᵗ, then L Lᵗ a = Xᵗy.
///
/// The pivots of L are those of R up to sign, but rounding in XᵗX leaves a
/// collinear column with a pivot around √ε rather than ε, so the tolerance is
/// applied to the squared pivots. `x` must already have unit-norm columns.
fn solve_cholesky(x: &DMatrix<f64>, y: &DVector<f64>, tol: f64) -> Result<(DVector<f64>, f64)> {
    let xt = x.transpose();
    let xtx = &xt * x;
    let xty = &xt * y;

    let chol = xtx.cholesky().ok_or_else(|| {
        LinRegError::SingularMatrix(
            "X'X is not positive definite. This usually means collinear or constant \
             predictors."
                .to_string(),
        )
    })?;

    let l_diag = chol.l().diagonal();
    let squared = l_diag.map(|v| v * v);
    let ratio = check_pivots(&squared, tol, "L")?;

    Ok((chol.solve(&xty), ratio.sqrt()))
}

/// Check pivots of a factor of unit-norm columns; returns min/max |pivot|.
///
/// Column j of X_s has norm 1, so |pivot j| is the length of the part of that
/// column not explained by columns 0..j.
fn check_pivots(diag: &DVector<f64>, tol: f64, factor: &str) -> Result<f64> {
    let abs: Vec<f64> = diag.iter().map(|v| v.abs()).collect();

    if let Some(j) = abs.iter().position(|&v| !(v > tol) || !v.is_finite()) {
        return Err(LinRegError::SingularMatrix(format!(
            "column {} of the design matrix is (nearly) a linear combination of the \
             columns before it ({} pivot {:.3e} after scaling to unit norm). \
             Check for duplicated or constant predictors.",
            j, factor, abs[j]
        )));
    }

    let max = abs.iter().copied().fold(0.0_f64, f64::max);
    let min = abs.iter().copied().fold(f64::INFINITY, f64::min);
    Ok(min / max)
}

// =============================================================================
// Tests
// =============================================================================
