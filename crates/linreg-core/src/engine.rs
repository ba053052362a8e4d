// =============================================================================
// Regression Engine
// =============================================================================
//
// The stateful front door of the library:
//
//     let mut engine = RegressionEngine::new();
//     engine.fit("price", &training)?;          // Unfitted -> Fitted
//     let yhat = engine.predict(&[250.0, 3.0])?; // needs Fitted
//
// STATE MACHINE
// -------------
//   Unfitted --fit ok--> Fitted --fit ok--> Fitted (coefficients replaced)
//
// A failed `fit` leaves the engine exactly as it was: coefficients are only
// stored after the solve has succeeded. There is no terminal state.
//
// =============================================================================

use log::{debug, warn};
use ndarray::Array1;

use crate::dataset::TabularData;
use crate::design_matrix::build_design_matrix;
use crate::error::{LinRegError, Result};
use crate::solvers::{solve_ols, OlsConfig};

/// Coefficients of a successful fit, with the names they belong to.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedModel {
    /// Intercept first, then one coefficient per independent variable.
    pub coefficients: Array1<f64>,
    pub dependent_name: String,
    /// Order matches `coefficients[1..]`.
    pub independent_names: Vec<String>,
}

/// Fits OLS models and predicts from the most recent fit.
#[derive(Debug, Clone, Default)]
pub struct RegressionEngine {
    config: OlsConfig,
    model: Option<FittedModel>,
}

impl RegressionEngine {
    /// Engine with the default solver (QR, tolerance 1e-10).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: OlsConfig) -> Self {
        Self {
            config,
            model: None,
        }
    }

    pub fn config(&self) -> &OlsConfig {
        &self.config
    }

    // -------------------------------------------------------------------------
    // Fit
    // -------------------------------------------------------------------------

    /// Regress `dependent_name` on every other column of `data`.
    ///
    /// Replaces any previous fit on success and returns the new coefficients.
    ///
    /// # Errors
    /// * `InvalidInput` - missing dependent column, no rows, no independent
    ///   column, or a non-numeric value
    /// * `SingularMatrix` - X'X is not invertible
    pub fn fit<D>(&mut self, dependent_name: &str, data: &D) -> Result<&Array1<f64>>
    where
        D: TabularData + ?Sized,
    {
        let design = build_design_matrix(dependent_name, data)?;
        let solution = solve_ols(&design.x, &design.y, &self.config)?;

        debug!(
            "fitted '{}' on {} observations, {} coefficients: {:?}",
            design.dependent_name,
            design.n_obs(),
            design.n_params(),
            solution.coefficients.as_slice().unwrap_or(&[])
        );

        let model = self.model.insert(FittedModel {
            coefficients: solution.coefficients,
            dependent_name: design.dependent_name,
            independent_names: design.independent_names,
        });
        Ok(&model.coefficients)
    }

    // -------------------------------------------------------------------------
    // Predict
    // -------------------------------------------------------------------------

    /// `a₀ + Σ aᵢ·vᵢ₋₁` for one row of independent values.
    ///
    /// # Errors
    /// * `NotFitted` - no successful fit yet
    /// * `DimensionMismatch` - `independent_vars.len() != coefficients.len() - 1`
    pub fn predict(&self, independent_vars: &[f64]) -> Result<f64> {
        let coefficients = self.fitted_coefficients()?;
        let expected = coefficients.len() - 1;
        if independent_vars.len() != expected {
            return Err(LinRegError::DimensionMismatch(format!(
                "expected {} independent values, got {}",
                expected,
                independent_vars.len()
            )));
        }

        Ok(coefficients[0]
            + coefficients
                .iter()
                .skip(1)
                .zip(independent_vars)
                .map(|(a, v)| a * v)
                .sum::<f64>())
    }

    /// Predict from row `row` of `data`, taking its values positionally.
    pub fn predict_row<D>(&self, data: &D, row: usize) -> Result<f64>
    where
        D: TabularData + ?Sized,
    {
        self.fitted_coefficients()?;
        self.predict(&data.row_values_as_numeric(row)?)
    }

    /// Predict every row of `data`, taking values positionally.
    pub fn predict_rows<D>(&self, data: &D) -> Result<Vec<f64>>
    where
        D: TabularData + ?Sized,
    {
        self.fitted_coefficients()?;
        (0..data.num_rows())
            .map(|row| self.predict_row(data, row))
            .collect()
    }

    /// Predict every row of `data`, picking columns by the fitted names.
    ///
    /// Column order in `data` does not matter and extra columns (including
    /// the dependent one) are ignored.
    ///
    /// # Errors
    /// `InvalidInput` if a fitted independent variable is missing from `data`.
    pub fn predict_by_name<D>(&self, data: &D) -> Result<Vec<f64>>
    where
        D: TabularData + ?Sized,
    {
        let model = self.model.as_ref().ok_or(LinRegError::NotFitted)?;

        let columns = model
            .independent_names
            .iter()
            .map(|name| {
                if !data.has_column(name) {
                    return Err(LinRegError::InvalidInput(format!(
                        "column '{}' used in the fit is missing from the prediction data",
                        name
                    )));
                }
                data.column_values_as_numeric(name)
            })
            .collect::<Result<Vec<_>>>()?;

        let mut row_values = vec![0.0; columns.len()];
        (0..data.num_rows())
            .map(|row| {
                for (slot, column) in row_values.iter_mut().zip(&columns) {
                    *slot = column[row];
                }
                self.predict(&row_values)
            })
            .collect()
    }

    /// Predict every row of `data`, by name when every fitted variable is a
    /// column of `data`, positionally otherwise.
    pub fn predict_table<D>(&self, data: &D) -> Result<Vec<f64>>
    where
        D: TabularData + ?Sized,
    {
        let model = self.model.as_ref().ok_or(LinRegError::NotFitted)?;
        if model.independent_names.iter().all(|n| data.has_column(n)) {
            self.predict_by_name(data)
        } else {
            warn!(
                "prediction columns {:?} do not include every fitted name {:?}; \
                 using column order",
                data.column_headers(),
                model.independent_names
            );
            self.predict_rows(data)
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn is_fitted(&self) -> bool {
        self.model.is_some()
    }

    pub fn model(&self) -> Option<&FittedModel> {
        self.model.as_ref()
    }

    pub fn coefficients(&self) -> Option<&Array1<f64>> {
        self.model.as_ref().map(|m| &m.coefficients)
    }

    pub fn intercept(&self) -> Option<f64> {
        self.coefficients().and_then(|c| c.first().copied())
    }

    pub fn dependent_name(&self) -> Option<&str> {
        self.model.as_ref().map(|m| m.dependent_name.as_str())
    }

    pub fn independent_names(&self) -> Option<&[String]> {
        self.model.as_ref().map(|m| m.independent_names.as_slice())
    }

    /// `(name, coefficient)` pairs, starting with `("(intercept)", a₀)`.
    pub fn named_coefficients(&self) -> Vec<(String, f64)> {
        match &self.model {
            None => Vec::new(),
            Some(model) => std::iter::once("(intercept)".to_string())
                .chain(model.independent_names.iter().cloned())
                .zip(model.coefficients.iter().copied())
                .collect(),
        }
    }

    fn fitted_coefficients(&self) -> Result<&Array1<f64>> {
        match self.coefficients() {
            Some(c) if c.len() >= 2 => Ok(c),
            _ => Err(LinRegError::NotFitted),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
