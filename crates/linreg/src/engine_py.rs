// =============================================================================
// RegressionEngine (Python Bindings)
// =============================================================================
//
// Wraps `linreg_core::RegressionEngine` as the Python class `RegressionEngine`.
// Tables come in as a 2-D numpy array plus a list of column names, which is
// what `df.to_numpy()` and `list(df.columns)` give you.
// =============================================================================

use pyo3::exceptions::{PyIOError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use numpy::{IntoPyArray, PyArray1, PyReadonlyArray2};
use ndarray::Array1;

use linreg_core::{
    CsvOptions, Dataset, LinRegError, OlsConfig, RegressionEngine, RowPolicy, SolveMethod,
};

/// Map library errors onto Python exceptions.
///
/// Calling predict before fit is a usage error (RuntimeError); file problems
/// are IOError; everything else is a bad value.
pub(crate) fn to_py_err(err: LinRegError) -> PyErr {
    match err {
        LinRegError::NotFitted => PyRuntimeError::new_err(err.to_string()),
        LinRegError::Io { .. } => PyIOError::new_err(err.to_string()),
        other => PyValueError::new_err(format!("{} ({})", other, other.kind())),
    }
}

/// Ordinary least squares regression engine.
///
/// Parameters
/// ----------
/// method : str
///     "qr" (default) or "cholesky"
/// rank_tolerance : float
///     Pivot threshold (on unit-norm columns) below which the design is
///     treated as singular
#[pyclass(name = "RegressionEngine")]
pub struct PyRegressionEngine {
    inner: RegressionEngine,
}

#[pymethods]
impl PyRegressionEngine {
    #[new]
    #[pyo3(signature = (method="qr", rank_tolerance=1e-10))]
    fn new(method: &str, rank_tolerance: f64) -> PyResult<Self> {
        let method = SolveMethod::from_name(method).map_err(to_py_err)?;
        Ok(Self {
            inner: RegressionEngine::with_config(OlsConfig {
                method,
                rank_tolerance,
            }),
        })
    }

    /// Fit `dependent` against every other column.
    ///
    /// Parameters
    /// ----------
    /// dependent : str
    ///     Name of the column to predict
    /// columns : list[str]
    ///     Column names, one per column of `data`
    /// data : numpy.ndarray
    ///     (n_rows, n_columns) float array
    ///
    /// Returns
    /// -------
    /// numpy.ndarray
    ///     Coefficients, intercept first
    fn fit<'py>(
        &mut self,
        py: Python<'py>,
        dependent: &str,
        columns: Vec<String>,
        data: PyReadonlyArray2<f64>,
    ) -> PyResult<Bound<'py, PyArray1<f64>>> {
        let data = data.as_array();
        if data.ncols() != columns.len() {
            return Err(PyValueError::new_err(format!(
                "data has {} columns but {} names were given",
                data.ncols(),
                columns.len()
            )));
        }

        let dataset = Dataset::from_numeric_columns(
            columns
                .into_iter()
                .zip(data.columns())
                .map(|(name, col)| (name, col.to_vec()))
                .collect(),
        )
        .map_err(to_py_err)?;

        let coefficients = self.inner.fit(dependent, &dataset).map_err(to_py_err)?;
        Ok(coefficients.clone().into_pyarray_bound(py))
    }

    /// Load a CSV file and fit `dependent` against every other column.
    #[pyo3(signature = (path, dependent, delimiter=",", skip_irregular=false))]
    fn fit_csv<'py>(
        &mut self,
        py: Python<'py>,
        path: &str,
        dependent: &str,
        delimiter: &str,
        skip_irregular: bool,
    ) -> PyResult<Bound<'py, PyArray1<f64>>> {
        let dataset = Dataset::from_csv_path(path, &csv_options(delimiter, skip_irregular)?)
            .map_err(to_py_err)?;
        let coefficients = self.inner.fit(dependent, &dataset).map_err(to_py_err)?;
        Ok(coefficients.clone().into_pyarray_bound(py))
    }

    /// Predict one row of independent values (fit order).
    fn predict(&self, independent_vars: Vec<f64>) -> PyResult<f64> {
        self.inner.predict(&independent_vars).map_err(to_py_err)
    }

    /// Predict each row of an (n_rows, n_independent) array.
    fn predict_many<'py>(
        &self,
        py: Python<'py>,
        x: PyReadonlyArray2<f64>,
    ) -> PyResult<Bound<'py, PyArray1<f64>>> {
        let x = x.as_array();
        let predictions = x
            .rows()
            .into_iter()
            .map(|row| self.inner.predict(&row.to_vec()))
            .collect::<Result<Array1<f64>, _>>()
            .map_err(to_py_err)?;
        Ok(predictions.into_pyarray_bound(py))
    }

    /// Predict every row of a CSV file of unlabeled data.
    ///
    /// Columns are matched by name when all fitted names are present,
    /// otherwise taken in file order.
    #[pyo3(signature = (path, delimiter=",", skip_irregular=false))]
    fn predict_csv<'py>(
        &self,
        py: Python<'py>,
        path: &str,
        delimiter: &str,
        skip_irregular: bool,
    ) -> PyResult<Bound<'py, PyArray1<f64>>> {
        let dataset = Dataset::from_csv_path(path, &csv_options(delimiter, skip_irregular)?)
            .map_err(to_py_err)?;
        let predictions = self.inner.predict_table(&dataset).map_err(to_py_err)?;
        Ok(Array1::from(predictions).into_pyarray_bound(py))
    }

    /// Fitted coefficients (intercept first), or None before fitting.
    #[getter]
    fn coefficients<'py>(&self, py: Python<'py>) -> Option<Bound<'py, PyArray1<f64>>> {
        self.inner
            .coefficients()
            .map(|c| c.clone().into_pyarray_bound(py))
    }

    #[getter]
    fn intercept(&self) -> Option<f64> {
        self.inner.intercept()
    }

    #[getter]
    fn dependent_name(&self) -> Option<String> {
        self.inner.dependent_name().map(str::to_string)
    }

    #[getter]
    fn independent_names(&self) -> Option<Vec<String>> {
        self.inner.independent_names().map(<[String]>::to_vec)
    }

    #[getter]
    fn is_fitted(&self) -> bool {
        self.inner.is_fitted()
    }

    #[getter]
    fn method(&self) -> &'static str {
        self.inner.config().method.name()
    }

    /// List of (term, estimate) pairs, "(intercept)" first.
    fn named_coefficients(&self) -> Vec<(String, f64)> {
        self.inner.named_coefficients()
    }

    fn __repr__(&self) -> String {
        match self.inner.dependent_name() {
            Some(dep) => format!(
                "RegressionEngine(method='{}', fitted='{}', n_coefficients={})",
                self.method(),
                dep,
                self.inner.coefficients().map(|c| c.len()).unwrap_or(0)
            ),
            None => format!("RegressionEngine(method='{}', unfitted)", self.method()),
        }
    }
}

fn csv_options(delimiter: &str, skip_irregular: bool) -> PyResult<CsvOptions> {
    let bytes = delimiter.as_bytes();
    if bytes.len() != 1 {
        return Err(PyValueError::new_err(format!(
            "delimiter must be a single ASCII character, got '{}'",
            delimiter
        )));
    }
    Ok(CsvOptions {
        delimiter: bytes[0],
        row_policy: if skip_irregular {
            RowPolicy::SkipIrregular
        } else {
            RowPolicy::Strict
        },
    })
}
