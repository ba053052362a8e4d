// =============================================================================
// linreg Python Bindings
// =============================================================================
//
// Exposes `linreg-core` to Python through PyO3. All numerics stay in the
// core crate; this crate only converts numpy arrays and Python strings into
// core types and maps `LinRegError` onto Python exceptions.
//
// Build with maturin (`maturin develop --features extension-module`), then:
//
//     from linreg._linreg import RegressionEngine
//     engine = RegressionEngine()
//     engine.fit("price", list(df.columns), df.to_numpy())
//     engine.predict([250.0, 3.0])
//
// =============================================================================

use pyo3::prelude::*;

mod engine_py;

pub use engine_py::PyRegressionEngine;

/// linreg: ordinary least squares with a Rust backend
#[pymodule]
fn _linreg(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyRegressionEngine>()?;
    Ok(())
}
