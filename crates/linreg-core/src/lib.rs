// =============================================================================
// linreg Core Library
// =============================================================================
//
// Pure Rust ordinary least squares: read a table, regress one column on all
// the others, predict new rows. The CLI and the Python bindings are thin
// wrappers around what is exported here.
//
// STRUCTURE:
// ----------
//   - dataset:       `TabularData` trait, in-memory `Dataset`, CSV loading
//   - design_matrix: table -> (X with intercept column, Y)
//   - solvers:       numerically stable least squares (QR / Cholesky)
//   - engine:        `RegressionEngine`, the fit/predict state machine
//   - convert:       ndarray <-> nalgebra glue
//   - error:         `LinRegError` and the `Result` alias
//
// =============================================================================

pub mod convert;
pub mod dataset;
pub mod design_matrix;
pub mod engine;
pub mod error;
pub mod solvers;

pub use dataset::{ColumnValues, CsvOptions, Dataset, RowPolicy, TabularData};
pub use design_matrix::{build_design_matrix, DesignMatrix};
pub use engine::{FittedModel, RegressionEngine};
pub use error::{LinRegError, Result};
pub use solvers::{solve_ols, OlsConfig, OlsSolution, SolveMethod};
