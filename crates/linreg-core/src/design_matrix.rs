// =============================================================================
// Design Matrix Construction
// =============================================================================
//
// Turns a table into the pieces of the linear model  Y = XA + E:
//
//     X = [ 1  x₁₁  x₁₂ ... x₁ₖ ]      Y = [ y₁ ]
//         [ 1  x₂₁  x₂₂ ... x₂ₖ ]          [ y₂ ]
//         [ ...                 ]          [ .. ]
//         [ 1  xₙ₁  xₙ₂ ... xₙₖ ]          [ yₙ ]
//
// Column 0 of X is the intercept. Columns 1..=k are every column of the table
// except the dependent one, in the table's own column order. That order is
// also the order of the fitted coefficients, so it is kept alongside X.
//
// =============================================================================

use log::debug;
use ndarray::{Array1, Array2};

use crate::dataset::TabularData;
use crate::error::{LinRegError, Result};

/// The regression problem extracted from a table.
#[derive(Debug, Clone)]
pub struct DesignMatrix {
    /// n × (k+1) matrix, intercept column first.
    pub x: Array2<f64>,
    /// Dependent values, length n.
    pub y: Array1<f64>,
    /// Name of the dependent column.
    pub dependent_name: String,
    /// Names of columns 1..=k of `x`.
    pub independent_names: Vec<String>,
}

impl DesignMatrix {
    pub fn n_obs(&self) -> usize {
        self.x.nrows()
    }

    /// Number of coefficients (independent variables + intercept).
    pub fn n_params(&self) -> usize {
        self.x.ncols()
    }
}

/// Every header except the dependent one, order preserved.
pub fn independent_names(headers: &[String], dependent_name: &str) -> Vec<String> {
    headers
        .iter()
        .filter(|h| h.as_str() != dependent_name)
        .cloned()
        .collect()
}

/// Build X and Y for regressing `dependent_name` on every other column.
///
/// # Errors
/// `InvalidInput` if the dependent column is missing, the table has no rows,
/// there is no independent column, or a value is not numeric.
pub fn build_design_matrix<D>(dependent_name: &str, data: &D) -> Result<DesignMatrix>
where
    D: TabularData + ?Sized,
{
    let headers = data.column_headers();
    if !headers.iter().any(|h| h == dependent_name) {
        return Err(LinRegError::InvalidInput(format!(
            "dependent column '{}' not found (available: {})",
            dependent_name,
            headers.join(", ")
        )));
    }

    let n = data.num_rows();
    if n == 0 {
        return Err(LinRegError::InvalidInput("dataset has no rows".to_string()));
    }

    let names = independent_names(headers, dependent_name);
    if names.is_empty() {
        return Err(LinRegError::InvalidInput(format!(
            "dataset needs at least one column besides '{}'",
            dependent_name
        )));
    }

    let y = Array1::from(checked_column(data, dependent_name, n)?);

    let mut x = Array2::ones((n, names.len() + 1));
    for (j, name) in names.iter().enumerate() {
        let values = checked_column(data, name, n)?;
        x.column_mut(j + 1)
            .iter_mut()
            .zip(values)
            .for_each(|(cell, v)| *cell = v);
    }

    debug!(
        "design matrix for '{}': {} rows x {} columns",
        dependent_name,
        n,
        x.ncols()
    );

    Ok(DesignMatrix {
        x,
        y,
        dependent_name: dependent_name.to_string(),
        independent_names: names,
    })
}

fn checked_column<D>(data: &D, name: &str, n: usize) -> Result<Vec<f64>>
where
    D: TabularData + ?Sized,
{
    let values = data.column_values_as_numeric(name)?;
    if values.len() != n {
        return Err(LinRegError::InvalidInput(format!(
            "column '{}' has {} values but the dataset has {} rows",
            name,
            values.len(),
            n
        )));
    }
    Ok(values)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use ndarray::array;

    fn dataset() -> Dataset {
        Dataset::from_numeric_columns(vec![
            ("x1".to_string(), vec![1.0, 2.0, 3.0]),
            ("y".to_string(), vec![10.0, 20.0, 30.0]),
            ("x2".to_string(), vec![4.0, 5.0, 6.0]),
        ])
        .unwrap()
    }

    #[test]
    fn test_intercept_then_independent_columns_in_order() {
        let dm = build_design_matrix("y", &dataset()).unwrap();
        assert_eq!(dm.x, array![[1.0, 1.0, 4.0], [1.0, 2.0, 5.0], [1.0, 3.0, 6.0]]);
        assert_eq!(dm.y, array![10.0, 20.0, 30.0]);
        assert_eq!(dm.independent_names, vec!["x1", "x2"]);
        assert_eq!(dm.n_obs(), 3);
        assert_eq!(dm.n_params(), 3);
    }

    #[test]
    fn test_missing_dependent() {
        let err = build_design_matrix("price", &dataset()).unwrap_err();
        assert!(matches!(err, LinRegError::InvalidInput(_)));
    }

    #[test]
    fn test_no_rows() {
        let ds = Dataset::from_numeric_columns(vec![
            ("x".to_string(), vec![]),
            ("y".to_string(), vec![]),
        ])
        .unwrap();
        assert!(matches!(
            build_design_matrix("y", &ds),
            Err(LinRegError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_only_dependent_column() {
        let ds = Dataset::from_numeric_columns(vec![("y".to_string(), vec![1.0, 2.0])]).unwrap();
        assert!(matches!(
            build_design_matrix("y", &ds),
            Err(LinRegError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_non_numeric_independent_value() {
        let ds = Dataset::from_columns(vec![
            ("x".to_string(), vec!["1".to_string(), "two".to_string()]),
            ("y".to_string(), vec!["1".to_string(), "2".to_string()]),
        ])
        .unwrap();
        let err = build_design_matrix("y", &ds).unwrap_err();
        assert!(err.to_string().contains("two"));
    }

    #[test]
    fn test_works_through_trait_object() {
        let ds = dataset();
        let data: &dyn TabularData = &ds;
        let dm = build_design_matrix("x2", data).unwrap();
        assert_eq!(dm.independent_names, vec!["x1", "y"]);
    }
}
