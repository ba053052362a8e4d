// =============================================================================
// Tabular Data
// =============================================================================
//
// The regression engine never reads files itself. It talks to a
// `TabularData` provider that can answer four questions:
//
//   - what are the column names (in order)?
//   - how many rows are there?
//   - give me column `name` as f64 values
//   - give me row `i` as f64 values (one per column, header order)
//
// `Dataset` is the in-memory implementation. Columns loaded from CSV are kept
// as raw text and only converted when the engine asks for numbers, so a
// dataset can be printed exactly as it was read even if some cells are not
// numeric. Columns handed over by numeric callers (Python, tests) are stored
// as f64 directly.
//
// =============================================================================

pub mod csv;

pub use self::csv::{CsvOptions, RowPolicy};

use std::collections::HashMap;

use crate::error::{LinRegError, Result};

/// A source of named, equally long columns that can be read as f64.
pub trait TabularData {
    /// Column names in their natural order.
    fn column_headers(&self) -> &[String];

    /// Number of rows (shared by every column).
    fn num_rows(&self) -> usize;

    /// Values of one column converted to f64, `num_rows()` long.
    fn column_values_as_numeric(&self, name: &str) -> Result<Vec<f64>>;

    /// Values of one row converted to f64, ordered like `column_headers()`.
    fn row_values_as_numeric(&self, row: usize) -> Result<Vec<f64>>;

    fn num_columns(&self) -> usize {
        self.column_headers().len()
    }

    fn has_column(&self, name: &str) -> bool {
        self.column_headers().iter().any(|h| h == name)
    }
}

/// Storage for a single column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    /// Raw cell text, as tokenized from a CSV file.
    Text(Vec<String>),
    /// Already-numeric values.
    Numeric(Vec<f64>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Text(v) => v.len(),
            ColumnValues::Numeric(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The cell rendered as text. Empty string means a null cell.
    pub fn cell_text(&self, row: usize) -> Option<String> {
        match self {
            ColumnValues::Text(v) => v.get(row).cloned(),
            ColumnValues::Numeric(v) => v.get(row).map(|x| x.to_string()),
        }
    }

    fn numeric_at(&self, column: &str, row: usize) -> Result<f64> {
        match self {
            ColumnValues::Text(v) => parse_cell(&v[row], column, row),
            ColumnValues::Numeric(v) => check_finite(v[row], column, row),
        }
    }
}

/// Parse one cell as a finite f64.
///
/// Surrounding whitespace is ignored. Empty cells are nulls and are rejected,
/// as are `NaN`/`inf` spellings that `str::parse` would otherwise accept.
pub fn parse_cell(text: &str, column: &str, row: usize) -> Result<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(LinRegError::InvalidInput(format!(
            "column '{}' row {} is empty (NULL)",
            column, row
        )));
    }
    let value: f64 = trimmed.parse().map_err(|_| {
        LinRegError::InvalidInput(format!(
            "column '{}' row {}: cannot parse '{}' as a number",
            column, row, trimmed
        ))
    })?;
    check_finite(value, column, row)
}

fn check_finite(value: f64, column: &str, row: usize) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(LinRegError::InvalidInput(format!(
            "column '{}' row {}: value {} is not finite",
            column, row, value
        )))
    }
}

// =============================================================================
// Dataset
// =============================================================================

/// In-memory table: ordered, uniquely named columns of equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    headers: Vec<String>,
    columns: Vec<ColumnValues>,
    index: HashMap<String, usize>,
    num_rows: usize,
}

impl Dataset {
    /// Build a dataset from raw text columns.
    pub fn from_columns(columns: Vec<(String, Vec<String>)>) -> Result<Self> {
        Self::from_column_values(
            columns
                .into_iter()
                .map(|(name, values)| (name, ColumnValues::Text(values)))
                .collect(),
        )
    }

    /// Build a dataset from numeric columns.
    pub fn from_numeric_columns(columns: Vec<(String, Vec<f64>)>) -> Result<Self> {
        Self::from_column_values(
            columns
                .into_iter()
                .map(|(name, values)| (name, ColumnValues::Numeric(values)))
                .collect(),
        )
    }

    /// Build a dataset, checking that names are unique and lengths agree.
    pub fn from_column_values(columns: Vec<(String, ColumnValues)>) -> Result<Self> {
        if columns.is_empty() {
            return Err(LinRegError::InvalidInput(
                "a dataset needs at least one column".to_string(),
            ));
        }

        let num_rows = columns[0].1.len();
        let mut headers = Vec::with_capacity(columns.len());
        let mut values = Vec::with_capacity(columns.len());
        let mut index = HashMap::with_capacity(columns.len());

        for (i, (name, column)) in columns.into_iter().enumerate() {
            if column.len() != num_rows {
                return Err(LinRegError::InvalidInput(format!(
                    "column '{}' has {} values but column '{}' has {}",
                    name,
                    column.len(),
                    headers.first().map(String::as_str).unwrap_or(""),
                    num_rows
                )));
            }
            if index.insert(name.clone(), i).is_some() {
                return Err(LinRegError::InvalidInput(format!(
                    "duplicate column name '{}'",
                    name
                )));
            }
            headers.push(name);
            values.push(column);
        }

        Ok(Self {
            headers,
            columns: values,
            index,
            num_rows,
        })
    }

    /// Raw storage of a column, if it exists.
    pub fn column(&self, name: &str) -> Option<&ColumnValues> {
        self.index.get(name).map(|&i| &self.columns[i])
    }

    /// Cell text of a column, for display.
    pub fn column_values(&self, name: &str) -> Result<Vec<String>> {
        let column = self.require(name)?;
        Ok((0..self.num_rows)
            .filter_map(|row| column.cell_text(row))
            .collect())
    }

    /// Iterate over `(name, column)` pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnValues)> {
        self.headers
            .iter()
            .map(String::as_str)
            .zip(self.columns.iter())
    }

    /// A copy with the columns in a different order.
    ///
    /// `order` must be a permutation of the existing header names.
    pub fn reordered(&self, order: &[&str]) -> Result<Self> {
        if order.len() != self.headers.len() {
            return Err(LinRegError::InvalidInput(format!(
                "expected {} column names, got {}",
                self.headers.len(),
                order.len()
            )));
        }
        let columns = order
            .iter()
            .map(|&name| Ok((name.to_string(), self.require(name)?.clone())))
            .collect::<Result<Vec<_>>>()?;
        Self::from_column_values(columns)
    }

    fn require(&self, name: &str) -> Result<&ColumnValues> {
        self.column(name).ok_or_else(|| {
            LinRegError::InvalidInput(format!(
                "column '{}' not found (available: {})",
                name,
                self.headers.join(", ")
            ))
        })
    }
}

impl TabularData for Dataset {
    fn column_headers(&self) -> &[String] {
        &self.headers
    }

    fn num_rows(&self) -> usize {
        self.num_rows
    }

    fn column_values_as_numeric(&self, name: &str) -> Result<Vec<f64>> {
        let column = self.require(name)?;
        (0..self.num_rows)
            .map(|row| column.numeric_at(name, row))
            .collect()
    }

    fn row_values_as_numeric(&self, row: usize) -> Result<Vec<f64>> {
        if row >= self.num_rows {
            return Err(LinRegError::InvalidInput(format!(
                "row {} out of range (dataset has {} rows)",
                row, self.num_rows
            )));
        }
        self.headers
            .iter()
            .zip(self.columns.iter())
            .map(|(name, column)| column.numeric_at(name, row))
            .collect()
    }
}

// =============================================================================
// Tests
// =============================================================================
