// =============================================================================
// CSV Loading
// =============================================================================
//
// Reads a delimited text file into a `Dataset`. The first non-blank record is
// the header row; every following non-blank record is a data row. Cells are
// kept as text; numeric conversion happens later, on demand.
//
// IRREGULAR ROWS
// --------------
// A record with more or fewer fields than the header cannot be aligned with
// the columns. `RowPolicy::Strict` turns that into an `InvalidInput` error;
// `RowPolicy::SkipIrregular` drops the record and logs a warning.
//
// The tokenizer skips blank lines. With several columns a blank line is not a
// row anyway, but in a single-column file it is a row whose only cell is
// empty. Those lines are found from gaps in the record line numbers and go
// through the same policy.
//
// =============================================================================

use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::{debug, warn};

use super::Dataset;
use crate::error::{LinRegError, Result};

/// What to do with a record whose field count differs from the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowPolicy {
    /// Fail with `InvalidInput`.
    #[default]
    Strict,
    /// Drop the record and log a warning.
    SkipIrregular,
}

/// Options for reading CSV input.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter. Default: `b','`
    pub delimiter: u8,
    /// Handling of records with the wrong number of fields.
    pub row_policy: RowPolicy,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            row_policy: RowPolicy::Strict,
        }
    }
}

impl Dataset {
    /// Load a CSV file from disk.
    pub fn from_csv_path<P: AsRef<Path>>(path: P, options: &CsvOptions) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LinRegError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = Self::from_csv_reader(file, options)?;
        debug!(
            "loaded {} rows x {} columns from {}",
            dataset.num_rows,
            dataset.headers.len(),
            path.display()
        );
        Ok(dataset)
    }

    /// Load CSV from any reader.
    pub fn from_csv_reader<R: Read>(reader: R, options: &CsvOptions) -> Result<Self> {
        let mut reader = ::csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(options.delimiter)
            .from_reader(reader);

        let mut records = reader.records();

        let header_record = match records.next() {
            Some(record) => record?,
            None => {
                return Err(LinRegError::InvalidInput(
                    "CSV input is empty; expected a header row".to_string(),
                ))
            }
        };

        let headers: Vec<String> = header_record
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        if let Some(pos) = headers.iter().position(String::is_empty) {
            return Err(LinRegError::InvalidInput(format!(
                "header field {} is blank",
                pos + 1
            )));
        }

        let single_column = headers.len() == 1;
        let mut next_line = line_after(&header_record);

        let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
        for record in records {
            let record = record?;

            if let (true, Some(expected), Some(line)) =
                (single_column, next_line, record.position().map(|p| p.line()))
            {
                if line > expected {
                    match options.row_policy {
                        RowPolicy::Strict => {
                            return Err(LinRegError::InvalidInput(format!(
                                "line {}: blank line in a single-column file is an empty cell",
                                expected
                            )))
                        }
                        RowPolicy::SkipIrregular => warn!(
                            "skipping {} blank line(s) starting at line {}",
                            line - expected,
                            expected
                        ),
                    }
                }
            }
            next_line = line_after(&record);

            if record.len() != headers.len() {
                let line = record.position().map(|p| p.line()).unwrap_or(0);
                match options.row_policy {
                    RowPolicy::Strict => {
                        return Err(LinRegError::InvalidInput(format!(
                            "line {}: expected {} fields, found {}",
                            line,
                            headers.len(),
                            record.len()
                        )))
                    }
                    RowPolicy::SkipIrregular => {
                        warn!(
                            "skipping line {}: expected {} fields, found {}",
                            line,
                            headers.len(),
                            record.len()
                        );
                        continue;
                    }
                }
            }
            for (column, field) in cells.iter_mut().zip(record.iter()) {
                column.push(field.to_string());
            }
        }

        Self::from_columns(headers.into_iter().zip(cells).collect())
    }
}

/// Line on which the record after `record` starts, unless blank lines follow.
fn line_after(record: &::csv::StringRecord) -> Option<u64> {
    let start = record.position()?.line();
    let embedded: usize = record.iter().map(|field| field.matches('\n').count()).sum();
    Some(start + 1 + embedded as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::TabularData;
    use std::io::Write;

    fn load(text: &str, policy: RowPolicy) -> Result<Dataset> {
        let options = CsvOptions {
            row_policy: policy,
            ..CsvOptions::default()
        };
        Dataset::from_csv_reader(text.as_bytes(), &options)
    }

    #[test]
    fn test_reads_headers_and_values() {
        let ds = load("x, y\n0,2\n1,5\n\n2,8\n", RowPolicy::Strict).unwrap();
        assert_eq!(ds.column_headers(), &["x".to_string(), "y".to_string()]);
        assert_eq!(ds.num_rows(), 3);
        assert_eq!(ds.column_values_as_numeric("y").unwrap(), vec![2.0, 5.0, 8.0]);
    }

    #[test]
    fn test_single_column_file() {
        let ds = load("x\n1\n2\n", RowPolicy::Strict).unwrap();
        assert_eq!(ds.num_columns(), 1);
        assert_eq!(ds.num_rows(), 2);
    }

    #[test]
    fn test_single_column_blank_line_is_strict_error() {
        let err = load("x\n4\n\n10\n", RowPolicy::Strict).unwrap_err();
        assert!(matches!(err, LinRegError::InvalidInput(_)));
        assert!(err.to_string().contains("line 3"), "{}", err);
    }

    #[test]
    fn test_single_column_blank_line_skipped_when_lenient() {
        let ds = load("x\n4\n\n10\n", RowPolicy::SkipIrregular).unwrap();
        assert_eq!(ds.column_values_as_numeric("x").unwrap(), vec![4.0, 10.0]);
    }

    #[test]
    fn test_single_column_trailing_blank_lines_ignored() {
        let ds = load("x\n4\n10\n\n\n", RowPolicy::Strict).unwrap();
        assert_eq!(ds.num_rows(), 2);
    }

    #[test]
    fn test_single_column_quoted_newline_is_not_blank_line() {
        let ds = load("x\n\"4\n\"\n10\n", RowPolicy::Strict).unwrap();
        assert_eq!(ds.num_rows(), 2);
    }

    #[test]
    fn test_empty_cell_is_kept_as_null() {
        let ds = load("a,b\n1,\n2,3\n", RowPolicy::Strict).unwrap();
        assert_eq!(ds.column_values("b").unwrap(), vec!["", "3"]);
        assert!(ds.column_values_as_numeric("b").is_err());
    }

    #[test]
    fn test_strict_rejects_irregular_row() {
        let err = load("a,b\n1,2\n3\n", RowPolicy::Strict).unwrap_err();
        assert!(matches!(err, LinRegError::InvalidInput(_)));
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_skip_irregular_drops_row() {
        let ds = load("a,b\n1,2\n3\n4,5,6\n7,8\n", RowPolicy::SkipIrregular).unwrap();
        assert_eq!(ds.num_rows(), 2);
        assert_eq!(ds.column_values_as_numeric("a").unwrap(), vec![1.0, 7.0]);
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(matches!(
            load("", RowPolicy::Strict),
            Err(LinRegError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_blank_header_rejected() {
        assert!(matches!(
            load("a,,c\n1,2,3\n", RowPolicy::Strict),
            Err(LinRegError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_custom_delimiter() {
        let options = CsvOptions {
            delimiter: b';',
            ..CsvOptions::default()
        };
        let ds = Dataset::from_csv_reader("a;b\n1;2\n".as_bytes(), &options).unwrap();
        assert_eq!(ds.row_values_as_numeric(0).unwrap(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "x,y").unwrap();
        writeln!(file, "1,2").unwrap();
        file.flush().unwrap();

        let ds = Dataset::from_csv_path(file.path(), &CsvOptions::default()).unwrap();
        assert_eq!(ds.num_rows(), 1);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Dataset::from_csv_path("/definitely/not/here.csv", &CsvOptions::default())
            .unwrap_err();
        assert!(matches!(err, LinRegError::Io { .. }));
        assert!(err.to_string().contains("here.csv"));
    }
}
