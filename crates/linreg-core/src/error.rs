// =============================================================================
// Error Types
// =============================================================================
//
// Every fallible operation in the library returns `Result<T>`, which is an
// alias for `std::result::Result<T, LinRegError>`.
//
// The four regression errors map one-to-one onto the ways fitting and
// prediction can go wrong. The I/O and CSV variants only come from the
// dataset loader; the numeric code never touches the filesystem.
//
// =============================================================================

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LinRegError>;

/// Errors produced while loading data, fitting, or predicting.
#[derive(Error, Debug)]
pub enum LinRegError {
    /// Bad column name, empty dataset, or a value that is not a number.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The normal equations have no unique solution (rank-deficient X'X).
    #[error("Singular matrix: {0}")]
    SingularMatrix(String),

    /// `predict` was called before a successful `fit`.
    #[error("Model is not fitted yet")]
    NotFitted,

    /// Prediction input does not match the number of fitted variables.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// The CSV file could not be opened or read.
    #[error("Unable to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV tokenizer rejected the input.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl LinRegError {
    /// Short, stable name of the error kind.
    ///
    /// Handy for callers (the Python bindings, the CLI) that want to branch
    /// on the category without matching every variant.
    pub fn kind(&self) -> &'static str {
        match self {
            LinRegError::InvalidInput(_) => "InvalidInput",
            LinRegError::SingularMatrix(_) => "SingularMatrix",
            LinRegError::NotFitted => "NotFitted",
            LinRegError::DimensionMismatch(_) => "DimensionMismatch",
            LinRegError::Io { .. } => "Io",
            LinRegError::Csv(_) => "Csv",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_detail() {
        let err = LinRegError::InvalidInput("column 'y' not found".to_string());
        assert_eq!(err.to_string(), "Invalid input: column 'y' not found");
        assert_eq!(err.kind(), "InvalidInput");
    }

    #[test]
    fn test_io_error_names_path() {
        let err = LinRegError::Io {
            path: PathBuf::from("missing.csv"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let msg = err.to_string();
        assert!(msg.contains("missing.csv"));
        assert!(msg.contains("no such file"));
    }
}
